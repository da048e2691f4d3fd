#![cfg(target_os = "linux")]
mod linux;
mod tap;

pub use crate::tap::{ipv4_netmask, Tap};
