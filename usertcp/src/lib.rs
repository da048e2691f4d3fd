/// The address resolution table a device fills from the ARP traffic it sees. Every
/// well-formed Ethernet/IPv4 ARP message teaches the device the sender's hardware
/// address, whether or not the message was meant for it.
pub mod arp_cache;

/// Command line configuration of the daemon: which TAP interface to drive, and the
/// IPv4 and Ethernet identity the device answers for.
pub mod config;

/// Errors the device can hit while moving frames. Only a failure to read from the
/// link is fatal; everything else costs at most one frame.
pub mod error;

/// Links are the device's connection to the outside world: something that hands over
/// whole Ethernet frames and accepts them back. The daemon uses a TAP interface, tests
/// use an in-memory link driven through channels.
pub mod link;

/// The network device itself. It pulls frames off its link, classifies them by
/// ethertype, keeps its ARP cache current and answers ARP requests for its address.
/// If you are looking for a place to start, start there.
pub mod netdev;

/// A `tracing` subscriber that prints events to stderr, filtered by verbosity.
pub mod subscriber;


pub use crate::arp_cache::{ArpCache, ArpCacheEntry};
pub use crate::config::{Config, ConfigError};
pub use crate::error::DeviceError;
pub use crate::link::Link;
pub use crate::netdev::{build_arp_reply, ArpOutcome, Dispatch, NetDevice};
pub use crate::subscriber::DeviceSubscriber;
