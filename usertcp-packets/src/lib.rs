//! Zero-copy header overlays for the frames a usertcp device reads off its link.
//!
//! Every overlay is generic over its storage, so the same type views a received
//! buffer in place or owns the few bytes of a header being built for a reply.
//! Lengths are checked once, when the overlay is constructed.

mod types;
pub use self::types::*;

mod ethernet;
pub use self::ethernet::*;

mod arp;
pub use self::arp::*;

mod ipv4;
pub use self::ipv4::*;
