use failure::Fail;
use std::fmt;
use std::str::FromStr;

pub const IPV4_ETHER_TYPE: u16 = 0x0800;
pub const ARP_ETHER_TYPE: u16 = 0x0806;
pub const RARP_ETHER_TYPE: u16 = 0x8035;
pub const IPV6_ETHER_TYPE: u16 = 0x86DD;

/// Errors raised while laying a header overlay over an untrusted buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Fail)]
pub enum PacketError {
    #[fail(display = "frame is shorter than the 14 byte Ethernet header")]
    MalformedFrame,
    #[fail(display = "ARP message is shorter than the 8 byte ARP header")]
    MalformedArpHeader,
    #[fail(display = "ARP data region is shorter than the 20 byte IPv4 payload")]
    MalformedArpV4Data,
    #[fail(display = "unsupported ARP hardware type {:#06x}", _0)]
    UnsupportedHardwareType(u16),
    #[fail(display = "unsupported ARP protocol type {:#06x}", _0)]
    UnsupportedProtocolType(u16),
    #[fail(
        display = "unsupported ARP address lengths (hardware {}, protocol {})",
        hardware, protocol
    )]
    UnsupportedAddressLength { hardware: u8, protocol: u8 },
    #[fail(display = "malformed IPv4 header")]
    MalformedIpv4Packet,
    #[fail(display = "invalid MAC address")]
    InvalidMacAddr,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr { bytes: [0xff; 6] };

    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    /// Copies the first six bytes of `bytes`. Callers guarantee the length.
    pub(crate) fn from_slice(bytes: &[u8]) -> MacAddr {
        let mut mac = [0; 6];
        mac.copy_from_slice(&bytes[..6]);
        MacAddr::new(mac)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}

/// Parses the colon separated form, `DE:C7:87:CB:A8:5C`. Hyphens are accepted too.
impl FromStr for MacAddr {
    type Err = PacketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 6];
        let mut octets = s.split(|c| c == ':' || c == '-');
        for byte in bytes.iter_mut() {
            let octet = octets.next().ok_or(PacketError::InvalidMacAddr)?;
            if octet.len() != 2 {
                return Err(PacketError::InvalidMacAddr);
            }
            *byte = u8::from_str_radix(octet, 16).map_err(|_| PacketError::InvalidMacAddr)?;
        }
        if octets.next().is_some() {
            return Err(PacketError::InvalidMacAddr);
        }
        Ok(MacAddr::new(bytes))
    }
}

/// Payload protocol carried by an Ethernet II frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EtherType {
    Ipv4,
    Arp,
    Rarp,
    Ipv6,
    Unknown(u16),
}

impl From<u16> for EtherType {
    fn from(raw: u16) -> Self {
        match raw {
            IPV4_ETHER_TYPE => EtherType::Ipv4,
            ARP_ETHER_TYPE => EtherType::Arp,
            RARP_ETHER_TYPE => EtherType::Rarp,
            IPV6_ETHER_TYPE => EtherType::Ipv6,
            other => EtherType::Unknown(other),
        }
    }
}

impl From<EtherType> for u16 {
    fn from(ether_type: EtherType) -> Self {
        match ether_type {
            EtherType::Ipv4 => IPV4_ETHER_TYPE,
            EtherType::Arp => ARP_ETHER_TYPE,
            EtherType::Rarp => RARP_ETHER_TYPE,
            EtherType::Ipv6 => IPV6_ETHER_TYPE,
            EtherType::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EtherType::Ipv4 => write!(f, "IPv4"),
            EtherType::Arp => write!(f, "ARP"),
            EtherType::Rarp => write!(f, "RARP"),
            EtherType::Ipv6 => write!(f, "IPv6"),
            EtherType::Unknown(raw) => write!(f, "{:#06x}", raw),
        }
    }
}
