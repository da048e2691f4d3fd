use crate::*;
use std::net::Ipv4Addr;

/// Fixed part of every ARP message.
pub const ARP_HEADER_LEN: usize = 8;
/// Ethernet/IPv4 address block that follows the fixed header.
pub const ARP_V4_PAYLOAD_LEN: usize = 20;

const ETHERNET_ADDR_LEN: u8 = 6;
const IPV4_ADDR_LEN: u8 = 4;

const HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
const PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
const HARDWARE_ADDR_LEN_OFFSET: usize = 4;
const PROTOCOL_ADDR_LEN_OFFSET: usize = 5;
const OPCODE_RANGE: (usize, usize) = (6, 8);

// Offsets inside the IPv4 payload, relative to the end of the fixed header.
const SENDER_MAC_RANGE: (usize, usize) = (0, 6);
const SENDER_IP_RANGE: (usize, usize) = (6, 10);
const TARGET_MAC_RANGE: (usize, usize) = (10, 16);
const TARGET_IP_RANGE: (usize, usize) = (16, 20);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpOp {
    Request,
    Reply,
    RarpRequest,
    RarpReply,
    Unknown(u16),
}

impl From<u16> for ArpOp {
    fn from(raw: u16) -> Self {
        match raw {
            1 => ArpOp::Request,
            2 => ArpOp::Reply,
            3 => ArpOp::RarpRequest,
            4 => ArpOp::RarpReply,
            other => ArpOp::Unknown(other),
        }
    }
}

impl From<ArpOp> for u16 {
    fn from(op: ArpOp) -> Self {
        match op {
            ArpOp::Request => 1,
            ArpOp::Reply => 2,
            ArpOp::RarpRequest => 3,
            ArpOp::RarpReply => 4,
            ArpOp::Unknown(raw) => raw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpHardwareType {
    Ethernet,
    Unknown(u16),
}

impl From<u16> for ArpHardwareType {
    fn from(raw: u16) -> Self {
        match raw {
            1 => ArpHardwareType::Ethernet,
            other => ArpHardwareType::Unknown(other),
        }
    }
}

impl From<ArpHardwareType> for u16 {
    fn from(hardware_type: ArpHardwareType) -> Self {
        match hardware_type {
            ArpHardwareType::Ethernet => 1,
            ArpHardwareType::Unknown(raw) => raw,
        }
    }
}

///
/// Overlay over the fixed 8 byte header of the packet structure described in RFC 826
/// https://tools.ietf.org/html/rfc826
///
/// Only the header length is checked here; `ArpMessage` decides whether the
/// hardware/protocol combination is one we speak.
///
#[derive(Clone, Debug)]
pub struct ArpHeader<T> {
    buffer: T,
}

impl<T: AsRef<[u8]>> ArpHeader<T> {
    pub fn new_checked(buffer: T) -> Result<Self, PacketError> {
        if buffer.as_ref().len() < ARP_HEADER_LEN {
            return Err(PacketError::MalformedArpHeader);
        }
        Ok(ArpHeader { buffer })
    }

    pub fn hardware_type(&self) -> ArpHardwareType {
        ArpHardwareType::from(self.read_u16(HARDWARE_TYPE_RANGE))
    }

    /// Protocol types share the EtherType number space.
    pub fn protocol_type(&self) -> EtherType {
        EtherType::from(self.read_u16(PROTOCOL_TYPE_RANGE))
    }

    pub fn hardware_addr_len(&self) -> u8 {
        self.buffer.as_ref()[HARDWARE_ADDR_LEN_OFFSET]
    }

    pub fn protocol_addr_len(&self) -> u8 {
        self.buffer.as_ref()[PROTOCOL_ADDR_LEN_OFFSET]
    }

    pub fn opcode(&self) -> ArpOp {
        ArpOp::from(self.read_u16(OPCODE_RANGE))
    }

    /// The variable length address block after the fixed header.
    pub fn data(&self) -> &[u8] {
        &self.buffer.as_ref()[ARP_HEADER_LEN..]
    }

    /// The 8 fixed header bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..ARP_HEADER_LEN]
    }

    fn read_u16(&self, (start, _): (usize, usize)) -> u16 {
        let data = self.buffer.as_ref();
        u16::from_be_bytes([data[start], data[start + 1]])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> ArpHeader<T> {
    pub fn set_hardware_type(&mut self, hardware_type: ArpHardwareType) {
        self.write_u16(HARDWARE_TYPE_RANGE, hardware_type.into());
    }

    pub fn set_protocol_type(&mut self, protocol_type: EtherType) {
        self.write_u16(PROTOCOL_TYPE_RANGE, protocol_type.into());
    }

    pub fn set_hardware_addr_len(&mut self, len: u8) {
        self.buffer.as_mut()[HARDWARE_ADDR_LEN_OFFSET] = len;
    }

    pub fn set_protocol_addr_len(&mut self, len: u8) {
        self.buffer.as_mut()[PROTOCOL_ADDR_LEN_OFFSET] = len;
    }

    pub fn set_opcode(&mut self, op: ArpOp) {
        self.write_u16(OPCODE_RANGE, op.into());
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[ARP_HEADER_LEN..]
    }

    fn write_u16(&mut self, (start, end): (usize, usize), value: u16) {
        self.buffer.as_mut()[start..end].copy_from_slice(&value.to_be_bytes());
    }
}

///
/// An ARP message whose header declares the one combination we resolve:
/// Ethernet hardware addresses for IPv4 protocol addresses.
///
#[derive(Clone, Debug)]
pub struct ArpMessage<T> {
    buffer: T,
}

impl<T: AsRef<[u8]>> ArpMessage<T> {
    ///
    /// Validates
    /// - The buffer holds the fixed 8 byte header
    /// - The hardware type is Ethernet and the protocol type is IPv4
    /// - The declared address lengths are 6 and 4
    ///
    /// The address block itself is checked by `ipv4_payload`.
    ///
    pub fn new_checked(buffer: T) -> Result<Self, PacketError> {
        {
            let header = ArpHeader::new_checked(buffer.as_ref())?;

            if let ArpHardwareType::Unknown(raw) = header.hardware_type() {
                return Err(PacketError::UnsupportedHardwareType(raw));
            }

            let protocol_type = header.protocol_type();
            if protocol_type != EtherType::Ipv4 {
                return Err(PacketError::UnsupportedProtocolType(protocol_type.into()));
            }

            let hardware = header.hardware_addr_len();
            let protocol = header.protocol_addr_len();
            if hardware != ETHERNET_ADDR_LEN || protocol != IPV4_ADDR_LEN {
                return Err(PacketError::UnsupportedAddressLength { hardware, protocol });
            }
        }
        Ok(ArpMessage { buffer })
    }

    pub fn header(&self) -> ArpHeader<&[u8]> {
        ArpHeader {
            buffer: self.buffer.as_ref(),
        }
    }

    pub fn ipv4_payload(&self) -> Result<ArpV4Message<&[u8]>, PacketError> {
        ArpV4Message::new_checked(&self.buffer.as_ref()[ARP_HEADER_LEN..])
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    pub fn into_inner(self) -> T {
        self.buffer
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> ArpMessage<T> {
    pub fn header_mut(&mut self) -> ArpHeader<&mut [u8]> {
        ArpHeader {
            buffer: self.buffer.as_mut(),
        }
    }

    pub fn ipv4_payload_mut(&mut self) -> Result<ArpV4Message<&mut [u8]>, PacketError> {
        let data = &mut self.buffer.as_mut()[ARP_HEADER_LEN..];
        ArpV4Message::new_checked(data)
    }
}

impl ArpMessage<Vec<u8>> {
    /// Builds a complete Ethernet/IPv4 ARP message, header and address block.
    pub fn build_ipv4(
        op: ArpOp,
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        let mut data = vec![0; ARP_HEADER_LEN + ARP_V4_PAYLOAD_LEN];
        {
            let mut header = ArpHeader {
                buffer: &mut data[..],
            };
            header.set_hardware_type(ArpHardwareType::Ethernet);
            header.set_protocol_type(EtherType::Ipv4);
            header.set_hardware_addr_len(ETHERNET_ADDR_LEN);
            header.set_protocol_addr_len(IPV4_ADDR_LEN);
            header.set_opcode(op);

            let mut payload = ArpV4Message {
                buffer: header.data_mut(),
            };
            payload.set_sender_mac(sender_mac);
            payload.set_sender_ip(sender_ip);
            payload.set_target_mac(target_mac);
            payload.set_target_ip(target_ip);
        }
        ArpMessage { buffer: data }
    }
}

/// The Ethernet/IPv4 address block of an ARP message.
#[derive(Clone, Debug)]
pub struct ArpV4Message<T> {
    buffer: T,
}

impl<T: AsRef<[u8]>> ArpV4Message<T> {
    pub fn new_checked(buffer: T) -> Result<Self, PacketError> {
        if buffer.as_ref().len() < ARP_V4_PAYLOAD_LEN {
            return Err(PacketError::MalformedArpV4Data);
        }
        Ok(ArpV4Message { buffer })
    }

    pub fn sender_mac(&self) -> MacAddr {
        let (start, end) = SENDER_MAC_RANGE;
        MacAddr::from_slice(&self.buffer.as_ref()[start..end])
    }

    pub fn sender_ip(&self) -> Ipv4Addr {
        self.read_ip(SENDER_IP_RANGE)
    }

    pub fn target_mac(&self) -> MacAddr {
        let (start, end) = TARGET_MAC_RANGE;
        MacAddr::from_slice(&self.buffer.as_ref()[start..end])
    }

    pub fn target_ip(&self) -> Ipv4Addr {
        self.read_ip(TARGET_IP_RANGE)
    }

    /// Builds the block of a reply to this message: `sender_mac`/`sender_ip` become
    /// the sender and the original sender becomes the target.
    pub fn with_swapped_endpoints(
        &self,
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
    ) -> ArpV4Message<[u8; ARP_V4_PAYLOAD_LEN]> {
        let mut reply = ArpV4Message {
            buffer: [0; ARP_V4_PAYLOAD_LEN],
        };
        reply.set_sender_mac(sender_mac);
        reply.set_sender_ip(sender_ip);
        reply.set_target_mac(self.sender_mac());
        reply.set_target_ip(self.sender_ip());
        reply
    }

    /// The 20 address bytes, without any trailing padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..ARP_V4_PAYLOAD_LEN]
    }

    fn read_ip(&self, (start, _): (usize, usize)) -> Ipv4Addr {
        let data = self.buffer.as_ref();
        Ipv4Addr::new(data[start], data[start + 1], data[start + 2], data[start + 3])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> ArpV4Message<T> {
    pub fn set_sender_mac(&mut self, mac: MacAddr) {
        let (start, end) = SENDER_MAC_RANGE;
        self.buffer.as_mut()[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn set_sender_ip(&mut self, ip: Ipv4Addr) {
        let (start, end) = SENDER_IP_RANGE;
        self.buffer.as_mut()[start..end].copy_from_slice(&ip.octets());
    }

    pub fn set_target_mac(&mut self, mac: MacAddr) {
        let (start, end) = TARGET_MAC_RANGE;
        self.buffer.as_mut()[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn set_target_ip(&mut self, ip: Ipv4Addr) {
        let (start, end) = TARGET_IP_RANGE;
        self.buffer.as_mut()[start..end].copy_from_slice(&ip.octets());
    }
}
