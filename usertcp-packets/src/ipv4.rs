use crate::*;
use std::net::Ipv4Addr;

/// Minimum IPv4 header, without options.
pub const IPV4_HEADER_LEN: usize = 20;

/// Read-only overlay over an IPv4 header. The device does not route, so this is
/// only ever used to describe the IPv4 traffic it sees.
#[derive(Clone, Debug)]
pub struct Ipv4Header<T> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Ipv4Header<T> {
    pub fn new_checked(buffer: T) -> Result<Self, PacketError> {
        let data = buffer.as_ref();
        if data.len() < IPV4_HEADER_LEN {
            return Err(PacketError::MalformedIpv4Packet);
        }

        // Check version number
        if (data[0] & 0xF0) >> 4 != 4 {
            return Err(PacketError::MalformedIpv4Packet);
        }

        // IHL is in 32bit words and covers the options
        let header_len = usize::from(data[0] & 0x0F) * 4;
        if header_len < IPV4_HEADER_LEN || data.len() < header_len {
            return Err(PacketError::MalformedIpv4Packet);
        }

        Ok(Ipv4Header { buffer })
    }

    pub fn version(&self) -> u8 {
        self.data()[0] >> 4
    }

    pub fn ihl(&self) -> u8 {
        self.data()[0] & 0x0F
    }

    pub fn dscp(&self) -> u8 {
        self.data()[1] >> 2
    }

    pub fn ecn(&self) -> u8 {
        self.data()[1] & 0x03
    }

    pub fn total_len(&self) -> u16 {
        self.read_u16(2)
    }

    pub fn identification(&self) -> u16 {
        self.read_u16(4)
    }

    /// Returns tuple of (Don't Fragment, More Fragments)
    pub fn flags(&self) -> (bool, bool) {
        let df = (self.data()[6] & 0x40) != 0;
        let mf = (self.data()[6] & 0x20) != 0;
        (df, mf)
    }

    pub fn fragment_offset(&self) -> u16 {
        self.read_u16(6) & 0x1FFF
    }

    pub fn ttl(&self) -> u8 {
        self.data()[8]
    }

    pub fn protocol(&self) -> u8 {
        self.data()[9]
    }

    pub fn checksum(&self) -> u16 {
        self.read_u16(10)
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        let d = self.data();
        Ipv4Addr::new(d[12], d[13], d[14], d[15])
    }

    pub fn dest_addr(&self) -> Ipv4Addr {
        let d = self.data();
        Ipv4Addr::new(d[16], d[17], d[18], d[19])
    }

    /// Option bytes, empty when the IHL is 5.
    pub fn options(&self) -> &[u8] {
        &self.data()[IPV4_HEADER_LEN..self.header_len()]
    }

    pub fn payload(&self) -> &[u8] {
        &self.data()[self.header_len()..]
    }

    fn header_len(&self) -> usize {
        usize::from(self.ihl()) * 4
    }

    fn data(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    fn read_u16(&self, offset: usize) -> u16 {
        let d = self.data();
        u16::from_be_bytes([d[offset], d[offset + 1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_header() {
        let data: Vec<u8> = vec![
            0x45, 0, 0, 24, 0x1c, 0x46, 0x40, 0, 64, 17, 0xb8, 0x61, 192, 178, 128, 0, 10, 0, 0, 1,
            0xca, 0xfe, 0xba, 0xbe,
        ];
        let header = Ipv4Header::new_checked(&data[..]).unwrap();

        assert_eq!(header.version(), 4);
        assert_eq!(header.ihl(), 5);
        assert_eq!(header.dscp(), 0);
        assert_eq!(header.ecn(), 0);
        assert_eq!(header.total_len(), 24);
        assert_eq!(header.identification(), 0x1c46);
        assert_eq!(header.flags(), (true, false));
        assert_eq!(header.fragment_offset(), 0);
        assert_eq!(header.ttl(), 64);
        assert_eq!(header.protocol(), 17);
        assert_eq!(header.checksum(), 0xb861);
        assert_eq!(header.src_addr(), Ipv4Addr::new(192, 178, 128, 0));
        assert_eq!(header.dest_addr(), Ipv4Addr::new(10, 0, 0, 1));
        assert!(header.options().is_empty());
        assert_eq!(header.payload(), &[0xca, 0xfe, 0xba, 0xbe]);
    }

    #[test]
    fn options() {
        let mut data: Vec<u8> = vec![
            0x46, 0, 0, 24, 0, 0, 0, 0, 64, 6, 0, 0, 10, 0, 0, 2, 10, 0, 0, 1,
        ];
        data.extend_from_slice(&[1, 1, 1, 0]);
        let header = Ipv4Header::new_checked(&data[..]).unwrap();
        assert_eq!(header.options(), &[1, 1, 1, 0]);
        assert!(header.payload().is_empty());
    }

    #[test]
    fn reject_malformed() {
        // Too short
        assert!(Ipv4Header::new_checked(&[0x45; 19][..]).is_err());

        // Wrong version
        let mut data = vec![0; 20];
        data[0] = 0x65;
        assert_eq!(
            Ipv4Header::new_checked(&data[..]).unwrap_err(),
            PacketError::MalformedIpv4Packet
        );

        // IHL claims options that are not there
        data[0] = 0x46;
        assert!(Ipv4Header::new_checked(&data[..]).is_err());

        // IHL below the minimum
        data[0] = 0x44;
        assert!(Ipv4Header::new_checked(&data[..]).is_err());
    }
}
