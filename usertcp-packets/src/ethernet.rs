use crate::*;

/// Length of an Ethernet II header. 802.1Q tagged frames are not supported.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Largest frame read from a link: 1500 byte MTU, header and frame check sequence.
pub const MAX_FRAME_LEN: usize = 1518;

// 0                    6                    12                      14
// |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
const DEST_MAC_RANGE: (usize, usize) = (0, 6);
const SRC_MAC_RANGE: (usize, usize) = (6, 12);
const ETHER_TYPE_RANGE: (usize, usize) = (12, 14);

/// Overlay over the first 14 bytes of a buffer holding an Ethernet II frame.
///
/// The overlay never owns more than the caller hands it: a borrowed slice while
/// parsing, or a fresh `[u8; 14]` from `build` when constructing a reply.
#[derive(Clone, Debug)]
pub struct EthernetHeader<T> {
    buffer: T,
}

impl<T: AsRef<[u8]>> EthernetHeader<T> {
    pub fn new_checked(buffer: T) -> Result<Self, PacketError> {
        if buffer.as_ref().len() < ETHERNET_HEADER_LEN {
            return Err(PacketError::MalformedFrame);
        }
        Ok(EthernetHeader { buffer })
    }

    pub fn dest_mac(&self) -> MacAddr {
        let (start, end) = DEST_MAC_RANGE;
        MacAddr::from_slice(&self.buffer.as_ref()[start..end])
    }

    pub fn src_mac(&self) -> MacAddr {
        let (start, end) = SRC_MAC_RANGE;
        MacAddr::from_slice(&self.buffer.as_ref()[start..end])
    }

    pub fn ether_type(&self) -> EtherType {
        EtherType::from(self.raw_ether_type())
    }

    pub fn raw_ether_type(&self) -> u16 {
        let (start, _) = ETHER_TYPE_RANGE;
        let data = self.buffer.as_ref();
        u16::from_be_bytes([data[start], data[start + 1]])
    }

    /// The 14 header bytes, without whatever follows them in the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..ETHERNET_HEADER_LEN]
    }

    pub fn into_inner(self) -> T {
        self.buffer
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> EthernetHeader<T> {
    pub fn set_dest_mac(&mut self, mac: MacAddr) {
        let (start, end) = DEST_MAC_RANGE;
        self.buffer.as_mut()[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn set_src_mac(&mut self, mac: MacAddr) {
        let (start, end) = SRC_MAC_RANGE;
        self.buffer.as_mut()[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn set_ether_type(&mut self, ether_type: EtherType) {
        let (start, end) = ETHER_TYPE_RANGE;
        self.buffer.as_mut()[start..end].copy_from_slice(&u16::from(ether_type).to_be_bytes());
    }
}

impl EthernetHeader<[u8; ETHERNET_HEADER_LEN]> {
    /// Builds a fresh header for an outgoing frame.
    pub fn build(src_mac: MacAddr, dest_mac: MacAddr, ether_type: EtherType) -> Self {
        let mut header = EthernetHeader {
            buffer: [0; ETHERNET_HEADER_LEN],
        };
        header.set_src_mac(src_mac);
        header.set_dest_mac(dest_mac);
        header.set_ether_type(ether_type);
        header
    }
}

/// An Ethernet II frame: the header overlay plus the payload that follows it in
/// the same buffer.
#[derive(Clone, Debug)]
pub struct EthernetFrame<T> {
    buffer: T,
}

impl<T: AsRef<[u8]>> EthernetFrame<T> {
    pub fn from_buffer(buffer: T) -> Result<Self, PacketError> {
        if !Self::is_valid(buffer.as_ref()) {
            return Err(PacketError::MalformedFrame);
        }
        Ok(EthernetFrame { buffer })
    }

    pub fn is_valid(buffer: &[u8]) -> bool {
        buffer.len() >= ETHERNET_HEADER_LEN
    }

    pub fn header(&self) -> EthernetHeader<&[u8]> {
        EthernetHeader {
            buffer: &self.buffer.as_ref()[..ETHERNET_HEADER_LEN],
        }
    }

    /// Everything after the header. Interpreting it is up to the caller.
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[ETHERNET_HEADER_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    pub fn len(&self) -> usize {
        self.buffer.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> T {
        self.buffer
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> EthernetFrame<T> {
    pub fn header_mut(&mut self) -> EthernetHeader<&mut [u8]> {
        EthernetHeader {
            buffer: &mut self.buffer.as_mut()[..ETHERNET_HEADER_LEN],
        }
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[ETHERNET_HEADER_LEN..]
    }
}

impl EthernetFrame<Vec<u8>> {
    /// Allocates a new frame holding `header` followed by `payload`.
    pub fn encap<H: AsRef<[u8]>>(header: &EthernetHeader<H>, payload: &[u8]) -> Self {
        let mut data = Vec::with_capacity(ETHERNET_HEADER_LEN + payload.len());
        data.extend_from_slice(header.as_bytes());
        data.extend_from_slice(payload);
        EthernetFrame { buffer: data }
    }
}

/// Frames are considered the same if their bytes are the same.
impl<T: AsRef<[u8]>, U: AsRef<[u8]>> PartialEq<EthernetFrame<U>> for EthernetFrame<T> {
    fn eq(&self, other: &EthernetFrame<U>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<T: AsRef<[u8]>> Eq for EthernetFrame<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    static FRAME: [u8; 14] = [0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0, 0];

    #[test]
    fn ethernet_frame() {
        let frame = EthernetFrame::from_buffer(&FRAME[..]).unwrap();
        assert_eq!(
            frame.header().dest_mac(),
            MacAddr::new([0xde, 0xad, 0xbe, 0xef, 0xff, 0xff])
        );
        assert_eq!(frame.header().src_mac(), MacAddr::new([1, 2, 3, 4, 5, 6]));
        assert_eq!(frame.header().ether_type(), EtherType::Unknown(0));
        assert_eq!(frame.payload().len(), 0);
    }

    #[test]
    fn payload_is_the_rest_of_the_buffer() {
        let mut data = FRAME.to_vec();
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut frame = EthernetFrame::from_buffer(data).unwrap();
        assert_eq!(frame.payload(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);

        frame.payload_mut()[2] = 42;
        assert_eq!(frame.into_inner()[ETHERNET_HEADER_LEN + 2], 42);
    }

    #[test]
    fn invalid_data_length() {
        for len in 0..ETHERNET_HEADER_LEN {
            let data = vec![0xff; len];
            assert_eq!(
                EthernetFrame::from_buffer(&data[..]).unwrap_err(),
                PacketError::MalformedFrame
            );
            assert_eq!(
                EthernetHeader::new_checked(&data[..]).unwrap_err(),
                PacketError::MalformedFrame
            );
            assert!(!EthernetFrame::<&[u8]>::is_valid(&data));
        }
    }

    #[test]
    fn set_dest_mac() {
        let mut data = FRAME;
        let mut header = EthernetHeader::new_checked(&mut data[..]).unwrap();
        let new_dest = MacAddr::new([0x98, 0x88, 0x18, 0x12, 0xb4, 0xdf]);
        header.set_dest_mac(new_dest);
        assert_eq!(header.dest_mac(), new_dest);
        assert_eq!(&data[..6], &new_dest.bytes);
    }

    #[test]
    fn set_src_mac() {
        let mut frame = EthernetFrame::from_buffer(FRAME.to_vec()).unwrap();
        let new_src = MacAddr::new([0x98, 0x88, 0x18, 0x12, 0xb4, 0xdf]);
        frame.header_mut().set_src_mac(new_src);
        assert_eq!(frame.header().src_mac(), new_src);
    }

    #[test]
    fn ether_type() {
        let mut data = FRAME;
        data[12] = 0x08;
        data[13] = 0x06;
        let header = EthernetHeader::new_checked(&data[..]).unwrap();
        assert_eq!(header.ether_type(), EtherType::Arp);
        assert_eq!(header.raw_ether_type(), ARP_ETHER_TYPE);
    }

    #[test]
    fn random_header_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let len = rng.gen_range(ETHERNET_HEADER_LEN, MAX_FRAME_LEN);
            let mut data = vec![0; len];
            rng.fill(&mut data[..]);
            let payload = data[ETHERNET_HEADER_LEN..].to_vec();

            let dest = MacAddr::new(rng.gen());
            let src = MacAddr::new(rng.gen());
            let ether_type = EtherType::from(rng.gen::<u16>());

            let mut header = EthernetHeader::new_checked(&mut data[..]).unwrap();
            header.set_dest_mac(dest);
            header.set_src_mac(src);
            header.set_ether_type(ether_type);
            assert_eq!(header.dest_mac(), dest);
            assert_eq!(header.src_mac(), src);
            assert_eq!(header.ether_type(), ether_type);

            // Setters never touch the payload.
            assert_eq!(&data[ETHERNET_HEADER_LEN..], &payload[..]);
        }
    }

    #[test]
    fn build_header() {
        let src = MacAddr::new([0xbb; 6]);
        let dest = MacAddr::new([0xaa; 6]);
        let header = EthernetHeader::build(src, dest, EtherType::Arp);
        assert_eq!(
            header.as_bytes(),
            &[0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0x08, 0x06]
        );
    }

    #[test]
    fn encap() {
        let header = EthernetHeader::build(MacAddr::new([1; 6]), MacAddr::BROADCAST, EtherType::Ipv6);
        let frame = EthernetFrame::encap(&header, &[9, 8, 7]);
        assert_eq!(frame.len(), ETHERNET_HEADER_LEN + 3);
        assert_eq!(frame.header().ether_type(), EtherType::Ipv6);
        assert_eq!(frame.header().dest_mac(), MacAddr::BROADCAST);
        assert_eq!(frame.payload(), &[9, 8, 7]);
    }
}
