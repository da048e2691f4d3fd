use crate::arp_cache::ArpCache;
use crate::error::DeviceError;
use crate::link::Link;
use std::io;
use std::net::Ipv4Addr;
use tracing::{debug, info, trace, warn};
use usertcp_packets::*;

/// What the device did with an ARP message addressed to a supported
/// Ethernet/IPv4 combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpOutcome {
    /// A request for our address; a reply was transmitted.
    Replied,
    /// The sender was learned but the target address is not ours.
    NotForUs,
    /// The sender was learned, nothing else is done for this opcode.
    UnsupportedOpcode(ArpOp),
}

/// Where a single frame ended up after classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Arp(ArpOutcome),
    /// A protocol the device recognizes but does not process.
    Ignored(EtherType),
    Unknown(u16),
    /// The frame failed validation and was discarded.
    Dropped(PacketError),
}

/// A user-space network device: one local IPv4/MAC identity attached to one link.
///
/// The device reads a frame, classifies it by ethertype and answers ARP requests
/// for its own address, learning every ARP sender it sees along the way.
pub struct NetDevice<L> {
    addr: Ipv4Addr,
    hw_addr: MacAddr,
    cache: ArpCache,
    link: L,
}

impl<L: Link> NetDevice<L> {
    pub fn new(addr: Ipv4Addr, hw_addr: MacAddr, link: L) -> Self {
        NetDevice {
            addr,
            hw_addr,
            cache: ArpCache::new(),
            link,
        }
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn hw_addr(&self) -> MacAddr {
        self.hw_addr
    }

    pub fn cache(&self) -> &ArpCache {
        &self.cache
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Handles frames until the link fails. Malformed frames and failed
    /// transmissions are logged and skipped.
    pub fn run(&mut self) -> Result<(), DeviceError> {
        info!(addr = %self.addr, hw_addr = %self.hw_addr, "device running");
        loop {
            match self.poll() {
                Ok(dispatch) => trace!(dispatch = ?dispatch, "frame handled"),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => warn!(error = %err, "failed to handle frame"),
            }
        }
    }

    /// Receives and handles exactly one frame.
    pub fn poll(&mut self) -> Result<Dispatch, DeviceError> {
        let mut frame = self.receive_frame()?;
        self.handle_frame(&mut frame)
    }

    /// Blocks until the link delivers a frame of at most `MAX_FRAME_LEN` bytes.
    pub fn receive_frame(&mut self) -> Result<Vec<u8>, DeviceError> {
        let mut buffer = vec![0; MAX_FRAME_LEN];
        let len = self.link.recv(&mut buffer).map_err(DeviceError::LinkRead)?;
        buffer.truncate(len);
        trace!(len = len as u64, "received frame");
        Ok(buffer)
    }

    /// Classifies a received frame and dispatches it. ARP requests are answered in
    /// place, so the frame may be modified.
    ///
    /// Validation failures are not errors here: they come back as `Dispatch::Dropped`.
    /// The only error is a failure to transmit a reply.
    pub fn handle_frame(&mut self, buffer: &mut [u8]) -> Result<Dispatch, DeviceError> {
        let mut frame = match EthernetFrame::from_buffer(buffer) {
            Ok(frame) => frame,
            Err(err) => return Ok(drop_frame(err)),
        };

        let ether_type = {
            let header = frame.header();
            trace!(
                src = %header.src_mac(),
                dest = %header.dest_mac(),
                ether_type = %header.ether_type(),
                "classified frame"
            );
            header.ether_type()
        };

        match ether_type {
            EtherType::Arp => match self.handle_arp(frame.payload_mut()) {
                Ok(outcome) => Ok(Dispatch::Arp(outcome)),
                Err(DeviceError::Packet(err)) => Ok(drop_frame(err)),
                Err(err) => Err(err),
            },
            EtherType::Ipv4 => {
                describe_ipv4(frame.payload());
                Ok(Dispatch::Ignored(ether_type))
            }
            EtherType::Ipv6 | EtherType::Rarp => {
                trace!(ether_type = %ether_type, "ignoring frame");
                Ok(Dispatch::Ignored(ether_type))
            }
            EtherType::Unknown(raw) => {
                debug!(ether_type = %ether_type, "unknown ethertype");
                Ok(Dispatch::Unknown(raw))
            }
        }
    }

    fn handle_arp(&mut self, message: &mut [u8]) -> Result<ArpOutcome, DeviceError> {
        let mut message = ArpMessage::new_checked(message)?;
        let hardware_type = message.header().hardware_type();
        let opcode = message.header().opcode();
        let (sender_mac, sender_ip, target_ip) = {
            let payload = message.ipv4_payload()?;
            (payload.sender_mac(), payload.sender_ip(), payload.target_ip())
        };

        match self.cache.upsert(hardware_type, sender_ip, sender_mac) {
            None => debug!(addr = %sender_ip, hw_addr = %sender_mac, "learned ARP entry"),
            Some(previous) if previous != sender_mac => debug!(
                addr = %sender_ip,
                hw_addr = %sender_mac,
                previous = %previous,
                "updated ARP entry"
            ),
            Some(_) => {}
        }

        if target_ip != self.addr {
            debug!(target = %target_ip, "ARP message is not for us");
            return Ok(ArpOutcome::NotForUs);
        }

        match opcode {
            ArpOp::Request => {
                let reply = build_arp_reply(&mut message, self.hw_addr, self.addr)?;
                self.transmit(reply.as_bytes())?;
                debug!(to = %sender_ip, hw_addr = %sender_mac, "sent ARP reply");
                Ok(ArpOutcome::Replied)
            }
            other => {
                info!(opcode = ?other, from = %sender_ip, "unsupported ARP opcode");
                Ok(ArpOutcome::UnsupportedOpcode(other))
            }
        }
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), DeviceError> {
        let written = self.link.send(frame).map_err(DeviceError::LinkWrite)?;
        if written < frame.len() {
            return Err(DeviceError::LinkWrite(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("wrote {} of {} bytes", written, frame.len()),
            )));
        }
        Ok(())
    }
}

/// Turns an ARP request into the reply frame answering it for `hw_addr`/`addr`.
///
/// The request's opcode is rewritten to Reply in place; its header bytes are reused
/// and its address block is replaced, so any trailing padding is left behind.
/// The reply is addressed to the original sender.
pub fn build_arp_reply<T>(
    request: &mut ArpMessage<T>,
    hw_addr: MacAddr,
    addr: Ipv4Addr,
) -> Result<EthernetFrame<Vec<u8>>, PacketError>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    let (payload, dest_mac) = {
        let request_payload = request.ipv4_payload()?;
        (
            request_payload.with_swapped_endpoints(hw_addr, addr),
            request_payload.sender_mac(),
        )
    };
    request.header_mut().set_opcode(ArpOp::Reply);

    let mut body = Vec::with_capacity(ARP_HEADER_LEN + ARP_V4_PAYLOAD_LEN);
    body.extend_from_slice(request.header().as_bytes());
    body.extend_from_slice(payload.as_bytes());

    let header = EthernetHeader::build(hw_addr, dest_mac, EtherType::Arp);
    Ok(EthernetFrame::encap(&header, &body))
}

fn drop_frame(err: PacketError) -> Dispatch {
    warn!(error = %err, "dropping frame");
    Dispatch::Dropped(err)
}

fn describe_ipv4(packet: &[u8]) {
    match Ipv4Header::new_checked(packet) {
        Ok(header) => trace!(
            src = %header.src_addr(),
            dest = %header.dest_addr(),
            protocol = %header.protocol(),
            ttl = %header.ttl(),
            "ignoring IPv4 packet"
        ),
        Err(err) => trace!(error = %err, "ignoring malformed IPv4 packet"),
    }
}
