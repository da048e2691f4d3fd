use failure::Fail;
use std::io;
use usertcp_packets::PacketError;

#[derive(Debug, Fail)]
pub enum DeviceError {
    /// The link can no longer deliver frames. The dispatch loop stops.
    #[fail(display = "failed to read from link: {}", _0)]
    LinkRead(#[cause] io::Error),
    /// A reply could not be sent. The peer is expected to retry.
    #[fail(display = "failed to write to link: {}", _0)]
    LinkWrite(#[cause] io::Error),
    #[fail(display = "failed to configure link: {}", _0)]
    LinkSetup(#[cause] io::Error),
    #[fail(display = "{}", _0)]
    Packet(#[cause] PacketError),
}

impl DeviceError {
    /// Whether the device can keep handling frames after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            DeviceError::LinkRead(_) | DeviceError::LinkSetup(_) => true,
            DeviceError::LinkWrite(_) | DeviceError::Packet(_) => false,
        }
    }
}

impl From<PacketError> for DeviceError {
    fn from(err: PacketError) -> Self {
        DeviceError::Packet(err)
    }
}
