use std::io;
#[cfg(target_os = "linux")]
use tap::Tap;

/// The byte level endpoint a `NetDevice` reads frames from and writes frames to.
///
/// `recv` blocks until one frame is available and returns its length; a frame
/// longer than `frame` is truncated. An error from `recv` means the link is gone.
/// An error from `send` only loses that one frame.
pub trait Link {
    fn recv(&mut self, frame: &mut [u8]) -> io::Result<usize>;

    fn send(&mut self, frame: &[u8]) -> io::Result<usize>;
}

#[cfg(target_os = "linux")]
impl Link for Tap {
    fn recv(&mut self, frame: &mut [u8]) -> io::Result<usize> {
        Tap::recv(self, frame)
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        Tap::send(self, frame)
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn recv(&mut self, frame: &mut [u8]) -> io::Result<usize> {
        (**self).recv(frame)
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        (**self).send(frame)
    }
}
