#![deny(missing_docs)]

use crate::linux;
use libc;
use std::{
    ffi::CStr,
    io,
    net::Ipv4Addr,
};
use usertcp_packets::MacAddr;

const CLONE_DEVICE_PATH: &[u8] = b"/dev/net/tun\0";

/// A Linux TAP interface. Reads and writes move whole Ethernet frames, with no
/// packet information header, and block until a frame is available.
pub struct Tap {
    fd: libc::c_int,
    ifname: [libc::c_char; libc::IFNAMSIZ],
}

impl Tap {
    /// Creates the TAP interface `name`, or attaches to it if it already exists
    /// and the caller owns it. An empty name lets the kernel pick one.
    pub fn create(name: &str) -> io::Result<Self> {
        let ifname = interface_name(name)?;

        // This block is marked as unsafe because it uses FFI. It borrows no Rust-owned memory
        // beyond the static, NUL terminated device path.
        // Resources:
        // https://www.kernel.org/doc/Documentation/networking/tuntap.txt
        let fd = unsafe {
            let fd = libc::open(
                CLONE_DEVICE_PATH.as_ptr() as *const libc::c_char,
                libc::O_RDWR | libc::O_CLOEXEC,
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        // Owned from here on, so the descriptor is closed if TUNSETIFF fails.
        let mut tap = Tap { fd, ifname };

        let mut ifr = linux::ifreq::with_name(ifname);
        ifr.ifr_ifru.ifru_flags = linux::IFF_TAP | linux::IFF_NO_PI;
        // The kernel only reads the name and flags of the ifreq we own, and writes back the
        // name it settled on.
        let err = unsafe { libc::ioctl(tap.fd, linux::TUNSETIFF, &mut ifr as *mut linux::ifreq) };
        if err < 0 {
            return Err(io::Error::last_os_error());
        }
        tap.ifname = ifr.name();
        Ok(tap)
    }

    /// The interface name, as assigned by the kernel.
    pub fn name(&self) -> String {
        // ifname always holds a NUL: interface_name leaves room for it and the kernel
        // writes back at most IFNAMSIZ - 1 characters.
        unsafe { CStr::from_ptr(self.ifname.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    /// Sets the interface's Ethernet address.
    pub fn set_hw_addr(&self, mac: MacAddr) -> io::Result<()> {
        let mut hwaddr = libc::sockaddr {
            sa_family: libc::ARPHRD_ETHER,
            sa_data: [0; 14],
        };
        for (dst, src) in hwaddr.sa_data.iter_mut().zip(mac.bytes.iter()) {
            *dst = *src as libc::c_char;
        }

        let mut ifr = linux::ifreq::with_name(self.ifname);
        ifr.ifr_ifru.ifru_hwaddr = hwaddr;
        ControlSocket::new()?.ioctl(libc::SIOCSIFHWADDR, &mut ifr)
    }

    /// Assigns `addr/prefix_len` to the interface. Setting the netmask installs the
    /// route to the connected subnet.
    pub fn set_ipv4_addr(&self, addr: Ipv4Addr, prefix_len: u8) -> io::Result<()> {
        let netmask = ipv4_netmask(prefix_len)?;
        let sock = ControlSocket::new()?;

        let mut ifr = linux::ifreq::with_name(self.ifname);
        ifr.ifr_ifru.ifru_addr = sockaddr_v4(addr);
        sock.ioctl(libc::SIOCSIFADDR, &mut ifr)?;

        let mut ifr = linux::ifreq::with_name(self.ifname);
        ifr.ifr_ifru.ifru_netmask = sockaddr_v4(netmask);
        sock.ioctl(libc::SIOCSIFNETMASK, &mut ifr)
    }

    /// Brings the interface administratively up.
    pub fn set_up(&self) -> io::Result<()> {
        let sock = ControlSocket::new()?;
        let mut ifr = linux::ifreq::with_name(self.ifname);
        sock.ioctl(libc::SIOCGIFFLAGS, &mut ifr)?;

        // SIOCGIFFLAGS filled in the flags variant.
        let flags = unsafe { ifr.ifr_ifru.ifru_flags };
        ifr.ifr_ifru.ifru_flags = flags | (libc::IFF_UP | libc::IFF_RUNNING) as libc::c_short;
        sock.ioctl(libc::SIOCSIFFLAGS, &mut ifr)
    }

    /// Receives one frame from the interface, blocking until one arrives.
    pub fn recv(&mut self, frame: &mut [u8]) -> io::Result<usize> {
        // This block is marked as unsafe because it uses FFI. The kernel writes at most
        // frame.len() bytes into the Rust-owned buffer.
        let bytes = unsafe { libc::read(self.fd, frame.as_mut_ptr() as *mut _, frame.len()) };
        if bytes < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(bytes as usize)
        }
    }

    /// Sends one frame to the interface.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        // Note comment in `recv` call.
        let bytes = unsafe { libc::write(self.fd, frame.as_ptr() as *const _, frame.len()) };
        if bytes < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(bytes as usize)
        }
    }
}

impl io::Read for Tap {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf)
    }
}

impl io::Write for Tap {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Tap {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

/// Converts a prefix length into a dotted netmask, `24` into `255.255.255.0`.
pub fn ipv4_netmask(prefix_len: u8) -> io::Result<Ipv4Addr> {
    if prefix_len > 32 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("prefix length {} is longer than 32", prefix_len),
        ));
    }
    let mask = u32::max_value()
        .checked_shl(32 - u32::from(prefix_len))
        .unwrap_or(0);
    Ok(Ipv4Addr::from(mask))
}

/// `AF_INET` datagram socket used only as a handle for netdevice ioctls.
struct ControlSocket {
    fd: libc::c_int,
}

impl ControlSocket {
    fn new() -> io::Result<Self> {
        // Resources:
        // man 7 netdevice
        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ControlSocket { fd })
    }

    fn ioctl(&self, request: libc::c_ulong, ifr: &mut linux::ifreq) -> io::Result<()> {
        // The kernel reads and writes within the ifreq we hand it, nothing else.
        let err = unsafe { libc::ioctl(self.fd, request, ifr as *mut linux::ifreq) };
        if err < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for ControlSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

fn interface_name(name: &str) -> io::Result<[libc::c_char; libc::IFNAMSIZ]> {
    let bytes = name.as_bytes();
    if bytes.len() >= libc::IFNAMSIZ || bytes.contains(&0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid interface name {:?}", name),
        ));
    }
    let mut ifname = [0; libc::IFNAMSIZ];
    for (dst, src) in ifname.iter_mut().zip(bytes) {
        *dst = *src as libc::c_char;
    }
    Ok(ifname)
}

/// `sockaddr_in` laid out in a generic `sockaddr`: port in sa_data[0..2], address after.
fn sockaddr_v4(addr: Ipv4Addr) -> libc::sockaddr {
    let mut sockaddr = libc::sockaddr {
        sa_family: libc::AF_INET as libc::sa_family_t,
        sa_data: [0; 14],
    };
    for (dst, src) in sockaddr.sa_data[2..6].iter_mut().zip(addr.octets().iter()) {
        *dst = *src as libc::c_char;
    }
    sockaddr
}
