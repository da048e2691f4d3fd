#![allow(non_camel_case_types)]

use libc;
use std::mem::MaybeUninit;

/// Attaches a `/dev/net/tun` descriptor to a named interface.
/// `_IOW('T', 202, int)` from linux/if_tun.h.
pub(crate) const TUNSETIFF: libc::c_ulong = 0x4004_54ca;

/// Ethernet frames rather than IP packets.
pub(crate) const IFF_TAP: libc::c_short = 0x0002;
/// No packet information header in front of each frame.
pub(crate) const IFF_NO_PI: libc::c_short = 0x1000;

#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct ifmap {
    pub(crate) mem_start: libc::c_ulong,
    pub(crate) mem_end: libc::c_ulong,
    pub(crate) base_addr: libc::c_ushort,
    pub(crate) irq: libc::c_uchar,
    pub(crate) dma: libc::c_uchar,
    pub(crate) port: libc::c_uchar,
}

#[repr(C)]
pub(crate) union ifru {
    pub(crate) ifru_addr: libc::sockaddr,
    pub(crate) ifru_dstaddr: libc::sockaddr,
    pub(crate) ifru_netmask: libc::sockaddr,
    pub(crate) ifru_hwaddr: libc::sockaddr,
    pub(crate) ifru_flags: libc::c_short,
    pub(crate) ifru_ivalue: libc::c_int,
    pub(crate) ifru_mtu: libc::c_int,
    pub(crate) ifru_map: ifmap,
    pub(crate) ifru_slave: [libc::c_char; libc::IFNAMSIZ],
    pub(crate) ifru_newname: [libc::c_char; libc::IFNAMSIZ],
}

#[repr(C)]
pub(crate) union ifrn {
    pub(crate) ifrn_name: [libc::c_char; libc::IFNAMSIZ],
}

#[repr(C)]
pub(crate) struct ifreq {
    pub(crate) ifr_ifrn: ifrn,
    pub(crate) ifr_ifru: ifru,
}

impl ifreq {
    /// A zeroed request addressed to the interface `name`.
    pub(crate) fn with_name(name: [libc::c_char; libc::IFNAMSIZ]) -> ifreq {
        // An all-zero ifreq is a valid value: every field is plain old data.
        let mut ifr: ifreq = unsafe { MaybeUninit::zeroed().assume_init() };
        ifr.ifr_ifrn.ifrn_name = name;
        ifr
    }

    pub(crate) fn name(&self) -> [libc::c_char; libc::IFNAMSIZ] {
        // ifrn has a single variant, so reading it is always valid.
        unsafe { self.ifr_ifrn.ifrn_name }
    }
}
