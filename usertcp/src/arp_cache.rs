use std::net::Ipv4Addr;
use std::slice;
use usertcp_packets::{ArpHardwareType, MacAddr};

/// One learned binding of a protocol address to a hardware address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpCacheEntry {
    pub hardware_type: ArpHardwareType,
    pub addr: Ipv4Addr,
    pub hw_addr: MacAddr,
}

/// Address resolution table keyed on (hardware type, IPv4 address).
///
/// Entries are kept in the order they were first learned and are never evicted.
/// The table only grows by one entry per distinct peer, so lookups scan it linearly.
#[derive(Clone, Debug, Default)]
pub struct ArpCache {
    entries: Vec<ArpCacheEntry>,
}

impl ArpCache {
    pub fn new() -> Self {
        ArpCache {
            entries: Vec::new(),
        }
    }

    pub fn lookup(&self, hardware_type: ArpHardwareType, addr: Ipv4Addr) -> Option<MacAddr> {
        self.entries
            .iter()
            .find(|entry| entry.hardware_type == hardware_type && entry.addr == addr)
            .map(|entry| entry.hw_addr)
    }

    /// Records that `addr` is reachable at `hw_addr`. An existing binding for the same
    /// key is overwritten and its previous hardware address returned.
    pub fn upsert(
        &mut self,
        hardware_type: ArpHardwareType,
        addr: Ipv4Addr,
        hw_addr: MacAddr,
    ) -> Option<MacAddr> {
        let existing = self
            .entries
            .iter_mut()
            .find(|entry| entry.hardware_type == hardware_type && entry.addr == addr);

        match existing {
            Some(entry) => {
                let previous = entry.hw_addr;
                entry.hw_addr = hw_addr;
                Some(previous)
            }
            None => {
                self.entries.push(ArpCacheEntry {
                    hardware_type,
                    addr,
                    hw_addr,
                });
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<ArpCacheEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ArpCache {
    type Item = &'a ArpCacheEntry;
    type IntoIter = slice::Iter<'a, ArpCacheEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
