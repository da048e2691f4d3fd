use cidr::{Inet, Ipv4Inet};
use clap::{App, Arg, ArgMatches};
use failure::Fail;
use std::net::Ipv4Addr;
use usertcp_packets::MacAddr;

pub const DEFAULT_INTERFACE: &str = "tap1";
pub const DEFAULT_ADDR: &str = "160.84.32.24/24";
pub const DEFAULT_HW_ADDR: &str = "DE:C7:87:CB:A8:5C";

#[derive(Debug, Fail, PartialEq, Eq)]
pub enum ConfigError {
    #[fail(display = "invalid interface address {:?}, expected ADDR/PREFIX", _0)]
    InvalidAddr(String),
    #[fail(display = "invalid hardware address {:?}", _0)]
    InvalidHwAddr(String),
}

/// Startup settings for the daemon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// TAP interface to create or attach to.
    pub interface: String,
    /// Address of the device, also assigned to the interface.
    pub addr: Ipv4Addr,
    /// Length of the connected subnet's prefix.
    pub prefix_len: u8,
    pub hw_addr: MacAddr,
    /// 0 logs info and above, 1 adds debug, 2 or more adds trace.
    pub verbosity: u64,
}

impl Config {
    pub fn app() -> App<'static, 'static> {
        App::new("usertcp")
            .version(env!("CARGO_PKG_VERSION"))
            .author("usertcp Contributors")
            .about("Run a user-space Ethernet/ARP device on a TAP interface")
            .arg(
                Arg::with_name("interface")
                    .short("i")
                    .long("interface")
                    .value_name("IFACE")
                    .help("TAP interface name")
                    .takes_value(true)
                    .default_value(DEFAULT_INTERFACE),
            )
            .arg(
                Arg::with_name("addr")
                    .short("a")
                    .long("addr")
                    .value_name("ADDR/PREFIX")
                    .help("IPv4 address and subnet prefix length of the device")
                    .takes_value(true)
                    .default_value(DEFAULT_ADDR),
            )
            .arg(
                Arg::with_name("hw_addr")
                    .short("m")
                    .long("mac")
                    .value_name("MAC")
                    .help("Ethernet address of the device")
                    .takes_value(true)
                    .default_value(DEFAULT_HW_ADDR),
            )
            .arg(
                Arg::with_name("verbose")
                    .short("v")
                    .multiple(true)
                    .help("Log more detail, repeat for frame level tracing"),
            )
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Config, ConfigError> {
        let interface = matches.value_of("interface").unwrap_or(DEFAULT_INTERFACE);

        let addr = matches.value_of("addr").unwrap_or(DEFAULT_ADDR);
        let inet: Ipv4Inet = addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr.to_string()))?;

        let hw_addr = matches.value_of("hw_addr").unwrap_or(DEFAULT_HW_ADDR);
        let hw_addr: MacAddr = hw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidHwAddr(hw_addr.to_string()))?;

        Ok(Config {
            interface: interface.to_string(),
            addr: inet.address(),
            prefix_len: inet.network_length(),
            hw_addr,
            verbosity: matches.occurrences_of("verbose"),
        })
    }
}
