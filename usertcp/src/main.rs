use std::process;
use tap::Tap;
use tracing::{error, info};
use usertcp::{Config, DeviceError, DeviceSubscriber, NetDevice};

fn main() {
    let matches = Config::app().get_matches();
    let config = match Config::from_matches(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(2);
        }
    };

    let subscriber = DeviceSubscriber::new(config.verbosity);
    tracing::subscriber::set_global_default(subscriber).expect("setting tracing default failed");

    if let Err(err) = run(&config) {
        error!(error = %err, "usertcp stopped");
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), DeviceError> {
    let tap = Tap::create(&config.interface).map_err(DeviceError::LinkSetup)?;
    tap.set_hw_addr(config.hw_addr)
        .map_err(DeviceError::LinkSetup)?;
    tap.set_ipv4_addr(config.addr, config.prefix_len)
        .map_err(DeviceError::LinkSetup)?;
    tap.set_up().map_err(DeviceError::LinkSetup)?;
    info!(
        interface = %tap.name(),
        addr = %config.addr,
        prefix_len = %config.prefix_len,
        hw_addr = %config.hw_addr,
        "interface configured"
    );

    let mut device = NetDevice::new(config.addr, config.hw_addr, tap);
    device.run()
}
