//! Walk through the pin and port operations against a simulated expander.
//!
//! Run with `RUST_LOG=pcf8574=trace` to see every bus transfer.

use anyhow::Result;
use pcf8574::peripheral::pcf8574::sim::SimBus;
use pcf8574::{ExpanderConfig, Pcf8574};
use tracing::info;

fn main() -> Result<()> {
    pcf8574::tracing::init_stdout()?;

    let config = ExpanderConfig::from_env()?;
    let mut bus = SimBus::new();
    bus.attach(config.address);
    // Something outside the chip holds P2 low.
    bus.set_input(config.address, 2, false);

    let mut pcf = Pcf8574::from_config(&mut bus, &config)?;
    pcf.check()?;
    info!("Found {:?} at 0x{:02X}", config.variant, pcf.address());

    info!("pin 2 = {}", pcf.get_pin(2)? as u8);

    pcf.set_pin(3, true)?;
    pcf.set_pin(4, false)?;
    pcf.toggle_pin(5)?;
    info!("port after pin writes = 0x{:02X}", pcf.get_port()?);

    pcf.set_port(0xff)?;
    info!("port = {}", pcf.get_port()?);

    Ok(())
}
