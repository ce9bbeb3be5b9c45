//! Runs one scan and prints the stored spectrum as CSV.
//!
//! Usage: `cargo run --example scan -- <port> [long_nm short_nm]`
//! Set `RUST_LOG=uv1600=debug` to watch the exchange.

use std::time::Duration;

use uv1600::{MeasurementMode, SerialSession, SpeedSetting};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let long_wave: u16 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(700);
    let short_wave: u16 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(400);

    let mut session = SerialSession::open(&port, Duration::from_secs(1))?;

    session.set_scan_range(long_wave, short_wave)?;
    session.set_speed(SpeedSetting::Fast)?;
    session.set_mode(MeasurementMode::Absorbance)?;
    session.measure()?;

    let points = session.transfer()?;
    session.close()?;

    println!("wavelength,measurement");
    for point in &points {
        println!("{},{}", point.wavelength, point.measurement);
    }
    Ok(())
}
