//! Demonstration of the ring device.
//!
//! Run with: `cargo run -p ringdev --features demo --bin demo`
//! Set `RUST_LOG=ringdev=trace` to watch cursor movement.

use ringdev::{Config, Device, Error};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ringdev=debug")),
        )
        .init();

    println!("=== ringdev Demo ===\n");

    let device = Device::open(Config::default())?;

    demo_read_cycle(&device)?;
    demo_overwrite(&device)?;
    demo_channels(&device)?;
    demo_control(&device)?;

    device.close();

    println!("\n=== All demos completed successfully! ===");
    Ok(())
}

fn show(label: &str, bytes: &[u8]) {
    println!("  {:<10} {:>2} bytes {:?}", label, bytes.len(), String::from_utf8_lossy(bytes));
}

/// Demo 1: burst, end of data, burst
fn demo_read_cycle(device: &Device) -> Result<(), Error> {
    println!("--- Demo 1: Read Cycle ---");
    device.open_channel(0)?;

    device.write(0, b"hello")?;
    show("read", &device.read(0, 64)?);
    show("read", &device.read(0, 64)?);

    device.write(0, b"hi")?;
    show("read", &device.read(0, 64)?);
    show("read", &device.read(0, 64)?);

    device.close_channel(0)?;
    println!();
    Ok(())
}

/// Demo 2: writes past capacity overwrite the oldest bytes
fn demo_overwrite(device: &Device) -> Result<(), Error> {
    println!("--- Demo 2: Overwrite Oldest ---");
    let capacity = device.registry().capacity();
    println!("  capacity = {}", capacity);

    device.write(1, b"the quick brown fox ")?;
    device.write(1, b"jumps over the lazy dog")?;
    show("snapshot", &device.registry().snapshot(1)?);

    let lost = device.registry().with_channel(1, |ch| {
        ch.ring().total_written() - ch.ring().len() as u64
    })?;
    println!("  {} bytes overwritten", lost);
    println!();
    Ok(())
}

/// Demo 3: channels are independent
fn demo_channels(device: &Device) -> Result<(), Error> {
    println!("--- Demo 3: Independent Channels ---");
    let channels = device.registry().channels();

    for channel in 2..channels {
        device.write(channel, format!("channel-{}", channel).as_bytes())?;
    }
    for channel in 0..channels {
        println!(
            "  channel {} empty = {}",
            channel,
            device.registry().is_empty(channel)?
        );
    }

    match device.write(channels, b"nowhere") {
        Err(err) => println!("  write to channel {}: {}", channels, err),
        Ok(_) => println!("  write to channel {} unexpectedly succeeded", channels),
    }
    println!();
    Ok(())
}

/// Demo 4: control is a reserved extension point
fn demo_control(device: &Device) -> Result<(), Error> {
    println!("--- Demo 4: Control ---");
    for command in [1, 0x4004_6601] {
        match device.control(0, command, 0) {
            Err(Error::Unsupported { command }) => {
                println!("  command {:#x}: not supported", command);
            }
            Err(err) => return Err(err),
            Ok(()) => println!("  command {:#x}: ok", command),
        }
    }
    Ok(())
}
