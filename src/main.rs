//! max6675-scan: checks both chip selects of an SPI bus for a MAX6675.
//!
//! With no arguments this scans `/dev/spidev0.0` and `/dev/spidev0.1` at
//! 1 MHz, mode 0, with a 250 ms conversion wait.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::Level;

use max6675_scan::{Banner, ClockMode, LineScanner, LinuxHost, ScanConfig, Summary, Timing};

#[derive(Parser)]
#[command(name = "max6675-scan")]
#[command(author, version, about = "Detect MAX6675 thermocouple converters on SPI", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// SPI bus number (the X in /dev/spidevX.Y)
    #[arg(long, default_value_t = 0)]
    bus: u8,

    /// SPI clock in kHz (must stay below 4300)
    #[arg(long, default_value_t = 1000)]
    speed_khz: u32,

    /// SPI mode 0-3
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    mode: u8,

    /// Drive chip selects from GPIOs instead of the SPI controller
    #[arg(long)]
    manual_cs: bool,

    /// GPIO chip holding the chip select pins (with --manual-cs)
    #[arg(long, default_value = "/dev/gpiochip0")]
    gpio_chip: String,

    /// GPIO offset wired to CS0 (required with --manual-cs)
    #[arg(long, required_if_eq("manual_cs", "true"), requires = "manual_cs")]
    cs0_pin: Option<u32>,

    /// GPIO offset wired to CS1 (required with --manual-cs)
    #[arg(long, required_if_eq("manual_cs", "true"), requires = "manual_cs")]
    cs1_pin: Option<u32>,

    /// Conversion wait in milliseconds (at least 220)
    #[arg(long, default_value_t = 250)]
    conversion_ms: u64,

    /// Wait after pulling a GPIO chip select low, in milliseconds
    #[arg(long, default_value_t = 2)]
    settle_ms: u64,

    /// Also run a byte-pattern probe that only checks whether MISO is driven
    #[arg(long)]
    coarse_probe: bool,
}

impl Cli {
    /// The pins have no default: the SPI driver usually owns the bus's own
    /// CE pins, so they have to be named.
    fn config(&self) -> anyhow::Result<ScanConfig> {
        let mut config = ScanConfig::new(self.bus)
            .with_speed(self.speed_khz.saturating_mul(1000))
            .with_mode(ClockMode::from_number(self.mode)?)
            .with_timing(Timing {
                conversion: Duration::from_millis(self.conversion_ms),
                cs_settle: Duration::from_millis(self.settle_ms),
            });
        if let (true, Some(cs0), Some(cs1)) = (self.manual_cs, self.cs0_pin, self.cs1_pin) {
            config = config.with_manual_cs(self.gpio_chip.clone(), [cs0, cs1]);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config()?;
    let mut scanner = LineScanner::new(LinuxHost::new(), config)
        .context("refusing to scan with this configuration")?;

    println!("{}", Banner(scanner.config()));

    let results = scanner.scan();
    for result in &results {
        println!("\n{result}");
    }

    if cli.coarse_probe {
        println!("\n  Coarse probe (bus-driven CS, not MAX6675-aware)");
        println!("  -----------------------------------------------");
        for result in scanner.coarse_probe_all() {
            println!("{result}");
        }
    }

    println!("\n{}", Summary(&results));
    Ok(())
}
