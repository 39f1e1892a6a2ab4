//! # max6675_scan
//!
//! Finds and reads MAX6675 thermocouple converters on both chip selects of a
//! Linux SPI bus, and says what went wrong when it can't.
//!
//! ## Usage
//!
//! You'll need SPI enabled so that `/dev/spidev0.0` and `/dev/spidev0.1`
//! exist. On a Raspberry Pi, that's `dtparam=spi=on` in
//! `/boot/firmware/config.txt`.
//!
//! Then, you can use something like this in your binary...
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     use max6675_scan::{LineScanner, LinuxHost, ScanConfig};
//!
//!     let mut scanner = LineScanner::new(LinuxHost::new(), ScanConfig::new(0))?;
//!
//!     for line in scanner.scan() {
//!         match line.temperature_celsius() {
//!             Some(c) => println!("{}: {c:.2}° C", line.cs_label()),
//!             None => println!("{}: {} ({})", line.cs_label(), line.status, line.note),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Chip select
//!
//! The MAX6675 starts converting when CS goes high and needs up to 220 ms
//! before it can be read with CS low. The kernel's spidev toggles CS around
//! each transfer, so by default a read is a throwaway transfer (the trigger),
//! the conversion wait, then the real transfer.
//!
//! For the exact sequence, wire the chip selects to GPIOs and turn on manual
//! CS:
//!
//! ```no_run
//! use max6675_scan::{LineScanner, LinuxHost, ScanConfig};
//!
//! let config = ScanConfig::new(0).with_manual_cs("/dev/gpiochip0", [22, 23]);
//! let mut scanner = LineScanner::new(LinuxHost::new(), config)?;
//! let [cs0, cs1] = scanner.scan();
//! println!("{cs0}\n{cs1}");
//! # Ok::<(), max6675_scan::ScanError>(())
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod hal;
pub mod linux;
pub mod probe;
pub mod reader;
pub mod report;
pub mod scanner;
pub mod status;

pub use config::{ClockMode, CsLine, ScanConfig, Timing};
pub use decode::{DecodedFields, RawWord};
pub use error::{Result, ScanError};
pub use hal::{BusHandle, ChipSelectLine, ConversionTimer, Host, ThreadSleep};
pub use linux::{ChipSelectPins, GpioChipSelect, LinuxHost, SpidevBus};
pub use probe::{CoarseResult, ProbeVerdict};
pub use reader::{Acquisition, LineSession, Max6675Reader};
pub use report::{Banner, Summary};
pub use scanner::{LineResult, LineScanner};
pub use status::DeviceStatus;
