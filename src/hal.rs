//! The hardware the acquisition sequence is written against.
//!
//! The scanner only sees these traits, so the CS/timer ordering can be checked
//! against a recording fake and [`crate::linux`] supplies the real thing.

use std::path::Path;
use std::time::Duration;

use crate::config::{CsLine, ScanConfig};
use crate::error::Result;

/// An open SPI channel, already configured for clock rate and mode.
///
/// Closing happens when the handle is dropped.
pub trait BusHandle {
    /// Clocks `tx` out while filling `rx`, MSB first. Both must be the same
    /// length.
    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()>;
}

/// A chip select output. Idle is high; the line must start out idle.
pub trait ChipSelectLine {
    /// Drive the line low.
    fn assert(&mut self) -> Result<()>;
    /// Drive the line high.
    fn release(&mut self) -> Result<()>;
}

/// Blocking delay used for the conversion and settle waits.
pub trait ConversionTimer {
    fn wait(&mut self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl ConversionTimer for ThreadSleep {
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Where buses and chip select lines come from.
pub trait Host {
    type Bus: BusHandle;
    type Cs: ChipSelectLine;

    /// Whether a bus node is present. Checked before anything is opened.
    fn node_exists(&self, node: &Path) -> bool;

    fn open_bus(&mut self, node: &Path, config: &ScanConfig) -> Result<Self::Bus>;

    /// Claims `line`'s chip select pin, leaving it high.
    fn open_chip_select(&mut self, config: &ScanConfig, line: CsLine) -> Result<Self::Cs>;
}
