//! Scan configuration.
//!
//! Everything the scanner needs to know about the board is fixed up front in a
//! [`ScanConfig`]; nothing is discovered at runtime.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ScanError};

/// Default SPI clock, comfortably under the MAX6675's 4.3 MHz limit.
pub const DEFAULT_SPEED_HZ: u32 = 1_000_000;

/// The MAX6675 can't be clocked at or above this rate.
pub const MAX_SPEED_HZ: u32 = 4_300_000;

/// Worst-case conversion time from the datasheet.
pub const MIN_CONVERSION_TIME: Duration = Duration::from_millis(220);

/// Conversion wait with some margin over [`MIN_CONVERSION_TIME`].
pub const DEFAULT_CONVERSION_TIME: Duration = Duration::from_millis(250);

/// Output settle time after pulling a GPIO chip select low.
pub const DEFAULT_CS_SETTLE_TIME: Duration = Duration::from_millis(2);

/// Raspberry Pi CE0 and CE1, as BCM offsets on `gpiochip0`.
///
/// While the SPI overlay is loaded its driver owns these pins and claiming
/// them fails, so manual CS usually needs other pins.
pub const DEFAULT_CS_PINS: [u32; 2] = [8, 7];

/// One of the two chip select lines on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CsLine {
    Cs0,
    Cs1,
}

impl CsLine {
    /// Both lines, in scan order.
    pub const ALL: [CsLine; 2] = [CsLine::Cs0, CsLine::Cs1];

    pub fn index(self) -> u8 {
        match self {
            Self::Cs0 => 0,
            Self::Cs1 => 1,
        }
    }
}

impl fmt::Display for CsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("CS{}", self.index()))
    }
}

/// SPI clock polarity and phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMode {
    /// CPOL 0, CPHA 0. What the MAX6675 expects.
    #[default]
    Mode0,
    /// CPOL 0, CPHA 1
    Mode1,
    /// CPOL 1, CPHA 0
    Mode2,
    /// CPOL 1, CPHA 1
    Mode3,
}

impl ClockMode {
    pub fn number(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
            Self::Mode3 => 3,
        }
    }

    pub fn from_number(mode: u8) -> Result<Self> {
        match mode {
            0 => Ok(Self::Mode0),
            1 => Ok(Self::Mode1),
            2 => Ok(Self::Mode2),
            3 => Ok(Self::Mode3),
            _ => Err(ScanError::InvalidConfig(format!(
                "SPI mode must be 0-3, got {mode}"
            ))),
        }
    }
}

/// Delays in the acquisition sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Open-loop wait after CS goes high. The chip has no ready signal.
    pub conversion: Duration,
    /// Wait between pulling a GPIO CS low and the first clock edge.
    pub cs_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            conversion: DEFAULT_CONVERSION_TIME,
            cs_settle: DEFAULT_CS_SETTLE_TIME,
        }
    }
}

/// Configuration for a two-line scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// SPI bus number, the `X` in `/dev/spidevX.Y`.
    pub bus: u8,
    pub speed_hz: u32,
    pub mode: ClockMode,
    /// Drive CS from GPIOs so the conversion trigger and the read can be
    /// separated. Without it the bus toggles CS once per transfer.
    pub manual_cs: bool,
    /// GPIO chip holding the CS pins (manual CS only).
    pub gpio_chip: String,
    /// GPIO offsets for CS0 and CS1 (manual CS only).
    pub cs_pins: [u32; 2],
    pub timing: Timing,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            speed_hz: DEFAULT_SPEED_HZ,
            mode: ClockMode::Mode0,
            manual_cs: false,
            gpio_chip: "/dev/gpiochip0".to_owned(),
            cs_pins: DEFAULT_CS_PINS,
            timing: Timing::default(),
        }
    }
}

impl ScanConfig {
    pub fn new(bus: u8) -> Self {
        Self {
            bus,
            ..Default::default()
        }
    }

    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    pub fn with_mode(mut self, mode: ClockMode) -> Self {
        self.mode = mode;
        self
    }

    /// Switch to GPIO-driven chip selects on `gpio_chip`.
    pub fn with_manual_cs(mut self, gpio_chip: impl Into<String>, cs_pins: [u32; 2]) -> Self {
        self.manual_cs = true;
        self.gpio_chip = gpio_chip.into();
        self.cs_pins = cs_pins;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Checks the limits the MAX6675 imposes.
    pub fn validate(&self) -> Result<()> {
        if self.speed_hz == 0 {
            return Err(ScanError::InvalidConfig("SPI speed can't be 0 Hz".into()));
        }
        if self.speed_hz >= MAX_SPEED_HZ {
            return Err(ScanError::InvalidConfig(format!(
                "SPI speed {} Hz is at or above the MAX6675 limit of {} Hz",
                self.speed_hz, MAX_SPEED_HZ
            )));
        }
        if self.timing.conversion < MIN_CONVERSION_TIME {
            return Err(ScanError::InvalidConfig(format!(
                "conversion wait of {} ms is shorter than the {} ms the MAX6675 needs",
                self.timing.conversion.as_millis(),
                MIN_CONVERSION_TIME.as_millis()
            )));
        }
        if self.manual_cs && self.gpio_chip.is_empty() {
            return Err(ScanError::InvalidConfig(
                "manual chip select needs a GPIO chip".into(),
            ));
        }
        if self.manual_cs && self.cs_pins[0] == self.cs_pins[1] {
            return Err(ScanError::InvalidConfig(format!(
                "CS0 and CS1 can't share GPIO {}",
                self.cs_pins[0]
            )));
        }
        Ok(())
    }

    /// The spidev node a line is read through.
    ///
    /// With manual CS both lines share the bus's first node, whose own chip
    /// select is disabled, and the GPIO pin picks the device.
    pub fn node_path(&self, line: CsLine) -> PathBuf {
        let cs = if self.manual_cs { 0 } else { line.index() };
        PathBuf::from(format!("/dev/spidev{}.{}", self.bus, cs))
    }

    /// The GPIO offset wired to `line`'s chip select.
    pub fn cs_pin(&self, line: CsLine) -> u32 {
        self.cs_pins[usize::from(line.index())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, ClockMode::Mode0);
        assert!(!config.manual_cs);
        assert_eq!(config.timing.conversion, Duration::from_millis(250));
        assert_eq!(config.timing.cs_settle, Duration::from_millis(2));
    }

    #[test]
    fn rejects_out_of_range_speed() {
        assert!(ScanConfig::default().with_speed(0).validate().is_err());
        assert!(ScanConfig::default()
            .with_speed(MAX_SPEED_HZ)
            .validate()
            .is_err());
        assert!(ScanConfig::default().with_speed(500_000).validate().is_ok());
    }

    #[test]
    fn rejects_short_conversion_wait() {
        let timing = Timing {
            conversion: Duration::from_millis(100),
            ..Default::default()
        };
        let err = ScanConfig::default()
            .with_timing(timing)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_shared_cs_pin() {
        let err = ScanConfig::default()
            .with_manual_cs("/dev/gpiochip0", [22, 22])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("can't share GPIO 22"));

        // Only matters when the pins are actually driven.
        let auto = ScanConfig {
            cs_pins: [22, 22],
            ..Default::default()
        };
        assert!(auto.validate().is_ok());
        assert!(ScanConfig::default()
            .with_manual_cs("/dev/gpiochip0", [22, 23])
            .validate()
            .is_ok());
    }

    #[test]
    fn node_paths_follow_cs_strategy() {
        let auto = ScanConfig::new(1);
        assert_eq!(auto.node_path(CsLine::Cs0), PathBuf::from("/dev/spidev1.0"));
        assert_eq!(auto.node_path(CsLine::Cs1), PathBuf::from("/dev/spidev1.1"));

        let manual = ScanConfig::new(0).with_manual_cs("/dev/gpiochip4", [22, 23]);
        assert_eq!(manual.node_path(CsLine::Cs1), PathBuf::from("/dev/spidev0.0"));
        assert_eq!(manual.cs_pin(CsLine::Cs0), 22);
        assert_eq!(manual.cs_pin(CsLine::Cs1), 23);
    }

    #[test]
    fn clock_mode_numbers() {
        for n in 0..4 {
            assert_eq!(ClockMode::from_number(n).unwrap().number(), n);
        }
        assert!(ClockMode::from_number(4).is_err());
    }
}
