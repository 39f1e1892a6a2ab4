//! Linux implementations of the [`crate::hal`] traits: `spidev` for the bus
//! and the GPIO character device for manually driven chip selects.

use std::io;
use std::path::Path;
use std::rc::Rc;

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::Request;
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use tracing::debug;

use crate::config::{ClockMode, CsLine, ScanConfig};
use crate::error::{Result, ScanError};
use crate::hal::{BusHandle, ChipSelectLine, Host};

const GPIO_CONSUMER: &str = "max6675-scan";

fn mode_flags(mode: ClockMode) -> SpiModeFlags {
    match mode {
        ClockMode::Mode0 => SpiModeFlags::SPI_MODE_0,
        ClockMode::Mode1 => SpiModeFlags::SPI_MODE_1,
        ClockMode::Mode2 => SpiModeFlags::SPI_MODE_2,
        ClockMode::Mode3 => SpiModeFlags::SPI_MODE_3,
    }
}

/// A `/dev/spidevX.Y` channel.
#[derive(Debug)]
pub struct SpidevBus {
    spi: Spidev,
}

impl SpidevBus {
    /// Opens and configures `node`.
    ///
    /// With manual chip select the controller's own CS is turned off
    /// (`SPI_NO_CS`) so it can't fight the GPIO.
    pub fn open(node: &Path, config: &ScanConfig) -> Result<Self> {
        let open_err = |source: io::Error| ScanError::Open {
            path: node.display().to_string(),
            source,
        };

        let mut spi = Spidev::open(node).map_err(open_err)?;

        let mut flags = mode_flags(config.mode);
        if config.manual_cs {
            flags |= SpiModeFlags::SPI_NO_CS;
        }
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.speed_hz)
            .lsb_first(false)
            .mode(flags)
            .build();
        spi.configure(&options).map_err(open_err)?;

        debug!(
            "opened {} (mode={}, speed={} kHz, no_cs={})",
            node.display(),
            config.mode.number(),
            config.speed_hz / 1000,
            config.manual_cs
        );
        Ok(Self { spi })
    }
}

impl BusHandle for SpidevBus {
    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        if tx.len() != rx.len() {
            return Err(ScanError::ShortTransfer {
                expected: tx.len(),
                got: rx.len(),
            });
        }
        let mut transfer = SpidevTransfer::read_write(tx, rx);
        self.spi
            .transfer(&mut transfer)
            .map_err(ScanError::Transfer)
    }
}

/// Both chip select pins, claimed together as outputs in one request.
///
/// Shared by the two lines' [`GpioChipSelect`]s so that neither pin is given
/// back to the kernel, or left undriven, while the other line is read.
pub struct ChipSelectPins {
    chip: String,
    request: Request,
}

impl ChipSelectPins {
    /// Claims `pins` on `chip`, all initially high.
    pub fn claim(chip: &str, pins: [Offset; 2]) -> Result<Self> {
        let request = Request::builder()
            .on_chip(chip)
            .with_consumer(GPIO_CONSUMER)
            .with_lines(&pins)
            .as_output(Value::Active)
            .request()
            .map_err(|source| ScanError::ChipSelect {
                chip: chip.to_owned(),
                pin: pins[0],
                source,
            })?;
        debug!("claimed {} lines {:?} for chip select", chip, pins);
        Ok(Self {
            chip: chip.to_owned(),
            request,
        })
    }

    fn drive(&self, pin: Offset, value: Value) -> Result<()> {
        self.request
            .set_value(pin, value)
            .map_err(|source| ScanError::ChipSelect {
                chip: self.chip.clone(),
                pin,
                source,
            })
    }
}

/// One line's pin out of a shared [`ChipSelectPins`] claim.
pub struct GpioChipSelect {
    pins: Rc<ChipSelectPins>,
    pin: Offset,
}

impl ChipSelectLine for GpioChipSelect {
    fn assert(&mut self) -> Result<()> {
        self.pins.drive(self.pin, Value::Inactive)
    }

    fn release(&mut self) -> Result<()> {
        self.pins.drive(self.pin, Value::Active)
    }
}

/// The host's spidev nodes and GPIO chips.
///
/// The chip select pins are claimed on first use and held, high when idle,
/// until the host is dropped.
#[derive(Default)]
pub struct LinuxHost {
    cs_pins: Option<Rc<ChipSelectPins>>,
}

impl LinuxHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for LinuxHost {
    type Bus = SpidevBus;
    type Cs = GpioChipSelect;

    fn node_exists(&self, node: &Path) -> bool {
        node.exists()
    }

    fn open_bus(&mut self, node: &Path, config: &ScanConfig) -> Result<SpidevBus> {
        SpidevBus::open(node, config)
    }

    fn open_chip_select(&mut self, config: &ScanConfig, line: CsLine) -> Result<GpioChipSelect> {
        let pins = match &self.cs_pins {
            Some(pins) => Rc::clone(pins),
            None => {
                let pins = Rc::new(ChipSelectPins::claim(&config.gpio_chip, config.cs_pins)?);
                self.cs_pins = Some(Rc::clone(&pins));
                pins
            }
        };
        Ok(GpioChipSelect {
            pins,
            pin: config.cs_pin(line),
        })
    }
}
