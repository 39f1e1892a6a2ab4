//! Scans both chip select lines and records what each one said.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{CsLine, ScanConfig};
use crate::decode::{DecodedFields, RawWord};
use crate::error::{Result, ScanError};
use crate::hal::{ConversionTimer, Host, ThreadSleep};
use crate::probe::{self, CoarseResult};
use crate::reader::{Acquisition, LineSession, Max6675Reader};
use crate::status::{self, DeviceStatus};

/// The outcome of scanning one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineResult {
    pub line: CsLine,
    pub bus: u8,
    pub node: PathBuf,
    pub node_exists: bool,
    /// The bus node was opened and configured.
    pub opened: bool,
    pub raw: Option<RawWord>,
    pub fields: Option<DecodedFields>,
    pub status: DeviceStatus,
    pub note: String,
}

impl LineResult {
    fn new(line: CsLine, bus: u8, node: PathBuf) -> Self {
        Self {
            line,
            bus,
            node,
            node_exists: false,
            opened: false,
            raw: None,
            fields: None,
            status: DeviceStatus::Error,
            note: String::new(),
        }
    }

    pub fn cs_label(&self) -> String {
        self.line.to_string()
    }

    pub fn device_found(&self) -> bool {
        self.status.device_found()
    }

    pub fn thermocouple_ok(&self) -> bool {
        self.status.thermocouple_ok()
    }

    /// The reading in °C, if it can be trusted.
    pub fn temperature_celsius(&self) -> Option<f64> {
        self.trusted_fields().map(|f| f.temperature_celsius())
    }

    /// The reading in °F, if it can be trusted.
    pub fn temperature_fahrenheit(&self) -> Option<f64> {
        self.trusted_fields().map(|f| f.temperature_fahrenheit())
    }

    fn trusted_fields(&self) -> Option<&DecodedFields> {
        self.fields.as_ref().filter(|_| self.thermocouple_ok())
    }

    fn classify(&mut self, raw: RawWord) {
        let fields = raw.decode();
        self.status = DeviceStatus::classify(raw, &fields);
        self.note = status::protocol_note(self.status, raw);
        self.raw = Some(raw);
        self.fields = Some(fields);
    }

    fn fail(&mut self, err: &ScanError) {
        self.status = err.status();
        self.note = fault_note(self.status, &self.node, err);
    }
}

pub(crate) fn missing_node_note(node: &Path) -> String {
    format!(
        "{} does not exist. Enable SPI in raspi-config or /boot/firmware/config.txt and reboot.",
        node.display()
    )
}

pub(crate) fn fault_note(status: DeviceStatus, node: &Path, err: &ScanError) -> String {
    if let ScanError::ChipSelect { chip, pin, .. } = err {
        return match status {
            DeviceStatus::PermissionDenied => format!(
                "Permission denied on {chip} (GPIO {pin}). Run with sudo, or add your user to \
                 the gpio group: sudo usermod -aG gpio $USER"
            ),
            _ => err.to_string(),
        };
    }
    match status {
        DeviceStatus::NoDeviceNode => format!(
            "{} disappeared before it could be opened: {}",
            node.display(),
            err
        ),
        DeviceStatus::PermissionDenied => format!(
            "Permission denied on {}. Run with sudo, or add your user to the spi group: \
             sudo usermod -aG spi $USER",
            node.display()
        ),
        DeviceStatus::OsError => format!("Failed to access {}: {}", node.display(), err),
        _ => format!("Unexpected error: {}", err),
    }
}

/// Runs the read-decode-classify pipeline on CS0 then CS1.
///
/// Lines are scanned one after the other over the same bus; a fault on one
/// never stops the other from being scanned.
pub struct LineScanner<H: Host, T: ConversionTimer = ThreadSleep> {
    host: H,
    timer: T,
    config: ScanConfig,
    reader: Max6675Reader,
}

impl<H: Host> LineScanner<H, ThreadSleep> {
    /// A scanner that sleeps the calling thread for its waits.
    pub fn new(host: H, config: ScanConfig) -> Result<Self> {
        Self::with_timer(host, ThreadSleep, config)
    }
}

impl<H: Host, T: ConversionTimer> LineScanner<H, T> {
    pub fn with_timer(host: H, timer: T, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let reader = Max6675Reader::new(config.timing);
        Ok(Self {
            host,
            timer,
            config,
            reader,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scans both lines, CS0 first.
    pub fn scan(&mut self) -> [LineResult; 2] {
        CsLine::ALL.map(|line| self.scan_line(line))
    }

    pub fn scan_line(&mut self, line: CsLine) -> LineResult {
        let node = self.config.node_path(line);
        let mut result = LineResult::new(line, self.config.bus, node);

        if !self.host.node_exists(&result.node) {
            result.status = DeviceStatus::NoDeviceNode;
            result.note = missing_node_note(&result.node);
            warn!("{}: {} is missing", line, result.node.display());
            return result;
        }
        result.node_exists = true;

        match self.acquire(line, &result.node, &mut result.opened) {
            Ok(raw) => result.classify(raw),
            Err(e) => {
                warn!("{}: {}", line, e);
                result.fail(&e);
            }
        }
        info!("{}: {}", line, result.status);
        result
    }

    /// Claims the bus (and CS pin, if manual) for `line` and reads one word.
    /// Everything claimed is let go before this returns.
    fn acquire(&mut self, line: CsLine, node: &Path, opened: &mut bool) -> Result<RawWord> {
        let bus = self.host.open_bus(node, &self.config)?;
        *opened = true;

        let cs = if self.config.manual_cs {
            Acquisition::Manual(self.host.open_chip_select(&self.config, line)?)
        } else {
            Acquisition::Automatic
        };

        let mut session = LineSession::new(bus, cs);
        session.read(&self.reader, &mut self.timer)
    }

    /// Runs the byte-pattern probe on both lines with bus-driven CS.
    ///
    /// This isn't MAX6675-aware and its verdicts are reported on their own,
    /// never folded into a [`DeviceStatus`].
    pub fn coarse_probe_all(&mut self) -> [CoarseResult; 2] {
        let config = ScanConfig {
            manual_cs: false,
            ..self.config.clone()
        };
        CsLine::ALL.map(|line| {
            let node = config.node_path(line);
            if !self.host.node_exists(&node) {
                return CoarseResult::missing(line, node);
            }
            let outcome = self
                .host
                .open_bus(&node, &config)
                .and_then(|mut bus| probe::coarse_probe(&mut bus));
            CoarseResult::from_outcome(line, node, outcome)
        })
    }
}
