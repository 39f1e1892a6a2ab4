//! Human-readable rendering of scan results.

use std::fmt;

use crate::config::{CsLine, ScanConfig};
use crate::probe::CoarseResult;
use crate::scanner::LineResult;

const RULE: &str = "============================================================";

impl fmt::Display for LineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  --- SPI Bus {}, {} ({}) ---",
            self.bus,
            self.cs_label(),
            self.node.display()
        )?;
        writeln!(f, "  Node exists      : {}", self.node_exists)?;
        writeln!(f, "  SPI opened       : {}", self.opened)?;
        if let Some(raw) = self.raw {
            writeln!(f, "  Raw response     : {raw}")?;
        }
        if let Some(fields) = &self.fields {
            let state = if fields.open_thermocouple {
                "open/disconnected"
            } else {
                "connected"
            };
            writeln!(
                f,
                "  Open TC flag     : {}  ({state})",
                u8::from(fields.open_thermocouple)
            )?;
        }
        if let (Some(c), Some(fahr)) = (self.temperature_celsius(), self.temperature_fahrenheit()) {
            writeln!(f, "  Temperature      : {c:.2} C  /  {fahr:.2} F")?;
        }
        writeln!(f, "  Status           : {}", self.status)?;
        write!(f, "  Notes            : {}", self.note)
    }
}

impl fmt::Display for CoarseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} ({}) : ", self.line, self.node.display())?;
        match self.fault {
            Some(status) => write!(f, "{status} -- {}", self.note),
            None => f.write_str(&self.note),
        }
    }
}

/// The closing summary over a finished scan.
pub struct Summary<'a>(pub &'a [LineResult]);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "  Summary")?;
        writeln!(f, "  -------")?;

        let mut found = self.0.iter().filter(|r| r.device_found()).peekable();
        if found.peek().is_none() {
            writeln!(f, "  No MAX6675 devices detected on CS0 or CS1.")?;
        }
        for r in found {
            let tc = if r.thermocouple_ok() {
                "thermocouple OK"
            } else {
                "thermocouple OPEN"
            };
            writeln!(f, "  {} : MAX6675 found -- {tc}", r.cs_label())?;
            if let (Some(c), Some(fahr)) = (r.temperature_celsius(), r.temperature_fahrenheit()) {
                writeln!(f, "         Temperature : {c:.2} C / {fahr:.2} F")?;
            }
        }
        write!(f, "{RULE}")
    }
}

/// The header describing what is about to be scanned.
pub struct Banner<'a>(pub &'a ScanConfig);

impl fmt::Display for Banner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.0;
        writeln!(f, "{RULE}")?;
        writeln!(f, "  MAX6675 Detector")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "  SPI Bus      : {}", config.bus)?;
        writeln!(f, "  Speed        : {} kHz", config.speed_hz / 1000)?;
        writeln!(f, "  Mode         : {}", config.mode.number())?;
        writeln!(
            f,
            "  Conv wait    : {} ms",
            config.timing.conversion.as_millis()
        )?;
        if config.manual_cs {
            writeln!(
                f,
                "  Chip select  : GPIO on {} (settle {} ms)",
                config.gpio_chip,
                config.timing.cs_settle.as_millis()
            )?;
        } else {
            writeln!(f, "  Chip select  : driven by the SPI controller")?;
        }
        for (i, line) in CsLine::ALL.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "  Checking {line:<4}: {}",
                config.node_path(*line).display()
            )?;
            if config.manual_cs {
                write!(f, " + GPIO {}", config.cs_pin(*line))?;
            }
        }
        Ok(())
    }
}
