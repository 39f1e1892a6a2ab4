//! A quick look at whether anything drives MISO at all.
//!
//! One transfer, bus-driven CS, no conversion wait. The only thing it checks is
//! whether the reply bytes are all 0x00 or all 0xFF, so it can't tell a
//! MAX6675 from any other chip. Its verdicts stay separate from
//! [`DeviceStatus`](crate::status::DeviceStatus).

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::config::CsLine;
use crate::decode::RawWord;
use crate::error::Result;
use crate::hal::BusHandle;
use crate::scanner::{fault_note, missing_node_note};
use crate::status::DeviceStatus;

/// What the raw bytes looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// Every byte was 0x00.
    AllLow,
    /// Every byte was 0xFF.
    AllHigh,
    /// Some mix of bits came back.
    Activity(RawWord),
}

impl fmt::Display for ProbeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllLow => f.write_str("all 0x00 -- nothing responding, or MISO held low"),
            Self::AllHigh => f.write_str("all 0xFF -- MISO floating, nothing responding"),
            Self::Activity(raw) => write!(f, "mixed bits ({raw}) -- something is responding"),
        }
    }
}

/// Exchanges two zero bytes and sorts the reply.
pub fn coarse_probe<B: BusHandle>(bus: &mut B) -> Result<ProbeVerdict> {
    let mut rx = [0u8; 2];
    bus.exchange(&[0x00, 0x00], &mut rx)?;
    debug!("coarse probe got {:02X?}", rx);

    let verdict = if rx.iter().all(|&b| b == 0x00) {
        ProbeVerdict::AllLow
    } else if rx.iter().all(|&b| b == 0xFF) {
        ProbeVerdict::AllHigh
    } else {
        ProbeVerdict::Activity(RawWord::from_be_bytes(rx))
    };
    Ok(verdict)
}

/// A coarse probe of one line.
#[derive(Debug, Clone, PartialEq)]
pub struct CoarseResult {
    pub line: CsLine,
    pub node: PathBuf,
    pub node_exists: bool,
    pub verdict: Option<ProbeVerdict>,
    /// Set when the probe couldn't run.
    pub fault: Option<DeviceStatus>,
    pub note: String,
}

impl CoarseResult {
    pub(crate) fn missing(line: CsLine, node: PathBuf) -> Self {
        let note = missing_node_note(&node);
        Self {
            line,
            node,
            node_exists: false,
            verdict: None,
            fault: Some(DeviceStatus::NoDeviceNode),
            note,
        }
    }

    pub(crate) fn from_outcome(line: CsLine, node: PathBuf, outcome: Result<ProbeVerdict>) -> Self {
        match outcome {
            Ok(verdict) => Self {
                line,
                node,
                node_exists: true,
                verdict: Some(verdict),
                fault: None,
                note: verdict.to_string(),
            },
            Err(e) => {
                let status = e.status();
                let note = fault_note(status, &node, &e);
                Self {
                    line,
                    node,
                    node_exists: true,
                    verdict: None,
                    fault: Some(status),
                    note,
                }
            }
        }
    }
}
