use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use max6675_scan::{
    BusHandle, ChipSelectLine, ConversionTimer, CsLine, DecodedFields, DeviceStatus, Host,
    LineScanner, Result, ScanConfig, ScanError, Summary,
};

/// A bench with one MAX6675 reading `word` on CS1 and whatever `cs0` says on
/// CS0. Records how many times each bus node was opened and how long the
/// scanner waited in total.
struct Bench {
    cs0: Cs0,
    word: u16,
    opens: Rc<RefCell<Vec<String>>>,
}

#[derive(Clone, Copy)]
enum Cs0 {
    NoNode,
    Denied,
}

struct Bus(Option<[u8; 2]>);

impl BusHandle for Bus {
    fn exchange(&mut self, _tx: &[u8], rx: &mut [u8]) -> Result<()> {
        let bytes = self.0.ok_or_else(|| ScanError::Transfer(io::Error::other("no data")))?;
        rx.copy_from_slice(&bytes);
        Ok(())
    }
}

struct NoCs;

impl ChipSelectLine for NoCs {
    fn assert(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Host for Bench {
    type Bus = Bus;
    type Cs = NoCs;

    fn node_exists(&self, node: &Path) -> bool {
        node != Path::new("/dev/spidev0.0") || !matches!(self.cs0, Cs0::NoNode)
    }

    fn open_bus(&mut self, node: &Path, _config: &ScanConfig) -> Result<Bus> {
        self.opens.borrow_mut().push(node.display().to_string());
        if node == Path::new("/dev/spidev0.0") {
            return Err(ScanError::Open {
                path: node.display().to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        Ok(Bus(Some(self.word.to_be_bytes())))
    }

    fn open_chip_select(&mut self, _config: &ScanConfig, _line: CsLine) -> Result<NoCs> {
        Ok(NoCs)
    }
}

#[derive(Default)]
struct Clock(Rc<RefCell<Duration>>);

impl ConversionTimer for Clock {
    fn wait(&mut self, duration: Duration) {
        *self.0.borrow_mut() += duration;
    }
}

fn bench(cs0: Cs0, word: u16) -> (Bench, Rc<RefCell<Vec<String>>>) {
    let opens = Rc::new(RefCell::new(Vec::new()));
    let bench = Bench {
        cs0,
        word,
        opens: opens.clone(),
    };
    (bench, opens)
}

#[test]
fn access_denied_on_cs0_still_reads_cs1() -> anyhow::Result<()> {
    let (bench, opens) = bench(Cs0::Denied, 0x0C98);
    let clock = Clock::default();
    let waited = clock.0.clone();
    let mut scanner = LineScanner::with_timer(bench, clock, ScanConfig::default())?;

    let results = scanner.scan();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, DeviceStatus::PermissionDenied);
    assert_eq!(results[1].status, DeviceStatus::DetectedOk);
    assert_eq!(results[1].temperature_celsius(), Some(100.75));
    assert_eq!(*opens.borrow(), vec!["/dev/spidev0.0", "/dev/spidev0.1"]);
    // Only the line that opened waited for a conversion.
    assert_eq!(*waited.borrow(), Duration::from_millis(250));

    let summary = Summary(&results).to_string();
    assert!(summary.contains("CS1 : MAX6675 found -- thermocouple OK"));
    assert!(!summary.contains("CS0 : MAX6675 found"));
    Ok(())
}

#[test]
fn missing_node_is_never_opened() -> anyhow::Result<()> {
    let (bench, opens) = bench(Cs0::NoNode, 0x8000);
    let mut scanner = LineScanner::with_timer(bench, Clock::default(), ScanConfig::default())?;

    let [cs0, cs1] = scanner.scan();
    assert_eq!(cs0.status, DeviceStatus::NoDeviceNode);
    assert!(!cs0.opened);
    assert_eq!(cs1.status, DeviceStatus::InvalidResponse);
    assert!(cs1.fields.is_some_and(|f| f.sign_bit));
    assert_eq!(*opens.borrow(), vec!["/dev/spidev0.1"]);
    Ok(())
}

#[test]
fn synthetic_reading_survives_the_pipeline() -> anyhow::Result<()> {
    let word = DecodedFields::reading(1234).encode().value();
    let (bench, _) = bench(Cs0::NoNode, word);
    let mut scanner = LineScanner::with_timer(bench, Clock::default(), ScanConfig::default())?;

    let cs1 = scanner.scan_line(CsLine::Cs1);
    assert_eq!(cs1.status, DeviceStatus::DetectedOk);
    assert_eq!(cs1.fields.map(|f| f.temperature_counts), Some(1234));
    assert_eq!(cs1.temperature_celsius(), Some(308.5));
    Ok(())
}
