//! The MAX6675 acquisition sequence.
//!
//! The chip starts a conversion when CS goes high, needs up to 220 ms to finish
//! it, and only then may be clocked out with CS held low. A bus that toggles CS
//! around every transfer can't put that wait between the trigger and the read,
//! so the full sequence needs a separately driven chip select. Without one,
//! [`Max6675Reader`] falls back to a dummy transfer as the trigger followed by
//! a second transfer as the read.

use tracing::{debug, warn};

use crate::config::Timing;
use crate::decode::RawWord;
use crate::error::Result;
use crate::hal::{BusHandle, ChipSelectLine, ConversionTimer};

/// Sent while clocking; the MAX6675 has no MOSI pin and ignores it.
const DUMMY: [u8; 2] = [0x00, 0x00];

/// How a line's chip select is driven.
pub enum Acquisition<C> {
    /// The bus asserts CS around each transfer.
    Automatic,
    /// A GPIO the reader drives itself.
    Manual(C),
}

/// A bus and chip select claimed for one line.
///
/// Dropping it puts CS back high and then closes the bus, whichever way the
/// read ended. Errors during that cleanup are logged and discarded.
pub struct LineSession<B: BusHandle, C: ChipSelectLine> {
    bus: B,
    cs: Acquisition<C>,
}

impl<B: BusHandle, C: ChipSelectLine> LineSession<B, C> {
    pub fn new(bus: B, cs: Acquisition<C>) -> Self {
        Self { bus, cs }
    }

    /// Runs one read through `reader`.
    pub fn read<T: ConversionTimer>(
        &mut self,
        reader: &Max6675Reader,
        timer: &mut T,
    ) -> Result<RawWord> {
        match &mut self.cs {
            Acquisition::Manual(cs) => reader.read_manual(&mut self.bus, cs, timer),
            Acquisition::Automatic => reader.read_automatic(&mut self.bus, timer),
        }
    }
}

impl<B: BusHandle, C: ChipSelectLine> Drop for LineSession<B, C> {
    fn drop(&mut self) {
        if let Acquisition::Manual(cs) = &mut self.cs {
            if let Err(e) = cs.release() {
                warn!("couldn't return chip select to idle: {}", e);
            }
        }
    }
}

/// Produces one raw word per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max6675Reader {
    timing: Timing,
}

impl Max6675Reader {
    pub fn new(timing: Timing) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// The full sequence with a separately driven chip select.
    ///
    /// CS high (starts a conversion), conversion wait, CS low, settle wait,
    /// clock 16 bits, CS high.
    pub fn read_manual<B, C, T>(&self, bus: &mut B, cs: &mut C, timer: &mut T) -> Result<RawWord>
    where
        B: BusHandle,
        C: ChipSelectLine,
        T: ConversionTimer,
    {
        cs.release()?;
        debug!(
            "CS high, waiting {} ms for conversion",
            self.timing.conversion.as_millis()
        );
        timer.wait(self.timing.conversion);

        cs.assert()?;
        timer.wait(self.timing.cs_settle);

        let mut rx = [0u8; 2];
        bus.exchange(&DUMMY, &mut rx)?;
        cs.release()?;

        let raw = RawWord::from_be_bytes(rx);
        debug!("read {}", raw);
        Ok(raw)
    }

    /// The fallback for a bus that drives CS itself.
    ///
    /// The first transfer only pulses CS to start a conversion; its data is
    /// discarded. Nothing guarantees where the edges land relative to the
    /// conversion, so this is weaker than [`Self::read_manual`].
    pub fn read_automatic<B, T>(&self, bus: &mut B, timer: &mut T) -> Result<RawWord>
    where
        B: BusHandle,
        T: ConversionTimer,
    {
        let mut discard = [0u8; 2];
        bus.exchange(&DUMMY, &mut discard)?;
        debug!(
            "conversion triggered, waiting {} ms",
            self.timing.conversion.as_millis()
        );
        timer.wait(self.timing.conversion);

        let mut rx = [0u8; 2];
        bus.exchange(&DUMMY, &mut rx)?;

        let raw = RawWord::from_be_bytes(rx);
        debug!("read {}", raw);
        Ok(raw)
    }
}
