//! Field extraction for the MAX6675's 16-bit reply.
//!
//! Refer to page 5 of [Maxim Integrated's MAX6675 specsheet](https://www.analog.com/media/en/technical-documentation/data-sheets/MAX6675.pdf)
//! for the layout:
//!
//! | Bit    | Meaning                                  |
//! |--------|------------------------------------------|
//! | D15    | dummy sign bit, always 0                 |
//! | D14-D3 | 12-bit temperature count, 0.25 °C / LSB  |
//! | D2     | thermocouple input open                  |
//! | D1     | device ID, always 0 for the MAX6675      |
//! | D0     | three-state output, ignored              |

use std::fmt;

const SIGN_BIT: u16 = 1 << 15;
const COUNTS_SHIFT: u16 = 3;
const COUNTS_MASK: u16 = 0x0FFF;
const OPEN_BIT: u16 = 1 << 2;
const DEVICE_ID_BIT: u16 = 1 << 1;
const STATE_BIT: u16 = 1;

/// Degrees Celsius per temperature count.
pub const CELSIUS_PER_COUNT: f64 = 0.25;

/// The literal 16 bits clocked out of MISO, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawWord(pub u16);

impl RawWord {
    /// MISO left floating high: nothing is driving the line.
    pub const FLOATING: RawWord = RawWord(0xFFFF);
    /// MISO held low: shorted or stuck.
    pub const STUCK_LOW: RawWord = RawWord(0x0000);

    /// Combines the two received bytes big-endian.
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Splits this word into its fields. Total over every `u16`.
    pub fn decode(self) -> DecodedFields {
        DecodedFields::from(self)
    }
}

impl fmt::Display for RawWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl fmt::UpperHex for RawWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// The fields of a [`RawWord`].
///
/// The temperature is always recomputed from `temperature_counts`, so the two
/// can never disagree. It's only meaningful when both `sign_bit` and
/// `device_id_bit` are clear, and unreliable (but still defined) when
/// `open_thermocouple` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedFields {
    pub sign_bit: bool,
    /// Bits 14-3, in `0..=4095`.
    pub temperature_counts: u16,
    pub open_thermocouple: bool,
    pub device_id_bit: bool,
    pub state_bit: bool,
}

impl DecodedFields {
    /// A well-formed reply carrying `counts` with a closed thermocouple.
    pub fn reading(counts: u16) -> Self {
        Self {
            sign_bit: false,
            temperature_counts: counts & COUNTS_MASK,
            open_thermocouple: false,
            device_id_bit: false,
            state_bit: false,
        }
    }

    pub fn temperature_celsius(&self) -> f64 {
        f64::from(self.temperature_counts) * CELSIUS_PER_COUNT
    }

    pub fn temperature_fahrenheit(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature_celsius())
    }

    /// Packs the fields back into the word the chip would have sent.
    pub fn encode(&self) -> RawWord {
        let mut word = (self.temperature_counts & COUNTS_MASK) << COUNTS_SHIFT;
        if self.sign_bit {
            word |= SIGN_BIT;
        }
        if self.open_thermocouple {
            word |= OPEN_BIT;
        }
        if self.device_id_bit {
            word |= DEVICE_ID_BIT;
        }
        if self.state_bit {
            word |= STATE_BIT;
        }
        RawWord(word)
    }
}

impl From<RawWord> for DecodedFields {
    fn from(raw: RawWord) -> Self {
        let word = raw.0;
        Self {
            sign_bit: word & SIGN_BIT != 0,
            temperature_counts: (word >> COUNTS_SHIFT) & COUNTS_MASK,
            open_thermocouple: word & OPEN_BIT != 0,
            device_id_bit: word & DEVICE_ID_BIT != 0,
            state_bit: word & STATE_BIT != 0,
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
