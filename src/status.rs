//! Per-line diagnostic outcome.

use std::fmt;

use crate::decode::{DecodedFields, RawWord};

/// What a scan concluded about one chip select line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    /// The expected `/dev/spidevX.Y` node isn't there.
    NoDeviceNode,
    PermissionDenied,
    /// The driver or kernel rejected an open or a transfer.
    OsError,
    /// Any other acquisition failure.
    Error,
    /// 0xFFFF: MISO is floating.
    NotDetectedFloating,
    /// 0x0000: MISO is shorted or stuck low.
    NotDetectedStuckLow,
    /// D15 was set.
    InvalidResponse,
    /// D1 was set.
    WrongDevice,
    /// A MAX6675 answered, but D2 says the thermocouple is open.
    DetectedThermocoupleOpen,
    DetectedOk,
}

impl DeviceStatus {
    /// Classifies a successfully exchanged word.
    ///
    /// The checks run in a fixed order and the first match wins. The two
    /// sentinel words are compared before any field is trusted, since 0xFFFF
    /// would otherwise look like a bad sign bit and 0x0000 like a 0 °C reading.
    pub fn classify(raw: RawWord, fields: &DecodedFields) -> Self {
        if raw == RawWord::FLOATING {
            Self::NotDetectedFloating
        } else if raw == RawWord::STUCK_LOW {
            Self::NotDetectedStuckLow
        } else if fields.sign_bit {
            Self::InvalidResponse
        } else if fields.device_id_bit {
            Self::WrongDevice
        } else if fields.open_thermocouple {
            Self::DetectedThermocoupleOpen
        } else {
            Self::DetectedOk
        }
    }

    /// A MAX6675 answered on this line, whatever the thermocouple is doing.
    pub fn device_found(self) -> bool {
        matches!(self, Self::DetectedOk | Self::DetectedThermocoupleOpen)
    }

    /// The reading's temperature can be trusted.
    pub fn thermocouple_ok(self) -> bool {
        self == Self::DetectedOk
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoDeviceNode => "NO NODE",
            Self::PermissionDenied => "PERMISSION DENIED",
            Self::OsError => "OS ERROR",
            Self::Error => "ERROR",
            Self::NotDetectedFloating => "NOT DETECTED -- FLOATING",
            Self::NotDetectedStuckLow => "NOT DETECTED -- STUCK LOW",
            Self::InvalidResponse => "INVALID RESPONSE",
            Self::WrongDevice => "WRONG DEVICE",
            Self::DetectedThermocoupleOpen => "DETECTED -- THERMOCOUPLE OPEN",
            Self::DetectedOk => "DETECTED -- OK",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The note printed next to a protocol-derived status.
pub(crate) fn protocol_note(status: DeviceStatus, raw: RawWord) -> String {
    match status {
        DeviceStatus::NotDetectedFloating => format!(
            "Response was {raw} -- MISO is floating. No MAX6675 present on this CS line."
        ),
        DeviceStatus::NotDetectedStuckLow => format!(
            "Response was {raw} -- MISO is shorted or stuck low. \
             Check MISO wiring and the MAX6675 supply."
        ),
        DeviceStatus::InvalidResponse => format!(
            "D15 must always be 0 but was 1 (raw={raw}). \
             This is not a valid MAX6675 response; check wiring, supply voltage and SPI mode."
        ),
        DeviceStatus::WrongDevice => format!(
            "D1 device ID bit must be 0 for MAX6675 but was 1 (raw={raw}). \
             A different SPI device may be connected."
        ),
        DeviceStatus::DetectedThermocoupleOpen => "MAX6675 responded correctly, but D2=1 \
             indicates the thermocouple is open or not connected. Check thermocouple wiring."
            .to_owned(),
        DeviceStatus::DetectedOk => {
            "MAX6675 responded with a valid temperature reading.".to_owned()
        }
        other => format!("{other} (raw={raw})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(word: u16) -> DeviceStatus {
        let raw = RawWord(word);
        DeviceStatus::classify(raw, &raw.decode())
    }

    #[test]
    fn sentinels_win_over_field_checks() {
        assert_eq!(classify(0xFFFF), DeviceStatus::NotDetectedFloating);
        assert_eq!(classify(0x0000), DeviceStatus::NotDetectedStuckLow);

        // Even with fields that would otherwise trip later rules.
        let mut fields = RawWord(0x8002).decode();
        fields.open_thermocouple = true;
        assert_eq!(
            DeviceStatus::classify(RawWord::FLOATING, &fields),
            DeviceStatus::NotDetectedFloating
        );
        assert_eq!(
            DeviceStatus::classify(RawWord::STUCK_LOW, &fields),
            DeviceStatus::NotDetectedStuckLow
        );
    }

    #[test]
    fn field_rules_in_order() {
        assert_eq!(classify(0x8000), DeviceStatus::InvalidResponse);
        // Sign beats device id and open flag.
        assert_eq!(classify(0x8006), DeviceStatus::InvalidResponse);
        // Device id beats open flag.
        assert_eq!(classify(0x0006), DeviceStatus::WrongDevice);
        assert_eq!(classify(0x0002), DeviceStatus::WrongDevice);
        assert_eq!(classify(0x0004), DeviceStatus::DetectedThermocoupleOpen);
        assert_eq!(classify(0x0C98), DeviceStatus::DetectedOk);
        // D0 is ignored.
        assert_eq!(classify(0x0C99), DeviceStatus::DetectedOk);
    }

    #[test]
    fn synthetic_readings_are_ok() {
        for counts in [1, 403, 2048, 4095] {
            let raw = crate::decode::DecodedFields::reading(counts).encode();
            let fields = raw.decode();
            assert_eq!(fields.temperature_counts, counts);
            assert_eq!(DeviceStatus::classify(raw, &fields), DeviceStatus::DetectedOk);
        }
    }

    #[test]
    fn every_word_has_exactly_one_status() {
        for word in 0..=u16::MAX {
            let status = classify(word);
            assert!(!matches!(
                status,
                DeviceStatus::NoDeviceNode
                    | DeviceStatus::PermissionDenied
                    | DeviceStatus::OsError
                    | DeviceStatus::Error
            ));
            if word != 0xFFFF && word != 0x0000 {
                assert_ne!(status, DeviceStatus::NotDetectedFloating);
                assert_ne!(status, DeviceStatus::NotDetectedStuckLow);
            }
        }
    }

    #[test]
    fn found_flags() {
        assert!(DeviceStatus::DetectedOk.device_found());
        assert!(DeviceStatus::DetectedThermocoupleOpen.device_found());
        assert!(!DeviceStatus::DetectedThermocoupleOpen.thermocouple_ok());
        assert!(!DeviceStatus::WrongDevice.device_found());
    }
}
