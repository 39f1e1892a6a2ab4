//! Errors raised while talking to the bus or the chip select pins.

use std::io;

use thiserror::Error;

use crate::status::DeviceStatus;

/// An error emitted while acquiring a word from a MAX6675 line.
///
/// None of these are fatal to a scan. Each one is caught at the line boundary
/// and turned into a [`DeviceStatus`] with [`ScanError::status`].
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Couldn't open or configure {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("SPI transfer failed: {0}")]
    Transfer(#[source] io::Error),
    #[error("SPI transfer returned {got} bytes, expected {expected}")]
    ShortTransfer { expected: usize, got: usize },
    #[error("Couldn't drive chip select GPIO {pin} on {chip}: {source}")]
    ChipSelect {
        chip: String,
        pin: u32,
        #[source]
        source: gpiocdev::Error,
    },
    #[error("Invalid scan configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    /// Places this error in the per-line fault taxonomy.
    pub fn status(&self) -> DeviceStatus {
        match self {
            Self::Open { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => DeviceStatus::PermissionDenied,
                io::ErrorKind::NotFound => DeviceStatus::NoDeviceNode,
                _ => DeviceStatus::OsError,
            },
            Self::Transfer(source) => match source.kind() {
                io::ErrorKind::PermissionDenied => DeviceStatus::PermissionDenied,
                _ => DeviceStatus::OsError,
            },
            Self::ChipSelect { source, .. } => match source {
                gpiocdev::Error::Os(errno) if matches!(errno.0, libc::EACCES | libc::EPERM) => {
                    DeviceStatus::PermissionDenied
                }
                _ => DeviceStatus::OsError,
            },
            Self::ShortTransfer { .. } | Self::InvalidConfig(_) => DeviceStatus::Error,
        }
    }
}

/// Result type for line acquisition.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn open_err(kind: io::ErrorKind) -> ScanError {
        ScanError::Open {
            path: "/dev/spidev0.0".into(),
            source: io::Error::from(kind),
        }
    }

    #[test]
    fn open_errors_follow_io_kind() {
        assert_eq!(
            open_err(io::ErrorKind::PermissionDenied).status(),
            DeviceStatus::PermissionDenied
        );
        assert_eq!(
            open_err(io::ErrorKind::NotFound).status(),
            DeviceStatus::NoDeviceNode
        );
        assert_eq!(
            open_err(io::ErrorKind::Other).status(),
            DeviceStatus::OsError
        );
    }

    fn gpio_err(errno: i32) -> ScanError {
        ScanError::ChipSelect {
            chip: "/dev/gpiochip0".into(),
            pin: 8,
            source: gpiocdev::Error::from(io::Error::from_raw_os_error(errno)),
        }
    }

    #[test]
    fn gpio_errors_follow_errno() {
        assert_eq!(
            gpio_err(libc::EACCES).status(),
            DeviceStatus::PermissionDenied
        );
        assert_eq!(gpio_err(libc::EPERM).status(), DeviceStatus::PermissionDenied);
        assert_eq!(gpio_err(libc::EBUSY).status(), DeviceStatus::OsError);
        assert!(gpio_err(libc::EBUSY)
            .to_string()
            .starts_with("Couldn't drive chip select GPIO 8 on /dev/gpiochip0"));
    }

    #[test]
    fn transfer_and_protocol_errors() {
        let err = ScanError::Transfer(io::Error::from_raw_os_error(5));
        assert_eq!(err.status(), DeviceStatus::OsError);
        assert!(err.to_string().starts_with("SPI transfer failed"));

        let short = ScanError::ShortTransfer {
            expected: 2,
            got: 1,
        };
        assert_eq!(short.status(), DeviceStatus::Error);
        assert_eq!(
            ScanError::InvalidConfig("bad".into()).status(),
            DeviceStatus::Error
        );
    }
}
