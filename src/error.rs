use std::io;
use thiserror::Error;

/// Errors raised while talking to the accelerator over the TWSI bus.
#[derive(Debug, Error)]
pub enum TwsiError {
    /// Device node missing or not accessible
    #[error("Failed to open TWSI bus {path}: {source}")]
    BusOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Speed request rejected by the driver
    #[error("Failed to set TWSI speed: {0}")]
    BusConfig(#[source] io::Error),

    /// A read/write transaction failed
    #[error("Failed to {op} TWSI: {source}")]
    Transfer {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Operation on a handle that was never opened or is already closed
    #[error("Can't access bus: handle is not open")]
    HandleInvalid,

    /// Buffer does not fit the driver's 8-bit byte counts
    #[error("{what} length {len} exceeds {max} bytes")]
    Length {
        what: &'static str,
        len: usize,
        max: usize,
    },
}

impl TwsiError {
    /// Process status for this error: `1` when the bus never came up,
    /// `-1` (the driver's ioctl status) for everything after that.
    pub fn exit_code(&self) -> i32 {
        match self {
            TwsiError::BusOpen { .. } | TwsiError::BusConfig(_) => 1,
            _ => -1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TwsiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let open = TwsiError::BusOpen {
            path: "/dev/twsi0".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(open.exit_code(), 1);
        assert_eq!(
            TwsiError::BusConfig(io::Error::from_raw_os_error(libc::EINVAL)).exit_code(),
            1
        );
        assert_eq!(TwsiError::HandleInvalid.exit_code(), -1);
    }

    #[test]
    fn test_message_carries_os_error() {
        let err = TwsiError::Transfer {
            op: "write",
            source: io::Error::from_raw_os_error(libc::EIO),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to write TWSI: "));
        assert!(msg.len() > "Failed to write TWSI: ".len());
    }
}
