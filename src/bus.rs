use crate::error::{Result, TwsiError};
use crate::twsi;
use log::{debug, info, warn};
use std::fs::OpenOptions;
use std::os::fd::{AsFd, OwnedFd};

/// Operations the FFT sequence needs from a TWSI bus.
pub trait TwsiBus {
    /// Select the standard-class bus speed. Called once, right after open.
    fn set_speed(&mut self, speed: u32) -> Result<()>;

    /// Single atomic transaction: write `write` (may be empty), then read
    /// `read.len()` bytes (may be zero) from the 7-bit `slave`.
    fn transfer(&mut self, slave: u8, write: &[u8], read: &mut [u8]) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    fn write(&mut self, slave: u8, data: &[u8]) -> Result<()> {
        self.transfer(slave, data, &mut [])
    }

    fn read(&mut self, slave: u8, buffer: &mut [u8]) -> Result<()> {
        self.transfer(slave, &[], buffer)
    }
}

impl<T: TwsiBus + ?Sized> TwsiBus for &mut T {
    fn set_speed(&mut self, speed: u32) -> Result<()> {
        (**self).set_speed(speed)
    }

    fn transfer(&mut self, slave: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        (**self).transfer(slave, write, read)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Handle on the TWSI controller's character device.
pub struct TwsiDevice {
    fd: Option<OwnedFd>,
    device_path: String,
}

impl TwsiDevice {
    pub fn open(device_path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device_path)
            .map_err(|source| TwsiError::BusOpen {
                path: device_path.to_string(),
                source,
            })?;
        info!("TWSI bus opened: {}", device_path);

        Ok(TwsiDevice {
            fd: Some(file.into()),
            device_path: device_path.to_string(),
        })
    }

    /// A handle that was never opened. Every operation on it fails with
    /// `HandleInvalid`.
    pub fn unopened(device_path: &str) -> Self {
        TwsiDevice {
            fd: None,
            device_path: device_path.to_string(),
        }
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    fn fd(&self) -> Result<&OwnedFd> {
        self.fd.as_ref().ok_or(TwsiError::HandleInvalid)
    }
}

impl TwsiBus for TwsiDevice {
    fn set_speed(&mut self, speed: u32) -> Result<()> {
        debug!("Setting TWSI speed code {} on {}", speed, self.device_path);
        twsi::set_speed(self.fd()?.as_fd(), speed)
    }

    fn transfer(&mut self, slave: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        let fd = self.fd().map_err(|e| {
            warn!("Can't access bus {}: handle is not open", self.device_path);
            e
        })?;
        twsi::read_write(fd.as_fd(), slave, write, read)
    }

    fn close(&mut self) -> Result<()> {
        match self.fd.take() {
            Some(fd) => {
                drop(fd);
                info!("TWSI bus closed: {}", self.device_path);
                Ok(())
            }
            None => {
                warn!("Can't close bus {}: handle is not open", self.device_path);
                Err(TwsiError::HandleInvalid)
            }
        }
    }

    fn is_open(&self) -> bool {
        self.fd.is_some()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device() {
        let err = TwsiDevice::open("/dev/does-not-exist-twsi").err().unwrap();
        assert!(matches!(err, TwsiError::BusOpen { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_unopened_handle_rejects_everything() {
        let mut dev = TwsiDevice::unopened("/dev/twsi0");
        assert!(!dev.is_open());
        assert!(matches!(dev.set_speed(100), Err(TwsiError::HandleInvalid)));
        assert!(matches!(dev.write(0x20, &[0x02]), Err(TwsiError::HandleInvalid)));
        let mut buf = [0u8; 48];
        assert!(matches!(dev.read(0x20, &mut buf), Err(TwsiError::HandleInvalid)));
        assert_eq!(buf, [0u8; 48]);
        assert!(matches!(dev.close(), Err(TwsiError::HandleInvalid)));
    }

    #[test]
    fn test_close_twice() {
        let mut dev = TwsiDevice::open("/dev/null").unwrap();
        assert!(dev.is_open());
        assert!(dev.close().is_ok());
        assert!(!dev.is_open());
        assert!(matches!(dev.close(), Err(TwsiError::HandleInvalid)));
        assert!(matches!(dev.write(0x20, &[0x01]), Err(TwsiError::HandleInvalid)));
    }

    #[test]
    fn test_fake_echo() {
        let mut bus = fake::FakeBus::new();
        bus.write(0x20, &[0x01, 0xAA, 0xBB]).unwrap();
        let mut buf = [0xFFu8; 4];
        bus.read(0x20, &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xBB, 0, 0]);
        assert_eq!(bus.transactions.len(), 2);
        assert_eq!(bus.transactions[1].read_len, 4);
        assert!(bus.transactions[1].written.is_empty());
    }
}
