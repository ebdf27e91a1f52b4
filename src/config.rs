use crate::protocol::DecodeRule;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bus: BusConfig,
    pub sequence: SequenceConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusConfig {
    pub device: String,
    /// 7-bit address of the FFT core
    pub slave_address: u8,
    /// Standard-class speed code understood by the TWSI driver
    pub speed: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceConfig {
    /// Pause between RUN and GET while the accelerator computes
    pub settle: Duration,
    pub decode: DecodeRule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: BusConfig {
                device: "/dev/twsi0".to_string(),
                slave_address: 0x20,
                speed: crate::twsi::TWSI_SPEED_100,
            },
            sequence: SequenceConfig {
                settle: Duration::from_micros(500),
                decode: DecodeRule::Masked,
            },
        }
    }
}
