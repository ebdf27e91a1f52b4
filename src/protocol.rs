//! Wire format of the FPGA FFT core.
//!
//! Every write starts with an opcode byte. SET carries the input samples as
//! 24-bit big-endian two's complement values; RUN and GET are bare opcodes.
//! After GET the results are clocked out with a plain read.

use log::debug;

pub const SAMPLE_COUNT: usize = 15;
pub const SAMPLE_WIDTH: usize = 3;

/// SET frame as transferred: opcode, 15 packed samples, 3 trailing bytes
pub const SET_FRAME_LEN: usize = 49;
/// Opcode plus packed samples; the rest of the SET frame is padding
pub const SET_POPULATED_LEN: usize = 1 + SAMPLE_COUNT * SAMPLE_WIDTH;
/// 16 slots of 3 bytes, of which the first 15 are decoded
pub const RESULT_FRAME_LEN: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Set = 0x01,
    Run = 0x02,
    Get = 0x03,
}

/// One period of the input waveform, amplitude 1000.
///
/// The last entry is the implicit zero of the deployed 16-slot table, which
/// only had 14 initialised values.
pub const COEFFICIENTS: [i32; SAMPLE_COUNT] = [
    0, 382, 707, 923, 1000, 923, 707, 382, 0, -382, -707, -923, -707, -382, 0,
];

/// How result bytes are combined into a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRule {
    /// `(b0 << 16) & (b1 << 8) & b2`, what the deployed tool computes. The
    /// shifted terms share no bits, so every sample decodes to 0.
    Masked,
    /// `b0 << 16 | b1 << 8 | b2`, sign-extended from 24 bits.
    SignExtended,
}

pub fn pack_sample(value: i32) -> [u8; SAMPLE_WIDTH] {
    [
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ]
}

pub fn unpack_sample(bytes: [u8; SAMPLE_WIDTH], rule: DecodeRule) -> i32 {
    let [b0, b1, b2] = bytes.map(i32::from);
    match rule {
        DecodeRule::Masked => (b0 << 16) & (b1 << 8) & b2,
        DecodeRule::SignExtended => ((b0 << 16 | b1 << 8 | b2) << 8) >> 8,
    }
}

pub fn encode_set(samples: &[i32; SAMPLE_COUNT]) -> [u8; SET_FRAME_LEN] {
    let mut frame = [0u8; SET_FRAME_LEN];
    frame[0] = Opcode::Set as u8;
    for (i, value) in samples.iter().enumerate() {
        let idx = 1 + i * SAMPLE_WIDTH;
        frame[idx..idx + SAMPLE_WIDTH].copy_from_slice(&pack_sample(*value));
    }
    debug!("SET frame: {:02x?}", &frame[..SET_POPULATED_LEN]);
    frame
}

pub fn encode_run() -> [u8; 1] {
    [Opcode::Run as u8]
}

pub fn encode_get() -> [u8; 1] {
    [Opcode::Get as u8]
}

pub fn decode_results(frame: &[u8; RESULT_FRAME_LEN], rule: DecodeRule) -> [i32; SAMPLE_COUNT] {
    let mut values = [0i32; SAMPLE_COUNT];
    for (i, chunk) in frame.chunks_exact(SAMPLE_WIDTH).take(SAMPLE_COUNT).enumerate() {
        values[i] = unpack_sample([chunk[0], chunk[1], chunk[2]], rule);
    }
    debug!("Decoded results ({:?}): {:?}", rule, values);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes() {
        assert_eq!(Opcode::Set as u8, 0x01);
        assert_eq!(Opcode::Run as u8, 0x02);
        assert_eq!(Opcode::Get as u8, 0x03);
        assert_eq!(encode_run(), [0x02]);
        assert_eq!(encode_get(), [0x03]);
    }

    #[test]
    fn test_pack_negative() {
        assert_eq!(pack_sample(-382), [0xff, 0xfe, 0x82]);
        assert_eq!(pack_sample(1000), [0x00, 0x03, 0xe8]);
    }

    #[test]
    fn test_table_survives_sign_extended_decode() {
        for value in COEFFICIENTS {
            assert_eq!(unpack_sample(pack_sample(value), DecodeRule::SignExtended), value);
        }
        for value in [-(1 << 23), (1 << 23) - 1, -1, 1] {
            assert_eq!(unpack_sample(pack_sample(value), DecodeRule::SignExtended), value);
        }
    }

    #[test]
    fn test_masked_decode_is_always_zero() {
        assert_eq!(unpack_sample([0xff, 0xff, 0xff], DecodeRule::Masked), 0);
        assert_eq!(unpack_sample(pack_sample(1000), DecodeRule::Masked), 0);
    }

    #[test]
    fn test_set_frame_layout() {
        let frame = encode_set(&COEFFICIENTS);
        assert_eq!(frame.len(), SET_FRAME_LEN);
        assert_eq!(SET_POPULATED_LEN, 46);
        assert_eq!(frame[0], 0x01);
        // sample 4 (1000) lives at 1 + 4*3
        assert_eq!(&frame[13..16], &[0x00, 0x03, 0xe8]);
        // sample 9 (-382)
        assert_eq!(&frame[28..31], &[0xff, 0xfe, 0x82]);
        assert_eq!(&frame[SET_POPULATED_LEN..], &[0, 0, 0]);
    }

    #[test]
    fn test_decode_ignores_sixteenth_slot() {
        let mut frame = [0u8; RESULT_FRAME_LEN];
        frame[0..3].copy_from_slice(&pack_sample(-5));
        frame[45..48].copy_from_slice(&pack_sample(77));
        let values = decode_results(&frame, DecodeRule::SignExtended);
        assert_eq!(values[0], -5);
        assert!(values[1..].iter().all(|v| *v == 0));
    }
}
