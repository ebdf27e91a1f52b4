//! Host-side generators for the accelerator's input tables.

use std::f64::consts::PI;
use std::fmt::Write;

/// Samples per period of the generated sine
pub const SINE_POINTS: usize = 16;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// `a * sin(2*pi*f*i/16)` for i in 0..16, as (real, imaginary) pairs.
pub fn sine_table(amplitude: i32, frequency: i32) -> Vec<(f64, f64)> {
    (0..SINE_POINTS)
        .map(|i| {
            let t = i as f64 / SINE_POINTS as f64;
            let value = amplitude as f64 * (2.0 * PI * frequency as f64 * t).sin();
            (round4(value), 0.0)
        })
        .collect()
}

/// The `n/2` twiddle factors `(cos(2*pi*i/n), sin(2*pi*i/n))` of an
/// n-point FFT.
pub fn twiddle_factors(n: usize) -> Vec<(f64, f64)> {
    (0..n / 2)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (round4(angle.cos()), round4(angle.sin()))
        })
        .collect()
}

fn format_float(value: f64) -> String {
    // Keep a trailing ".0" on integral values, and avoid "-0.0".
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Render pairs as an indented, parenthesised tuple list:
///
/// ```text
/// (
///     (1.0, 0.0),
///     (0.7071, 0.7071)
/// )
/// ```
pub fn format_pairs(pairs: &[(f64, f64)]) -> String {
    let mut out = String::from("(\n");
    for (i, (re, im)) in pairs.iter().enumerate() {
        let sep = if i + 1 < pairs.len() { "," } else { "" };
        let _ = writeln!(out, "    ({}, {}){}", format_float(*re), format_float(*im), sep);
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::COEFFICIENTS;

    #[test]
    fn test_sine_first_quarter_matches_table() {
        let sine = sine_table(1000, 1);
        assert_eq!(sine.len(), SINE_POINTS);
        // The shipped table truncates toward zero
        for i in 0..=8 {
            assert_eq!(sine[i].0.trunc() as i32, COEFFICIENTS[i], "sample {}", i);
            assert_eq!(sine[i].1, 0.0);
        }
        assert_eq!(sine[1].0, 382.6834);
    }

    #[test]
    fn test_twiddle_8() {
        let tf = twiddle_factors(8);
        assert_eq!(tf.len(), 4);
        assert_eq!(tf[0], (1.0, 0.0));
        assert_eq!(tf[1], (0.7071, 0.7071));
        assert_eq!(tf[2].1, 1.0);
        assert_eq!(tf[3], (-0.7071, 0.7071));
    }

    #[test]
    fn test_format_pairs() {
        let text = format_pairs(&[(1.0, 0.0), (0.7071, -0.5)]);
        assert_eq!(text, "(\n    (1.0, 0.0),\n    (0.7071, -0.5)\n)");
    }
}
