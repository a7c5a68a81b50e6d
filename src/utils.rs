//! Shared helpers for the engine's real-time and control paths.

#![allow(dead_code, unused_macros)]

pub mod dsp;

use std::sync::atomic::{AtomicU32, Ordering};

// -------------------------------------------------------------------------------------------------

/// Values below this magnitude get flushed to zero in feedback paths.
pub const DENORMAL_THRESHOLD: f32 = 1e-15;

// -------------------------------------------------------------------------------------------------

macro_rules! assert_eq_with_epsilon {
    ($x:expr, $y:expr, $d:expr) => {
        if !(($x - $y).abs() < $d) {
            panic!(
                "assertion failed: `{} ~= {}` (epsilon: {})",
                $x, $y, $d
            );
        }
    };
}
pub(crate) use assert_eq_with_epsilon;

// -------------------------------------------------------------------------------------------------

/// Linear interpolation between `a` and `b`, with `t` in range \[0, 1\].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Flush denormal or near-denormal values to an exact zero.
#[inline]
pub fn flush_denormal(value: f32) -> f32 {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Convert a unipolar 0..1 level into a 7-bit MIDI value, rounding and clamping.
#[inline]
pub fn unipolar_to_midi(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (127.0 * value).round().clamp(0.0, 127.0) as u8
}

// -------------------------------------------------------------------------------------------------

/// A `f32` which can be shared across threads, stored as raw bits in an `AtomicU32`.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self, ordering: Ordering) -> f32 {
        f32::from_bits(self.0.load(ordering))
    }

    #[inline]
    pub fn store(&self, value: f32, ordering: Ordering) {
        self.0.store(value.to_bits(), ordering)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midi_value_conversion() {
        assert_eq!(unipolar_to_midi(0.0), 0);
        assert_eq!(unipolar_to_midi(1.0), 127);
        assert_eq!(unipolar_to_midi(0.5), 64);
        assert_eq!(unipolar_to_midi(-1.0), 0);
        assert_eq!(unipolar_to_midi(3.0), 127);
        assert_eq!(unipolar_to_midi(f32::NAN), 0);
    }

    #[test]
    fn denormals() {
        assert_eq!(flush_denormal(1e-20), 0.0);
        assert_eq!(flush_denormal(-1e-16), 0.0);
        assert_eq!(flush_denormal(0.25), 0.25);
        assert_eq_with_epsilon!(lerp(0.0, 10.0, 0.25), 2.5, 1e-6);
    }

    #[test]
    fn atomic_float() {
        let value = AtomicF32::new(0.5);
        assert_eq!(value.load(Ordering::Relaxed), 0.5);
        value.store(-2.25, Ordering::Relaxed);
        assert_eq!(value.load(Ordering::Relaxed), -2.25);
    }
}
