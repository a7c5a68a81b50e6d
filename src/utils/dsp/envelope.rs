//! Asymmetric one-pole envelope filter (a "low pass gate") which turns gate events into smooth
//! unipolar control signals.

use crate::utils::flush_denormal;

// -------------------------------------------------------------------------------------------------

/// An asymmetric one-pole smoother with independent rise and fall time constants.
///
/// The filter is driven by a target value (a gate as 0 or 1, or any continuous value in range
/// \[0, 1\]) and moves its output towards the target on each call to [`Self::generate`]. Time
/// constants are specified in milliseconds and converted to steps with the given rate, so the
/// output reaches -60 dB of a step after the configured time.
///
/// The rate is the rate at which `generate` gets called: the audio sample rate when used per
/// sample frame, or the control rate when used once per processing block.
#[derive(Debug, Clone)]
pub struct EnvelopeFilter {
    sample_rate: f32,
    rise_ms: f32,
    fall_ms: f32,
    rise_time_constant: f32,
    fall_time_constant: f32,
    rise_coeff: f32,
    fall_coeff: f32,
    target: f32,
    output: f32,
    previous_output: f32,
}

impl EnvelopeFilter {
    /// `ln(0.001)`: the decay reaches -60 dB of the step after one time constant.
    const LN_MINUS_60_DB: f32 = -6.907_755;
    /// Substitute for zero time constants.
    const EPSILON: f32 = 1e-9;
    /// Outputs above this level are reported as active.
    const ACTIVE_THRESHOLD: f32 = 1e-4;

    /// Create a new envelope filter with the given rate and rise/fall times in milliseconds.
    pub fn new(sample_rate: f32, rise_ms: f32, fall_ms: f32) -> Self {
        let mut filter = Self {
            sample_rate,
            rise_ms,
            fall_ms,
            rise_time_constant: 1.0,
            fall_time_constant: 1.0,
            rise_coeff: 0.0,
            fall_coeff: 0.0,
            target: 0.0,
            output: 0.0,
            previous_output: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    /// The rate at which the filter gets processed.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set a new processing rate. Time constants are recalculated when the rate changed.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.update_coefficients();
        }
    }

    /// Set new rise and fall times in milliseconds.
    pub fn set_slew(&mut self, rise_ms: f32, fall_ms: f32) {
        self.rise_ms = rise_ms;
        self.fall_ms = fall_ms;
        self.update_coefficients();
    }

    /// Rise time constant in steps.
    pub fn rise_time_constant(&self) -> f32 {
        self.rise_time_constant
    }

    /// Fall time constant in steps.
    pub fn fall_time_constant(&self) -> f32 {
        self.fall_time_constant
    }

    /// Set a new continuous target value. The value gets clamped into range \[0, 1\].
    pub fn trigger(&mut self, target: f32) {
        self.target = if target.is_nan() {
            0.0
        } else {
            target.clamp(0.0, 1.0)
        };
    }

    /// Open or close the gate.
    pub fn trigger_gate(&mut self, gate: bool) {
        self.trigger(if gate { 1.0 } else { 0.0 });
    }

    /// Current target value.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Last generated output value.
    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }

    /// True when the output is audibly non zero.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.output > Self::ACTIVE_THRESHOLD
    }

    /// Move the output towards the target and return the new output value.
    #[inline]
    pub fn generate(&mut self) -> f32 {
        let coeff = if self.target >= 0.5 {
            self.rise_coeff
        } else {
            self.fall_coeff
        };
        // (1 - c) * target + c * previous, arranged to land exactly on the target
        let output = self.target + coeff * (self.previous_output - self.target);
        self.output = flush_denormal(output).clamp(0.0, 1.0);
        self.previous_output = self.output;
        self.output
    }

    /// Reset output and target to zero.
    pub fn reset(&mut self) {
        self.target = 0.0;
        self.output = 0.0;
        self.previous_output = 0.0;
    }

    fn time_constant(&self, ms: f32) -> f32 {
        let samples = ms / 1000.0 * self.sample_rate;
        if samples.is_nan() {
            1.0
        } else {
            samples.max(1.0)
        }
    }

    fn coefficient(time_constant: f32) -> f32 {
        let denominator = if time_constant == 0.0 {
            Self::EPSILON
        } else {
            time_constant
        };
        (Self::LN_MINUS_60_DB / denominator).exp()
    }

    fn update_coefficients(&mut self) {
        self.rise_time_constant = self.time_constant(self.rise_ms);
        self.fall_time_constant = self.time_constant(self.fall_ms);
        self.rise_coeff = Self::coefficient(self.rise_time_constant);
        self.fall_coeff = Self::coefficient(self.fall_time_constant);
    }
}

impl Default for EnvelopeFilter {
    fn default() -> Self {
        Self::new(44100.0, 10.0, 100.0)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::assert_eq_with_epsilon;

    #[test]
    fn slew_to_time_constants() {
        let mut filter = EnvelopeFilter::new(1000.0, 10.0, 250.0);
        assert_eq_with_epsilon!(filter.rise_time_constant(), 10.0, 1e-4);
        assert_eq_with_epsilon!(filter.fall_time_constant(), 250.0, 1e-4);

        // time constants never drop below a single step
        filter.set_slew(0.0, 0.1);
        assert_eq!(filter.rise_time_constant(), 1.0);
        assert_eq!(filter.fall_time_constant(), 1.0);

        filter.set_slew(10.0, 10.0);
        filter.set_sample_rate(2000.0);
        assert_eq_with_epsilon!(filter.rise_time_constant(), 20.0, 1e-4);
    }

    #[test]
    fn rise_is_monotonic_and_converges() {
        for (rise, fall) in [(1.0, 1.0), (5.0, 50.0), (100.0, 2.0), (0.0, 0.0)] {
            let mut filter = EnvelopeFilter::new(1000.0, rise, fall);
            filter.trigger_gate(true);
            let mut last = filter.output();
            for _ in 0..5000 {
                let next = filter.generate();
                assert!(next >= last, "output must not decrease while rising");
                assert!((0.0..=1.0).contains(&next));
                last = next;
            }
            assert_eq_with_epsilon!(last, 1.0, 1e-3);
            assert!(filter.is_active());
        }
    }

    #[test]
    fn fall_is_monotonic_and_converges() {
        for (rise, fall) in [(1.0, 1.0), (5.0, 50.0), (100.0, 2.0)] {
            let mut filter = EnvelopeFilter::new(1000.0, rise, fall);
            filter.trigger(1.0);
            for _ in 0..5000 {
                filter.generate();
            }
            filter.trigger(0.0);
            let mut last = filter.output();
            for _ in 0..20000 {
                let next = filter.generate();
                assert!(next <= last, "output must not increase while falling");
                last = next;
            }
            assert_eq!(last, 0.0, "denormals must get flushed to zero");
            assert!(!filter.is_active());
        }
    }

    #[test]
    fn reaches_minus_60db_after_time_constant() {
        let mut filter = EnvelopeFilter::new(1000.0, 100.0, 100.0);
        filter.trigger(1.0);
        // 100 ms at 1 kHz = 100 steps
        for _ in 0..100 {
            filter.generate();
        }
        assert_eq_with_epsilon!(1.0 - filter.output(), 0.001, 1e-4);
    }

    #[test]
    fn continuous_targets() {
        let mut filter = EnvelopeFilter::new(1000.0, 1.0, 1.0);
        filter.trigger(0.3);
        for _ in 0..100 {
            filter.generate();
        }
        // below 0.5 the fall time constant is used, but it still converges to the target
        assert_eq_with_epsilon!(filter.output(), 0.3, 1e-4);

        filter.trigger(7.0);
        assert_eq!(filter.target(), 1.0);
        filter.trigger(f32::NAN);
        assert_eq!(filter.target(), 0.0);

        filter.reset();
        assert_eq!(filter.output(), 0.0);
    }
}
