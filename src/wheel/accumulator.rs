use crate::utils::dsp::envelope::EnvelopeFilter;

// -------------------------------------------------------------------------------------------------

/// Speed ratios for tempo synced wheels, relative to one revolution per beat.
///
/// 39 entries, spanning -8x..=+8x with a zero motion midpoint at index [`SYNC_RATIO_ZERO_INDEX`].
pub const SYNC_RATIOS: [f64; 39] = [
    -8.0,
    -6.0,
    -4.0,
    -3.0,
    -2.0,
    -3.0 / 2.0,
    -4.0 / 3.0,
    -1.0,
    -3.0 / 4.0,
    -2.0 / 3.0,
    -1.0 / 2.0,
    -3.0 / 8.0,
    -1.0 / 3.0,
    -1.0 / 4.0,
    -3.0 / 16.0,
    -1.0 / 6.0,
    -1.0 / 8.0,
    -1.0 / 12.0,
    -1.0 / 16.0,
    0.0,
    1.0 / 16.0,
    1.0 / 12.0,
    1.0 / 8.0,
    1.0 / 6.0,
    3.0 / 16.0,
    1.0 / 4.0,
    1.0 / 3.0,
    3.0 / 8.0,
    1.0 / 2.0,
    2.0 / 3.0,
    3.0 / 4.0,
    1.0,
    4.0 / 3.0,
    3.0 / 2.0,
    2.0,
    3.0,
    4.0,
    6.0,
    8.0,
];

/// Index of the zero motion entry in [`SYNC_RATIOS`].
pub const SYNC_RATIO_ZERO_INDEX: usize = 19;
/// Index of the one revolution per beat entry in [`SYNC_RATIOS`].
pub const SYNC_RATIO_ONE_INDEX: usize = 31;

// -------------------------------------------------------------------------------------------------

/// How a wheel's rotation speed is specified.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
    strum::VariantArray,
)]
pub enum RateMode {
    /// Free running rate in Hz.
    #[default]
    Free,
    /// Rate as a ratio of the host tempo.
    Synced,
}

/// Direction of a wheel's last phase step.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

// -------------------------------------------------------------------------------------------------

/// Slew times for the accumulator's gate envelopes as `(rise_ms, fall_ms)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slew {
    pub rise_ms: f32,
    pub fall_ms: f32,
}

impl Slew {
    pub const fn new(rise_ms: f32, fall_ms: f32) -> Self {
        Self { rise_ms, fall_ms }
    }
}

// -------------------------------------------------------------------------------------------------

/// Cyclic phase generator for a single wheel.
///
/// The accumulator gets stepped once per processing block with [`Self::accumulate`]. Its rate
/// is the control rate: the number of `accumulate` calls per second. Speed is either a free
/// rate in Hz or a ratio of the host tempo and is modulated by forward/backward nudge gates and
/// a brake gate, which are smoothed with [`EnvelopeFilter`]s.
#[derive(Debug, Clone)]
pub struct PhaseAccumulator {
    control_rate: f64,
    mode: RateMode,
    free_rate: f64,
    sync_index: usize,
    bpm: f64,
    nudge_scale: f64,
    nudge_forward: EnvelopeFilter,
    nudge_backward: EnvelopeFilter,
    brake: EnvelopeFilter,
    phase: f64,
    previous_phase: f64,
    increment: f64,
}

impl PhaseAccumulator {
    /// Limits for free running rates in Hz.
    pub const MIN_FREE_RATE: f64 = -5.0;
    pub const MAX_FREE_RATE: f64 = 5.0;

    /// Default nudge speed in Hz at fully opened nudge gates.
    pub const DEFAULT_NUDGE_SCALE: f64 = 0.5;
    pub const DEFAULT_NUDGE_SLEW: Slew = Slew::new(50.0, 200.0);
    pub const DEFAULT_BRAKE_SLEW: Slew = Slew::new(100.0, 300.0);

    /// Create a new accumulator running at the given control rate.
    pub fn new(control_rate: f64) -> Self {
        let control_rate = Self::sanitize_rate(control_rate);
        let envelope =
            |slew: Slew| EnvelopeFilter::new(control_rate as f32, slew.rise_ms, slew.fall_ms);
        Self {
            control_rate,
            mode: RateMode::Free,
            free_rate: 0.0,
            sync_index: SYNC_RATIO_ONE_INDEX,
            bpm: 120.0,
            nudge_scale: Self::DEFAULT_NUDGE_SCALE,
            nudge_forward: envelope(Self::DEFAULT_NUDGE_SLEW),
            nudge_backward: envelope(Self::DEFAULT_NUDGE_SLEW),
            brake: envelope(Self::DEFAULT_BRAKE_SLEW),
            phase: 0.0,
            previous_phase: 0.0,
            increment: 0.0,
        }
    }

    /// Set nudge speed in Hz for fully opened nudge gates.
    pub fn with_nudge_scale(mut self, nudge_scale: f64) -> Self {
        self.nudge_scale = if nudge_scale.is_finite() {
            nudge_scale.abs()
        } else {
            Self::DEFAULT_NUDGE_SCALE
        };
        self
    }

    /// Set rise and fall times of the nudge envelopes.
    pub fn set_nudge_slew(&mut self, slew: Slew) {
        self.nudge_forward.set_slew(slew.rise_ms, slew.fall_ms);
        self.nudge_backward.set_slew(slew.rise_ms, slew.fall_ms);
    }

    /// Set rise and fall times of the brake envelope.
    pub fn set_brake_slew(&mut self, slew: Slew) {
        self.brake.set_slew(slew.rise_ms, slew.fall_ms);
    }

    /// Number of `accumulate` calls per second.
    pub fn control_rate(&self) -> f64 {
        self.control_rate
    }

    /// Set a new control rate. Should be called when the processing block size changes.
    pub fn set_control_rate(&mut self, control_rate: f64) {
        let control_rate = Self::sanitize_rate(control_rate);
        if self.control_rate != control_rate {
            self.control_rate = control_rate;
            self.nudge_forward.set_sample_rate(control_rate as f32);
            self.nudge_backward.set_sample_rate(control_rate as f32);
            self.brake.set_sample_rate(control_rate as f32);
        }
    }

    /// Set rate mode, free rate in Hz and sync ratio index into [`SYNC_RATIOS`].
    /// Out of range values are clamped.
    pub fn set_rate(&mut self, mode: RateMode, free_rate: f64, sync_index: usize) {
        self.mode = mode;
        self.free_rate = if free_rate.is_finite() {
            free_rate.clamp(Self::MIN_FREE_RATE, Self::MAX_FREE_RATE)
        } else {
            0.0
        };
        self.sync_index = sync_index.min(SYNC_RATIOS.len() - 1);
    }

    /// Set host tempo and whether the rate follows the tempo.
    pub fn set_transport(&mut self, bpm: f64, is_synced: bool) {
        if bpm.is_finite() && bpm > 0.0 {
            self.bpm = bpm;
        }
        self.mode = if is_synced {
            RateMode::Synced
        } else {
            RateMode::Free
        };
    }

    pub fn mode(&self) -> RateMode {
        self.mode
    }

    /// Set forward and backward nudge gates (0 or 1, or continuous values in range 0..=1).
    pub fn nudge(&mut self, forward_gate: f32, backward_gate: f32) {
        self.nudge_forward.trigger(forward_gate);
        self.nudge_backward.trigger(backward_gate);
    }

    /// Set the brake gate (0 or 1, or continuous values in range 0..=1).
    pub fn brake(&mut self, gate: f32) {
        self.brake.trigger(gate);
    }

    /// Smoothed forward nudge level.
    pub fn nudge_forward_level(&self) -> f32 {
        self.nudge_forward.output()
    }

    /// Smoothed backward nudge level.
    pub fn nudge_backward_level(&self) -> f32 {
        self.nudge_backward.output()
    }

    /// Smoothed brake level.
    pub fn brake_level(&self) -> f32 {
        self.brake.output()
    }

    /// Base speed in revolutions per second, without nudge and brake modulation.
    pub fn base_rate(&self) -> f64 {
        match self.mode {
            RateMode::Free => self.free_rate,
            RateMode::Synced => self.bpm / 60.0 * SYNC_RATIOS[self.sync_index],
        }
    }

    /// Step the gate envelopes and advance the phase by one control period.
    /// Returns the new phase.
    pub fn accumulate(&mut self) -> f64 {
        let forward = self.nudge_forward.generate() as f64;
        let backward = self.nudge_backward.generate() as f64;
        let brake = self.brake.generate() as f64;

        let nudge = (forward - backward) * self.nudge_scale;
        let speed = (self.base_rate() + nudge) * (1.0 - brake);

        self.increment = speed / self.control_rate;
        self.previous_phase = self.phase;
        self.phase = Self::wrap(self.phase + self.increment);
        self.phase
    }

    /// Current phase in range \[0, 1).
    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase before the last `accumulate` call.
    pub fn previous_phase(&self) -> f64 {
        self.previous_phase
    }

    /// Direction of the last phase step. Unlike comparing the phase with the previous phase,
    /// this also is correct for steps which wrapped around.
    pub fn direction(&self) -> Direction {
        if self.increment >= 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Set a new phase. The value gets wrapped into range \[0, 1).
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = Self::wrap(phase);
        self.previous_phase = self.phase;
    }

    /// Reset phase and all gate envelopes.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.previous_phase = 0.0;
        self.increment = 0.0;
        self.nudge_forward.reset();
        self.nudge_backward.reset();
        self.brake.reset();
    }

    fn wrap(phase: f64) -> f64 {
        if !phase.is_finite() {
            return 0.0;
        }
        let wrapped = phase.rem_euclid(1.0);
        // rem_euclid may round tiny negative values up to exactly 1.0
        if wrapped >= 1.0 {
            0.0
        } else {
            wrapped
        }
    }

    fn sanitize_rate(rate: f64) -> f64 {
        if rate.is_finite() && rate > 0.0 {
            rate
        } else {
            1.0
        }
    }
}

// -------------------------------------------------------------------------------------------------
