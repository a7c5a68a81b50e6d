//! Rotating wheels: phase accumulation and threshold crossing geometry.

mod accumulator;
mod geometry;

pub use accumulator::{
    Direction, PhaseAccumulator, RateMode, Slew, SYNC_RATIOS, SYNC_RATIO_ONE_INDEX,
    SYNC_RATIO_ZERO_INDEX,
};
pub use geometry::{
    crossings, is_over_threshold, segment_angles, SegmentAngles, ThresholdCrossings,
    ThresholdSet, MAX_DIVISION, MAX_THRESHOLDS,
};

use crate::engine::parameters::WheelSnapshot;

// -------------------------------------------------------------------------------------------------

/// Number of wheels an engine runs.
pub const WHEEL_COUNT: usize = 3;

// -------------------------------------------------------------------------------------------------

/// A single rotating wheel: a phase accumulator plus the wheel's segment layout.
#[derive(Debug, Clone)]
pub struct Wheel {
    accumulator: PhaseAccumulator,
    division: usize,
    opacity: f32,
    phase_offset: f64,
    angles: SegmentAngles,
    crossings: ThresholdCrossings,
}

impl Wheel {
    pub fn new(accumulator: PhaseAccumulator) -> Self {
        let angles = segment_angles(accumulator.phase(), 1);
        Self {
            accumulator,
            division: 1,
            opacity: 1.0,
            phase_offset: 0.0,
            angles,
            crossings: ThresholdCrossings::NONE,
        }
    }

    pub fn accumulator(&self) -> &PhaseAccumulator {
        &self.accumulator
    }

    pub fn accumulator_mut(&mut self) -> &mut PhaseAccumulator {
        &mut self.accumulator
    }

    /// Number of active segments.
    pub fn division(&self) -> usize {
        self.division
    }

    /// Weight of the wheel in threshold weights, in range \[0, 1\].
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Phase including the phase offset, in range \[0, 1).
    pub fn display_phase(&self) -> f64 {
        (self.accumulator.phase() + self.phase_offset).rem_euclid(1.0)
    }

    /// Segment boundaries of the last processed block.
    pub fn angles(&self) -> &SegmentAngles {
        &self.angles
    }

    /// Threshold crossings of the last processed block.
    pub fn crossings(&self) -> ThresholdCrossings {
        self.crossings
    }

    /// Apply a parameter snapshot's wheel settings.
    pub fn apply(&mut self, snapshot: &WheelSnapshot, bpm: f64) {
        let is_synced = snapshot.rate_mode == RateMode::Synced;
        self.accumulator.set_transport(bpm, is_synced);
        self.accumulator
            .set_rate(snapshot.rate_mode, snapshot.free_rate, snapshot.sync_index);
        self.accumulator
            .nudge(snapshot.nudge_forward, snapshot.nudge_backward);
        self.accumulator.brake(snapshot.brake);
        self.division = snapshot.division.clamp(1, MAX_DIVISION);
        self.opacity = snapshot.opacity.clamp(0.0, 1.0);
        self.phase_offset = snapshot.phase_offset;
    }

    /// Advance the phase and update segment angles and crossings for the first `count`
    /// thresholds.
    pub fn process(&mut self, thresholds: &ThresholdSet, count: usize) -> ThresholdCrossings {
        self.accumulator.accumulate();
        self.angles = segment_angles(
            self.accumulator.phase() + self.phase_offset,
            self.division,
        );
        self.crossings = crossings(&self.angles, thresholds, count);
        self.crossings
    }

    /// Reset the wheel's phase and gate envelopes.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.angles = segment_angles(self.phase_offset, self.division);
        self.crossings = ThresholdCrossings::NONE;
    }
}

// -------------------------------------------------------------------------------------------------
