//! Smoothed engine levels, published by the real-time thread for display collaborators.

use std::sync::atomic::Ordering;

use crate::{
    utils::AtomicF32,
    wheel::{MAX_THRESHOLDS, WHEEL_COUNT},
};

// -------------------------------------------------------------------------------------------------

/// Envelope levels of a single wheel.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WheelLevels {
    /// Phase including the phase offset, in range \[0, 1).
    pub phase: f32,
    pub nudge_forward: f32,
    pub nudge_backward: f32,
    pub brake: f32,
}

#[derive(Debug, Default)]
struct AtomicWheelLevels {
    phase: AtomicF32,
    nudge_forward: AtomicF32,
    nudge_backward: AtomicF32,
    brake: AtomicF32,
}

// -------------------------------------------------------------------------------------------------

/// Lock-free display state of a running engine.
///
/// Written once per processing block by the engine, read at any time by UIs. Values of
/// different cells are not guaranteed to belong to the same block.
#[derive(Debug, Default)]
pub struct DisplayLevels {
    wheels: [AtomicWheelLevels; WHEEL_COUNT],
    reset: AtomicF32,
    weights: [AtomicF32; MAX_THRESHOLDS],
}

impl DisplayLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels of the given wheel, or None when the index is invalid.
    pub fn wheel(&self, index: usize) -> Option<WheelLevels> {
        let wheel = self.wheels.get(index)?;
        Some(WheelLevels {
            phase: wheel.phase.load(Ordering::Relaxed),
            nudge_forward: wheel.nudge_forward.load(Ordering::Relaxed),
            nudge_backward: wheel.nudge_backward.load(Ordering::Relaxed),
            brake: wheel.brake.load(Ordering::Relaxed),
        })
    }

    /// Smoothed reset gate level.
    pub fn reset(&self) -> f32 {
        self.reset.load(Ordering::Relaxed)
    }

    /// Combined weight of the given threshold, 0 for invalid indices.
    pub fn weight(&self, index: usize) -> f32 {
        self.weights
            .get(index)
            .map_or(0.0, |weight| weight.load(Ordering::Relaxed))
    }

    /// Combined weights of all thresholds.
    pub fn weights(&self) -> [f32; MAX_THRESHOLDS] {
        std::array::from_fn(|index| self.weights[index].load(Ordering::Relaxed))
    }

    pub(crate) fn publish_wheel(&self, index: usize, levels: WheelLevels) {
        if let Some(wheel) = self.wheels.get(index) {
            wheel.phase.store(levels.phase, Ordering::Relaxed);
            wheel
                .nudge_forward
                .store(levels.nudge_forward, Ordering::Relaxed);
            wheel
                .nudge_backward
                .store(levels.nudge_backward, Ordering::Relaxed);
            wheel.brake.store(levels.brake, Ordering::Relaxed);
        }
    }

    pub(crate) fn publish_reset(&self, level: f32) {
        self.reset.store(level, Ordering::Relaxed);
    }

    pub(crate) fn publish_weights(&self, weights: &[f32; MAX_THRESHOLDS]) {
        for (cell, weight) in self.weights.iter().zip(weights) {
            cell.store(*weight, Ordering::Relaxed);
        }
    }
}

// -------------------------------------------------------------------------------------------------
