#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod display;
mod engine;
mod error;
mod handle;
mod midi;
mod note;
mod transport;
mod wheel;

// public, flat re-exports
pub use error::Error;

pub use engine::{EngineConfig, WheelEngine};
pub use handle::{EngineHandle, EngineMessage};

pub use display::{DisplayLevels, WheelLevels};
pub use midi::{MidiBuffer, MidiEvent, MidiMessage, BRIGHTNESS_CC};
pub use transport::{TempoCache, Transport};

pub use note::{ChannelState, NoteBlock, NoteEngine, OverlapMode};
pub use note::{HeldNotePool, HeldNoteSlot, HELD_NOTE_SLOTS};

pub use wheel::{
    crossings, is_over_threshold, segment_angles, Direction, PhaseAccumulator, RateMode,
    SegmentAngles, Slew, ThresholdCrossings, ThresholdSet, Wheel, MAX_DIVISION, MAX_THRESHOLDS,
    SYNC_RATIOS, SYNC_RATIO_ONE_INDEX, SYNC_RATIO_ZERO_INDEX, WHEEL_COUNT,
};

// public mods
pub mod parameter;
pub mod utils;

pub mod parameters {
    //! Descriptors of all engine parameters and the per block parameter snapshot.

    pub use super::engine::parameters::*;
}
