//! The engine's parameter descriptors and the per block parameter snapshot.

use four_cc::FourCC;

use crate::{
    note::OverlapMode,
    parameter::{BooleanParameter, EnumParameter, FloatParameter, IntegerParameter, Parameter},
    wheel::{RateMode, MAX_DIVISION, MAX_THRESHOLDS, SYNC_RATIOS, SYNC_RATIO_ONE_INDEX, WHEEL_COUNT},
};

// -------------------------------------------------------------------------------------------------

pub static OVERLAP_MODE: EnumParameter = EnumParameter::new(
    FourCC(*b"ovlp"),
    "Overlap Mode",
    <OverlapMode as strum::VariantNames>::VARIANTS,
    0,
);
pub static CC_SLEW: FloatParameter =
    FloatParameter::new(FourCC(*b"slew"), "CC Slew", 0.0..=100.0, 100.0).with_unit("%");
pub static HOLD: BooleanParameter = BooleanParameter::new(FourCC(*b"hold"), "Hold", false);
pub static THRESHOLD_COUNT: IntegerParameter = IntegerParameter::new(
    FourCC(*b"thrs"),
    "Thresholds",
    1..=MAX_THRESHOLDS as i32,
    8,
);
pub static RESET: FloatParameter = FloatParameter::new(FourCC(*b"rset"), "Reset", 0.0..=1.0, 0.0);

// -------------------------------------------------------------------------------------------------

pub static WHEEL_SYNC: [BooleanParameter; WHEEL_COUNT] = [
    BooleanParameter::new(FourCC(*b"syn1"), "Wheel 1 Sync", false),
    BooleanParameter::new(FourCC(*b"syn2"), "Wheel 2 Sync", false),
    BooleanParameter::new(FourCC(*b"syn3"), "Wheel 3 Sync", false),
];

pub static WHEEL_RATE: [FloatParameter; WHEEL_COUNT] = [
    FloatParameter::new(FourCC(*b"frq1"), "Wheel 1 Rate", -5.0..=5.0, 0.25).with_unit("Hz"),
    FloatParameter::new(FourCC(*b"frq2"), "Wheel 2 Rate", -5.0..=5.0, 0.5).with_unit("Hz"),
    FloatParameter::new(FourCC(*b"frq3"), "Wheel 3 Rate", -5.0..=5.0, 0.75).with_unit("Hz"),
];

const MAX_SYNC_RATIO_INDEX: i32 = SYNC_RATIOS.len() as i32 - 1;
const DEFAULT_SYNC_RATIO_INDEX: i32 = SYNC_RATIO_ONE_INDEX as i32;

pub static WHEEL_SYNC_RATIO: [IntegerParameter; WHEEL_COUNT] = [
    IntegerParameter::new(
        FourCC(*b"rto1"),
        "Wheel 1 Sync Ratio",
        0..=MAX_SYNC_RATIO_INDEX,
        DEFAULT_SYNC_RATIO_INDEX,
    ),
    IntegerParameter::new(
        FourCC(*b"rto2"),
        "Wheel 2 Sync Ratio",
        0..=MAX_SYNC_RATIO_INDEX,
        DEFAULT_SYNC_RATIO_INDEX,
    ),
    IntegerParameter::new(
        FourCC(*b"rto3"),
        "Wheel 3 Sync Ratio",
        0..=MAX_SYNC_RATIO_INDEX,
        DEFAULT_SYNC_RATIO_INDEX,
    ),
];

pub static WHEEL_PHASE: [FloatParameter; WHEEL_COUNT] = [
    FloatParameter::new(FourCC(*b"off1"), "Wheel 1 Phase", 0.0..=100.0, 0.0).with_unit("%"),
    FloatParameter::new(FourCC(*b"off2"), "Wheel 2 Phase", 0.0..=100.0, 0.0).with_unit("%"),
    FloatParameter::new(FourCC(*b"off3"), "Wheel 3 Phase", 0.0..=100.0, 0.0).with_unit("%"),
];

pub static WHEEL_OPACITY: [FloatParameter; WHEEL_COUNT] = [
    FloatParameter::new(FourCC(*b"opa1"), "Wheel 1 Opacity", 0.0..=100.0, 100.0).with_unit("%"),
    FloatParameter::new(FourCC(*b"opa2"), "Wheel 2 Opacity", 0.0..=100.0, 100.0).with_unit("%"),
    FloatParameter::new(FourCC(*b"opa3"), "Wheel 3 Opacity", 0.0..=100.0, 100.0).with_unit("%"),
];

pub static WHEEL_DIVISION: [IntegerParameter; WHEEL_COUNT] = [
    IntegerParameter::new(FourCC(*b"dvs1"), "Wheel 1 Division", 1..=MAX_DIVISION as i32, 1),
    IntegerParameter::new(FourCC(*b"dvs2"), "Wheel 2 Division", 1..=MAX_DIVISION as i32, 1),
    IntegerParameter::new(FourCC(*b"dvs3"), "Wheel 3 Division", 1..=MAX_DIVISION as i32, 1),
];

pub static WHEEL_NUDGE_FORWARD: [FloatParameter; WHEEL_COUNT] = [
    FloatParameter::new(FourCC(*b"nfw1"), "Wheel 1 Nudge Fwd", 0.0..=1.0, 0.0),
    FloatParameter::new(FourCC(*b"nfw2"), "Wheel 2 Nudge Fwd", 0.0..=1.0, 0.0),
    FloatParameter::new(FourCC(*b"nfw3"), "Wheel 3 Nudge Fwd", 0.0..=1.0, 0.0),
];

pub static WHEEL_NUDGE_BACKWARD: [FloatParameter; WHEEL_COUNT] = [
    FloatParameter::new(FourCC(*b"nbk1"), "Wheel 1 Nudge Back", 0.0..=1.0, 0.0),
    FloatParameter::new(FourCC(*b"nbk2"), "Wheel 2 Nudge Back", 0.0..=1.0, 0.0),
    FloatParameter::new(FourCC(*b"nbk3"), "Wheel 3 Nudge Back", 0.0..=1.0, 0.0),
];

pub static WHEEL_BRAKE: [FloatParameter; WHEEL_COUNT] = [
    FloatParameter::new(FourCC(*b"brk1"), "Wheel 1 Brake", 0.0..=1.0, 0.0),
    FloatParameter::new(FourCC(*b"brk2"), "Wheel 2 Brake", 0.0..=1.0, 0.0),
    FloatParameter::new(FourCC(*b"brk3"), "Wheel 3 Brake", 0.0..=1.0, 0.0),
];

// -------------------------------------------------------------------------------------------------

const GLOBAL_PARAMETER_COUNT: usize = 5;
const WHEEL_PARAMETER_COUNT: usize = 9;

/// Total number of engine parameters.
pub const PARAMETER_COUNT: usize = GLOBAL_PARAMETER_COUNT + WHEEL_COUNT * WHEEL_PARAMETER_COUNT;

/// All engine parameter descriptors: global parameters first, followed by the parameters of
/// each wheel. The order defines the layout of the values in [`ParameterSnapshot::from_values`].
pub static PARAMETERS: [&dyn Parameter; PARAMETER_COUNT] = [
    &OVERLAP_MODE,
    &CC_SLEW,
    &HOLD,
    &THRESHOLD_COUNT,
    &RESET,
    // wheel 1
    &WHEEL_SYNC[0],
    &WHEEL_RATE[0],
    &WHEEL_SYNC_RATIO[0],
    &WHEEL_PHASE[0],
    &WHEEL_OPACITY[0],
    &WHEEL_DIVISION[0],
    &WHEEL_NUDGE_FORWARD[0],
    &WHEEL_NUDGE_BACKWARD[0],
    &WHEEL_BRAKE[0],
    // wheel 2
    &WHEEL_SYNC[1],
    &WHEEL_RATE[1],
    &WHEEL_SYNC_RATIO[1],
    &WHEEL_PHASE[1],
    &WHEEL_OPACITY[1],
    &WHEEL_DIVISION[1],
    &WHEEL_NUDGE_FORWARD[1],
    &WHEEL_NUDGE_BACKWARD[1],
    &WHEEL_BRAKE[1],
    // wheel 3
    &WHEEL_SYNC[2],
    &WHEEL_RATE[2],
    &WHEEL_SYNC_RATIO[2],
    &WHEEL_PHASE[2],
    &WHEEL_OPACITY[2],
    &WHEEL_DIVISION[2],
    &WHEEL_NUDGE_FORWARD[2],
    &WHEEL_NUDGE_BACKWARD[2],
    &WHEEL_BRAKE[2],
];

/// Plain default values of all [`PARAMETERS`].
pub fn default_values() -> [f32; PARAMETER_COUNT] {
    std::array::from_fn(|index| PARAMETERS[index].default_value())
}

// -------------------------------------------------------------------------------------------------

/// Sanitized settings of a single wheel for one processing block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSnapshot {
    pub rate_mode: RateMode,
    /// Free running rate in Hz.
    pub free_rate: f64,
    /// Index into [`SYNC_RATIOS`].
    pub sync_index: usize,
    /// Phase offset in turn fractions, in range \[0, 1\].
    pub phase_offset: f64,
    /// Opacity in range \[0, 1\].
    pub opacity: f32,
    pub division: usize,
    pub nudge_forward: f32,
    pub nudge_backward: f32,
    pub brake: f32,
}

/// Sanitized plain values of all engine parameters for one processing block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub overlap_mode: OverlapMode,
    /// Controller interpolation amount in range \[0, 1\].
    pub slew_amount: f32,
    pub hold: bool,
    pub threshold_count: usize,
    pub reset_gate: f32,
    pub wheels: [WheelSnapshot; WHEEL_COUNT],
}

impl ParameterSnapshot {
    /// Create a snapshot from plain values, laid out as the [`PARAMETERS`] list.
    /// Values get clamped into their parameter's ranges.
    pub fn from_values(values: &[f32; PARAMETER_COUNT]) -> Self {
        let wheels = std::array::from_fn(|wheel| {
            let values = &values[GLOBAL_PARAMETER_COUNT + wheel * WHEEL_PARAMETER_COUNT..];
            let rate_mode = if WHEEL_SYNC[wheel].to_bool(values[0]) {
                RateMode::Synced
            } else {
                RateMode::Free
            };
            WheelSnapshot {
                rate_mode,
                free_rate: WHEEL_RATE[wheel].clamp_value(values[1]) as f64,
                sync_index: WHEEL_SYNC_RATIO[wheel].clamp_int(values[2]) as usize,
                phase_offset: WHEEL_PHASE[wheel].clamp_value(values[3]) as f64 / 100.0,
                opacity: WHEEL_OPACITY[wheel].clamp_value(values[4]) / 100.0,
                division: WHEEL_DIVISION[wheel].clamp_int(values[5]) as usize,
                nudge_forward: WHEEL_NUDGE_FORWARD[wheel].clamp_value(values[6]),
                nudge_backward: WHEEL_NUDGE_BACKWARD[wheel].clamp_value(values[7]),
                brake: WHEEL_BRAKE[wheel].clamp_value(values[8]),
            }
        });
        Self {
            overlap_mode: OVERLAP_MODE.to_variant(values[0]),
            slew_amount: CC_SLEW.clamp_value(values[1]) / 100.0,
            hold: HOLD.to_bool(values[2]),
            threshold_count: THRESHOLD_COUNT.clamp_int(values[3]) as usize,
            reset_gate: RESET.clamp_value(values[4]),
            wheels,
        }
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self::from_values(&default_values())
    }
}

// -------------------------------------------------------------------------------------------------
