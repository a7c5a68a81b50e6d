use crate::{
    wheel::{PhaseAccumulator, Slew, ThresholdSet, MAX_THRESHOLDS},
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Options to create a [`WheelEngine`](super::WheelEngine).
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Audio sample rate of the host. By default 44100.
    pub sample_rate: u32,

    /// By default 1024. Maximum number of sample frames passed to a single processing call.
    /// Larger blocks still get processed, but are treated as a single control step.
    pub max_block_frames: usize,

    /// By default None, which means threshold markers get laid out evenly for the current
    /// threshold count parameter. When set, the given markers are used as they are: only the
    /// first `threshold count` markers of the set then are active.
    pub thresholds: Option<ThresholdSet>,

    /// Note numbers played by each channel when no held note is available for it.
    /// By default 60, 61, 62 and so on.
    pub default_notes: [u8; MAX_THRESHOLDS],

    /// Rise and fall times of the wheels' nudge envelopes.
    pub nudge_slew: Slew,
    /// Rise and fall times of the wheels' brake envelopes.
    pub brake_slew: Slew,
    /// Rise and fall times of the reset gate envelope.
    pub reset_slew: Slew,

    /// Speed in Hz which gets added to or subtracted from a wheel's rate at fully opened
    /// nudge gates. By default 0.5.
    pub nudge_scale: f64,

    /// Tempo which is used until the host reports a tempo. By default 120.
    pub initial_bpm: f64,

    /// By default 64. Size of the control message queue of the engine's handles.
    pub message_queue_size: usize,

    /// By default 256. Number of MIDI events the engine can emit in a single block, including
    /// passed through input events. Passed through events never use the last
    /// [`Self::GENERATED_EVENT_HEADROOM`] slots, which are reserved for generated events.
    pub output_event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            max_block_frames: 1024,
            thresholds: None,
            default_notes: std::array::from_fn(|index| 60 + index as u8),
            nudge_slew: PhaseAccumulator::DEFAULT_NUDGE_SLEW,
            brake_slew: PhaseAccumulator::DEFAULT_BRAKE_SLEW,
            reset_slew: Self::DEFAULT_RESET_SLEW,
            nudge_scale: PhaseAccumulator::DEFAULT_NUDGE_SCALE,
            initial_bpm: 120.0,
            message_queue_size: 64,
            output_event_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub const DEFAULT_RESET_SLEW: Slew = Slew::new(1.0, 100.0);

    /// Output event slots reserved for generated events: a full note flush, plus a note-off,
    /// note-on and two controller events for each channel.
    pub const GENERATED_EVENT_HEADROOM: usize = 5 * MAX_THRESHOLDS;

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn max_block_frames(mut self, frames: usize) -> Self {
        self.max_block_frames = frames;
        self
    }

    pub fn thresholds(mut self, thresholds: ThresholdSet) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn default_notes(mut self, notes: [u8; MAX_THRESHOLDS]) -> Self {
        self.default_notes = notes;
        self
    }

    pub fn nudge_slew(mut self, rise_ms: f32, fall_ms: f32) -> Self {
        self.nudge_slew = Slew::new(rise_ms, fall_ms);
        self
    }

    pub fn brake_slew(mut self, rise_ms: f32, fall_ms: f32) -> Self {
        self.brake_slew = Slew::new(rise_ms, fall_ms);
        self
    }

    pub fn reset_slew(mut self, rise_ms: f32, fall_ms: f32) -> Self {
        self.reset_slew = Slew::new(rise_ms, fall_ms);
        self
    }

    pub fn nudge_scale(mut self, nudge_scale: f64) -> Self {
        self.nudge_scale = nudge_scale;
        self
    }

    pub fn initial_bpm(mut self, bpm: f64) -> Self {
        self.initial_bpm = bpm;
        self
    }

    pub fn message_queue_size(mut self, size: usize) -> Self {
        self.message_queue_size = size;
        self
    }

    pub fn output_event_capacity(mut self, capacity: usize) -> Self {
        self.output_event_capacity = capacity;
        self
    }

    /// Validate all options. Returns Error::InvalidSampleRate or Error::ParameterError on errors.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_frames == 0 {
            return Err(Error::ParameterError(
                "engine config 'max_block_frames' must not be 0".to_string(),
            ));
        }
        if let Some(note) = self.default_notes.iter().find(|note| **note > 127) {
            return Err(Error::ParameterError(format!(
                "engine config 'default_notes' value '{note}' is not a valid MIDI note"
            )));
        }
        for (name, slew) in [
            ("nudge_slew", self.nudge_slew),
            ("brake_slew", self.brake_slew),
            ("reset_slew", self.reset_slew),
        ] {
            if !(slew.rise_ms >= 0.0 && slew.fall_ms >= 0.0) {
                return Err(Error::ParameterError(format!(
                    "engine config '{name}' value '{} / {}' must be positive",
                    slew.rise_ms, slew.fall_ms
                )));
            }
        }
        if !self.nudge_scale.is_finite() || self.nudge_scale < 0.0 {
            return Err(Error::ParameterError(format!(
                "engine config 'nudge_scale' value is '{}'",
                self.nudge_scale
            )));
        }
        if !self.initial_bpm.is_finite() || self.initial_bpm <= 0.0 {
            return Err(Error::ParameterError(format!(
                "engine config 'initial_bpm' value is '{}'",
                self.initial_bpm
            )));
        }
        if self.message_queue_size == 0 {
            return Err(Error::ParameterError(
                "engine config 'message_queue_size' must not be 0".to_string(),
            ));
        }
        if self.output_event_capacity < Self::GENERATED_EVENT_HEADROOM {
            return Err(Error::ParameterError(format!(
                "engine config 'output_event_capacity' must be at least {}, got '{}'",
                Self::GENERATED_EVENT_HEADROOM,
                self.output_event_capacity
            )));
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_notes[0], 60);
        assert_eq!(config.default_notes[15], 75);
    }

    #[test]
    fn invalid_options() {
        assert!(matches!(
            EngineConfig::default().sample_rate(0).validate(),
            Err(Error::InvalidSampleRate(0))
        ));
        assert!(EngineConfig::default()
            .max_block_frames(0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .nudge_slew(f32::NAN, 10.0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .brake_slew(10.0, -1.0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .initial_bpm(0.0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .nudge_scale(f64::INFINITY)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .output_event_capacity(EngineConfig::GENERATED_EVENT_HEADROOM - 1)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .output_event_capacity(EngineConfig::GENERATED_EVENT_HEADROOM)
            .validate()
            .is_ok());
        assert!(EngineConfig::default()
            .default_notes([128; MAX_THRESHOLDS])
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .message_queue_size(0)
            .validate()
            .is_err());
    }
}
