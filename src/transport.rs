//! Host transport state, as passed to the engine for each processing block.

// -------------------------------------------------------------------------------------------------

/// Host transport information for a single processing block.
///
/// All fields are optional: hosts may not provide transport info at all, or only partially.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Transport {
    /// Host tempo in beats per minute, when known.
    pub bpm: Option<f64>,
    /// Host play state, when known.
    pub is_playing: Option<bool>,
}

impl Transport {
    /// Transport info with a known tempo and play state.
    pub fn new(bpm: f64, is_playing: bool) -> Self {
        Self {
            bpm: Some(bpm),
            is_playing: Some(is_playing),
        }
    }

    /// Missing transport info. The engine will use its last known values.
    pub fn unknown() -> Self {
        Self::default()
    }
}

// -------------------------------------------------------------------------------------------------

/// Caches the last known, valid host tempo and play state.
#[derive(Debug, Clone, Copy)]
pub struct TempoCache {
    bpm: f64,
    is_playing: bool,
}

impl TempoCache {
    /// Upper limit for accepted host tempos.
    pub const MAX_BPM: f64 = 999.0;

    pub fn new(initial_bpm: f64) -> Self {
        let bpm = if initial_bpm.is_finite() && initial_bpm > 0.0 {
            initial_bpm.min(Self::MAX_BPM)
        } else {
            120.0
        };
        Self {
            bpm,
            is_playing: false,
        }
    }

    /// Apply a new transport state. Missing or invalid values keep the last known values.
    pub fn update(&mut self, transport: &Transport) {
        if let Some(bpm) = transport.bpm {
            if bpm.is_finite() && bpm > 0.0 {
                self.bpm = bpm.min(Self::MAX_BPM);
            }
        }
        if let Some(is_playing) = transport.is_playing {
            self.is_playing = is_playing;
        }
    }

    /// Last known tempo.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Last known play state.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
}

impl Default for TempoCache {
    fn default() -> Self {
        Self::new(120.0)
    }
}

// -------------------------------------------------------------------------------------------------
