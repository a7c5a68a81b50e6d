use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use four_cc::FourCC;

use crate::{
    display::DisplayLevels,
    parameter::{Parameter, ParameterRegistry, SharedParameters},
    wheel::ThresholdSet,
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Messages which get sent from control threads to a running [`WheelEngine`](crate::WheelEngine).
/// They are applied at the start of the engine's next processing block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineMessage {
    /// Send note-offs on all channels and turn all channels off.
    FlushNotes,
    /// Reset all wheel phases and gate envelopes, flushing all notes.
    ResetPhases,
    /// Release all held notes, without sending any MIDI events.
    ClearHeldNotes,
    /// Use the given threshold markers, or evenly spaced markers when None.
    SetThresholds(Option<ThresholdSet>),
}

// -------------------------------------------------------------------------------------------------

/// A handle to control a [`WheelEngine`](crate::WheelEngine) from non real-time threads.
///
/// Handles are cheap to clone. Parameter changes and messages get picked up by the engine at
/// the start of its next processing block.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    parameters: Arc<SharedParameters>,
    message_queue: Arc<ArrayQueue<EngineMessage>>,
    display: Arc<DisplayLevels>,
}

impl EngineHandle {
    pub(crate) fn new(
        parameters: Arc<SharedParameters>,
        message_queue: Arc<ArrayQueue<EngineMessage>>,
        display: Arc<DisplayLevels>,
    ) -> Self {
        Self {
            parameters,
            message_queue,
            display,
        }
    }

    /// Access to the engine's shared parameter values.
    pub fn shared_parameters(&self) -> &SharedParameters {
        &self.parameters
    }

    /// Set a plain parameter value. The value gets clamped into the parameter's range.
    pub fn set_parameter(&self, id: FourCC, value: f32) -> Result<(), Error> {
        self.parameters.set(id, value).inspect_err(|err| {
            log::warn!("Failed to set parameter value: {err}");
        })
    }

    /// Set a normalized parameter value in range \[0, 1\].
    pub fn set_parameter_normalized(&self, id: FourCC, normalized: f32) -> Result<(), Error> {
        self.parameters
            .set_normalized(id, normalized)
            .inspect_err(|err| {
                log::warn!("Failed to set normalized parameter value: {err}");
            })
    }

    /// Set multiple plain parameter values at once. The engine applies all of them in the
    /// same processing block.
    pub fn set_parameters(&self, values: &[(FourCC, f32)]) -> Result<(), Error> {
        self.parameters.set_many(values).inspect_err(|err| {
            log::warn!("Failed to set parameter values: {err}");
        })
    }

    /// Reset all parameters to their default values.
    pub fn reset_parameters(&self) {
        self.parameters.reset_to_defaults();
    }

    /// Smoothed levels of the engine, for display purposes.
    pub fn display(&self) -> &DisplayLevels {
        &self.display
    }

    /// Send a message to the engine.
    pub fn send(&self, message: EngineMessage) -> Result<(), Error> {
        self.message_queue
            .push(message)
            .map_err(Self::message_queue_error)
    }

    /// Send note-offs on all channels with the next processing block.
    pub fn flush_notes(&self) -> Result<(), Error> {
        self.send(EngineMessage::FlushNotes)
    }

    /// Reset all wheel phases with the next processing block.
    pub fn reset_phases(&self) -> Result<(), Error> {
        self.send(EngineMessage::ResetPhases)
    }

    /// Release all captured held notes with the next processing block.
    pub fn clear_held_notes(&self) -> Result<(), Error> {
        self.send(EngineMessage::ClearHeldNotes)
    }

    /// Change threshold marker positions. Pass None to lay out markers evenly.
    pub fn set_thresholds(&self, thresholds: Option<ThresholdSet>) -> Result<(), Error> {
        self.send(EngineMessage::SetThresholds(thresholds))
    }

    fn message_queue_error(message: EngineMessage) -> Error {
        log::warn!("Engine message queue is full. Failed to send a {message:?} message.");
        log::warn!("Increase the engine's message queue size to prevent this from happening...");
        Error::SendError("Engine message queue is full".to_string())
    }
}

impl ParameterRegistry for EngineHandle {
    fn parameters(&self) -> &[&'static dyn Parameter] {
        self.parameters.parameters()
    }

    fn get(&self, id: FourCC) -> Option<f32> {
        self.parameters.get(id)
    }
}

// -------------------------------------------------------------------------------------------------
