use crate::{
    midi::{MidiBuffer, MidiEvent, BRIGHTNESS_CC},
    utils::{lerp, unipolar_to_midi},
    wheel::{ThresholdCrossings, MAX_THRESHOLDS, WHEEL_COUNT},
};

use super::OverlapMode;

// -------------------------------------------------------------------------------------------------

/// Note state of a single threshold channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    #[default]
    Off,
    On(u8),
}

impl ChannelState {
    /// The sounding note number, if any.
    pub fn active_note(&self) -> Option<u8> {
        match self {
            Self::Off => None,
            Self::On(note) => Some(*note),
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Self::On(_))
    }
}

// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct NoteChannel {
    state: ChannelState,
    last_note: u8,
    controller: f32,
}

// -------------------------------------------------------------------------------------------------

/// Everything the [`NoteEngine`] needs to know about a single processing block.
#[derive(Debug, Clone, Copy)]
pub struct NoteBlock {
    /// Threshold crossings of each wheel.
    pub crossings: [ThresholdCrossings; WHEEL_COUNT],
    /// Opacity of each wheel, in range \[0, 1\].
    pub opacities: [f32; WHEEL_COUNT],
    /// Note number each channel should play when triggered.
    pub notes: [i32; MAX_THRESHOLDS],
    /// Number of active thresholds (and thus channels).
    pub threshold_count: usize,
    /// Trigger policy.
    pub overlap_mode: OverlapMode,
    /// Controller interpolation amount, in range \[0, 1\]: 1 applies new values immediately.
    pub slew_amount: f32,
}

// -------------------------------------------------------------------------------------------------

/// Turns the wheels' threshold crossings into per channel MIDI note and controller events.
///
/// Each threshold `i` owns MIDI channel `i + 1` and runs a small state machine: a channel is
/// either off or plays a single note. Changing a playing channel's note always sends the old
/// note's note-off before the new note-on, so notes never get stuck or doubled.
#[derive(Debug, Clone)]
pub struct NoteEngine {
    channels: [NoteChannel; MAX_THRESHOLDS],
    weights: [f32; MAX_THRESHOLDS],
    flushed: bool,
}

impl NoteEngine {
    /// Create a new engine with all channels off. `initial_notes` are the note numbers used in
    /// note-offs of channels which never played a note yet.
    pub fn new(initial_notes: &[u8; MAX_THRESHOLDS]) -> Self {
        let mut channels = [NoteChannel {
            state: ChannelState::Off,
            last_note: 0,
            controller: 0.0,
        }; MAX_THRESHOLDS];
        for (channel, note) in channels.iter_mut().zip(initial_notes) {
            channel.last_note = (*note).min(127);
        }
        Self {
            channels,
            weights: [0.0; MAX_THRESHOLDS],
            flushed: false,
        }
    }

    /// State of the given channel index (0-based).
    pub fn channel_state(&self, index: usize) -> ChannelState {
        self.channels
            .get(index)
            .map_or(ChannelState::Off, |channel| channel.state)
    }

    /// Number of channels which currently play a note.
    pub fn active_channel_count(&self) -> usize {
        self.channels.iter().filter(|c| c.state.is_on()).count()
    }

    /// Combined threshold weights of the last processed block.
    pub fn weights(&self) -> &[f32; MAX_THRESHOLDS] {
        &self.weights
    }

    /// Combined coverage of threshold `index`: each covering wheel adds a third of its opacity.
    pub fn threshold_weight(block: &NoteBlock, index: usize) -> f32 {
        block
            .crossings
            .iter()
            .zip(block.opacities.iter())
            .filter(|(crossings, _)| crossings.is_crossed(index))
            .map(|(_, opacity)| opacity.clamp(0.0, 1.0) / WHEEL_COUNT as f32)
            .sum()
    }

    /// Process a single block: update all channel states and append resulting events.
    pub fn process(&mut self, block: &NoteBlock, output: &mut MidiBuffer) {
        let count = block.threshold_count.min(MAX_THRESHOLDS);
        if count == 0 {
            self.weights = [0.0; MAX_THRESHOLDS];
            if !self.flushed {
                self.flush_notes(output);
            }
            return;
        }
        self.flushed = false;

        let slew_amount = if block.slew_amount.is_nan() {
            1.0
        } else {
            block.slew_amount.clamp(0.0, 1.0)
        };
        for index in 0..MAX_THRESHOLDS {
            let midi_channel = index as u8 + 1;
            let channel = &mut self.channels[index];
            if index >= count {
                self.weights[index] = 0.0;
                if let ChannelState::On(note) = channel.state {
                    if output.push(MidiEvent::note_off(midi_channel, note)) {
                        channel.state = ChannelState::Off;
                    }
                }
                continue;
            }

            let weight = Self::threshold_weight(block, index);
            self.weights[index] = weight;
            let [a, b, c] = block.crossings;
            let triggered = block.overlap_mode.triggers(
                a.is_crossed(index),
                b.is_crossed(index),
                c.is_crossed(index),
            );

            if triggered {
                let note = block.notes[index].clamp(0, 127) as u8;
                let velocity = unipolar_to_midi(weight);
                let target = unipolar_to_midi(weight) as f32;
                let controller = lerp(channel.controller, target, slew_amount);
                // states only change with delivered events: dropped events get retried
                if let ChannelState::On(active) = channel.state {
                    if active != note && output.push(MidiEvent::note_off(midi_channel, active)) {
                        channel.state = ChannelState::Off;
                    }
                }
                if channel.state == ChannelState::Off
                    && output.push(MidiEvent::note_on(midi_channel, note, velocity))
                {
                    channel.state = ChannelState::On(note);
                    channel.last_note = note;
                }
                let value = unipolar_to_midi(controller / 127.0);
                output.push(MidiEvent::control_change(midi_channel, BRIGHTNESS_CC, value));
                output.push(MidiEvent::channel_pressure(midi_channel, value));
                channel.controller = controller;
            } else if let ChannelState::On(active) = channel.state {
                if output.push(MidiEvent::note_off(midi_channel, active)) {
                    channel.state = ChannelState::Off;
                }
            }
        }
    }

    /// Unconditionally send note-offs on all channels and reset all channels to off.
    ///
    /// Playing channels whose note-off did not fit into `output` keep playing, so their
    /// note-off gets sent with one of the next blocks.
    pub fn flush_notes(&mut self, output: &mut MidiBuffer) {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            let note = channel.state.active_note().unwrap_or(channel.last_note);
            if output.push(MidiEvent::note_off(index as u8 + 1, note)) {
                channel.state = ChannelState::Off;
            }
            channel.controller = 0.0;
        }
        self.flushed = self.active_channel_count() == 0;
    }
}

// -------------------------------------------------------------------------------------------------
