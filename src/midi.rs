//! MIDI event types and a fixed capacity, real-time safe MIDI event buffer.

// -------------------------------------------------------------------------------------------------

/// Controller number of the "brightness" CC, which carries the threshold weights.
pub const BRIGHTNESS_CC: u8 = 74;

// -------------------------------------------------------------------------------------------------

/// A channel voice message as consumed and produced by the engine.
///
/// Messages which the engine doesn't interpret are kept as raw bytes in [`MidiMessage::Other`],
/// so they can be passed through unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    ControlChange { controller: u8, value: u8 },
    ChannelPressure { value: u8 },
    Other { bytes: [u8; 3], len: u8 },
}

/// A MIDI message with its destination channel (1..=16) and sample offset within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub offset: u32,
    pub channel: u8,
    pub message: MidiMessage,
}

impl MidiEvent {
    /// Create a new event at the given offset. The channel gets clamped into range 1..=16.
    pub fn new(offset: u32, channel: u8, message: MidiMessage) -> Self {
        Self {
            offset,
            channel: channel.clamp(1, 16),
            message,
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(
            0,
            channel,
            MidiMessage::NoteOn {
                note: note.min(127),
                velocity: velocity.min(127),
            },
        )
    }

    pub fn note_off(channel: u8, note: u8) -> Self {
        Self::new(
            0,
            channel,
            MidiMessage::NoteOff {
                note: note.min(127),
                velocity: 0,
            },
        )
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(
            0,
            channel,
            MidiMessage::ControlChange {
                controller: controller.min(127),
                value: value.min(127),
            },
        )
    }

    pub fn channel_pressure(channel: u8, value: u8) -> Self {
        Self::new(
            0,
            channel,
            MidiMessage::ChannelPressure {
                value: value.min(127),
            },
        )
    }

    /// Parse a raw MIDI message. Note-ons with velocity 0 are treated as note-offs. Returns
    /// `None` for empty, system or malformed messages.
    pub fn from_bytes(offset: u32, bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;
        if !(0x80..0xF0).contains(&status) {
            return None;
        }
        let channel = (status & 0x0F) + 1;
        let data = |index: usize| bytes.get(index).map(|b| b & 0x7F);
        let message = match status & 0xF0 {
            0x90 => {
                let (note, velocity) = (data(1)?, data(2)?);
                if velocity == 0 {
                    MidiMessage::NoteOff { note, velocity }
                } else {
                    MidiMessage::NoteOn { note, velocity }
                }
            }
            0x80 => MidiMessage::NoteOff {
                note: data(1)?,
                velocity: data(2)?,
            },
            0xB0 => MidiMessage::ControlChange {
                controller: data(1)?,
                value: data(2)?,
            },
            0xD0 => MidiMessage::ChannelPressure { value: data(1)? },
            0xC0 => MidiMessage::Other {
                bytes: [status, data(1)?, 0],
                len: 2,
            },
            _ => MidiMessage::Other {
                bytes: [status, data(1)?, data(2)?],
                len: 3,
            },
        };
        Some(Self {
            offset,
            channel,
            message,
        })
    }

    /// Convert the event to raw MIDI bytes. Returns the bytes and the number of valid bytes.
    pub fn to_bytes(&self) -> ([u8; 3], usize) {
        let channel = self.channel.clamp(1, 16) - 1;
        match self.message {
            MidiMessage::NoteOn { note, velocity } => ([0x90 | channel, note, velocity], 3),
            MidiMessage::NoteOff { note, velocity } => ([0x80 | channel, note, velocity], 3),
            MidiMessage::ControlChange { controller, value } => {
                ([0xB0 | channel, controller, value], 3)
            }
            MidiMessage::ChannelPressure { value } => ([0xD0 | channel, value, 0], 2),
            MidiMessage::Other { bytes, len } => (bytes, len as usize),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// A MIDI event list with a fixed capacity, which never reallocates after construction.
///
/// Pushing into a full buffer drops the event and counts the drop, so the buffer can be used
/// in real-time threads.
#[derive(Debug, Clone)]
pub struct MidiBuffer {
    events: Vec<MidiEvent>,
    dropped: usize,
}

impl MidiBuffer {
    /// Create a new empty buffer which can hold up to `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            dropped: 0,
        }
    }

    /// Maximum number of events the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events that got dropped since the last `clear`, because the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Append an event. Returns false and drops the event when the buffer is full.
    #[inline]
    pub fn push(&mut self, event: MidiEvent) -> bool {
        self.push_with_headroom(event, 0)
    }

    /// Append an event, keeping at least `headroom` slots free for other events. Returns false
    /// and drops the event when there's not enough space left.
    #[inline]
    pub fn push_with_headroom(&mut self, event: MidiEvent, headroom: usize) -> bool {
        if self.events.len() + headroom < self.events.capacity() {
            self.events.push(event);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Remove all events and reset the drop counter. Keeps the allocated capacity.
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MidiEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[MidiEvent] {
        &self.events
    }
}

impl<'a> IntoIterator for &'a MidiBuffer {
    type Item = &'a MidiEvent;
    type IntoIter = std::slice::Iter<'a, MidiEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

// -------------------------------------------------------------------------------------------------
