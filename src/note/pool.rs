use crate::midi::{MidiBuffer, MidiEvent, MidiMessage};

// -------------------------------------------------------------------------------------------------

/// Number of slots in a [`HeldNotePool`].
pub const HELD_NOTE_SLOTS: usize = 16;

// -------------------------------------------------------------------------------------------------

/// A single slot of a [`HeldNotePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldNoteSlot {
    pub note: u8,
    pub is_available: bool,
}

impl Default for HeldNoteSlot {
    fn default() -> Self {
        Self {
            note: 0,
            is_available: true,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Captures live played pitches, so they can be triggered by the wheels instead of sounding
/// immediately.
///
/// Note-ons claim the first available slot, note-offs free the slot holding the same pitch.
/// A pitch occupies at most one slot. When all slots are occupied, further note-ons are not
/// captured but passed through, and so are their note-offs.
#[derive(Debug, Clone)]
pub struct HeldNotePool {
    slots: [HeldNoteSlot; HELD_NOTE_SLOTS],
}

impl HeldNotePool {
    pub fn new() -> Self {
        Self {
            slots: [HeldNoteSlot::default(); HELD_NOTE_SLOTS],
        }
    }

    pub fn slots(&self) -> &[HeldNoteSlot; HELD_NOTE_SLOTS] {
        &self.slots
    }

    /// Held pitch of the given slot, if the slot is occupied.
    pub fn note(&self, slot: usize) -> Option<u8> {
        self.slots
            .get(slot)
            .filter(|slot| !slot.is_available)
            .map(|slot| slot.note)
    }

    /// Number of occupied slots.
    pub fn held_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_available).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_available)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_available)
    }

    /// Capture a pitch. Returns true when the pitch is held afterwards, either by claiming a
    /// slot or because it already was held, and false when all slots are occupied.
    pub fn capture(&mut self, note: u8) -> bool {
        if self
            .slots
            .iter()
            .any(|slot| !slot.is_available && slot.note == note)
        {
            return true;
        }
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_available) {
            slot.note = note;
            slot.is_available = false;
            true
        } else {
            false
        }
    }

    /// Release a held pitch. Returns true when a slot held the pitch.
    pub fn release(&mut self, note: u8) -> bool {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|slot| !slot.is_available && slot.note == note)
        {
            *slot = HeldNoteSlot::default();
            true
        } else {
            false
        }
    }

    /// Release all held pitches.
    pub fn clear(&mut self) {
        self.slots = [HeldNoteSlot::default(); HELD_NOTE_SLOTS];
    }

    /// Filter incoming MIDI events: captured note-ons and their matching note-offs are removed,
    /// all other events get copied to `output` unmodified.
    pub fn filter(&mut self, input: &[MidiEvent], output: &mut MidiBuffer) {
        self.filter_with_headroom(input, output, 0);
    }

    /// Like [`Self::filter`], but keeps at least `headroom` slots in `output` free. Events
    /// which don't fit get dropped. Notes still get captured and released.
    pub fn filter_with_headroom(
        &mut self,
        input: &[MidiEvent],
        output: &mut MidiBuffer,
        headroom: usize,
    ) {
        for event in input {
            let consumed = match event.message {
                MidiMessage::NoteOn { note, .. } => self.capture(note),
                MidiMessage::NoteOff { note, .. } => self.release(note),
                _ => false,
            };
            if !consumed {
                output.push_with_headroom(*event, headroom);
            }
        }
    }
}

impl Default for HeldNotePool {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_and_release() {
        let mut pool = HeldNotePool::new();
        let original = *pool.slots();

        let mut output = MidiBuffer::with_capacity(8);
        pool.filter(&[MidiEvent::note_on(1, 60, 100)], &mut output);
        assert!(output.is_empty());
        assert_eq!(pool.note(0), Some(60));
        assert_eq!(pool.held_count(), 1);

        // a pitch occupies at most one slot
        pool.filter(&[MidiEvent::note_on(2, 60, 90)], &mut output);
        assert!(output.is_empty());
        assert_eq!(pool.held_count(), 1);

        pool.filter(&[MidiEvent::note_off(1, 60)], &mut output);
        assert!(output.is_empty());
        assert_eq!(pool.slots(), &original);
        assert!(pool.is_empty());
    }

    #[test]
    fn other_messages_pass_through() {
        let mut pool = HeldNotePool::new();
        let mut output = MidiBuffer::with_capacity(8);
        let input = [
            MidiEvent::control_change(1, 1, 64),
            MidiEvent::note_on(1, 64, 100),
            MidiEvent::note_off(1, 72),
            MidiEvent::channel_pressure(3, 20),
        ];
        pool.filter(&input, &mut output);
        assert_eq!(output.as_slice(), &[input[0], input[2], input[3]]);
    }

    #[test]
    fn first_available_slot_gets_claimed() {
        let mut pool = HeldNotePool::new();
        assert!(pool.capture(60));
        assert!(pool.capture(62));
        assert!(pool.capture(64));
        assert!(pool.release(62));
        assert!(pool.capture(67));
        assert_eq!(pool.note(0), Some(60));
        assert_eq!(pool.note(1), Some(67));
        assert_eq!(pool.note(2), Some(64));
        assert_eq!(pool.note(3), None);
        assert!(!pool.release(99));
        assert_eq!(pool.note(HELD_NOTE_SLOTS), None);
    }

    #[test]
    fn overflowing_notes_pass_through() {
        let mut pool = HeldNotePool::new();
        let mut output = MidiBuffer::with_capacity(64);
        let note_ons = (0..18u8)
            .map(|index| MidiEvent::note_on(1, 40 + index, 100))
            .collect::<Vec<_>>();
        pool.filter(&note_ons, &mut output);
        assert!(pool.is_full());
        assert_eq!(output.as_slice(), &note_ons[16..]);

        // the same input is handled the same way every time
        output.clear();
        pool.filter(&note_ons, &mut output);
        assert_eq!(output.as_slice(), &note_ons[16..]);

        // note-offs of pitches which never got captured pass through too
        output.clear();
        pool.filter(&[MidiEvent::note_off(1, 57)], &mut output);
        assert_eq!(output.as_slice(), &[MidiEvent::note_off(1, 57)]);
        output.clear();
        pool.filter(&[MidiEvent::note_off(1, 40)], &mut output);
        assert!(output.is_empty());
        assert_eq!(pool.held_count(), 15);

        pool.clear();
        assert!(pool.is_empty());
    }
}
