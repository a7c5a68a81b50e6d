//! Note generation: per threshold channel state machines, overlap policies and held notes.

mod engine;
mod overlap;
mod pool;

pub use engine::{ChannelState, NoteBlock, NoteEngine};
pub use overlap::OverlapMode;
pub use pool::{HeldNotePool, HeldNoteSlot, HELD_NOTE_SLOTS};
