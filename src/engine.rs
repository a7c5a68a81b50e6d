//! The real-time engine, which turns wheel rotations into MIDI events.

mod config;
pub mod parameters;

pub use config::EngineConfig;

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::{
    display::{DisplayLevels, WheelLevels},
    handle::{EngineHandle, EngineMessage},
    midi::{MidiBuffer, MidiEvent},
    note::{ChannelState, HeldNotePool, NoteBlock, NoteEngine},
    parameter::SharedParameters,
    transport::{TempoCache, Transport},
    utils::dsp::envelope::EnvelopeFilter,
    wheel::{PhaseAccumulator, ThresholdCrossings, ThresholdSet, Wheel, MAX_THRESHOLDS, WHEEL_COUNT},
    Error,
};

use parameters::{ParameterSnapshot, PARAMETERS, PARAMETER_COUNT};

// -------------------------------------------------------------------------------------------------

/// Generates MIDI notes and controllers from three rotating wheels, crossing a shared set of
/// threshold markers.
///
/// The engine is driven by the host's real-time thread via [`Self::process_block`]. All
/// control happens via the [`EngineHandle`] which gets created along with the engine.
/// Processing blocks never allocate, lock or wait.
pub struct WheelEngine {
    sample_rate: u32,
    control_rate: f64,
    default_notes: [u8; MAX_THRESHOLDS],
    output_event_capacity: usize,
    parameters: Arc<SharedParameters>,
    parameter_values: [f32; PARAMETER_COUNT],
    snapshot: ParameterSnapshot,
    message_queue: Arc<ArrayQueue<EngineMessage>>,
    display: Arc<DisplayLevels>,
    tempo: TempoCache,
    wheels: [Wheel; WHEEL_COUNT],
    reset_envelope: EnvelopeFilter,
    reset_gate_open: bool,
    custom_thresholds: Option<ThresholdSet>,
    thresholds: ThresholdSet,
    notes: NoteEngine,
    held_notes: HeldNotePool,
    reported_overflow: bool,
}

impl WheelEngine {
    /// Create a new engine and a handle to control it.
    pub fn new(config: EngineConfig) -> Result<(Self, EngineHandle), Error> {
        config.validate()?;

        let control_rate = config.sample_rate as f64 / config.max_block_frames as f64;
        let wheels = std::array::from_fn(|_| {
            let mut accumulator =
                PhaseAccumulator::new(control_rate).with_nudge_scale(config.nudge_scale);
            accumulator.set_nudge_slew(config.nudge_slew);
            accumulator.set_brake_slew(config.brake_slew);
            Wheel::new(accumulator)
        });
        let reset_envelope = EnvelopeFilter::new(
            control_rate as f32,
            config.reset_slew.rise_ms,
            config.reset_slew.fall_ms,
        );

        let parameters = Arc::new(SharedParameters::new(&PARAMETERS));
        let message_queue = Arc::new(ArrayQueue::new(config.message_queue_size));
        let display = Arc::new(DisplayLevels::new());

        let parameter_values = parameters::default_values();
        let snapshot = ParameterSnapshot::from_values(&parameter_values);
        let thresholds = config
            .thresholds
            .unwrap_or_else(|| ThresholdSet::evenly_spaced(snapshot.threshold_count));

        log::info!(
            "Creating wheel engine with a sample rate of {} Hz and a control rate of {:.2} Hz",
            config.sample_rate,
            control_rate
        );

        let engine = Self {
            sample_rate: config.sample_rate,
            control_rate,
            default_notes: config.default_notes,
            output_event_capacity: config.output_event_capacity,
            parameters: Arc::clone(&parameters),
            parameter_values,
            snapshot,
            message_queue: Arc::clone(&message_queue),
            display: Arc::clone(&display),
            tempo: TempoCache::new(config.initial_bpm),
            wheels,
            reset_envelope,
            reset_gate_open: false,
            custom_thresholds: config.thresholds,
            thresholds,
            notes: NoteEngine::new(&config.default_notes),
            held_notes: HeldNotePool::new(),
            reported_overflow: false,
        };
        let handle = EngineHandle::new(parameters, message_queue, display);
        Ok((engine, handle))
    }

    /// The host's audio sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Rate of the last processed blocks in blocks per second.
    pub fn control_rate(&self) -> f64 {
        self.control_rate
    }

    /// Create a new, empty output buffer with the configured event capacity.
    pub fn new_output_buffer(&self) -> MidiBuffer {
        MidiBuffer::with_capacity(self.output_event_capacity)
    }

    /// Parameter values which got applied in the last processed block.
    pub fn snapshot(&self) -> &ParameterSnapshot {
        &self.snapshot
    }

    /// Currently used threshold markers.
    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Access to the wheel with the given index.
    pub fn wheel(&self, index: usize) -> Option<&Wheel> {
        self.wheels.get(index)
    }

    /// Currently captured held notes.
    pub fn held_notes(&self) -> &HeldNotePool {
        &self.held_notes
    }

    /// Note state of the given channel index (0-based).
    pub fn channel_state(&self, index: usize) -> ChannelState {
        self.notes.channel_state(index)
    }

    /// Process a single block of `frames` sample frames.
    ///
    /// Incoming MIDI `input` events get filtered by the held note pool or passed through, then
    /// all generated note and controller events are appended to `output`. Generated events
    /// are stamped at offset 0, passed through events keep their offsets. When `output` is
    /// full, further events get dropped. Passed through events never use the last
    /// [`EngineConfig::GENERATED_EVENT_HEADROOM`] slots of `output`, and note state changes
    /// whose events got dropped are retried in the next blocks.
    pub fn process_block(
        &mut self,
        frames: usize,
        transport: &Transport,
        input: &[MidiEvent],
        output: &mut MidiBuffer,
    ) {
        Self::assert_no_alloc(|| self.process(frames, transport, input, output));
    }

    fn process(
        &mut self,
        frames: usize,
        transport: &Transport,
        input: &[MidiEvent],
        output: &mut MidiBuffer,
    ) {
        let dropped_events = output.dropped();

        self.update_control_rate(frames);
        self.tempo.update(transport);
        self.handle_messages(output);
        self.update_parameters();

        // reset gate
        self.reset_envelope.trigger(self.snapshot.reset_gate);
        let reset_level = self.reset_envelope.generate();
        let reset_gate_open = self.snapshot.reset_gate >= 0.5;
        if reset_gate_open && !self.reset_gate_open {
            Self::permit_alloc(|| log::debug!("Reset gate opened: resetting wheels"));
            self.reset_wheels(output);
        }
        self.reset_gate_open = reset_gate_open;

        // held notes
        let headroom = EngineConfig::GENERATED_EVENT_HEADROOM;
        if self.snapshot.hold {
            self.held_notes.filter_with_headroom(input, output, headroom);
        } else {
            for event in input {
                output.push_with_headroom(*event, headroom);
            }
        }

        // wheels
        let threshold_count = self.snapshot.threshold_count.min(self.thresholds.len());
        let bpm = self.tempo.bpm();
        let mut crossings = [ThresholdCrossings::NONE; WHEEL_COUNT];
        for (index, wheel) in self.wheels.iter_mut().enumerate() {
            wheel.apply(&self.snapshot.wheels[index], bpm);
            crossings[index] = wheel.process(&self.thresholds, threshold_count);
        }

        // notes
        let block = NoteBlock {
            crossings,
            opacities: std::array::from_fn(|index| self.wheels[index].opacity()),
            notes: std::array::from_fn(|index| self.channel_note(index) as i32),
            threshold_count,
            overlap_mode: self.snapshot.overlap_mode,
            slew_amount: self.snapshot.slew_amount,
        };
        self.notes.process(&block, output);

        // display
        for (index, wheel) in self.wheels.iter().enumerate() {
            let accumulator = wheel.accumulator();
            self.display.publish_wheel(
                index,
                WheelLevels {
                    phase: wheel.display_phase() as f32,
                    nudge_forward: accumulator.nudge_forward_level(),
                    nudge_backward: accumulator.nudge_backward_level(),
                    brake: accumulator.brake_level(),
                },
            );
        }
        self.display.publish_reset(reset_level);
        self.display.publish_weights(self.notes.weights());

        if output.dropped() > dropped_events {
            if !self.reported_overflow {
                self.reported_overflow = true;
                let capacity = output.capacity();
                Self::permit_alloc(|| {
                    log::warn!(
                        "MIDI output buffer with a capacity of {capacity} events is full. Dropped events."
                    )
                });
            }
        } else {
            self.reported_overflow = false;
        }
    }

    /// Note number of the given channel: the held note of the channel's slot when holding
    /// notes, else the channel's default note.
    fn channel_note(&self, index: usize) -> u8 {
        if self.snapshot.hold {
            if let Some(note) = self.held_notes.note(index) {
                return note;
            }
        }
        self.default_notes[index]
    }

    fn update_control_rate(&mut self, frames: usize) {
        let control_rate = self.sample_rate as f64 / frames.max(1) as f64;
        if control_rate != self.control_rate {
            self.control_rate = control_rate;
            for wheel in &mut self.wheels {
                wheel.accumulator_mut().set_control_rate(control_rate);
            }
            self.reset_envelope.set_sample_rate(control_rate as f32);
        }
    }

    fn update_parameters(&mut self) {
        // loading registers the thread once and may free a replaced value list
        let (parameters, values) = (&self.parameters, &mut self.parameter_values);
        Self::permit_alloc(|| parameters.read_into(values));
        self.snapshot = ParameterSnapshot::from_values(&self.parameter_values);
        if self.custom_thresholds.is_none() && self.thresholds.len() != self.snapshot.threshold_count
        {
            self.thresholds = ThresholdSet::evenly_spaced(self.snapshot.threshold_count);
        }
    }

    fn handle_messages(&mut self, output: &mut MidiBuffer) {
        while let Some(message) = self.message_queue.pop() {
            match message {
                EngineMessage::FlushNotes => {
                    Self::permit_alloc(|| log::debug!("Flushing notes"));
                    self.notes.flush_notes(output);
                }
                EngineMessage::ResetPhases => {
                    Self::permit_alloc(|| log::debug!("Resetting wheels"));
                    self.reset_wheels(output);
                }
                EngineMessage::ClearHeldNotes => {
                    self.held_notes.clear();
                }
                EngineMessage::SetThresholds(thresholds) => {
                    self.custom_thresholds = thresholds;
                    self.thresholds = thresholds.unwrap_or_else(|| {
                        ThresholdSet::evenly_spaced(self.snapshot.threshold_count)
                    });
                }
            }
        }
    }

    fn reset_wheels(&mut self, output: &mut MidiBuffer) {
        for wheel in &mut self.wheels {
            wheel.reset();
        }
        self.notes.flush_notes(output);
    }

    fn assert_no_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::assert_no_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }

    #[inline]
    fn permit_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::permit_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use four_cc::FourCC;

    use super::*;
    use crate::{
        midi::MidiMessage,
        parameter::{Parameter, ParameterRegistry},
        utils::assert_eq_with_epsilon,
    };
    use super::parameters::{
        CC_SLEW, HOLD, RESET, THRESHOLD_COUNT, WHEEL_PHASE, WHEEL_RATE, WHEEL_SYNC,
    };

    const FRAMES: usize = 10;

    // 1000 Hz at 10 frames per block: a control rate of 100 Hz
    fn engine() -> (WheelEngine, EngineHandle) {
        let config = EngineConfig::default()
            .sample_rate(1000)
            .max_block_frames(FRAMES);
        let (engine, handle) = WheelEngine::new(config).unwrap();
        // wheel A at 1 Hz, B and C stand still on the opposite half
        handle
            .set_parameters(&[
                (THRESHOLD_COUNT.id(), 4.0),
                (WHEEL_RATE[0].id(), 1.0),
                (WHEEL_RATE[1].id(), 0.0),
                (WHEEL_RATE[2].id(), 0.0),
                (WHEEL_PHASE[1].id(), 50.0),
                (WHEEL_PHASE[2].id(), 50.0),
            ])
            .unwrap();
        (engine, handle)
    }

    fn note_ons(output: &MidiBuffer) -> Vec<(u8, u8, u8)> {
        output
            .iter()
            .filter_map(|e| match e.message {
                MidiMessage::NoteOn { note, velocity } => Some((e.channel, note, velocity)),
                _ => None,
            })
            .collect()
    }

    fn note_off_count(output: &MidiBuffer) -> usize {
        output
            .iter()
            .filter(|e| matches!(e.message, MidiMessage::NoteOff { .. }))
            .count()
    }

    #[test]
    fn invalid_config() {
        assert!(WheelEngine::new(EngineConfig::default().sample_rate(0)).is_err());
    }

    #[test]
    fn crossings_generate_notes() {
        let (mut engine, handle) = engine();
        let mut output = engine.new_output_buffer();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);

        assert_eq!(engine.thresholds().as_slice(), &[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(engine.control_rate(), 100.0);
        let wheel = engine.wheel(0).unwrap();
        assert_eq_with_epsilon!(wheel.accumulator().phase(), 0.01, 1e-9);

        // wheel A covers thresholds 1 and 2 with a weight of 1/3
        assert_eq!(note_ons(&output), vec![(2, 61, 42), (3, 62, 42)]);
        assert_eq!(note_off_count(&output), 0);
        assert!(output.iter().all(|e| e.offset == 0));
        assert_eq!(engine.channel_state(1), ChannelState::On(61));
        assert_eq!(engine.channel_state(0), ChannelState::Off);
        assert_eq_with_epsilon!(handle.display().weight(0), 2.0 / 3.0, 1e-6);
        assert_eq_with_epsilon!(handle.display().weight(1), 1.0 / 3.0, 1e-6);
        assert_eq_with_epsilon!(
            handle.display().wheel(1).unwrap().phase,
            0.5,
            1e-6
        );

        // sustained notes don't retrigger
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert!(note_ons(&output).is_empty());
        assert_eq!(note_off_count(&output), 0);

        // after a quarter revolution, wheel A leaves threshold 1 and reaches threshold 3
        output.clear();
        for _ in 0..25 {
            engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        }
        assert_eq!(engine.channel_state(1), ChannelState::Off);
        assert_eq!(engine.channel_state(2), ChannelState::On(62));
        assert_eq!(engine.channel_state(3), ChannelState::On(63));
    }

    #[test]
    fn synced_rates_follow_transport() {
        let (mut engine, handle) = engine();
        handle.set_parameter(WHEEL_SYNC[0].id(), 1.0).unwrap();
        let mut output = engine.new_output_buffer();
        // 1x at 120 bpm: 2 Hz
        engine.process_block(FRAMES, &Transport::new(120.0, true), &[], &mut output);
        assert_eq_with_epsilon!(engine.wheel(0).unwrap().accumulator().phase(), 0.02, 1e-9);
        // missing tempo keeps the last known one
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq_with_epsilon!(engine.wheel(0).unwrap().accumulator().phase(), 0.04, 1e-9);
        // the block size defines the control rate
        engine.process_block(2 * FRAMES, &Transport::new(60.0, true), &[], &mut output);
        assert_eq!(engine.control_rate(), 50.0);
        assert_eq_with_epsilon!(engine.wheel(0).unwrap().accumulator().phase(), 0.06, 1e-9);
    }

    #[test]
    fn held_notes_replace_default_notes() {
        let (mut engine, handle) = engine();
        handle.set_parameter(HOLD.id(), 1.0).unwrap();
        let input = [
            MidiEvent::note_on(1, 72, 100),
            MidiEvent::note_on(1, 74, 100),
            MidiEvent::control_change(1, 1, 10),
        ];
        let mut output = engine.new_output_buffer();
        engine.process_block(FRAMES, &Transport::unknown(), &input, &mut output);
        assert_eq!(engine.held_notes().held_count(), 2);
        assert_eq!(note_ons(&output), vec![(2, 74, 42), (3, 62, 42)]);
        assert_eq!(output.as_slice()[0], input[2]);

        // releasing the held note switches back to the default note
        output.clear();
        engine.process_block(
            FRAMES,
            &Transport::unknown(),
            &[MidiEvent::note_off(1, 74)],
            &mut output,
        );
        assert_eq!(note_ons(&output), vec![(2, 61, 42)]);
        assert_eq!(note_off_count(&output), 1);

        // without hold all input passes through
        handle.set_parameter(HOLD.id(), 0.0).unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &input, &mut output);
        assert_eq!(&output.as_slice()[..3], &input);
        assert_eq!(engine.held_notes().held_count(), 1);

        handle.clear_held_notes().unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert!(engine.held_notes().is_empty());
    }

    #[test]
    fn reset_gate_resets_wheels() {
        let (mut engine, handle) = engine();
        let mut output = engine.new_output_buffer();
        for _ in 0..10 {
            engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        }
        assert_eq_with_epsilon!(engine.wheel(0).unwrap().accumulator().phase(), 0.1, 1e-9);

        handle.set_parameter(RESET.id(), 1.0).unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq_with_epsilon!(engine.wheel(0).unwrap().accumulator().phase(), 0.01, 1e-9);
        assert_eq!(note_off_count(&output), MAX_THRESHOLDS);
        assert_eq!(note_ons(&output).len(), 2);
        assert!(handle.display().reset() > 0.0);

        // holding the gate open does not reset again
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq!(note_off_count(&output), 0);
        assert_eq_with_epsilon!(engine.wheel(0).unwrap().accumulator().phase(), 0.02, 1e-9);
    }

    #[test]
    fn messages() {
        let (mut engine, handle) = engine();
        let mut output = engine.new_output_buffer();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);

        handle.flush_notes().unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq!(note_off_count(&output), MAX_THRESHOLDS);
        // flushed notes retrigger when still covered
        assert_eq!(note_ons(&output).len(), 2);

        // no thresholds: flush once, then stay silent
        handle.set_thresholds(Some(ThresholdSet::empty())).unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq!(note_off_count(&output), MAX_THRESHOLDS);
        assert!(note_ons(&output).is_empty());
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert!(output.is_empty());

        // back to evenly spaced markers, following the threshold count
        handle.set_thresholds(None).unwrap();
        handle.set_parameter(THRESHOLD_COUNT.id(), 2.0).unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq!(engine.thresholds().as_slice(), &[0.0, 0.5]);
        assert_eq!(note_ons(&output), vec![(2, 61, 42)]);

        handle.reset_phases().unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq!(note_off_count(&output), MAX_THRESHOLDS);
    }

    #[test]
    fn controller_slew() {
        let (mut engine, handle) = engine();
        handle.set_parameter(CC_SLEW.id(), 50.0).unwrap();
        assert_eq!(handle.get(CC_SLEW.id()), Some(50.0));
        let mut output = engine.new_output_buffer();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        let pressure = output
            .iter()
            .find_map(|e| match e.message {
                MidiMessage::ChannelPressure { value } if e.channel == 2 => Some(value),
                _ => None,
            })
            .unwrap();
        assert_eq!(pressure, 21);
    }

    #[test]
    fn full_output_buffers_drop_events() {
        let (mut engine, _handle) = engine();
        let mut output = MidiBuffer::with_capacity(2);
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq!(output.len(), output.capacity());
        assert!(output.dropped() > 0);
    }

    #[test]
    fn dense_input_keeps_room_for_notes() {
        let (mut engine, _handle) = engine();
        let input = vec![MidiEvent::control_change(1, 1, 0); 300];
        let mut output = engine.new_output_buffer();
        let mut note_offs = Vec::new();
        for _ in 0..30 {
            output.clear();
            engine.process_block(FRAMES, &Transport::unknown(), &input, &mut output);
            assert!(output.dropped() > 0);
            let passed_through = output.iter().filter(|e| *e == &input[0]).count();
            assert_eq!(
                passed_through,
                output.capacity() - EngineConfig::GENERATED_EVENT_HEADROOM
            );
            note_offs.extend(output.iter().filter_map(|e| match e.message {
                MidiMessage::NoteOff { note, .. } => Some((e.channel, note)),
                _ => None,
            }));
        }
        // wheel A left threshold 1 after a quarter revolution
        assert_eq!(engine.channel_state(1), ChannelState::Off);
        assert_eq!(note_offs, vec![(2, 61)]);
    }

    #[test]
    fn passed_through_events_keep_offsets() {
        let (mut engine, _handle) = engine();
        let input = [MidiEvent::new(
            37,
            5,
            MidiMessage::ControlChange {
                controller: 1,
                value: 64,
            },
        )];
        let mut output = engine.new_output_buffer();
        engine.process_block(FRAMES, &Transport::unknown(), &input, &mut output);
        assert_eq!(output.as_slice()[0], input[0]);
        assert_eq!(output.as_slice()[0].offset, 37);
        assert!(output.iter().skip(1).all(|e| e.offset == 0));
        assert_eq!(note_ons(&output).len(), 2);
    }

    #[test]
    fn flushes_keep_held_notes() {
        let (mut engine, handle) = engine();
        handle.set_parameter(HOLD.id(), 1.0).unwrap();
        let mut output = engine.new_output_buffer();
        engine.process_block(
            FRAMES,
            &Transport::unknown(),
            &[MidiEvent::note_on(1, 72, 100)],
            &mut output,
        );
        assert_eq!(engine.held_notes().note(0), Some(72));

        handle.flush_notes().unwrap();
        handle.reset_phases().unwrap();
        output.clear();
        engine.process_block(FRAMES, &Transport::unknown(), &[], &mut output);
        assert_eq!(note_off_count(&output), 2 * MAX_THRESHOLDS);
        assert_eq!(engine.held_notes().note(0), Some(72));
    }

    #[test]
    fn unknown_parameters() {
        let (_engine, handle) = engine();
        assert!(handle.set_parameter(FourCC(*b"????"), 1.0).is_err());
        assert_eq!(handle.parameters().len(), PARAMETER_COUNT);
    }
}
