//! Common, shared DSP tools for the wheel engine.

pub mod envelope;
