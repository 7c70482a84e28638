//! Scripted, time-driven animation sequences.
//!
//! A sequence takes over the scene for its duration: it owns a private set
//! of instances, advances a local clock and applies declarative phases to
//! them each tick.

pub mod curve;
pub mod phase;
pub mod sequence;
mod sequencer;

pub use curve::PathCurve;
pub use phase::{Effect, Phase, TimeWindow};
pub use sequence::{InstanceDef, SequenceDef, SequenceInstance, builtin_sequences};
pub use sequencer::{AnimationSequencer, SequenceStatus, SequencerState};
