//! Trait abstractions callers implement to plug into the engine.

pub mod flagger;
