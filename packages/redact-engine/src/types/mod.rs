//! Data types shared across the redaction pipeline.

pub mod kind;
pub mod layout;
pub mod span;
