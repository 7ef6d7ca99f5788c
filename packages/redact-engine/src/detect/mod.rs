//! Independent detectors. Each produces candidate spans over the normalized
//! text; none of them mutate shared state.

pub mod flagger;
pub mod layout_name;
pub mod patterns;

pub use flagger::{proposals_to_spans, run_flagger};
pub use layout_name::{detect_layout_name, SECTION_HEADINGS};
pub use patterns::{detect_patterns, looks_like_contact};
