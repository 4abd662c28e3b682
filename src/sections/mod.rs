//! Legacy scoring sections
//!
//! Each section awards points for a single aspect of the password. The
//! legacy score is the capped sum of all sections.

mod length;
mod variety;

pub use length::length_section;
pub use variety::character_variety_section;

/// Points awarded by a single section.
pub type SectionScore = u32;
