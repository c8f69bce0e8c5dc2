//! Core data types shared by the analysis engine and its collaborators.
//!
//! Offsets everywhere in this crate are measured in Unicode scalar values
//! (chars), never bytes. A [`Finding`] is only meaningful relative to the
//! [`TextSnapshot`] whose content it was computed from.

/// Findings, severities and categories.
pub mod finding;
/// Observed surface identity, generations and geometry.
pub mod surface;
/// Immutable text snapshots.
pub mod snapshot;
/// Char-offset text helpers.
pub mod text;

pub use finding::{Category, Finding, Severity};
pub use ropey::Rope;
pub use snapshot::TextSnapshot;
pub use surface::{Generation, SurfaceGeometry, SurfaceId};
pub use text::{CharIdx, CharLen};
