use std::ops::Range;

use proofline_primitives::{CharIdx, SurfaceId};

use crate::error::{BackendError, SurfaceError};

/// What a surface supports, probed before every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceCapabilities {
	/// Select a range and replace it in place.
	pub range_replace: bool,
	/// Shared clipboard plus synthetic paste into the surface.
	pub clipboard_paste: bool,
	/// The whole buffer can be read back.
	pub full_read: bool,
	/// Partial-range edits are known to land in the wrong place.
	pub unreliable_ranges: bool,
}

impl SurfaceCapabilities {
	pub const FULL: Self = Self {
		range_replace: true,
		clipboard_paste: true,
		full_read: true,
		unreliable_ranges: false,
	};
}

/// Platform primitives used by mutation strategies.
///
/// Every call may block briefly (input injection, clipboard); they only run
/// on the mutation worker pool.
pub trait MutationBackend: Send + Sync {
	fn capabilities(&self, surface: SurfaceId) -> Result<SurfaceCapabilities, SurfaceError>;

	fn replace_range(&self, surface: SurfaceId, range: Range<CharIdx>, text: &str) -> Result<(), BackendError>;

	fn select_range(&self, surface: SurfaceId, range: Range<CharIdx>) -> Result<(), BackendError>;

	fn select_all(&self, surface: SurfaceId) -> Result<(), BackendError>;

	fn read_text(&self, surface: SurfaceId) -> Result<String, BackendError>;

	fn clipboard(&self) -> Result<Option<String>, BackendError>;

	/// Writes `contents` to the clipboard; `None` clears it.
	fn set_clipboard(&self, contents: Option<&str>) -> Result<(), BackendError>;

	/// Brings the surface to the front so synthetic input reaches it.
	fn activate(&self, surface: SurfaceId) -> Result<(), BackendError>;

	/// Synthesizes a paste into the surface's current selection.
	fn paste(&self, surface: SurfaceId) -> Result<(), BackendError>;
}
