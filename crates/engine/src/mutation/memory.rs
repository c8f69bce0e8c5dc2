use std::ops::Range;

use parking_lot::Mutex;
use proofline_primitives::text::{char_len, replace_chars};
use proofline_primitives::{CharIdx, SurfaceGeometry, SurfaceId};
use rustc_hash::{FxHashMap, FxHashSet};

use super::backend::{MutationBackend, SurfaceCapabilities};
use crate::error::{BackendError, SurfaceError};
use crate::presentation::GeometryProbe;

#[derive(Debug)]
struct MemorySurface {
	text: String,
	selection: Option<Range<CharIdx>>,
	caps: SurfaceCapabilities,
	geometry: Option<SurfaceGeometry>,
	available: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
	surfaces: FxHashMap<SurfaceId, MemorySurface>,
	clipboard: Option<String>,
	failing: FxHashSet<&'static str>,
	ops: Vec<&'static str>,
}

/// In-process surfaces with a shared clipboard.
///
/// Backs the command line tool and every test that needs a live surface.
/// Operations can be made to fail by name with [`MemoryBackend::fail_on`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
	state: Mutex<MemoryState>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_surface(&self, surface: SurfaceId, text: &str, caps: SurfaceCapabilities) {
		self.state.lock().surfaces.insert(
			surface,
			MemorySurface {
				text: text.to_string(),
				selection: None,
				caps,
				geometry: None,
				available: true,
			},
		);
	}

	pub fn text(&self, surface: SurfaceId) -> Option<String> {
		self.state.lock().surfaces.get(&surface).map(|s| s.text.clone())
	}

	pub fn set_text(&self, surface: SurfaceId, text: &str) {
		if let Some(s) = self.state.lock().surfaces.get_mut(&surface) {
			s.text = text.to_string();
			s.selection = None;
		}
	}

	pub fn set_geometry(&self, surface: SurfaceId, geometry: SurfaceGeometry) {
		if let Some(s) = self.state.lock().surfaces.get_mut(&surface) {
			s.geometry = Some(geometry);
		}
	}

	pub fn set_available(&self, surface: SurfaceId, available: bool) {
		if let Some(s) = self.state.lock().surfaces.get_mut(&surface) {
			s.available = available;
		}
	}

	/// Makes every later call of the named operation fail.
	pub fn fail_on(&self, op: &'static str) {
		self.state.lock().failing.insert(op);
	}

	pub fn clipboard_contents(&self) -> Option<String> {
		self.state.lock().clipboard.clone()
	}

	/// Operations called so far, in order.
	pub fn ops(&self) -> Vec<&'static str> {
		self.state.lock().ops.clone()
	}

	fn with_surface<R>(
		&self,
		op: &'static str,
		surface: SurfaceId,
		f: impl FnOnce(&mut MemorySurface, &mut Option<String>) -> Result<R, BackendError>,
	) -> Result<R, BackendError> {
		let mut state = self.state.lock();
		state.ops.push(op);
		if state.failing.contains(op) {
			return Err(BackendError::Rejected {
				op,
				reason: "injected failure".into(),
			});
		}
		let MemoryState { surfaces, clipboard, .. } = &mut *state;
		let target = surfaces
			.get_mut(&surface)
			.filter(|s| s.available)
			.ok_or(SurfaceError::Unavailable(surface))?;
		f(target, clipboard)
	}

	fn with_clipboard<R>(&self, op: &'static str, f: impl FnOnce(&mut Option<String>) -> R) -> Result<R, BackendError> {
		let mut state = self.state.lock();
		state.ops.push(op);
		if state.failing.contains(op) {
			return Err(BackendError::Clipboard("injected failure".into()));
		}
		Ok(f(&mut state.clipboard))
	}
}

fn splice(text: &mut String, range: Range<CharIdx>, replacement: &str, op: &'static str) -> Result<(), BackendError> {
	*text = replace_chars(text, range, replacement).ok_or(BackendError::Rejected {
		op,
		reason: "range outside buffer".into(),
	})?;
	Ok(())
}

impl MutationBackend for MemoryBackend {
	fn capabilities(&self, surface: SurfaceId) -> Result<SurfaceCapabilities, SurfaceError> {
		let state = self.state.lock();
		state
			.surfaces
			.get(&surface)
			.filter(|s| s.available)
			.map(|s| s.caps)
			.ok_or(SurfaceError::Unavailable(surface))
	}

	fn replace_range(&self, surface: SurfaceId, range: Range<CharIdx>, text: &str) -> Result<(), BackendError> {
		self.with_surface("replace_range", surface, |s, _| {
			if !s.caps.range_replace {
				return Err(BackendError::Unsupported("replace_range"));
			}
			splice(&mut s.text, range, text, "replace_range")
		})
	}

	fn select_range(&self, surface: SurfaceId, range: Range<CharIdx>) -> Result<(), BackendError> {
		self.with_surface("select_range", surface, |s, _| {
			if range.start > range.end || range.end > char_len(&s.text) {
				return Err(BackendError::Rejected {
					op: "select_range",
					reason: "range outside buffer".into(),
				});
			}
			s.selection = Some(range);
			Ok(())
		})
	}

	fn select_all(&self, surface: SurfaceId) -> Result<(), BackendError> {
		self.with_surface("select_all", surface, |s, _| {
			s.selection = Some(0..char_len(&s.text));
			Ok(())
		})
	}

	fn read_text(&self, surface: SurfaceId) -> Result<String, BackendError> {
		self.with_surface("read_text", surface, |s, _| {
			if !s.caps.full_read {
				return Err(BackendError::Unsupported("read_text"));
			}
			Ok(s.text.clone())
		})
	}

	fn clipboard(&self) -> Result<Option<String>, BackendError> {
		self.with_clipboard("clipboard", |c| c.clone())
	}

	fn set_clipboard(&self, contents: Option<&str>) -> Result<(), BackendError> {
		self.with_clipboard("set_clipboard", |c| *c = contents.map(str::to_string))
	}

	fn activate(&self, surface: SurfaceId) -> Result<(), BackendError> {
		self.with_surface("activate", surface, |_, _| Ok(()))
	}

	fn paste(&self, surface: SurfaceId) -> Result<(), BackendError> {
		self.with_surface("paste", surface, |s, clipboard| {
			if !s.caps.clipboard_paste {
				return Err(BackendError::Unsupported("paste"));
			}
			let pasted = clipboard.clone().unwrap_or_default();
			let end = char_len(&s.text);
			let range = s.selection.take().unwrap_or(end..end);
			splice(&mut s.text, range, &pasted, "paste")
		})
	}
}

impl GeometryProbe for MemoryBackend {
	fn sample(&self, surface: SurfaceId) -> Result<Option<SurfaceGeometry>, SurfaceError> {
		let state = self.state.lock();
		match state.surfaces.get(&surface) {
			Some(s) if s.available => Ok(s.geometry),
			_ => Err(SurfaceError::Unavailable(surface)),
		}
	}
}
