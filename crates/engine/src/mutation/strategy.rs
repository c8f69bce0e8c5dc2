use std::fmt;
use std::thread;

use proofline_config::MutationTimingConfig;
use proofline_primitives::text::{char_slice, replace_chars};

use super::MutationRequest;
use super::backend::{MutationBackend, SurfaceCapabilities};
use crate::error::BackendError;

/// One way of writing a suggestion into a surface.
pub trait MutationStrategy: Send + Sync {
	fn kind(&self) -> StrategyKind;

	/// Checks whether the strategy applies at all. A failed precondition has
	/// no side effects and moves on to the next strategy.
	fn precondition(&self, caps: &SurfaceCapabilities) -> Result<(), &'static str>;

	fn try_apply(&self, backend: &dyn MutationBackend, request: &MutationRequest, timing: &MutationTimingConfig) -> Result<(), BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
	DirectReplace,
	ClipboardPaste,
	BufferRebuild,
}

impl StrategyKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::DirectReplace => "direct_replace",
			Self::ClipboardPaste => "clipboard_paste",
			Self::BufferRebuild => "buffer_rebuild",
		}
	}
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Replaces the range through the surface's own editing API. Keeps any
/// formatting around the edit intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectReplace;

impl MutationStrategy for DirectReplace {
	fn kind(&self) -> StrategyKind {
		StrategyKind::DirectReplace
	}

	fn precondition(&self, caps: &SurfaceCapabilities) -> Result<(), &'static str> {
		if !caps.range_replace {
			return Err("range replace unsupported");
		}
		if caps.unreliable_ranges {
			return Err("range edits unreliable");
		}
		Ok(())
	}

	fn try_apply(&self, backend: &dyn MutationBackend, request: &MutationRequest, _timing: &MutationTimingConfig) -> Result<(), BackendError> {
		backend.replace_range(request.surface, request.finding.range(), &request.suggestion)
	}
}

/// Selects the range, pastes the suggestion through the clipboard and puts
/// the previous clipboard contents back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardPaste;

impl MutationStrategy for ClipboardPaste {
	fn kind(&self) -> StrategyKind {
		StrategyKind::ClipboardPaste
	}

	fn precondition(&self, caps: &SurfaceCapabilities) -> Result<(), &'static str> {
		if !caps.clipboard_paste {
			return Err("clipboard paste unsupported");
		}
		if caps.unreliable_ranges {
			return Err("range edits unreliable");
		}
		Ok(())
	}

	fn try_apply(&self, backend: &dyn MutationBackend, request: &MutationRequest, timing: &MutationTimingConfig) -> Result<(), BackendError> {
		if let Err(error) = backend.select_range(request.surface, request.finding.range()) {
			tracing::debug!(surface = %request.surface, %error, "mutation.clipboard.select_failed");
		}
		paste_through_clipboard(backend, request, &request.suggestion, timing)
	}
}

/// Reads the whole buffer, splices the suggestion in locally and pastes the
/// full corrected text over a select-all.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferRebuild;

impl MutationStrategy for BufferRebuild {
	fn kind(&self) -> StrategyKind {
		StrategyKind::BufferRebuild
	}

	fn precondition(&self, caps: &SurfaceCapabilities) -> Result<(), &'static str> {
		if !caps.unreliable_ranges {
			return Err("surface supports range edits");
		}
		if !caps.full_read || !caps.clipboard_paste {
			return Err("full read or clipboard paste unsupported");
		}
		Ok(())
	}

	fn try_apply(&self, backend: &dyn MutationBackend, request: &MutationRequest, timing: &MutationTimingConfig) -> Result<(), BackendError> {
		let current = backend.read_text(request.surface)?;
		let range = request.finding.range();
		if char_slice(&current, range.clone()) != Some(request.original.as_str()) {
			return Err(BackendError::Rejected {
				op: "read_text",
				reason: "buffer no longer matches the analyzed text".into(),
			});
		}
		let corrected = replace_chars(&current, range, &request.suggestion).ok_or(BackendError::Rejected {
			op: "read_text",
			reason: "finding range outside buffer".into(),
		})?;
		backend.select_all(request.surface)?;
		paste_through_clipboard(backend, request, &corrected, timing)
	}
}

/// Pastes `text` into the current selection, restoring the clipboard even if
/// the paste fails.
fn paste_through_clipboard(backend: &dyn MutationBackend, request: &MutationRequest, text: &str, timing: &MutationTimingConfig) -> Result<(), BackendError> {
	let saved = backend.clipboard()?;
	backend.set_clipboard(Some(text))?;

	let pasted = backend.activate(request.surface).and_then(|()| {
		thread::sleep(timing.activate_delay());
		backend.paste(request.surface)?;
		thread::sleep(timing.paste_delay());
		Ok(())
	});

	thread::sleep(timing.clipboard_restore_delay());
	if let Err(error) = backend.set_clipboard(saved.as_deref()) {
		tracing::warn!(surface = %request.surface, %error, "mutation.clipboard.restore_failed");
	}
	pasted
}
