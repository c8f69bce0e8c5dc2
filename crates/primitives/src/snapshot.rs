use std::ops::Range;

use ropey::Rope;

use crate::surface::{Generation, SurfaceId};
use crate::text::{CharIdx, CharLen};

/// Immutable capture of a surface's text at one generation.
///
/// Edits produce a new snapshot. The only in-place change is
/// [`TextSnapshot::apply_replacement`], used when the engine itself wrote the
/// edit into the surface and already knows the resulting text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSnapshot {
	pub surface_id: SurfaceId,
	pub content: Rope,
	pub revision: Generation,
}

impl TextSnapshot {
	pub fn new(surface_id: SurfaceId, content: &str, revision: Generation) -> Self {
		Self {
			surface_id,
			content: Rope::from_str(content),
			revision,
		}
	}

	#[inline]
	pub fn len_chars(&self) -> CharLen {
		self.content.len_chars()
	}

	/// Returns the text in `range`, or `None` if it is out of bounds.
	pub fn slice(&self, range: Range<CharIdx>) -> Option<String> {
		if range.start > range.end || range.end > self.len_chars() {
			return None;
		}
		Some(self.content.slice(range).to_string())
	}

	/// Replaces `range` with `replacement` and stamps the new revision.
	///
	/// Returns `false` without touching the content if `range` is out of bounds.
	pub fn apply_replacement(&mut self, range: Range<CharIdx>, replacement: &str, revision: Generation) -> bool {
		if range.start > range.end || range.end > self.len_chars() {
			return false;
		}
		self.content.remove(range.clone());
		self.content.insert(range.start, replacement);
		self.revision = revision;
		true
	}

	/// True if `char_idx` begins a sentence: offset zero, or the nearest
	/// non-whitespace char before it is `.`, `!` or `?`.
	pub fn is_sentence_start(&self, char_idx: CharIdx) -> bool {
		if char_idx == 0 {
			return true;
		}
		if char_idx > self.len_chars() {
			return false;
		}
		let mut chars = self.content.chars_at(char_idx);
		while let Some(c) = chars.prev() {
			if !c.is_whitespace() {
				return matches!(c, '.' | '!' | '?');
			}
		}
		false
	}

	/// Returns the full text.
	pub fn text(&self) -> String {
		self.content.to_string()
	}
}
