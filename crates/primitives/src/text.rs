use std::ops::Range;

/// A position in the text, measured in chars (Unicode scalar values).
pub type CharIdx = usize;

/// A length in chars. Kept distinct from [`CharIdx`] in signatures to avoid
/// passing a length where a position is expected.
pub type CharLen = usize;

/// Returns the number of chars in `text`.
#[inline]
pub fn char_len(text: &str) -> CharLen {
	text.chars().count()
}

/// Converts a char index into a byte offset.
///
/// `char_idx == char_len(text)` maps to `text.len()`. Returns `None` past the end.
pub fn byte_offset(text: &str, char_idx: CharIdx) -> Option<usize> {
	if char_idx == 0 {
		return Some(0);
	}
	let mut seen = 0;
	for (byte, _) in text.char_indices() {
		if seen == char_idx {
			return Some(byte);
		}
		seen += 1;
	}
	(seen == char_idx).then_some(text.len())
}

/// Slices `text` by a char range. Returns `None` when the range is inverted or
/// reaches past the end of `text`.
pub fn char_slice(text: &str, range: Range<CharIdx>) -> Option<&str> {
	if range.start > range.end {
		return None;
	}
	let start = byte_offset(text, range.start)?;
	let len = text[start..].char_indices().nth(range.end - range.start).map(|(b, _)| b);
	let end = match len {
		Some(b) => start + b,
		None if char_len(&text[start..]) == range.end - range.start => text.len(),
		None => return None,
	};
	Some(&text[start..end])
}

/// Replaces the chars in `range` with `replacement`, returning the new text.
pub fn replace_chars(text: &str, range: Range<CharIdx>, replacement: &str) -> Option<String> {
	let removed = char_slice(text, range.clone())?;
	let start = byte_offset(text, range.start)?;
	let end = start + removed.len();
	let mut out = String::with_capacity(text.len() - removed.len() + replacement.len());
	out.push_str(&text[..start]);
	out.push_str(replacement);
	out.push_str(&text[end..]);
	Some(out)
}

/// Upper-cases the first char of `s`.
pub fn capitalize_first(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
