use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for an observed text surface (a focused text field in some
/// external application, an editor buffer, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "surface#{}", self.0)
	}
}

/// Per-surface monotonic edit counter.
///
/// Every accepted edit event bumps the generation of its surface. Asynchronous
/// work captures the generation at dispatch time and is discarded on
/// completion if the surface has moved on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
	/// Generation before any edit has been observed.
	pub const ZERO: Self = Self(0);

	/// Returns the following generation.
	#[inline]
	pub const fn next(self) -> Self {
		Self(self.0.wrapping_add(1))
	}

	#[inline]
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "g{}", self.0)
	}
}

/// One geometry sample of a surface, as reported by the platform probe.
///
/// Two samples compare equal only if nothing that affects on-screen
/// positions of findings has changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
	pub x: i32,
	pub y: i32,
	pub width: u32,
	pub height: u32,
	/// Vertical scroll offset of the visible region.
	pub scroll_offset: i64,
	pub visible: bool,
}

impl SurfaceGeometry {
	pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
		Self {
			x,
			y,
			width,
			height,
			scroll_offset: 0,
			visible: true,
		}
	}

	/// Returns a copy with the given scroll offset.
	pub const fn with_scroll(mut self, scroll_offset: i64) -> Self {
		self.scroll_offset = scroll_offset;
		self
	}

	/// True when the surface moved or resized relative to `other`.
	pub fn frame_differs(&self, other: &Self) -> bool {
		self.x != other.x || self.y != other.y || self.width != other.width || self.height != other.height
	}
}
