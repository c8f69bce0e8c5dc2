//! Presentation state machine.
//!
//! Decides, per surface, whether findings may be painted right now. Movement,
//! scroll and resize withhold everything immediately; painting resumes only
//! after a settle window with no further movement. Geometry handed to the
//! renderer is always a sample taken after the last observed movement.

use std::time::{Duration, Instant};

use proofline_primitives::{Finding, SurfaceGeometry, SurfaceId};

use crate::error::SurfaceError;


/// Externally visible presentation state of one surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PresentationState {
	#[default]
	Idle,
	Displaying,
	SuppressedTransient,
	PopoverOpen,
	Error,
}

impl PresentationState {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Displaying => "displaying",
			Self::SuppressedTransient => "suppressed_transient",
			Self::PopoverOpen => "popover_open",
			Self::Error => "error",
		}
	}

	/// True if findings may be painted in this state.
	pub const fn is_renderable(self) -> bool {
		matches!(self, Self::Displaying | Self::PopoverOpen)
	}
}

/// Input events from the surface and from the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
	Moved,
	ScrollStarted,
	Resized,
	/// A geometry probe sample. A sample that differs from the previous one
	/// counts as movement.
	Geometry(SurfaceGeometry),
	Hover(Finding),
	Click(Finding),
	PopoverDismissed,
	Unavailable,
	Available,
}

/// What the renderer receives. `findings` is empty whenever painting is not
/// allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
	pub surface: SurfaceId,
	pub state: PresentationState,
	pub findings: Vec<Finding>,
	pub geometry: Option<SurfaceGeometry>,
	pub popover: Option<Finding>,
}

impl RenderFrame {
	pub fn empty(surface: SurfaceId, state: PresentationState) -> Self {
		Self {
			surface,
			state,
			findings: Vec::new(),
			geometry: None,
			popover: None,
		}
	}
}

/// Paints findings. Implementations must not block; panics are caught.
pub trait Renderer: Send + Sync {
	fn render(&self, frame: &RenderFrame);
}

/// Samples surface geometry on the coordinator's poll interval.
pub trait GeometryProbe: Send + Sync {
	/// `Ok(None)` when the surface has no geometry to report (not on screen).
	fn sample(&self, surface: SurfaceId) -> Result<Option<SurfaceGeometry>, SurfaceError>;
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
	Idle,
	Displaying,
	Suppressed { settle_at: Instant },
	Popover { finding: Finding },
	Error,
}

/// Per-surface presentation state.
#[derive(Debug, Clone)]
pub struct Presentation {
	phase: Phase,
	has_findings: bool,
	settle_window: Duration,
	/// Latest sample taken since the last movement.
	latest: Option<SurfaceGeometry>,
	/// Geometry at the last settle, handed to the renderer.
	settled: Option<SurfaceGeometry>,
}

impl Presentation {
	pub fn new(settle_window: Duration) -> Self {
		Self {
			phase: Phase::Idle,
			has_findings: false,
			settle_window,
			latest: None,
			settled: None,
		}
	}

	pub fn state(&self) -> PresentationState {
		match self.phase {
			Phase::Idle => PresentationState::Idle,
			Phase::Displaying => PresentationState::Displaying,
			Phase::Suppressed { .. } => PresentationState::SuppressedTransient,
			Phase::Popover { .. } => PresentationState::PopoverOpen,
			Phase::Error => PresentationState::Error,
		}
	}

	pub fn popover(&self) -> Option<&Finding> {
		match &self.phase {
			Phase::Popover { finding } => Some(finding),
			_ => None,
		}
	}

	pub fn geometry(&self) -> Option<SurfaceGeometry> {
		self.settled
	}

	pub fn settle_deadline(&self) -> Option<Instant> {
		match self.phase {
			Phase::Suppressed { settle_at } => Some(settle_at),
			_ => None,
		}
	}

	/// Feeds a new canonical set. Returns true if the state changed.
	pub fn findings_updated(&mut self, findings: &[Finding]) -> bool {
		self.has_findings = !findings.is_empty();
		let next = match &self.phase {
			Phase::Idle if self.has_findings => Phase::Displaying,
			Phase::Displaying if !self.has_findings => Phase::Idle,
			Phase::Popover { finding } if !findings.iter().any(|f| f.same_report(finding)) => {
				if self.has_findings {
					Phase::Displaying
				} else {
					Phase::Idle
				}
			}
			_ => return false,
		};
		self.transition(next)
	}

	/// Applies a geometry or interaction event. Returns true if the state changed.
	pub fn on_event(&mut self, event: &SurfaceEvent, now: Instant) -> bool {
		match event {
			SurfaceEvent::Moved | SurfaceEvent::ScrollStarted | SurfaceEvent::Resized => {
				self.latest = None;
				self.movement(now)
			}
			SurfaceEvent::Geometry(sample) => self.sample(*sample, now),
			SurfaceEvent::Hover(finding) | SurfaceEvent::Click(finding) => match self.phase {
				Phase::Displaying | Phase::Popover { .. } => self.transition(Phase::Popover { finding: finding.clone() }),
				_ => false,
			},
			SurfaceEvent::PopoverDismissed => self.close_popover(),
			SurfaceEvent::Unavailable => self.surface_unavailable(),
			SurfaceEvent::Available => self.surface_available(),
		}
	}

	fn sample(&mut self, sample: SurfaceGeometry, now: Instant) -> bool {
		let previous = self.latest.replace(sample);
		if matches!(self.phase, Phase::Error) {
			return false;
		}
		match previous {
			Some(previous) if previous != sample => self.movement(now),
			Some(_) => false,
			None => {
				if !matches!(self.phase, Phase::Suppressed { .. }) {
					self.settled = Some(sample);
				}
				false
			}
		}
	}

	fn movement(&mut self, now: Instant) -> bool {
		if matches!(self.phase, Phase::Error) {
			return false;
		}
		self.settled = None;
		let from = self.state();
		self.phase = Phase::Suppressed {
			settle_at: now + self.settle_window,
		};
		if from == PresentationState::SuppressedTransient {
			return false;
		}
		tracing::trace!(from = from.as_str(), "presentation.suppressed");
		true
	}

	/// Ends suppression once the settle window has passed. Returns true if
	/// the state changed.
	pub fn tick(&mut self, now: Instant) -> bool {
		let Phase::Suppressed { settle_at } = self.phase else {
			return false;
		};
		if now < settle_at {
			return false;
		}
		self.settled = self.latest;
		let next = if self.has_findings { Phase::Displaying } else { Phase::Idle };
		self.transition(next)
	}

	/// `PopoverOpen -> Displaying`, after dismiss, accept or reject.
	pub fn close_popover(&mut self) -> bool {
		match self.phase {
			Phase::Popover { .. } => self.transition(Phase::Displaying),
			_ => false,
		}
	}

	pub fn surface_unavailable(&mut self) -> bool {
		self.latest = None;
		self.settled = None;
		self.transition(Phase::Error)
	}

	pub fn surface_available(&mut self) -> bool {
		match self.phase {
			Phase::Error => self.transition(Phase::Idle),
			_ => false,
		}
	}

	/// The surface is no longer the active one.
	pub fn deactivate(&mut self) -> bool {
		self.has_findings = false;
		match self.phase {
			Phase::Error => false,
			_ => self.transition(Phase::Idle),
		}
	}

	/// Builds the frame for the current state.
	pub fn frame(&self, surface: SurfaceId, findings: &[Finding]) -> RenderFrame {
		let state = self.state();
		if !state.is_renderable() {
			return RenderFrame::empty(surface, state);
		}
		RenderFrame {
			surface,
			state,
			findings: findings.to_vec(),
			geometry: self.settled,
			popover: self.popover().cloned(),
		}
	}

	fn transition(&mut self, next: Phase) -> bool {
		if self.phase == next {
			return false;
		}
		let from = self.state();
		self.phase = next;
		tracing::trace!(from = from.as_str(), to = self.state().as_str(), "presentation.transition");
		true
	}
}
