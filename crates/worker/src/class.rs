/// Execution classes used for worker scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The single-writer coordinator loop.
	Coordinator,
	/// Fast structural analysis (expected ~10ms).
	FastAnalysis,
	/// Slow semantic analysis (up to tens of seconds).
	SlowAnalysis,
	/// Blocking surface mutation (clipboard, synthetic input).
	Mutation,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Coordinator => "coordinator",
			Self::FastAnalysis => "fast_analysis",
			Self::SlowAnalysis => "slow_analysis",
			Self::Mutation => "mutation",
		}
	}
}
