//! `proofline check`: one file, one surface, one settled cycle.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use proofline_config::{Config, SharedConfig};
use proofline_engine::{BacktickZones, Coordinator, CoordinatorDeps, CoordinatorHandle, MemoryBackend, RenderFrame, Renderer, SurfaceCapabilities};
use proofline_primitives::{CharIdx, Finding, SurfaceId};
use serde::Serialize;

use crate::analyzers::{DemoFast, LongSentences};
use crate::cli::CheckArgs;

#[cfg(test)]
mod tests;

const SURFACE: SurfaceId = SurfaceId(1);

/// Logs frames instead of painting them.
struct LogRenderer;

impl Renderer for LogRenderer {
	fn render(&self, frame: &RenderFrame) {
		tracing::debug!(
			surface = %frame.surface,
			state = ?frame.state,
			findings = frame.findings.len(),
			"render.frame"
		);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedFinding {
	/// 1-based.
	pub line: usize,
	/// 1-based, in chars.
	pub column: usize,
	#[serde(flatten)]
	pub finding: Finding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
	pub file: PathBuf,
	pub findings: Vec<ReportedFinding>,
	/// Suggestions written back with `--apply`.
	pub applied: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub corrected: Option<String>,
}

/// 1-based line and column of `char_idx` in `text`.
pub(crate) fn line_col(text: &str, char_idx: CharIdx) -> (usize, usize) {
	let mut line = 1;
	let mut column = 1;
	for ch in text.chars().take(char_idx) {
		if ch == '\n' {
			line += 1;
			column = 1;
		} else {
			column += 1;
		}
	}
	(line, column)
}

pub async fn run(args: CheckArgs) -> Result<()> {
	let config = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::load_default()?,
	};
	let text = std::fs::read_to_string(&args.file).with_context(|| format!("reading {}", args.file.display()))?;

	let report = check(args.file.clone(), &text, config, args.apply).await?;
	if args.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		print!("{}", render_human(&report));
	}
	Ok(())
}

/// Analyzes `text` on an in-memory surface and optionally applies every
/// first suggestion.
pub async fn check(file: PathBuf, text: &str, mut config: Config, apply: bool) -> Result<Report> {
	// A single edit has nothing to coalesce with.
	config.engine.semantic_debounce_ms = 0;

	let backend = Arc::new(MemoryBackend::new());
	backend.add_surface(SURFACE, text, SurfaceCapabilities::FULL);
	let deps = CoordinatorDeps {
		fast: Arc::new(DemoFast),
		slow: Arc::new(LongSentences::default()),
		renderer: Arc::new(LogRenderer),
		backend: backend.clone(),
		config: Arc::new(SharedConfig::new(config.analysis)),
		zones: Arc::new(BacktickZones),
		probe: None,
	};
	let handle = Coordinator::spawn(deps, config.engine);

	let result = drive(&handle, &backend, file, text, apply).await;
	handle.shutdown();
	result
}

async fn drive(handle: &CoordinatorHandle, backend: &MemoryBackend, file: PathBuf, text: &str, apply: bool) -> Result<Report> {
	handle.edit(SURFACE, text)?;
	handle.settled().await?;
	let view = handle.view(SURFACE).await?.context("surface was never analyzed")?;
	let findings = view
		.findings
		.iter()
		.map(|finding| {
			let (line, column) = line_col(text, finding.start);
			ReportedFinding {
				line,
				column,
				finding: finding.clone(),
			}
		})
		.collect::<Vec<_>>();
	tracing::info!(file = %file.display(), findings = findings.len(), "check.analyzed");

	if !apply {
		return Ok(Report {
			file,
			findings,
			applied: 0,
			corrected: None,
		});
	}

	let mut applied = 0;
	let mut skipped: Vec<Finding> = Vec::new();
	// Each round either lands a fix, which drops that finding, or skips one.
	for _ in 0..findings.len() {
		let view = handle.view(SURFACE).await?.context("surface disappeared")?;
		let next = view
			.findings
			.into_iter()
			.find(|f| !f.suggestions.is_empty() && !skipped.iter().any(|s| s.same_report(f)));
		let Some(finding) = next else { break };
		let suggestion = finding.suggestions[0].clone();
		match handle.accept(SURFACE, finding.clone(), suggestion).await? {
			Ok(done) => {
				applied += 1;
				tracing::debug!(rule = %finding.rule_id, strategy = %done.strategy, "check.applied");
				// Echo the mutation the way a surface observer would.
				if let Some(current) = backend.text(SURFACE) {
					handle.edit(SURFACE, current)?;
				}
			}
			Err(error) => {
				tracing::warn!(rule = %finding.rule_id, %error, "check.apply_failed");
				skipped.push(finding);
			}
		}
	}
	handle.settled().await?;

	Ok(Report {
		file,
		findings,
		applied,
		corrected: backend.text(SURFACE),
	})
}

pub(crate) fn render_human(report: &Report) -> String {
	let mut out = String::new();
	let file = report.file.display();
	for item in &report.findings {
		let f = &item.finding;
		let _ = write!(out, "{file}:{}:{}: {} [{}/{}] {}", item.line, item.column, f.severity.as_str(), f.category, f.rule_id, f.message);
		if let Some(first) = f.suggestions.first() {
			match first.as_str() {
				"" => out.push_str(" (remove)"),
				s => {
					let _ = write!(out, " (suggest {s:?})");
				}
			}
		}
		out.push('\n');
	}
	match report.findings.len() {
		0 => {
			let _ = writeln!(out, "{file}: no findings");
		}
		n => {
			let _ = writeln!(out, "{file}: {n} finding{}", if n == 1 { "" } else { "s" });
		}
	}
	if let Some(corrected) = &report.corrected {
		let _ = writeln!(out, "applied {} suggestion{}:", report.applied, if report.applied == 1 { "" } else { "s" });
		out.push_str(corrected);
		if !corrected.ends_with('\n') {
			out.push('\n');
		}
	}
	out
}
