use std::io::Write as _;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use proofline_config::Config;

use super::*;

fn rules(report: &Report) -> Vec<(&str, usize, usize)> {
	report
		.findings
		.iter()
		.map(|f| (f.finding.rule_id.as_str(), f.line, f.column))
		.collect()
}

#[test]
fn line_col_counts_chars() {
	let text = "ab\ncdé\nf";
	assert_eq!(line_col(text, 0), (1, 1));
	assert_eq!(line_col(text, 2), (1, 3));
	assert_eq!(line_col(text, 3), (2, 1));
	assert_eq!(line_col(text, 7), (3, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn findings_carry_line_and_column() {
	let text = "Hello there.\nTeh fox  ran.";
	let report = check(PathBuf::from("notes.txt"), text, Config::default(), false).await.unwrap();

	assert_eq!(rules(&report), vec![("MISSPELLING", 2, 1), ("DOUBLE_SPACE", 2, 8)]);
	assert_eq!(report.applied, 0);
	assert_eq!(report.corrected, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn apply_fixes_every_finding_with_a_suggestion() {
	let text = "Teh fox ran over the the  hill.";
	let report = check(PathBuf::from("notes.txt"), text, Config::default(), true).await.unwrap();

	assert_eq!(report.findings.len(), 3);
	assert_eq!(report.applied, 3);
	assert_eq!(report.corrected.as_deref(), Some("The fox ran over the hill."));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ignored_rules_come_from_config() {
	let config = Config::from_toml_str(
		r#"
		[analysis]
		ignored_rules = ["DOUBLE_SPACE"]
		"#,
	)
	.unwrap();
	let report = check(PathBuf::from("notes.txt"), "Teh fox  ran.", config, false).await.unwrap();
	assert_eq!(rules(&report), vec![("MISSPELLING", 1, 1)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn code_spans_are_not_checked() {
	let report = check(PathBuf::from("notes.md"), "Run `teh` to start.", Config::default(), false).await.unwrap();
	assert!(report.findings.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_reads_the_file_and_config() {
	let dir = tempfile::tempdir().unwrap();
	let file = dir.path().join("notes.txt");
	std::fs::write(&file, "Teh end.").unwrap();
	let config_path = dir.path().join("config.toml");
	let mut config = std::fs::File::create(&config_path).unwrap();
	writeln!(config, "[analysis]\ndialect = \"british\"").unwrap();

	let args = CheckArgs {
		file,
		config: Some(config_path),
		json: true,
		apply: false,
	};
	run(args).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_file_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	let args = CheckArgs {
		file: dir.path().join("absent.txt"),
		config: Some(dir.path().join("absent.toml")),
		json: false,
		apply: false,
	};
	assert!(run(args).await.is_err());
}

#[test]
fn human_output_lists_findings_and_the_corrected_text() {
	let report = Report {
		file: PathBuf::from("notes.txt"),
		findings: vec![ReportedFinding {
			line: 1,
			column: 9,
			finding: Finding::new(8..12, "Repeated word \"the\"", "grammar", "REPEATED_WORD").with_suggestions([""]),
		}],
		applied: 1,
		corrected: Some("over the dog".into()),
	};
	assert_eq!(
		render_human(&report),
		"notes.txt:1:9: warning [grammar/REPEATED_WORD] Repeated word \"the\" (remove)\n\
		 notes.txt: 1 finding\n\
		 applied 1 suggestion:\n\
		 over the dog\n"
	);
}
