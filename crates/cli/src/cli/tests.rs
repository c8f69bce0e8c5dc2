use clap::Parser;

use super::*;

fn check(args: &[&str]) -> CheckArgs {
	let cli = Cli::try_parse_from(args).unwrap();
	match cli.command {
		Command::Check(args) => args,
	}
}

#[test]
fn check_takes_a_file() {
	let args = check(&["proofline", "check", "notes.txt"]);
	assert_eq!(args.file, PathBuf::from("notes.txt"));
	assert_eq!(args.config, None);
	assert!(!args.json);
	assert!(!args.apply);
}

#[test]
fn check_flags() {
	let args = check(&["proofline", "check", "--json", "--apply", "-c", "cfg.toml", "notes.txt"]);
	assert_eq!(args.config, Some(PathBuf::from("cfg.toml")));
	assert!(args.json);
	assert!(args.apply);
}

#[test]
fn verbose_is_global() {
	let cli = Cli::try_parse_from(["proofline", "check", "notes.txt", "--verbose"]).unwrap();
	assert!(cli.verbose);
}

#[test]
fn file_is_required() {
	assert!(Cli::try_parse_from(["proofline", "check"]).is_err());
}
