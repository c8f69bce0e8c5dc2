use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "proofline")]
#[command(about = "Continuous grammar and style analysis")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Analyze a file and print its findings
	Check(CheckArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CheckArgs {
	/// File to analyze
	pub file: PathBuf,

	/// Config file (defaults to the user config, if present)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Print findings as JSON
	#[arg(long)]
	pub json: bool,

	/// Accept the first suggestion of every finding and print the result
	#[arg(long)]
	pub apply: bool,
}
