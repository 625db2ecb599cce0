//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use janitor_domain::TagMatcher;
use std::path::PathBuf;

/// AWS Janitor - delete cloud resources that outlive their TTL.
#[derive(Debug, Parser)]
#[command(name = "aws-janitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags shared by every subcommand.
#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// Region to sweep (repeatable or comma separated)
    #[arg(short, long, global = true, env = "AWS_JANITOR_REGIONS", value_delimiter = ',')]
    pub region: Vec<String>,

    /// Account to sweep (default: the account of the current credentials)
    #[arg(short, long, global = true)]
    pub account: Option<String>,

    /// AWS profile
    #[arg(short, long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Delete resources tracked for at least this many hours
    #[arg(long, global = true)]
    pub ttl_hours: Option<u64>,

    /// Log what would be deleted without deleting anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Where ledgers are kept: s3://bucket/prefix or a local directory
    #[arg(long, global = true, env = "AWS_JANITOR_STATE")]
    pub state: Option<String>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Only sweep these resource types
    #[arg(long, global = true, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Never sweep these resource types
    #[arg(long, global = true, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Only manage resources carrying this tag (key or key=value)
    #[arg(long, global = true)]
    pub include_tag: Vec<TagMatcher>,

    /// Leave resources carrying this tag alone (key or key=value)
    #[arg(long, global = true)]
    pub exclude_tag: Vec<TagMatcher>,

    /// Per-call timeout for each resource type, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (totals only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mark live resources and delete the ones past their TTL (default)
    Sweep,

    /// Delete every resource now, regardless of age
    Purge(PurgeArgs),

    /// List live resources without deleting anything
    List,

    /// Sweep repeatedly until interrupted
    Watch(WatchArgs),
}

/// Arguments for the purge command.
#[derive(Debug, Parser)]
pub struct PurgeArgs {
    /// Confirm deletion of everything in scope
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Minutes between sweeps
    #[arg(short, long)]
    pub interval_minutes: Option<u64>,

    /// Stop after this many sweeps
    #[arg(long)]
    pub cycles: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command() {
        let cli = Cli::try_parse_from(["aws-janitor", "--region", "us-east-1"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.global.region, vec!["us-east-1"]);
    }

    #[test]
    fn test_repeated_and_delimited_regions() {
        let cli = Cli::try_parse_from([
            "aws-janitor",
            "sweep",
            "-r",
            "us-east-1,us-west-2",
            "--region",
            "eu-west-1",
        ])
        .unwrap();
        assert_eq!(cli.global.region, vec!["us-east-1", "us-west-2", "eu-west-1"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "aws-janitor",
            "purge",
            "--yes",
            "--dry-run",
            "--ttl-hours",
            "6",
            "--exclude-tag",
            "keep=true",
            "--skip",
            "eventbridge-rules",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Command::Purge(PurgeArgs { yes: true }))));
        assert!(cli.global.dry_run);
        assert_eq!(cli.global.ttl_hours, Some(6));
        assert_eq!(cli.global.exclude_tag[0].value.as_deref(), Some("true"));
        assert_eq!(cli.global.skip, vec!["eventbridge-rules"]);
    }

    #[test]
    fn test_watch_args() {
        let cli = Cli::try_parse_from(["aws-janitor", "watch", "-i", "15", "--cycles", "2"]).unwrap();
        match cli.command {
            Some(Command::Watch(args)) => {
                assert_eq!(args.interval_minutes, Some(15));
                assert_eq!(args.cycles, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let result = Cli::try_parse_from(["aws-janitor", "--include-tag", "=x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["aws-janitor", "-vv", "list"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert!(matches!(cli.command, Some(Command::List)));
    }
}
