//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lotmeter",
    version,
    about = "Job-lifecycle log analyzer with time-bucketed throughput reporting",
    long_about = "lotmeter reconstructs a job-processing funnel (staged, queued in the parking \
                  lot, retrieved or submitted) from a closed log file in a single pass, and \
                  reports per-interval and overall throughput plus a queue discrepancy figure."
)]
pub struct Cli {
    /// Config file path (defaults to ~/.config/lotmeter/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Trace every per-line classification decision to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a job-processing log file
    Analyze {
        /// Path to the log file
        file: PathBuf,

        /// Number of intervals to split the analysis window into
        #[arg(short = 'n', long, value_name = "COUNT")]
        intervals: Option<usize>,

        /// How retrieval polls are told apart
        #[arg(long, value_parser = ["status-code", "response-size"])]
        policy: Option<String>,

        /// Count parking-lot timeouts and subtract them from the discrepancy
        #[arg(long)]
        count_timeouts: bool,

        /// Emit the summary as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::parse_from(["lotmeter", "analyze", "job.log"]);
        match cli.command {
            Commands::Analyze {
                file,
                intervals,
                policy,
                count_timeouts,
                json,
            } => {
                assert_eq!(file, PathBuf::from("job.log"));
                assert_eq!(intervals, None);
                assert_eq!(policy, None);
                assert!(!count_timeouts);
                assert!(!json);
            }
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_policy_values_are_closed() {
        assert!(Cli::try_parse_from([
            "lotmeter",
            "analyze",
            "job.log",
            "--policy",
            "response-size"
        ])
        .is_ok());
        assert!(Cli::try_parse_from([
            "lotmeter",
            "analyze",
            "job.log",
            "--policy",
            "coin-flip"
        ])
        .is_err());
    }
}
