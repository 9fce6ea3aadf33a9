use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "queue-sim", about = "Replay one day of a service counter with queues")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulation and print its log
    Run(RunArgs),
    /// Print the resolved configuration without running
    ShowConfig(SourceArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
    #[arg(long, help = "Shorthand for --format summary")]
    pub summary: bool,
}

impl RunArgs {
    pub fn output_format(&self) -> FormatArg {
        if self.summary {
            FormatArg::Summary
        } else {
            self.format.clone()
        }
    }
}

/// Where the configuration comes from. Flags override values read from a
/// file or stdin.
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    #[arg(long, conflicts_with = "stdin", help = "Read a .toml or .json config file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Read whitespace-separated parameters from stdin")]
    pub stdin: bool,
    #[arg(long, help = "Random seed [default: 0]")]
    pub seed: Option<u64>,
    #[arg(long, help = "Number of human servers")]
    pub servers: Option<usize>,
    #[arg(long, help = "Number of self-check counters [default: 0]")]
    pub self_checks: Option<usize>,
    #[arg(long, visible_alias = "qmax", help = "Waiting room per server (shared by self-checks)")]
    pub queue_capacity: Option<usize>,
    #[arg(long)]
    pub arrivals: Option<usize>,
    #[arg(long, help = "Arrival rate (lambda)")]
    pub arrival_rate: Option<f64>,
    #[arg(long, help = "Service rate (mu)")]
    pub service_rate: Option<f64>,
    #[arg(long, help = "Rest rate (rho) [default: 1]")]
    pub rest_rate: Option<f64>,
    #[arg(long, help = "Chance a server rests after a customer [default: 0]")]
    pub rest_probability: Option<f64>,
    #[arg(long, help = "Chance a customer is greedy [default: 0]")]
    pub greedy_probability: Option<f64>,
}

#[derive(ValueEnum, Clone, Debug, Eq, PartialEq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

pub fn parse_args() -> Result<Cli> {
    parse_args_from(std::env::args_os())
}

pub fn parse_args_from<I, T>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => Err(Error::Cli(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse() {
        let cli = parse_args_from([
            "queue-sim",
            "run",
            "--servers",
            "2",
            "--qmax",
            "1",
            "--arrivals",
            "5",
            "--arrival-rate",
            "1.0",
            "--service-rate",
            "2.0",
            "--summary",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.source.servers, Some(2));
                assert_eq!(args.source.queue_capacity, Some(1));
                assert_eq!(args.source.arrivals, Some(5));
                assert_eq!(args.output_format(), FormatArg::Summary);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn config_and_stdin_conflict() {
        let err = parse_args_from(["queue-sim", "run", "--config", "a.toml", "--stdin"]).unwrap_err();
        assert!(matches!(err, Error::Cli(_)));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(parse_args_from(["queue-sim", "run", "--format", "xml"]).is_err());
    }
}
