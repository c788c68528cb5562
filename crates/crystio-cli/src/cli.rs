use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "crystio - inspect and convert crystal structure files (DISCUS, XYZ).",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a structure file to another format.
    Convert(ConvertArgs),
    /// Print a summary of a structure file.
    Info(InfoArgs),
    /// List the supported structure formats in detection order.
    Formats,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the input structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Input format, or 'auto' to detect it.
    #[arg(short = 'f', long = "from", value_name = "FORMAT")]
    pub from: Option<String>,

    /// Output format. Defaults to the configured format, else the input format.
    #[arg(short = 't', long = "to", value_name = "FORMAT")]
    pub to: Option<String>,

    /// Replace atom elements with those of a chemical formula, in atom order
    /// (e.g., 'Na4Cl4'). The formula must contain exactly one element per atom.
    #[arg(long, value_name = "FORMULA")]
    pub formula: Option<String>,
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the structure file.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Input format, or 'auto' to detect it.
    #[arg(short = 'f', long = "from", value_name = "FORMAT")]
    pub from: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_accepts_short_and_long_flags() {
        let cli = Cli::parse_from([
            "crystio", "convert", "-i", "ni.stru", "-o", "ni.xyz", "-t", "xyz", "--formula", "Ni4",
        ]);
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.input, PathBuf::from("ni.stru"));
                assert_eq!(args.output, PathBuf::from("ni.xyz"));
                assert_eq!(args.from, None);
                assert_eq!(args.to.as_deref(), Some("xyz"));
                assert_eq!(args.formula.as_deref(), Some("Ni4"));
            }
            other => panic!("Expected 'convert' subcommand, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::parse_from(["crystio", "info", "ni.stru", "-vv", "-c", "crystio.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("crystio.toml")));
        assert!(matches!(cli.command, Commands::Info(_)));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["crystio", "formats", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn convert_requires_input_and_output() {
        assert!(Cli::try_parse_from(["crystio", "convert", "-i", "a.xyz"]).is_err());
    }
}
