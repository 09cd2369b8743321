//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ClauseFlow CLI - Index contracts and purchase orders by line range.
#[derive(Debug, Parser)]
#[command(name = "clauseflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CLAUSEFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (line ranges only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the full structural index of a document
    Index(IndexArgs),

    /// Segment a document into sections
    Segment(SegmentArgs),

    /// Print lines of a document by range
    Lines(LinesArgs),

    /// Match a spec citation against a reference library
    Match(MatchArgs),

    /// Turn a reference document into library entries
    Reference(ReferenceArgs),

    /// Manage oracle profiles
    Profile(ProfileArgs),
}

/// Engine tuning shared by commands that call the oracle.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Extractor settings preset
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Lines per oracle call, overriding the derived value
    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Lines shared by consecutive windows
    #[arg(long)]
    pub overlap: Option<usize>,
}

/// Extractor settings presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Small windows and short timeouts
    Aggressive,
    /// Large windows and long timeouts
    Lenient,
}

/// Arguments for the index command.
#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Plain-text document to index
    pub file: PathBuf,

    /// Customer whose reference library applies
    #[arg(long, requires = "library")]
    pub customer: Option<String>,

    /// Reference library TOML file
    #[arg(long, requires = "customer")]
    pub library: Option<PathBuf>,

    /// Skip segmentation and extract clauses from the whole document
    #[arg(long)]
    pub single_pass: bool,

    /// Include clause text in the output
    #[arg(long)]
    pub text: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Arguments for the segment command.
#[derive(Debug, Parser)]
pub struct SegmentArgs {
    /// Plain-text document to segment
    pub file: PathBuf,

    /// Also read the line-items table from header sections
    #[arg(long)]
    pub line_items: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Arguments for the lines command.
#[derive(Debug, Parser)]
pub struct LinesArgs {
    /// Plain-text document
    pub file: PathBuf,

    /// Line range as START-END (whole document if omitted)
    pub range: Option<String>,

    /// Print the numbered rendering instead of the original text
    #[arg(short, long)]
    pub numbered: bool,
}

/// Arguments for the match command.
#[derive(Debug, Parser)]
pub struct MatchArgs {
    /// Spec identifier as cited
    pub identifier: String,

    /// Version as cited
    #[arg(long = "rev")]
    pub version: Option<String>,

    /// Customer whose library applies
    #[arg(long)]
    pub customer: String,

    /// Reference library TOML file
    #[arg(long)]
    pub library: PathBuf,
}

/// Arguments for the reference command.
#[derive(Debug, Parser)]
pub struct ReferenceArgs {
    /// Plain-text reference document
    pub file: PathBuf,

    /// Customer owning the reference document
    #[arg(long)]
    pub customer: String,

    /// Library TOML file to append entries to (created if missing)
    #[arg(long)]
    pub library: Option<PathBuf>,

    /// Identifier used when none can be read from the document
    #[arg(long)]
    pub identifier: Option<String>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Oracle backend
        #[arg(long, value_enum)]
        provider: ProviderArg,
        /// Model name
        #[arg(short, long)]
        model: String,
        /// Service endpoint (backend default if omitted)
        #[arg(short, long)]
        endpoint: Option<String>,
        /// Environment variable holding the API key
        #[arg(long)]
        api_key_env: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

/// Oracle backend argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible chat completions
    Openai,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ProviderArg> for crate::config::Provider {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Ollama => crate::config::Provider::Ollama,
            ProviderArg::Openai => crate::config::Provider::OpenAi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_command() {
        let cli = Cli::parse_from([
            "clauseflow",
            "index",
            "po.txt",
            "--customer",
            "acme",
            "--library",
            "lib.toml",
            "--max-lines",
            "400",
        ]);
        match cli.command {
            Command::Index(args) => {
                assert_eq!(args.customer.as_deref(), Some("acme"));
                assert_eq!(args.engine.max_lines, Some(400));
                assert!(!args.single_pass);
            }
            _ => panic!("Expected Index command"),
        }
    }

    #[test]
    fn test_customer_requires_library() {
        let result = Cli::try_parse_from(["clauseflow", "index", "po.txt", "--customer", "acme"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["clauseflow", "-vv", "lines", "po.txt", "3-7"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Lines(args) => assert_eq!(args.range.as_deref(), Some("3-7")),
            _ => panic!("Expected Lines command"),
        }
    }

    #[test]
    fn test_provider_conversion() {
        let provider: crate::config::Provider = ProviderArg::Openai.into();
        assert_eq!(provider, crate::config::Provider::OpenAi);
    }
}
