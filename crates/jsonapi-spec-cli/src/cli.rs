//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// JSON:API Spec CLI - Validate JSON:API request documents
///
/// Checks create, update and relationship request documents against a
/// resource store fixture and reports every violation as a JSON:API
/// error object.
#[derive(Parser, Debug)]
#[command(
    name = "jsonapi-spec",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "JSONAPI_SPEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate one or more request documents
    Validate(ValidateArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Request documents to validate (JSON or YAML)
    #[arg(value_name = "DOCUMENT", required = true, num_args = 1..)]
    pub documents: Vec<PathBuf>,

    /// Kind of request the documents are sent with
    #[arg(short, long, value_enum, default_value = "create")]
    pub mode: ValidationMode,

    /// Resource type the endpoint expects (create and update)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub resource_type: Option<String>,

    /// Resource id named by the update URL
    #[arg(long)]
    pub id: Option<String>,

    /// Reject client-generated ids on create
    #[arg(long)]
    pub no_client_ids: bool,

    /// Resource store fixture, overriding the configured one
    #[arg(short, long, value_name = "FIXTURE")]
    pub store: Option<PathBuf>,

    /// Relationship field the document is sent to (relationship mode)
    #[arg(long)]
    pub field: Option<String>,

    /// Allowed target types of the relationship (repeatable)
    #[arg(long = "related-type", value_name = "TYPE")]
    pub related_types: Vec<String>,

    /// Expected relationship cardinality
    #[arg(short, long, value_enum)]
    pub expect: Option<Expect>,

    /// Show each failed document and error details
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a starter configuration file
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the configuration file
    #[arg(value_name = "PATH", default_value = ".jsonapi-spec.yaml")]
    pub path: PathBuf,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Kind of request a document is validated as
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValidationMode {
    /// Resource creation (POST to a collection)
    Create,
    /// Resource update (PATCH to a resource)
    Update,
    /// Relationship replacement or modification
    Relationship,
}

/// Expected relationship cardinality
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Expect {
    /// Null or a single identifier
    ToOne,
    /// An array of identifiers
    ToMany,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<Expect> for jsonapi_spec::Cardinality {
    fn from(expect: Expect) -> Self {
        match expect {
            Expect::ToOne => jsonapi_spec::Cardinality::ToOne,
            Expect::ToMany => jsonapi_spec::Cardinality::ToMany,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["jsonapi-spec", "-vv", "validate", "a.json"]);
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli { quiet: true, ..cli };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_validate_arguments() {
        let cli = Cli::parse_from([
            "jsonapi-spec",
            "validate",
            "a.json",
            "b.yaml",
            "--mode",
            "relationship",
            "--field",
            "tags",
            "--related-type",
            "tags",
            "--related-type",
            "labels",
            "--expect",
            "to-many",
        ]);

        let Commands::Validate(args) = cli.command else {
            panic!("expected validate command");
        };
        assert_eq!(args.documents, vec![PathBuf::from("a.json"), PathBuf::from("b.yaml")]);
        assert_eq!(args.mode, ValidationMode::Relationship);
        assert_eq!(args.field.as_deref(), Some("tags"));
        assert_eq!(args.related_types, vec!["tags", "labels"]);
        assert_eq!(args.expect, Some(Expect::ToMany));
        assert!(args.resource_type.is_none());
    }

    #[test]
    fn test_validate_requires_a_document() {
        assert!(Cli::try_parse_from(["jsonapi-spec", "validate"]).is_err());
    }

    #[test]
    fn test_expect_converts_to_cardinality() {
        assert_eq!(jsonapi_spec::Cardinality::from(Expect::ToOne), jsonapi_spec::Cardinality::ToOne);
        assert_eq!(jsonapi_spec::Cardinality::from(Expect::ToMany), jsonapi_spec::Cardinality::ToMany);
    }
}
