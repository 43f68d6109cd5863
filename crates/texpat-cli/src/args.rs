use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Recognizes the structure of LaTeX documents against style packages.
#[derive(Debug, Clone, Parser)]
#[clap(name = "texpat", version = crate::texpat_version(), author)]
pub struct CliArguments {
    /// The command to run
    #[command(subcommand)]
    pub command: Command,

    /// Whether to use color in diagnostics and errors
    #[clap(long, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,

    /// Sets the level of logging verbosity:
    /// -v = warning & error, -vv = info, -vvv = debug, -vvvv = trace
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbosity: u8,
}

/// What to do.
#[derive(Debug, Clone, Subcommand)]
#[command()]
pub enum Command {
    /// Parses an input file and prints its syntax tree
    #[command(visible_alias = "p")]
    Parse(ParseCommand),

    /// Reports unknown constructs and unterminated environments
    #[command(visible_alias = "c")]
    Check(CheckCommand),

    /// Lists the loaded style packages
    Styles(StylesCommand),
}

/// Parses an input file and prints its syntax tree
#[derive(Debug, Clone, Parser)]
pub struct ParseCommand {
    /// Shared arguments.
    #[clap(flatten)]
    pub common: SharedArgs,

    /// How to print the tree
    #[clap(long = "format", short = 'f', default_value_t = OutputFormat::Debug)]
    pub format: OutputFormat,
}

/// Reports unknown constructs and unterminated environments
#[derive(Debug, Clone, Parser)]
pub struct CheckCommand {
    /// Shared arguments.
    #[clap(flatten)]
    pub common: SharedArgs,

    /// In which format to emit diagnostics
    #[clap(
        long,
        default_value_t = DiagnosticFormat::Human,
        value_parser = clap::value_parser!(DiagnosticFormat)
    )]
    pub diagnostic_format: DiagnosticFormat,
}

/// Lists the loaded style packages
#[derive(Debug, Clone, Parser)]
pub struct StylesCommand {
    /// The style packages to load.
    #[clap(flatten)]
    pub styles: StyleArgs,
}

/// Common arguments of parse and check.
#[derive(Debug, Clone, Args)]
pub struct SharedArgs {
    /// Path to input LaTeX file, use `-` to read from stdin
    pub input: PathBuf,

    /// The style packages to load.
    #[clap(flatten)]
    pub styles: StyleArgs,

    /// Starts parsing in math mode instead of text mode
    #[clap(long = "math")]
    pub math: bool,
}

/// Where to find style packages.
#[derive(Debug, Clone, Args)]
pub struct StyleArgs {
    /// Adds a style package file (JSON, YAML or TOML). Packages given later
    /// take priority over earlier ones
    #[clap(
        long = "style",
        short = 's',
        env = "TEXPAT_STYLES",
        value_name = "FILE",
        value_delimiter = ',',
        action = ArgAction::Append,
    )]
    pub styles: Vec<PathBuf>,
}

/// How to print a syntax tree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// A structural dump of all nodes
    Debug,
    /// The normalized source text
    Text,
    /// The nodes as JSON
    Json,
    /// The nodes as YAML
    Yaml,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

/// Which format to use for diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum DiagnosticFormat {
    Human,
    Short,
}

impl Display for DiagnosticFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

/// Whether to use color.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum ColorChoice {
    /// Use color if printing to a terminal
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

impl Display for ColorChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}
