use codespan_reporting::files::SimpleFile;
use ecow::eco_format;
use serde::Serialize;
use texpat_syntax::{Context, Diagnostic, ModeState, ParseError, StrResult, Tree};

use crate::args::{DiagnosticFormat, OutputFormat, ParseCommand, SharedArgs};
use crate::check::{locate, print_diagnostics};
use crate::{load, set_failed};

/// Execute a parse command.
pub fn parse(command: &ParseCommand) -> StrResult<()> {
    let parsed = parse_input(&command.common)?;
    let mut diagnostics = parsed.ctx.diagnostics().to_vec();
    match &parsed.error {
        Some(err) => {
            set_failed();
            diagnostics.push(parsed.diagnostic(err));
        }
        None => {
            let output = format(parsed.ctx.tree(), command.format)?;
            println!("{output}");
        }
    }

    print_diagnostics(&parsed.name, &parsed.text, &diagnostics, DiagnosticFormat::Human)
        .map_err(|err| eco_format!("failed to print diagnostics ({err})"))
}

/// A parsed input document.
pub struct Parsed {
    /// The input's display name.
    pub name: String,
    /// The input's text.
    pub text: String,
    /// The context after parsing. Empty if parsing was aborted.
    pub ctx: Context,
    /// The condition that aborted parsing, if any.
    pub error: Option<ParseError>,
}

impl Parsed {
    /// A diagnostic for the error that aborted parsing, placed in the text.
    pub fn diagnostic(&self, err: &ParseError) -> Diagnostic {
        let file = SimpleFile::new(self.name.as_str(), self.text.as_str());
        locate(&file, err.to_diagnostic())
    }
}

/// Load the styles, read the input and parse it.
pub fn parse_input(args: &SharedArgs) -> StrResult<Parsed> {
    let registry = load::registry(&args.styles)?;
    let (name, text) = load::input(&args.input)?;

    let mut ctx = if args.math {
        Context::with_modes(ModeState::MATH)
    } else {
        Context::new()
    };

    tracing::info!(input = %name, bytes = text.len(), "starting to parse");
    let error = match texpat_syntax::parse_with(&text, &registry, &mut ctx) {
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(%err, "parsing was aborted");
            Some(err)
        }
    };
    tracing::info!(nodes = ctx.tree().len(), "finished parsing");

    Ok(Parsed { name, text, ctx, error })
}

/// Format a tree in the output format.
fn format(tree: &Tree, format: OutputFormat) -> StrResult<String> {
    match format {
        OutputFormat::Debug => Ok(format!("{tree:#?}")),
        OutputFormat::Text => Ok(tree.to_string()),
        OutputFormat::Json => serialize(tree, format),
        OutputFormat::Yaml => serialize(tree, format),
    }
}

/// Serialize data to the output format.
fn serialize(data: &impl Serialize, format: OutputFormat) -> StrResult<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(&data).map_err(|e| eco_format!("{e}")),
        _ => serde_json::to_string_pretty(data).map_err(|e| eco_format!("{e}")),
    }
}
