use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{Files, SimpleFile};
use codespan_reporting::term;
use ecow::{EcoString, eco_format};
use texpat_syntax::{NodeKind, NodeRef, Severity, StrResult};

use crate::args::{CheckCommand, DiagnosticFormat};
use crate::parse::parse_input;
use crate::{set_failed, terminal};

type SourceDiagnostic = texpat_syntax::Diagnostic;

/// Execute a check command.
pub fn check(command: &CheckCommand) -> StrResult<()> {
    let parsed = parse_input(&command.common)?;
    let file = SimpleFile::new(parsed.name.as_str(), parsed.text.as_str());

    let mut diagnostics = parsed.ctx.diagnostics().to_vec();
    for node in parsed.ctx.tree().roots() {
        unknown(&file, node, true, &mut diagnostics);
    }
    if let Some(err) = &parsed.error {
        diagnostics.push(parsed.diagnostic(err));
    }
    diagnostics.sort_by_key(|diag| diag.range.start);

    tracing::info!(problems = diagnostics.len(), "finished checking");
    if !diagnostics.is_empty() {
        set_failed();
    }

    print_diagnostics(&parsed.name, &parsed.text, &diagnostics, command.diagnostic_format)
        .map_err(|err| eco_format!("failed to print diagnostics ({err})"))
}

/// Collect warnings for unknown commands and environments below a node.
///
/// The begin and end commands of an environment are not reported on their
/// own, since their names are given by the environment.
fn unknown(
    file: &SimpleFile<&str, &str>,
    node: NodeRef<'_>,
    report: bool,
    out: &mut Vec<SourceDiagnostic>,
) {
    let message = match node.kind() {
        NodeKind::Command { name, command: None } if report => {
            Some(eco_format!("unknown command `\\{name}`"))
        }
        NodeKind::Environment { name, environment: None, .. } => {
            Some(eco_format!("unknown environment `{name}`"))
        }
        _ => None,
    };

    if let Some(message) = message {
        out.push(warning(file, node.range(), message));
    }

    let environment = matches!(node.kind(), NodeKind::Environment { .. });
    for (i, child) in node.children().enumerate() {
        unknown(file, child, !environment || i == 1, out);
    }
}

/// Create a warning for an unknown construct.
fn warning(
    file: &SimpleFile<&str, &str>,
    range: Range<usize>,
    message: EcoString,
) -> SourceDiagnostic {
    let diag = SourceDiagnostic::warning(range, message)
        .with_hint("register it in a style package to recognize it");
    locate(file, diag)
}

/// Set the line and column of a diagnostic from the start of its range.
pub fn locate(file: &SimpleFile<&str, &str>, diag: SourceDiagnostic) -> SourceDiagnostic {
    match file.location((), diag.range.start) {
        Ok(loc) => diag.at(loc.line_number - 1, loc.column_number - 1),
        Err(_) => diag,
    }
}

/// Print diagnostic messages to the terminal.
pub fn print_diagnostics(
    name: &str,
    text: &str,
    diagnostics: &[SourceDiagnostic],
    diagnostic_format: DiagnosticFormat,
) -> Result<(), codespan_reporting::files::Error> {
    let file = SimpleFile::new(name, text);
    let mut config = term::Config { tab_width: 2, ..Default::default() };
    if diagnostic_format == DiagnosticFormat::Short {
        config.display_style = term::DisplayStyle::Short;
    }

    for diagnostic in diagnostics {
        let diag = match diagnostic.severity {
            Severity::Error => Diagnostic::error(),
            Severity::Warning => Diagnostic::warning(),
        }
        .with_message(diagnostic.message.clone())
        .with_notes(
            diagnostic
                .hints
                .iter()
                .map(|e| (eco_format!("hint: {e}")).into())
                .collect(),
        )
        .with_labels(vec![Label::primary((), diagnostic.range.clone())]);

        term::emit(&mut terminal::out(), &config, &file, &diag)?;
    }

    Ok(())
}
