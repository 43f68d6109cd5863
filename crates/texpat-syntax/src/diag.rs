//! Errors and diagnostics.

use std::fmt::{self, Display, Formatter};
use std::ops::Range;

use ecow::{EcoString, EcoVec, eco_vec};

use crate::mode::UnbalancedGroup;
use crate::tree::StructureError;

/// Early-return with a [`StrResult`].
///
/// ```ignore
/// bail!("bailing with a {}", "string result");
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! __bail {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        return Err($crate::diag::eco_format!($fmt $(, $arg)*))
    };
}

#[rustfmt::skip]
#[doc(inline)]
pub use {
    crate::__bail as bail,
    ecow::eco_format,
};

/// A result type with a string error message.
///
/// Used for contract violations in style data, which are detected when the
/// data is loaded and not while parsing.
pub type StrResult<T> = Result<T, EcoString>;

/// A condition that aborts a parse.
///
/// Unrecognized input never produces one of these: unknown symbols, commands
/// and environments degrade to placeholder nodes instead.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    /// The style data ended a group that was never begun.
    UnbalancedGroup {
        /// The byte offset at which the offending item matched.
        offset: usize,
    },
    /// The input nests deeper than the parser is willing to recurse.
    TooDeep {
        /// The byte offset at which the limit was hit.
        offset: usize,
    },
    /// A node was attached where the tree does not permit it.
    Structure(StructureError),
}

impl ParseError {
    pub(crate) fn unbalanced(_: UnbalancedGroup, offset: usize) -> Self {
        Self::UnbalancedGroup { offset }
    }
}

impl ParseError {
    /// The absolute byte offset at which parsing was aborted, if known.
    pub fn offset(&self) -> Option<usize> {
        match *self {
            Self::UnbalancedGroup { offset } | Self::TooDeep { offset } => Some(offset),
            Self::Structure(_) => None,
        }
    }

    /// The error as a diagnostic pointing at its offset.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let offset = self.offset().unwrap_or_default();
        let diag = Diagnostic::error(offset..offset, eco_format!("{self}"));
        match self {
            Self::UnbalancedGroup { .. } => {
                diag.with_hint("check the GROUP operations of the loaded style packages")
            }
            Self::TooDeep { .. } => diag.with_hint("try to split up deeply nested groups"),
            Self::Structure(_) => diag,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::UnbalancedGroup { offset } => {
                write!(f, "{UnbalancedGroup} (at byte {offset})")
            }
            Self::TooDeep { offset } => {
                write!(f, "maximum nesting depth exceeded (at byte {offset})")
            }
            Self::Structure(err) => Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<StructureError> for ParseError {
    fn from(err: StructureError) -> Self {
        Self::Structure(err)
    }
}

/// The severity of a [`Diagnostic`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Severity {
    /// A problem that made part of the document unusable.
    Error,
    /// A non-fatal problem.
    Warning,
}

/// A problem found in the source text that did not abort parsing.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Diagnostic {
    /// Whether the diagnostic is an error or a warning.
    pub severity: Severity,
    /// The absolute byte range of the problem in the fed source.
    pub range: Range<usize>,
    /// The zero-based line at which the problem starts.
    pub line: usize,
    /// The zero-based column (in characters) at which the problem starts.
    pub column: usize,
    /// A message describing the problem.
    pub message: EcoString,
    /// Additional hints to the user, indicating how this problem could be
    /// avoided or worked around.
    pub hints: EcoVec<EcoString>,
}

impl Diagnostic {
    /// Create a new, bare warning.
    pub fn warning(range: Range<usize>, message: impl Into<EcoString>) -> Self {
        Self {
            severity: Severity::Warning,
            range,
            line: 0,
            column: 0,
            message: message.into(),
            hints: eco_vec![],
        }
    }

    /// Create a new, bare error.
    pub fn error(range: Range<usize>, message: impl Into<EcoString>) -> Self {
        Self { severity: Severity::Error, ..Self::warning(range, message) }
    }

    /// Set the line and column the diagnostic starts at.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Adds a user-facing hint to the diagnostic.
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}:{}: {severity}: {}", self.line + 1, self.column + 1, self.message)
    }
}
