use std::ops::Range;

use ecow::EcoString;

use crate::diag::Diagnostic;
use crate::mode::{ModeState, State};
use crate::tree::{NodeId, Tree};

/// Everything that carries over between successive chunks of one document.
///
/// A fresh context starts in the default mode state at the beginning of the
/// document. Feeding text through [`parse_with`](crate::parse_with) appends
/// the recognized nodes to the context's tree and continues in whatever mode
/// state the previous chunk left behind.
#[derive(Debug, Default, Clone)]
pub struct Context {
    /// The live modes and the saved states of open groups.
    pub(crate) state: State,
    /// The node that newly recognized tokens are attached to. `None` at the
    /// top level.
    pub(crate) current: Option<NodeId>,
    pub(crate) tree: Tree,
    /// The absolute byte offset of the next chunk.
    pub(crate) offset: usize,
    /// The zero-based line the next chunk starts on.
    pub(crate) line: usize,
    /// The zero-based column (in characters) the next chunk starts at.
    pub(crate) column: usize,
    pub(crate) comments: Vec<Comment>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// A skipped comment.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Comment {
    /// The text between the `%` and the end of the line.
    pub text: EcoString,
    /// The absolute byte range of the comment, including the `%`, the line
    /// break and the leading blanks of the next line.
    pub range: Range<usize>,
}

impl Context {
    /// Create a context for a new document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a new document that starts in the given modes,
    /// for example to parse a formula on its own.
    pub fn with_modes(modes: ModeState) -> Self {
        Self { state: State::new(modes), ..Self::default() }
    }

    /// The mode state the next chunk starts in.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The tree of all nodes recognized so far.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Consume the context, keeping only the tree.
    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// The absolute byte offset of the next chunk.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The zero-based line the next chunk starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The comments skipped so far, in source order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The problems found so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The line and column reached after `text`, when `text` starts where
    /// the next chunk starts.
    pub(crate) fn position_after(&self, text: &str) -> (usize, usize) {
        let mut line = self.line;
        let mut column = self.column;
        let mut prev = None;
        for c in text.chars() {
            match c {
                '\n' if prev == Some('\r') => {}
                '\n' | '\r' => {
                    line += 1;
                    column = 0;
                }
                _ => column += 1,
            }
            prev = Some(c);
        }
        (line, column)
    }

    /// Move past a fully parsed chunk.
    pub(crate) fn advance(&mut self, text: &str) {
        (self.line, self.column) = self.position_after(text);
        self.offset += text.len();
    }
}
