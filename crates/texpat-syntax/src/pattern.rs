use std::fmt::{self, Display, Formatter};

use ecow::EcoString;
use unscanny::Scanner;

use crate::diag::{StrResult, bail};

/// One component of a [`Pattern`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PatternPart {
    /// Text that must appear verbatim.
    Text(EcoString),
    /// Any run of whitespace.
    Space,
    /// The zero-based index of a parameter.
    Param(usize),
}

/// What a symbol or command must match, parsed once from its declaration.
///
/// In the declaration, whitespace runs stand for any whitespace, `#1`, `#2`,
/// ... refer to the item's parameters and `##` is a literal `#`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Pattern {
    source: EcoString,
    parts: Vec<PatternPart>,
}

impl Pattern {
    /// Parse a pattern declaration for an item with `params` parameters.
    pub fn parse(source: &str, params: usize) -> StrResult<Self> {
        let mut s = Scanner::new(source);
        let mut parts = vec![];
        let mut text = EcoString::new();

        fn flush(text: &mut EcoString, parts: &mut Vec<PatternPart>) {
            if !text.is_empty() {
                parts.push(PatternPart::Text(std::mem::take(text)));
            }
        }

        while let Some(c) = s.peek() {
            if c.is_whitespace() {
                flush(&mut text, &mut parts);
                s.eat_whitespace();
                parts.push(PatternPart::Space);
            } else if s.eat_if('#') {
                if s.eat_if('#') {
                    text.push('#');
                    continue;
                }

                let digits = s.eat_while(|c: char| c.is_ascii_digit());
                if digits.is_empty() {
                    bail!("malformed placeholder in pattern `{}`", source);
                }

                let number = digits.parse::<usize>().unwrap_or(usize::MAX);
                if number == 0 || number > params {
                    bail!(
                        "placeholder #{} in pattern `{}` refers to a missing parameter \
                         (the item declares {} parameters)",
                        digits,
                        source,
                        params,
                    );
                }

                flush(&mut text, &mut parts);
                parts.push(PatternPart::Param(number - 1));
            } else {
                text.push(c);
                s.eat();
            }
        }

        flush(&mut text, &mut parts);
        Ok(Self { source: source.into(), parts })
    }

    /// The declaration this pattern was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The parsed components.
    pub fn parts(&self) -> &[PatternPart] {
        &self.parts
    }

    /// Whether the pattern matches the empty string only.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The first character of the pattern, if it starts with literal text.
    pub fn first_char(&self) -> Option<char> {
        match self.parts.first()? {
            PatternPart::Text(text) => text.chars().next(),
            _ => None,
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(&self.source)
    }
}
