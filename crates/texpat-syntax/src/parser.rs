use std::ops::Range;
use std::sync::Arc;

use ecow::{EcoString, eco_format};
use rustc_hash::FxHashSet;
use unscanny::Scanner;

use crate::context::{Comment, Context};
use crate::diag::{Diagnostic, ParseError};
use crate::mode::{Operation, State};
use crate::pattern::PatternPart;
use crate::registry::Registry;
use crate::style::{Command, Parameter, Symbol};
use crate::tree::{NodeId, NodeKind, Tree};

/// How deeply tokens may nest before parsing is aborted.
const MAX_DEPTH: usize = 256;

/// Parse a complete document.
pub fn parse(text: &str, registry: &Registry) -> Result<Tree, ParseError> {
    let mut ctx = Context::new();
    parse_with(text, registry, &mut ctx)?;
    Ok(ctx.into_tree())
}

/// Parse the next chunk of a document, continuing where the context left off.
///
/// Returns the top-level nodes recognized in this chunk. Node ranges are
/// absolute, that is they count the bytes of all previous chunks. On error,
/// the context is left as it was before the call.
pub fn parse_with(
    text: &str,
    registry: &Registry,
    ctx: &mut Context,
) -> Result<Vec<NodeId>, ParseError> {
    let first = ctx.tree.root_ids().len();
    let mut p = Parser::new(text, registry, ctx);
    let checkpoint = p.checkpoint();
    if let Err(err) = p.parse_all() {
        p.restore(checkpoint);
        return Err(err);
    }

    let roots = ctx.tree.root_ids()[first..].to_vec();
    ctx.advance(text);
    Ok(roots)
}

/// Whether a string is a command or environment name: a run of letters,
/// digits and `@`, optionally followed by a `*`.
pub fn is_ident(text: &str) -> bool {
    let body = text.strip_suffix('*').unwrap_or(text);
    !body.is_empty() && body.chars().all(is_ident_char)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '@'
}

fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// The outcome of trying to recognize something: a fatal error, a mismatch
/// (`None`) or a match.
type Attempt<T> = Result<Option<T>, ParseError>;

/// Recognizes tokens in one chunk of text.
struct Parser<'a> {
    s: Scanner<'a>,
    registry: &'a Registry,
    ctx: &'a mut Context,
    /// How many tokens are currently being parsed inside each other.
    depth: usize,
    /// Candidates known not to match at a cursor position in a state.
    failed: FxHashSet<(usize, State, usize)>,
}

/// Everything needed to undo a failed attempt.
struct Checkpoint {
    cursor: usize,
    state: State,
    current: Option<NodeId>,
    nodes: usize,
    roots: usize,
    comments: usize,
    diagnostics: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, registry: &'a Registry, ctx: &'a mut Context) -> Self {
        Self {
            s: Scanner::new(text),
            registry,
            ctx,
            depth: 0,
            failed: FxHashSet::default(),
        }
    }

    fn parse_all(&mut self) -> Result<(), ParseError> {
        while self.parse_token()?.is_some() {}
        Ok(())
    }

    /// Parse the next token and attach it to the current node.
    ///
    /// Returns `None` only at the end of the text.
    fn parse_token(&mut self) -> Attempt<NodeId> {
        self.nested(|p| {
            let token = if let Some(space) = p.parse_space() {
                space
            } else if p.s.done() {
                return Ok(None);
            } else if let Some(env) = p.attempt(Self::parse_environment)? {
                env
            } else if let Some(command) = p.attempt(Self::parse_command)? {
                command
            } else if let Some(symbol) = p.parse_symbol()? {
                symbol
            } else {
                return Ok(None);
            };

            p.ctx.tree.attach(p.ctx.current, token)?;
            Ok(Some(token))
        })
    }

    /// Parse whitespace and comments into a space token.
    ///
    /// Skipped comments stay consumed even if no whitespace follows them.
    fn parse_space(&mut self) -> Option<NodeId> {
        let start = self.s.cursor();
        let line_breaks = self.eat_space()?;
        let range = self.range_from(start);
        Some(self.ctx.tree.push(NodeKind::Space { line_breaks }, range))
    }

    /// Parse `\begin{name}` ... `\end{name}`.
    fn parse_environment(&mut self) -> Attempt<NodeId> {
        let start = self.s.cursor();
        if !self.s.eat_if("\\begin") {
            return Ok(None);
        }

        self.eat_space();
        let Some(name) = self.eat_group_name() else { return Ok(None) };

        let registry = self.registry;
        let environment = registry.environments(self.ctx.state.modes(), name).next().cloned();
        let begin = self.parse_command_tail(name, start)?;

        let body_start = self.s.cursor();
        let body = self.ctx.tree.push(NodeKind::EnvironmentBody, self.range_from(body_start));
        let label = eco_format!("\\end{{{name}}}");
        let terminated = match &environment {
            Some(env) if env.raw() => {
                let lexeme = env.item().lexeme().unwrap_or("raw");
                self.parse_raw(body, &label, lexeme)?
            }
            _ => {
                let prev = self.ctx.current.replace(body);
                let found = self.until_label(&label)?;
                self.ctx.current = prev;
                found
            }
        };
        self.ctx.tree.set_end(body, self.pos());

        let end_name = eco_format!("end{name}");
        let end_start = self.s.cursor();
        let end = if terminated {
            self.s.eat_if(label.as_str());
            self.parse_command_tail(&end_name, end_start)?
        } else {
            self.unterminated(name, start);
            let range = self.range_from(end_start);
            self.ctx.tree.push(NodeKind::Command { name: end_name, command: None }, range)
        };

        let kind = NodeKind::Environment { name: name.into(), environment, terminated };
        let node = self.ctx.tree.push(kind, self.range_from(start));
        for child in [begin, body, end] {
            self.ctx.tree.attach(Some(node), child)?;
        }

        Ok(Some(node))
    }

    /// Keep everything up to the end label as a single source token.
    fn parse_raw(&mut self, body: NodeId, label: &str, lexeme: &str) -> Result<bool, ParseError> {
        let start = self.s.cursor();
        let found = self.s.after().find(label);
        let len = found.unwrap_or(self.s.after().len());
        self.s.jump(start + len);

        let kind = NodeKind::Source { lexeme: lexeme.into(), text: self.s.from(start).into() };
        let source = self.ctx.tree.push(kind, self.range_from(start));
        self.ctx.tree.attach(Some(body), source)?;
        Ok(found.is_some())
    }

    /// Record that an environment's end label is missing.
    fn unterminated(&mut self, name: &str, start: usize) {
        let offset = self.ctx.offset + start;
        tracing::warn!(environment = name, offset, "unterminated environment");

        let (line, column) = self.ctx.position_after(self.s.get(0..start));
        let diag = Diagnostic::warning(
            self.range_from(start),
            eco_format!("unterminated environment `{name}`"),
        )
        .at(line, column)
        .with_hint(eco_format!("add `\\end{{{name}}}` to close it"));
        self.ctx.diagnostics.push(diag);
    }

    /// Parse a backslash followed by a name.
    fn parse_command(&mut self) -> Attempt<NodeId> {
        let start = self.s.cursor();
        if !self.s.eat_if('\\') {
            return Ok(None);
        }

        let Some(name) = self.eat_ident() else { return Ok(None) };
        self.parse_command_tail(name, start).map(Some)
    }

    /// Parse what follows a command name, falling back to an unrecognized
    /// command if no registered command of that name matches.
    fn parse_command_tail(&mut self, name: &str, start: usize) -> Result<NodeId, ParseError> {
        let registry = self.registry;
        let candidates = registry.commands(self.ctx.state.modes(), name);
        let kind = |command: &Arc<Command>| NodeKind::Command {
            name: name.into(),
            command: Some(Arc::clone(command)),
        };

        if let Some(node) = self.parse_patterns(start, candidates, kind)? {
            return Ok(node);
        }

        let range = self.range_from(start);
        Ok(self.ctx.tree.push(NodeKind::Command { name: name.into(), command: None }, range))
    }

    /// Parse a symbol keyed by the next character, falling back to that
    /// character alone.
    fn parse_symbol(&mut self) -> Attempt<NodeId> {
        let start = self.s.cursor();
        let Some(c) = self.s.peek() else { return Ok(None) };

        let registry = self.registry;
        let candidates = registry.symbols(self.ctx.state.modes(), c);
        let kind = |symbol: &Arc<Symbol>| NodeKind::Symbol {
            symbol: Some(Arc::clone(symbol)),
            text: EcoString::new(),
        };

        if let Some(node) = self.parse_patterns(start, candidates, kind)? {
            return Ok(Some(node));
        }

        self.s.eat();
        let kind = NodeKind::Symbol { symbol: None, text: self.s.from(start).into() };
        Ok(Some(self.ctx.tree.push(kind, self.range_from(start))))
    }

    /// Try candidates in order until one matches.
    fn parse_patterns<T>(
        &mut self,
        start: usize,
        candidates: impl Iterator<Item = &'a Arc<T>>,
        kind: impl Fn(&Arc<T>) -> NodeKind,
    ) -> Attempt<NodeId>
    where
        T: AsRef<Symbol> + 'a,
    {
        for candidate in candidates {
            let key = (self.s.cursor(), self.ctx.state.clone(), Arc::as_ptr(candidate) as usize);
            if self.failed.contains(&key) {
                continue;
            }

            let symbol = (**candidate).as_ref();
            tracing::trace!(
                pattern = symbol.pattern().as_str(),
                offset = self.pos(),
                "trying candidate",
            );

            let node = self.attempt(|p| p.parse_pattern(start, symbol, kind(candidate)))?;
            if node.is_some() {
                return Ok(node);
            }
            self.failed.insert(key);
        }
        Ok(None)
    }

    /// Match a single candidate's pattern at the cursor.
    ///
    /// The token is created up front so that its parameters can be attached
    /// to it while they are parsed.
    fn parse_pattern(&mut self, start: usize, symbol: &Symbol, kind: NodeKind) -> Attempt<NodeId> {
        let node = self.ctx.tree.push(kind, self.range_from(start));
        let parts = symbol.pattern().parts();

        for (i, part) in parts.iter().enumerate() {
            match part {
                PatternPart::Text(text) => {
                    self.skip_comments();
                    if !self.s.eat_if(text.as_str()) {
                        return Ok(None);
                    }
                }
                PatternPart::Space => {
                    if self.eat_space().is_none() {
                        return Ok(None);
                    }
                }
                &PatternPart::Param(index) => {
                    // Literal text right after a parameter terminates it.
                    let label = match parts.get(i + 1) {
                        Some(PatternPart::Text(text)) => Some(text.as_str()),
                        _ => None,
                    };
                    let Some(parameter) = symbol.parameter(index) else {
                        return Ok(None);
                    };
                    if self.parse_parameter(node, index, parameter, label)?.is_none() {
                        return Ok(None);
                    }
                }
            }
        }

        self.apply(symbol.operations(), start)?;
        self.ctx.tree.set_end(node, self.pos());
        Ok(Some(node))
    }

    /// Parse a parameter's content and attach it to its owner.
    ///
    /// Without a label, the content is either a brace-delimited run of
    /// tokens or a single token. With a label, the content runs up to the
    /// label, which is left for the caller to consume.
    fn parse_parameter(
        &mut self,
        owner: NodeId,
        index: usize,
        parameter: &Parameter,
        label: Option<&str>,
    ) -> Attempt<NodeId> {
        let start = self.s.cursor();
        let space_prefix = self.eat_space().is_some();
        let braced = label.is_none() && self.s.eat_if('{');

        let kind = NodeKind::Parameter { index, braced, space_prefix };
        let node = self.ctx.tree.push(kind, self.range_from(start));
        self.ctx.tree.attach(Some(owner), node)?;
        self.apply(parameter.operations(), start)?;

        let prev = self.ctx.current.replace(node);
        let found = match label {
            Some(label) => self.until_label(label)?,
            None if braced => self.until_label("}")? && self.s.eat_if('}'),
            None => self.parse_token()?.is_some(),
        };
        self.ctx.current = prev;

        if !found {
            return Ok(None);
        }

        self.ctx.tree.set_end(node, self.pos());
        Ok(Some(node))
    }

    /// Parse tokens into the current node until the text at the cursor
    /// starts with the label. Returns whether the label was found.
    ///
    /// Comments in front of the label are skipped.
    fn until_label(&mut self, label: &str) -> Result<bool, ParseError> {
        loop {
            self.skip_comments();
            if self.s.after().starts_with(label) {
                return Ok(true);
            }
            if self.parse_token()?.is_none() {
                return Ok(false);
            }
        }
    }

    fn eat_ident(&mut self) -> Option<&'a str> {
        let start = self.s.cursor();
        if self.s.eat_while(is_ident_char).is_empty() {
            return None;
        }
        self.s.eat_if('*');
        Some(self.s.from(start))
    }

    /// Eat `{name}` where name is an identifier.
    fn eat_group_name(&mut self) -> Option<&'a str> {
        if !self.s.eat_if('{') {
            return None;
        }
        let name = self.eat_ident()?;
        self.s.eat_if('}').then_some(name)
    }

    /// Apply operations to the mode state of the parse.
    fn apply(&mut self, operations: &[Operation], start: usize) -> Result<(), ParseError> {
        let offset = self.ctx.offset + start;
        self.ctx.state = self
            .ctx
            .state
            .apply(operations)
            .map_err(|err| ParseError::unbalanced(err, offset))?;
        Ok(())
    }
}

impl Parser<'_> {
    /// Eat any interleaving of whitespace and comments. Returns the number of
    /// line breaks if at least one whitespace character was eaten.
    fn eat_space(&mut self) -> Option<usize> {
        let mut whitespace = false;
        let mut line_breaks = 0;
        loop {
            if self.skip_comment() {
                continue;
            }
            match self.s.peek() {
                Some(c) if c.is_whitespace() => {
                    whitespace = true;
                    if self.eat_newline() {
                        line_breaks += 1;
                    } else {
                        self.s.eat();
                    }
                }
                _ => break,
            }
        }
        whitespace.then_some(line_breaks)
    }

    fn skip_comments(&mut self) {
        while self.skip_comment() {}
    }

    /// Skip a `%` comment up to and including the line break and the leading
    /// blanks of the next line.
    fn skip_comment(&mut self) -> bool {
        let start = self.s.cursor();
        if !self.s.eat_if('%') {
            return false;
        }

        let text = self.s.eat_until(is_newline);
        if self.eat_newline() {
            self.s.eat_while(|c: char| c == ' ' || c == '\t');
        }

        let range = self.range_from(start);
        self.ctx.comments.push(Comment { text: text.into(), range });
        true
    }

    fn eat_newline(&mut self) -> bool {
        self.s.eat_if("\r\n") || self.s.eat_if('\n') || self.s.eat_if('\r')
    }

    /// The absolute offset of the cursor.
    fn pos(&self) -> usize {
        self.ctx.offset + self.s.cursor()
    }

    /// The absolute range from a cursor position in this chunk to the cursor.
    fn range_from(&self, start: usize) -> Range<usize> {
        self.ctx.offset + start..self.pos()
    }

    /// Run a nested parse, failing once nesting gets too deep.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Attempt<T>) -> Attempt<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep { offset: self.pos() });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run an attempt, undoing all of its effects unless it matched.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Attempt<T>) -> Attempt<T> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if !matches!(result, Ok(Some(_))) {
            self.restore(checkpoint);
        }
        result
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.s.cursor(),
            state: self.ctx.state.clone(),
            current: self.ctx.current,
            nodes: self.ctx.tree.len(),
            roots: self.ctx.tree.root_ids().len(),
            comments: self.ctx.comments.len(),
            diagnostics: self.ctx.diagnostics.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.s.jump(checkpoint.cursor);
        self.ctx.state = checkpoint.state;
        self.ctx.current = checkpoint.current;
        self.ctx.tree.truncate(checkpoint.nodes, checkpoint.roots);
        self.ctx.comments.truncate(checkpoint.comments);
        self.ctx.diagnostics.truncate(checkpoint.diagnostics);
    }
}
