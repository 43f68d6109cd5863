use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Range;
use std::sync::Arc;

use ecow::EcoString;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::pattern::{Pattern, PatternPart};
use crate::style::{Command, Environment, Parameter, Symbol};

/// The index of a node in a [`Tree`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The position of the node in the tree's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node in the tree represents.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// A matched symbol, or a single unrecognized character.
    Symbol {
        symbol: Option<Arc<Symbol>>,
        /// The source text of an unrecognized symbol. Empty otherwise.
        text: EcoString,
    },
    /// A backslash followed by a name. Recognized if a command of that name
    /// matched.
    Command { name: EcoString, command: Option<Arc<Command>> },
    /// The content of a symbol's or command's parameter.
    Parameter {
        /// The parameter's position in the owning item's declaration.
        index: usize,
        /// Whether the content was delimited by braces.
        braced: bool,
        /// Whether whitespace preceded the content.
        space_prefix: bool,
    },
    /// A `\begin{name}` ... `\end{name}` block with exactly three children:
    /// the begin command, the body and the end command.
    Environment {
        name: EcoString,
        environment: Option<Arc<Environment>>,
        /// Whether the end label was found.
        terminated: bool,
    },
    /// The content between an environment's begin and end commands.
    EnvironmentBody,
    /// Whitespace and skipped comments.
    Space {
        /// 0 for inline space, 1 for a line break, 2 or more for a paragraph
        /// break.
        line_breaks: usize,
    },
    /// Unparsed source text.
    Source { lexeme: EcoString, text: EcoString },
}

impl NodeKind {
    /// A human-readable name for the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Symbol { .. } => "symbol",
            Self::Command { .. } => "command",
            Self::Parameter { .. } => "parameter",
            Self::Environment { .. } => "environment",
            Self::EnvironmentBody => "environment body",
            Self::Space { .. } => "space",
            Self::Source { .. } => "source",
        }
    }

    /// Whether this kind can appear in running content, that is at the top
    /// level, in a parameter or in an environment body.
    pub fn is_token(&self) -> bool {
        !matches!(self, Self::Parameter { .. } | Self::EnvironmentBody)
    }
}

/// A node in a [`Tree`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    kind: NodeKind,
    range: Range<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    descendants: usize,
    attached: bool,
}

impl Node {
    /// What the node represents.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The absolute byte range of the node in the fed source.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The parent of the node, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The number of nodes in this node's subtree, including itself.
    pub fn descendants(&self) -> usize {
        self.descendants
    }
}

/// An arena of nodes together with the ordered list of top-level nodes.
#[derive(Default, Clone, Eq, PartialEq, Hash)]
pub struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The ids of the top-level nodes.
    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// The top-level nodes.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> {
        self.roots.iter().map(|&id| NodeRef { tree: self, id })
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Add a detached node to the arena.
    pub fn push(&mut self, kind: NodeKind, range: Range<usize>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            range,
            parent: None,
            children: vec![],
            descendants: 1,
            attached: false,
        });
        id
    }

    /// Attach a detached node as the last child of `parent`, or as the last
    /// top-level node if there is no parent.
    ///
    /// Only structurally valid combinations are accepted: parameters belong to
    /// symbols and commands, bodies belong to environments, an environment
    /// holds a begin command, a body and an end command in that order, and
    /// all other nodes are running content.
    pub fn attach(&mut self, parent: Option<NodeId>, child: NodeId) -> Result<(), StructureError> {
        let node = self.nodes.get(child.0).ok_or(StructureError::Missing)?;
        if node.attached {
            return Err(StructureError::AlreadyAttached);
        }

        let child_kind = &node.kind;
        let Some(parent) = parent else {
            if !child_kind.is_token() {
                return Err(StructureError::InvalidRoot { child: child_kind.name() });
            }
            self.nodes[child.0].attached = true;
            self.roots.push(child);
            return Ok(());
        };

        let host = self.nodes.get(parent.0).ok_or(StructureError::Missing)?;
        let valid = match (&host.kind, child_kind) {
            (
                NodeKind::Symbol { .. } | NodeKind::Command { .. },
                NodeKind::Parameter { .. },
            ) => true,
            (NodeKind::Environment { .. }, kind) => {
                let expected = match host.children.len() {
                    0 | 2 => matches!(kind, NodeKind::Command { .. }),
                    1 => matches!(kind, NodeKind::EnvironmentBody),
                    _ => false,
                };
                if !expected {
                    return Err(StructureError::EnvironmentShape {
                        index: host.children.len(),
                        child: kind.name(),
                    });
                }
                true
            }
            (NodeKind::Parameter { .. } | NodeKind::EnvironmentBody, kind) => kind.is_token(),
            _ => false,
        };

        if !valid {
            return Err(StructureError::InvalidParent {
                child: child_kind.name(),
                parent: host.kind.name(),
            });
        }

        // The child is detached, so it is the root of its own subtree and
        // attaching it below one of its descendants would close a cycle.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(StructureError::Cycle);
            }
            cursor = self.nodes[id.0].parent;
        }

        let added = self.nodes[child.0].descendants;
        let node = &mut self.nodes[child.0];
        node.attached = true;
        node.parent = Some(parent);
        self.nodes[parent.0].children.push(child);

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            let ancestor = &mut self.nodes[id.0];
            ancestor.descendants += added;
            cursor = ancestor.parent;
        }

        Ok(())
    }

    /// Drop all nodes created after the arena had `nodes` entries and all
    /// top-level nodes after the first `roots`.
    ///
    /// Callers must ensure that no surviving node refers to a dropped one.
    pub(crate) fn truncate(&mut self, nodes: usize, roots: usize) {
        self.nodes.truncate(nodes);
        self.roots.truncate(roots);
    }

    /// Set where a node ends once its extent is known.
    pub(crate) fn set_end(&mut self, id: NodeId, end: usize) {
        self.nodes[id.0].range.end = end;
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.roots().try_for_each(|node| Display::fmt(&node, f))
    }
}

impl Debug for Tree {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self.roots()).finish()
    }
}

impl Serialize for Tree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.roots())
    }
}

/// A node together with the tree it lives in, for navigation.
#[derive(Copy, Clone)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// The node's id.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The underlying node.
    pub fn node(self) -> &'a Node {
        &self.tree.nodes[self.id.0]
    }

    /// What the node represents.
    pub fn kind(self) -> &'a NodeKind {
        &self.node().kind
    }

    /// The absolute byte range of the node in the fed source.
    pub fn range(self) -> Range<usize> {
        self.node().range()
    }

    /// The number of nodes in this node's subtree, including itself.
    pub fn descendants(self) -> usize {
        self.node().descendants
    }

    /// The parent node, if any.
    pub fn parent(self) -> Option<Self> {
        self.node().parent.map(|id| Self { tree: self.tree, id })
    }

    /// The position of the node among its parent's children or among the
    /// top-level nodes.
    pub fn index(self) -> Option<usize> {
        let siblings = match self.node().parent {
            Some(parent) => &self.tree.nodes[parent.0].children,
            None => &self.tree.roots,
        };
        siblings.iter().position(|&id| id == self.id)
    }

    /// The child at the given position.
    pub fn child(self, index: usize) -> Option<Self> {
        let id = *self.node().children.get(index)?;
        Some(Self { tree: self.tree, id })
    }

    /// The node's children.
    pub fn children(self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node().children.iter().map(move |&id| NodeRef { tree, id })
    }

    /// The matched symbol.
    ///
    /// For a command, this is the symbol describing what follows its name.
    /// Environments and their bodies report their begin command's symbol.
    pub fn symbol(self) -> Option<&'a Symbol> {
        match self.kind() {
            NodeKind::Symbol { symbol, .. } => symbol.as_deref(),
            NodeKind::Command { command, .. } => command.as_deref().map(Command::symbol),
            NodeKind::Environment { .. } => self.child(0)?.symbol(),
            NodeKind::EnvironmentBody => self.parent()?.symbol(),
            _ => None,
        }
    }

    /// The matched command. Environments and their bodies report their begin
    /// command.
    pub fn command(self) -> Option<&'a Command> {
        match self.kind() {
            NodeKind::Command { command, .. } => command.as_deref(),
            NodeKind::Environment { .. } => self.child(0)?.command(),
            NodeKind::EnvironmentBody => self.parent()?.command(),
            _ => None,
        }
    }

    /// The matched environment of an environment or its body.
    pub fn environment(self) -> Option<&'a Environment> {
        match self.kind() {
            NodeKind::Environment { environment, .. } => environment.as_deref(),
            NodeKind::EnvironmentBody => self.parent()?.environment(),
            _ => None,
        }
    }

    /// The descriptor of a parameter, taken from its parent's symbol.
    pub fn parameter(self) -> Option<&'a Parameter> {
        match self.kind() {
            NodeKind::Parameter { index, .. } => self.parent()?.symbol()?.parameter(*index),
            _ => None,
        }
    }

    /// The semantic tag of whatever the node was recognized as.
    pub fn lexeme(self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Symbol { .. } | NodeKind::Command { .. } => {
                self.symbol()?.item().lexeme()
            }
            NodeKind::Parameter { .. } => self.parameter()?.item().lexeme(),
            NodeKind::Environment { .. } | NodeKind::EnvironmentBody => {
                self.environment()?.item().lexeme()
            }
            NodeKind::Source { lexeme, .. } => Some(lexeme),
            NodeKind::Space { .. } => None,
        }
    }

    /// Whether the node stands for a registered item or for plain structure,
    /// as opposed to a placeholder for unknown input.
    pub fn is_recognized(self) -> bool {
        match self.kind() {
            NodeKind::Symbol { symbol, .. } => symbol.is_some(),
            NodeKind::Command { command, .. } => command.is_some(),
            NodeKind::Environment { environment, .. } => environment.is_some(),
            _ => true,
        }
    }

    /// Render the components of a matched pattern, substituting parameters.
    fn fmt_pattern(self, pattern: &Pattern, f: &mut Formatter) -> fmt::Result {
        for part in pattern.parts() {
            match part {
                PatternPart::Text(text) => f.write_str(text)?,
                PatternPart::Space => f.write_str(" ")?,
                PatternPart::Param(i) => {
                    let param = self.children().find(|child| {
                        matches!(child.kind(), NodeKind::Parameter { index, .. } if index == i)
                    });
                    if let Some(param) = param {
                        Display::fmt(&param, f)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn fmt_children(self, f: &mut Formatter) -> fmt::Result {
        self.children().try_for_each(|child| Display::fmt(&child, f))
    }
}

impl Display for NodeRef<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let node = *self;
        match node.kind() {
            NodeKind::Symbol { symbol: Some(symbol), .. } => {
                node.fmt_pattern(symbol.pattern(), f)
            }
            NodeKind::Symbol { symbol: None, text } => f.write_str(text),
            NodeKind::Command { name, command } => {
                write!(f, "\\{name}")?;
                match command {
                    Some(command) => node.fmt_pattern(command.symbol().pattern(), f),
                    None => Ok(()),
                }
            }
            NodeKind::Parameter { braced, space_prefix, .. } => {
                if *space_prefix {
                    f.write_str(" ")?;
                }
                if *braced {
                    f.write_str("{")?;
                }
                node.fmt_children(f)?;
                if *braced {
                    f.write_str("}")?;
                }
                Ok(())
            }
            NodeKind::Environment { name, terminated, .. } => {
                write!(f, "\\begin{{{name}}}")?;
                if let Some(begin) = node.child(0) {
                    begin.fmt_tail(f)?;
                }
                if let Some(body) = node.child(1) {
                    Display::fmt(&body, f)?;
                }
                if *terminated {
                    write!(f, "\\end{{{name}}}")?;
                    if let Some(end) = node.child(2) {
                        end.fmt_tail(f)?;
                    }
                }
                Ok(())
            }
            NodeKind::EnvironmentBody => node.fmt_children(f),
            NodeKind::Space { line_breaks } => f.write_str(match *line_breaks {
                0 => " ",
                1 => "\n",
                _ => "\n\n",
            }),
            NodeKind::Source { text, .. } => f.write_str(text),
        }
    }
}

impl NodeRef<'_> {
    /// Render what follows the name of an environment's begin or end command.
    fn fmt_tail(self, f: &mut Formatter) -> fmt::Result {
        match self.command() {
            Some(command) => self.fmt_pattern(command.symbol().pattern(), f),
            None => Ok(()),
        }
    }
}

impl Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mark = if self.is_recognized() { "" } else { "?" };
        match self.kind() {
            NodeKind::Symbol { symbol: Some(symbol), .. } => {
                write!(f, "Symbol: {:?}", symbol.pattern().as_str())?
            }
            NodeKind::Symbol { symbol: None, text } => write!(f, "Symbol?: {text:?}")?,
            NodeKind::Command { name, command } => {
                write!(f, "Command{mark}({name})")?;
                if let Some(command) = command {
                    write!(f, ": {:?}", command.symbol().pattern().as_str())?;
                }
            }
            NodeKind::Parameter { index, braced, space_prefix } => {
                write!(f, "Parameter({index})")?;
                if *space_prefix {
                    f.write_str(" spaced")?;
                }
                if *braced {
                    f.write_str(" braced")?;
                }
            }
            NodeKind::Environment { name, terminated, .. } => {
                write!(f, "Environment{mark}({name})")?;
                if !*terminated {
                    f.write_str(" unterminated")?;
                }
            }
            NodeKind::EnvironmentBody => f.write_str("EnvironmentBody")?,
            NodeKind::Space { line_breaks } => write!(f, "Space({line_breaks})")?,
            NodeKind::Source { lexeme, text } => write!(f, "Source({lexeme}): {text:?}")?,
        }

        write!(f, " {:?}", self.range())?;
        if self.node().children.is_empty() {
            return Ok(());
        }

        f.write_str(" ")?;
        f.debug_list().entries(self.children()).finish()
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        let kind = self.kind();
        map.serialize_entry("kind", kind.name())?;
        map.serialize_entry("range", &self.range())?;
        map.serialize_entry("recognized", &self.is_recognized())?;
        if let Some(lexeme) = self.lexeme() {
            map.serialize_entry("lexeme", lexeme)?;
        }

        match kind {
            NodeKind::Symbol { symbol, text } => match symbol {
                Some(symbol) => map.serialize_entry("pattern", symbol.pattern().as_str())?,
                None => map.serialize_entry("text", text)?,
            },
            NodeKind::Command { name, command } => {
                map.serialize_entry("name", name)?;
                if let Some(command) = command {
                    map.serialize_entry("pattern", command.symbol().pattern().as_str())?;
                }
            }
            NodeKind::Parameter { index, braced, space_prefix } => {
                map.serialize_entry("index", index)?;
                map.serialize_entry("braced", braced)?;
                map.serialize_entry("space_prefix", space_prefix)?;
            }
            NodeKind::Environment { name, terminated, .. } => {
                map.serialize_entry("name", name)?;
                map.serialize_entry("terminated", terminated)?;
            }
            NodeKind::EnvironmentBody => {}
            NodeKind::Space { line_breaks } => {
                map.serialize_entry("line_breaks", line_breaks)?;
            }
            NodeKind::Source { text, .. } => map.serialize_entry("text", text)?,
        }

        if !self.node().children.is_empty() {
            map.serialize_entry("children", &self.children().collect::<Vec<_>>())?;
        }
        map.end()
    }
}

/// A node was attached where the tree does not permit it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StructureError {
    /// The node does not exist in this tree.
    Missing,
    /// The node already has a place in the tree.
    AlreadyAttached,
    /// The node would become its own ancestor.
    Cycle,
    /// The node kind cannot appear at the top level.
    InvalidRoot { child: &'static str },
    /// The node kind cannot be a child of the parent's kind.
    InvalidParent { child: &'static str, parent: &'static str },
    /// An environment's children must be a command, a body and a command.
    EnvironmentShape { index: usize, child: &'static str },
}

impl Display for StructureError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Missing => f.pad("node does not exist"),
            Self::AlreadyAttached => f.pad("node is already attached"),
            Self::Cycle => f.pad("node cannot be attached below itself"),
            Self::InvalidRoot { child } => write!(f, "a {child} cannot be a top-level node"),
            Self::InvalidParent { child, parent } => {
                write!(f, "a {child} cannot be a child of a {parent}")
            }
            Self::EnvironmentShape { index, child } => {
                write!(f, "an environment cannot have a {child} as child {index}")
            }
        }
    }
}

impl std::error::Error for StructureError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(tree: &mut Tree, text: &str) -> NodeId {
        tree.push(NodeKind::Symbol { symbol: None, text: text.into() }, 0..text.len())
    }

    fn command(tree: &mut Tree, name: &str) -> NodeId {
        tree.push(NodeKind::Command { name: name.into(), command: None }, 0..0)
    }

    fn parameter(tree: &mut Tree, index: usize) -> NodeId {
        tree.push(NodeKind::Parameter { index, braced: true, space_prefix: false }, 0..0)
    }

    #[test]
    fn test_tree_descendants() {
        let mut tree = Tree::new();
        let cmd = command(&mut tree, "emph");
        let param = parameter(&mut tree, 0);
        let a = symbol(&mut tree, "a");
        let b = symbol(&mut tree, "b");
        tree.attach(Some(param), a).unwrap();
        tree.attach(Some(cmd), param).unwrap();
        tree.attach(Some(param), b).unwrap();
        tree.attach(None, cmd).unwrap();

        let root = tree.roots().next().unwrap();
        assert_eq!(root.descendants(), 4);
        assert_eq!(root.child(0).unwrap().descendants(), 3);
        assert_eq!(tree.get(b).unwrap().index(), Some(1));
        assert_eq!(tree.get(b).unwrap().parent().unwrap().id(), param);
        assert_eq!(root.index(), Some(0));
        assert_eq!(tree.to_string(), "\\emph");
        assert_eq!(tree.get(param).unwrap().to_string(), "{ab}");
    }

    #[test]
    fn test_tree_parent_constraints() {
        let mut tree = Tree::new();
        let sym = symbol(&mut tree, "x");
        let param = parameter(&mut tree, 0);
        let space = tree.push(NodeKind::Space { line_breaks: 0 }, 0..1);
        let body = tree.push(NodeKind::EnvironmentBody, 0..0);

        assert_eq!(
            tree.attach(Some(space), param),
            Err(StructureError::InvalidParent { child: "parameter", parent: "space" }),
        );
        assert_eq!(
            tree.attach(None, param),
            Err(StructureError::InvalidRoot { child: "parameter" }),
        );
        assert_eq!(
            tree.attach(Some(sym), space),
            Err(StructureError::InvalidParent { child: "space", parent: "symbol" }),
        );
        assert_eq!(
            tree.attach(Some(param), body),
            Err(StructureError::InvalidParent {
                child: "environment body",
                parent: "parameter",
            }),
        );
        tree.attach(Some(sym), param).unwrap();
        assert_eq!(tree.attach(Some(sym), param), Err(StructureError::AlreadyAttached));
        assert_eq!(tree.attach(Some(param), sym), Err(StructureError::Cycle));
    }

    #[test]
    fn test_tree_environment_shape() {
        let mut tree = Tree::new();
        let env = tree.push(
            NodeKind::Environment { name: "quote".into(), environment: None, terminated: true },
            0..0,
        );
        let begin = command(&mut tree, "quote");
        let body = tree.push(NodeKind::EnvironmentBody, 0..0);
        let end = command(&mut tree, "endquote");
        let extra = command(&mut tree, "x");

        assert_eq!(
            tree.attach(Some(env), body),
            Err(StructureError::EnvironmentShape { index: 0, child: "environment body" }),
        );
        tree.attach(Some(env), begin).unwrap();
        tree.attach(Some(env), body).unwrap();
        tree.attach(Some(env), end).unwrap();
        assert_eq!(
            tree.attach(Some(env), extra),
            Err(StructureError::EnvironmentShape { index: 3, child: "command" }),
        );

        let x = symbol(&mut tree, "x");
        tree.attach(Some(body), x).unwrap();
        tree.attach(None, env).unwrap();
        assert_eq!(tree.get(env).unwrap().descendants(), 5);
        assert_eq!(tree.to_string(), "\\begin{quote}x\\end{quote}");
        assert!(!tree.get(env).unwrap().is_recognized());
    }

    #[test]
    fn test_tree_truncate() {
        let mut tree = Tree::new();
        let a = symbol(&mut tree, "a");
        tree.attach(None, a).unwrap();
        let (nodes, roots) = (tree.len(), tree.root_ids().len());
        let b = symbol(&mut tree, "b");
        tree.attach(None, b).unwrap();
        tree.truncate(nodes, roots);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.to_string(), "a");
        assert!(tree.get(b).is_none());
    }

    #[test]
    fn test_tree_debug_and_serialize() {
        let mut tree = Tree::new();
        let space = tree.push(NodeKind::Space { line_breaks: 2 }, 0..3);
        tree.attach(None, space).unwrap();
        let x = symbol(&mut tree, "x");
        tree.set_end(x, 1);
        tree.attach(None, x).unwrap();
        assert_eq!(format!("{tree:?}"), "[Space(2) 0..3, Symbol?: \"x\" 0..1]");
        assert_eq!(tree.to_string(), "\n\nx");

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["kind"], "space");
        assert_eq!(json[0]["line_breaks"], 2);
        assert_eq!(json[1]["text"], "x");
        assert_eq!(json[1]["recognized"], false);
    }
}
