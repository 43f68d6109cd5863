//! Data-driven recognition of LaTeX source text.
//!
//! Symbols, commands and environments are not built into the parser. They
//! are described by [style packages](StylePackage) that are loaded into a
//! [`Registry`] at runtime. Each item is only valid in certain typesetting
//! [modes](Mode) and the items matched while parsing switch these modes on
//! and off through [operations](Operation).
//!
//! Parsing never fails on unknown input: unrecognized symbols, commands and
//! environments yield placeholder nodes in the resulting [`Tree`]. Only
//! defective style data and overly deep nesting abort a parse.

pub mod diag;

mod context;
mod mode;
mod parser;
mod pattern;
mod registry;
mod style;
mod tree;

pub use self::context::{Comment, Context};
pub use self::diag::{Diagnostic, ParseError, Severity, StrResult};
pub use self::mode::{
    Directive, Mode, ModeMap, ModeState, Operand, Operation, State, UnbalancedGroup,
};
pub use self::parser::{is_ident, parse, parse_with};
pub use self::pattern::{Pattern, PatternPart};
pub use self::registry::{PackageInfo, Registry};
pub use self::style::{
    Command, CommandSpec, Environment, EnvironmentSpec, Parameter, ParameterSpec,
    StyleItem, StylePackage, Symbol, SymbolSpec,
};
pub use self::tree::{Node, NodeId, NodeKind, NodeRef, StructureError, Tree};
