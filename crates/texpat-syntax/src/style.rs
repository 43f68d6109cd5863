//! Style items: the symbols, commands and environments a registry holds, and
//! the serializable descriptors they are built from.

use ecow::{EcoString, eco_format};
use serde::Deserialize;

use crate::diag::{StrResult, bail};
use crate::mode::{ModeMap, ModeState, Operation};
use crate::parser::is_ident;
use crate::pattern::Pattern;

/// Properties shared by all style items.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct StyleItem {
    lexeme: Option<EcoString>,
    modes: ModeMap,
}

impl StyleItem {
    /// Create an item with the given lexeme and applicability.
    pub fn new(lexeme: Option<EcoString>, modes: ModeMap) -> Self {
        Self { lexeme, modes }
    }

    /// The semantic tag of the item, if any.
    pub fn lexeme(&self) -> Option<&str> {
        self.lexeme.as_deref()
    }

    /// The modes the item is restricted to.
    pub fn modes(&self) -> &ModeMap {
        &self.modes
    }

    /// Whether the item may be used in the given state.
    pub fn applies(&self, state: ModeState) -> bool {
        state.test(&self.modes)
    }
}

/// A parameter of a symbol or command.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Parameter {
    item: StyleItem,
    operations: Vec<Operation>,
}

impl Parameter {
    /// Build a parameter from its descriptor.
    pub fn new(spec: ParameterSpec) -> Self {
        Self {
            item: StyleItem::new(spec.lexeme, spec.modes),
            operations: spec.operations,
        }
    }

    /// The shared item properties.
    pub fn item(&self) -> &StyleItem {
        &self.item
    }

    /// The operations applied before the parameter's content is parsed.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

/// A piece of source text recognized by its pattern.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Symbol {
    item: StyleItem,
    operations: Vec<Operation>,
    parameters: Vec<Parameter>,
    pattern: Pattern,
    html: Option<EcoString>,
}

impl Symbol {
    /// Build a symbol from its descriptor.
    ///
    /// A symbol's pattern must start with literal text, because its first
    /// character is what the registry indexes it by.
    pub fn new(spec: SymbolSpec) -> StrResult<Self> {
        let symbol = Self::build(
            spec.lexeme,
            spec.modes,
            spec.operations,
            spec.parameters,
            spec.pattern.as_deref().unwrap_or_default(),
            spec.html,
        )?;
        if symbol.pattern.first_char().is_none() {
            bail!("symbol pattern `{}` must start with literal text", symbol.pattern);
        }
        Ok(symbol)
    }

    fn build(
        lexeme: Option<EcoString>,
        modes: ModeMap,
        operations: Vec<Operation>,
        parameters: Vec<ParameterSpec>,
        pattern: &str,
        html: Option<EcoString>,
    ) -> StrResult<Self> {
        Ok(Self {
            pattern: Pattern::parse(pattern, parameters.len())?,
            item: StyleItem::new(lexeme, modes),
            operations,
            parameters: parameters.into_iter().map(Parameter::new).collect(),
            html,
        })
    }

    /// The shared item properties.
    pub fn item(&self) -> &StyleItem {
        &self.item
    }

    /// The operations applied after the symbol matched.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// The declared parameters, in placeholder order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The parameter with the given zero-based index.
    pub fn parameter(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    /// What the symbol matches.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The output template. Opaque to parsing.
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }
}

impl AsRef<Symbol> for Symbol {
    fn as_ref(&self) -> &Symbol {
        self
    }
}

/// A symbol introduced by a backslash and a name.
///
/// The pattern matches what follows the name.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Command {
    name: EcoString,
    symbol: Symbol,
}

impl Command {
    /// Build a command from its descriptor.
    pub fn new(spec: CommandSpec) -> StrResult<Self> {
        let name = checked_name("command", spec.name)?;
        let symbol = Symbol::build(
            spec.lexeme,
            spec.modes,
            spec.operations,
            spec.parameters,
            spec.pattern.as_deref().unwrap_or_default(),
            spec.html,
        )
        .map_err(|err| eco_format!("command `{name}`: {err}"))?;
        Ok(Self { name, symbol })
    }

    /// The name following the backslash.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol describing what follows the name.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

impl AsRef<Symbol> for Command {
    fn as_ref(&self) -> &Symbol {
        &self.symbol
    }
}

/// A `\begin{name}` ... `\end{name}` block.
///
/// What follows the begin and end labels is described by the commands
/// `name` and `endname`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Environment {
    item: StyleItem,
    name: EcoString,
    raw: bool,
}

impl Environment {
    /// Build an environment from its descriptor.
    pub fn new(spec: EnvironmentSpec) -> StrResult<Self> {
        Ok(Self {
            name: checked_name("environment", spec.name)?,
            item: StyleItem::new(spec.lexeme, spec.modes),
            raw: spec.raw,
        })
    }

    /// The shared item properties.
    pub fn item(&self) -> &StyleItem {
        &self.item
    }

    /// The name inside the begin and end labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the body is kept as unparsed source text.
    pub fn raw(&self) -> bool {
        self.raw
    }
}

/// Ensure that a command or environment is named by an identifier.
fn checked_name(what: &str, name: Option<EcoString>) -> StrResult<EcoString> {
    match name {
        None => bail!("{} is missing a name", what),
        Some(name) if !is_ident(&name) => {
            bail!("{} name `{}` is not an identifier", what, name)
        }
        Some(name) => Ok(name),
    }
}

/// A named bundle of style items, as found in style data.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylePackage {
    pub symbols: Vec<SymbolSpec>,
    pub commands: Vec<CommandSpec>,
    pub environments: Vec<EnvironmentSpec>,
}

impl StylePackage {
    /// Parse a package from JSON.
    pub fn from_json(text: &str) -> StrResult<Self> {
        serde_json::from_str(text)
            .map_err(|err| eco_format!("failed to parse style package ({err})"))
    }

    /// The total number of items in the package.
    pub fn len(&self) -> usize {
        self.symbols.len() + self.commands.len() + self.environments.len()
    }

    /// Whether the package declares no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The descriptor of a [`Parameter`].
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSpec {
    pub lexeme: Option<EcoString>,
    pub modes: ModeMap,
    pub operations: Vec<Operation>,
}

/// The descriptor of a [`Symbol`].
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymbolSpec {
    pub lexeme: Option<EcoString>,
    pub modes: ModeMap,
    pub operations: Vec<Operation>,
    pub parameters: Vec<ParameterSpec>,
    pub pattern: Option<EcoString>,
    pub html: Option<EcoString>,
}

/// The descriptor of a [`Command`].
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandSpec {
    pub name: Option<EcoString>,
    pub lexeme: Option<EcoString>,
    pub modes: ModeMap,
    pub operations: Vec<Operation>,
    pub parameters: Vec<ParameterSpec>,
    pub pattern: Option<EcoString>,
    pub html: Option<EcoString>,
}

/// The descriptor of an [`Environment`].
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentSpec {
    pub lexeme: Option<EcoString>,
    pub modes: ModeMap,
    pub name: Option<EcoString>,
    pub raw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Mode, Operand};

    #[test]
    fn test_package_from_json() {
        let package = StylePackage::from_json(
            r##"{
                "symbols": [{
                    "lexeme": "MATH",
                    "modes": {"TEXT": true},
                    "operations": [{"directive": "END", "operand": "GROUP"}],
                    "parameters": [{"operations": [
                        {"directive": "BEGIN", "operand": "GROUP"},
                        {"directive": "BEGIN", "operand": "MATH"}
                    ]}],
                    "pattern": "$#1$"
                }],
                "commands": [{"name": "author", "pattern": "#1", "parameters": [{}]}],
                "environments": [{"name": "verbatim", "raw": true}]
            }"##,
        )
        .unwrap();
        assert_eq!(package.len(), 3);

        let symbol = Symbol::new(package.symbols[0].clone()).unwrap();
        assert_eq!(symbol.item().lexeme(), Some("MATH"));
        assert_eq!(symbol.item().modes().get(Mode::Text), Some(true));
        assert_eq!(symbol.operations(), &[Operation::end(Operand::Group)]);
        assert_eq!(symbol.parameter(0).unwrap().operations().len(), 2);
        assert!(symbol.parameter(1).is_none());
        assert_eq!(symbol.pattern().first_char(), Some('$'));

        let command = Command::new(package.commands[0].clone()).unwrap();
        assert_eq!(command.name(), "author");
        assert_eq!(command.symbol().parameters().len(), 1);

        let env = Environment::new(package.environments[0].clone()).unwrap();
        assert_eq!(env.name(), "verbatim");
        assert!(env.raw());
        assert!(env.item().applies(ModeState::MATH));
    }

    #[test]
    fn test_package_rejects_bad_types() {
        assert!(StylePackage::from_json(r#"{"symbols": {}}"#).is_err());
        assert!(StylePackage::from_json(r#"{"commands": [{"name": 3}]}"#).is_err());
        assert!(StylePackage::from_json(r#"{"commands": [{"nmae": "x"}]}"#).is_err());
        assert!(StylePackage::from_json(r#"{"fonts": []}"#).is_err());
    }

    #[test]
    fn test_item_contract_violations() {
        let dangling = SymbolSpec { pattern: Some("x#1".into()), ..Default::default() };
        assert!(Symbol::new(dangling).is_err());

        let unanchored = SymbolSpec {
            pattern: Some("#1x".into()),
            parameters: vec![ParameterSpec::default()],
            ..Default::default()
        };
        assert!(Symbol::new(unanchored).is_err());
        assert!(Symbol::new(SymbolSpec::default()).is_err());

        assert!(Command::new(CommandSpec::default()).is_err());
        let spaced = CommandSpec { name: Some("my command".into()), ..Default::default() };
        assert!(Command::new(spaced).is_err());
        let dangling = CommandSpec {
            name: Some("cite".into()),
            pattern: Some("#2".into()),
            parameters: vec![ParameterSpec::default()],
            ..Default::default()
        };
        let err = Command::new(dangling).unwrap_err();
        assert!(err.starts_with("command `cite`: placeholder #2"));

        assert!(Environment::new(EnvironmentSpec::default()).is_err());
    }

    #[test]
    fn test_command_without_pattern() {
        let spec = CommandSpec { name: Some("maketitle".into()), ..Default::default() };
        let command = Command::new(spec).unwrap();
        assert!(command.symbol().pattern().is_empty());
        assert!(command.as_ref().parameters().is_empty());
    }
}
