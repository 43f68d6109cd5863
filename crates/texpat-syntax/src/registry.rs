use std::hash::Hash;
use std::sync::Arc;

use ecow::{EcoString, eco_format};
use rustc_hash::FxHashMap;

use crate::diag::{StrResult, bail};
use crate::mode::ModeState;
use crate::style::{Command, Environment, StyleItem, StylePackage, Symbol};

/// Holds the style items of all loaded packages and looks them up by key.
///
/// Lookups only yield items that apply in the given mode state, in priority
/// order: items of more recently loaded packages come first, and within a
/// package, items declared earlier come first.
///
/// The registry can be shared by reference between any number of parses, as
/// long as no package is loaded or unloaded meanwhile.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    packages: Vec<PackageInfo>,
    symbols: FxHashMap<char, Vec<Entry<Symbol>>>,
    commands: FxHashMap<EcoString, Vec<Entry<Command>>>,
    environments: FxHashMap<EcoString, Vec<Entry<Environment>>>,
}

/// Summary of a loaded package.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PackageInfo {
    pub name: EcoString,
    pub symbols: usize,
    pub commands: usize,
    pub environments: usize,
}

/// An item tagged with its owning package.
#[derive(Debug, Clone)]
struct Entry<T> {
    package: EcoString,
    item: Arc<T>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the items of a package and make them available for lookup.
    ///
    /// Fails without changing the registry if a package of the same name is
    /// already loaded or if any of the package's items is malformed.
    pub fn load_package(
        &mut self,
        name: impl Into<EcoString>,
        package: StylePackage,
    ) -> StrResult<()> {
        let name = name.into();
        if self.is_loaded(&name) {
            bail!("style package `{}` is already loaded", name);
        }

        let symbols = build(&name, "symbol", package.symbols, Symbol::new)?;
        let commands = build(&name, "command", package.commands, Command::new)?;
        let environments =
            build(&name, "environment", package.environments, Environment::new)?;

        tracing::debug!(
            package = %name,
            symbols = symbols.len(),
            commands = commands.len(),
            environments = environments.len(),
            "loading style package",
        );

        self.packages.push(PackageInfo {
            name: name.clone(),
            symbols: symbols.len(),
            commands: commands.len(),
            environments: environments.len(),
        });

        // Inserting in reverse at the front keeps declaration order within
        // the package and puts the package before all earlier ones.
        for symbol in symbols.into_iter().rev() {
            if let Some(key) = symbol.pattern().first_char() {
                insert(&mut self.symbols, key, &name, symbol);
            }
        }
        for command in commands.into_iter().rev() {
            let key = command.name().into();
            insert(&mut self.commands, key, &name, command);
        }
        for env in environments.into_iter().rev() {
            let key = env.name().into();
            insert(&mut self.environments, key, &name, env);
        }

        Ok(())
    }

    /// Remove all items of a package. Returns whether it was loaded.
    pub fn unload_package(&mut self, name: &str) -> bool {
        let Some(index) = self.packages.iter().position(|info| info.name == name) else {
            return false;
        };

        tracing::debug!(package = name, "unloading style package");
        self.packages.remove(index);
        prune(&mut self.symbols, name);
        prune(&mut self.commands, name);
        prune(&mut self.environments, name);
        true
    }

    /// Whether a package with this name is loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.packages.iter().any(|info| info.name == name)
    }

    /// The loaded packages, in load order.
    pub fn packages(&self) -> &[PackageInfo] {
        &self.packages
    }

    /// The symbols whose pattern starts with `c` and that apply in `state`.
    pub fn symbols(&self, state: ModeState, c: char) -> impl Iterator<Item = &Arc<Symbol>> {
        applicable(self.symbols.get(&c), state)
    }

    /// The commands with the given name that apply in `state`.
    pub fn commands(&self, state: ModeState, name: &str) -> impl Iterator<Item = &Arc<Command>> {
        applicable(self.commands.get(name), state)
    }

    /// The environments with the given name that apply in `state`.
    pub fn environments(
        &self,
        state: ModeState,
        name: &str,
    ) -> impl Iterator<Item = &Arc<Environment>> {
        applicable(self.environments.get(name), state)
    }
}

/// Access to the applicability of registered items.
trait Styled {
    fn style(&self) -> &StyleItem;
}

impl Styled for Symbol {
    fn style(&self) -> &StyleItem {
        self.item()
    }
}

impl Styled for Command {
    fn style(&self) -> &StyleItem {
        self.symbol().item()
    }
}

impl Styled for Environment {
    fn style(&self) -> &StyleItem {
        self.item()
    }
}

/// Build all items of one kind, naming the first offending one on failure.
fn build<S, T>(
    package: &str,
    kind: &str,
    specs: Vec<S>,
    new: fn(S) -> StrResult<T>,
) -> StrResult<Vec<T>> {
    specs
        .into_iter()
        .enumerate()
        .map(|(i, spec)| {
            new(spec).map_err(|err| eco_format!("{kind} {i} of package `{package}`: {err}"))
        })
        .collect()
}

fn insert<K: Eq + Hash, T>(
    map: &mut FxHashMap<K, Vec<Entry<T>>>,
    key: K,
    package: &EcoString,
    item: T,
) {
    let entry = Entry { package: package.clone(), item: Arc::new(item) };
    map.entry(key).or_default().insert(0, entry);
}

fn prune<K: Eq + Hash, T>(map: &mut FxHashMap<K, Vec<Entry<T>>>, package: &str) {
    map.retain(|_, entries| {
        entries.retain(|entry| entry.package != package);
        !entries.is_empty()
    });
}

fn applicable<T: Styled>(
    entries: Option<&Vec<Entry<T>>>,
    state: ModeState,
) -> impl Iterator<Item = &Arc<T>> {
    entries
        .into_iter()
        .flatten()
        .map(|entry| &entry.item)
        .filter(move |item| item.style().applies(state))
}
