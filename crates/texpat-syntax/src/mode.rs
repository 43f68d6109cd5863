//! Typesetting modes and the state transitions style items apply to them.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use ecow::{EcoString, EcoVec, eco_format};
use serde::Deserialize;

/// One of the six typesetting contexts a style item can be restricted to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    List,
    Math,
    Picture,
    Table,
    Text,
    Vertical,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::List,
        Self::Math,
        Self::Picture,
        Self::Table,
        Self::Text,
        Self::Vertical,
    ];

    /// The name used for this mode in style data.
    pub const fn name(self) -> &'static str {
        match self {
            Self::List => "LIST",
            Self::Math => "MATH",
            Self::Picture => "PICTURE",
            Self::Table => "TABLE",
            Self::Text => "TEXT",
            Self::Vertical => "VERTICAL",
        }
    }

    /// The bit of this mode in a [`ModeState`].
    pub const fn flag(self) -> ModeState {
        match self {
            Self::List => ModeState::LIST,
            Self::Math => ModeState::MATH,
            Self::Picture => ModeState::PICTURE,
            Self::Table => ModeState::TABLE,
            Self::Text => ModeState::TEXT,
            Self::Vertical => ModeState::VERTICAL,
        }
    }
}

impl FromStr for Mode {
    type Err = EcoString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| eco_format!("unknown mode `{s}`"))
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

bitflags::bitflags! {
    /// The live mode vector: for each mode, whether it is switched on.
    ///
    /// Defaults to `TEXT` only.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct ModeState: u8 {
        const LIST = 1 << 0;
        const MATH = 1 << 1;
        const PICTURE = 1 << 2;
        const TABLE = 1 << 3;
        const TEXT = 1 << 4;
        const VERTICAL = 1 << 5;
    }
}

impl ModeState {
    /// Whether the given mode is switched on.
    pub fn get(self, mode: Mode) -> bool {
        self.contains(mode.flag())
    }

    /// Whether every mode specified in `map` has the specified value.
    ///
    /// Modes the map leaves out are wildcards.
    pub fn test(self, map: &ModeMap) -> bool {
        self.intersection(map.mask) == map.values.intersection(map.mask)
    }

    /// Overwrite the modes specified in `map`, leaving all others untouched.
    pub fn update(&mut self, map: &ModeMap) {
        *self = self.difference(map.mask).union(map.values.intersection(map.mask));
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self::TEXT
    }
}

impl Display for ModeState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut first = true;
        for mode in Mode::ALL.into_iter().filter(|&mode| self.get(mode)) {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(mode.name())?;
            first = false;
        }
        if first {
            f.write_str("NONE")?;
        }
        Ok(())
    }
}

/// A partial mapping from modes to their desired value.
///
/// Used both as an applicability filter for style items and as a batch of
/// pending mode changes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(from = "BTreeMap<Mode, bool>")]
pub struct ModeMap {
    /// Which modes are specified.
    mask: ModeState,
    /// The specified values. Bits outside of `mask` are always clear.
    values: ModeState,
}

impl ModeMap {
    /// A map that specifies nothing, and thus matches every state.
    pub const fn new() -> Self {
        Self { mask: ModeState::empty(), values: ModeState::empty() }
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, mode: Mode, on: bool) -> Self {
        self.set(mode, on);
        self
    }

    /// Specify the value of a mode.
    pub fn set(&mut self, mode: Mode, on: bool) {
        self.mask.insert(mode.flag());
        self.values.set(mode.flag(), on);
    }

    /// The specified value for a mode, if any.
    pub fn get(&self, mode: Mode) -> Option<bool> {
        self.mask.contains(mode.flag()).then(|| self.values.contains(mode.flag()))
    }

    /// Whether no mode is specified.
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Iterate over the specified modes and their values.
    pub fn iter(&self) -> impl Iterator<Item = (Mode, bool)> + '_ {
        Mode::ALL.into_iter().filter_map(|mode| Some((mode, self.get(mode)?)))
    }
}

impl Default for ModeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<Mode, bool>> for ModeMap {
    fn from(map: BTreeMap<Mode, bool>) -> Self {
        map.into_iter().collect()
    }
}

impl FromIterator<(Mode, bool)> for ModeMap {
    fn from_iter<T: IntoIterator<Item = (Mode, bool)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (mode, on) in iter {
            map.set(mode, on);
        }
        map
    }
}

impl Debug for ModeMap {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(mode, on)| (mode.name(), on))).finish()
    }
}

/// The polarity of an [`Operation`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Directive {
    Begin,
    End,
}

/// What an [`Operation`] acts on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(try_from = "EcoString")]
pub enum Operand {
    /// Push or pop the whole mode vector.
    Group,
    /// Switch a single mode on or off.
    Mode(Mode),
}

impl FromStr for Operand {
    type Err = EcoString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GROUP" => Ok(Self::Group),
            _ => s.parse().map(Self::Mode),
        }
    }
}

impl TryFrom<EcoString> for Operand {
    type Error = EcoString;

    fn try_from(value: EcoString) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Group => f.pad("GROUP"),
            Self::Mode(mode) => Display::fmt(mode, f),
        }
    }
}

/// A single state transition declared by a style item.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Operation {
    pub directive: Directive,
    pub operand: Operand,
}

impl Operation {
    /// An operation that begins the operand.
    pub const fn begin(operand: Operand) -> Self {
        Self { directive: Directive::Begin, operand }
    }

    /// An operation that ends the operand.
    pub const fn end(operand: Operand) -> Self {
        Self { directive: Directive::End, operand }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let directive = match self.directive {
            Directive::Begin => "BEGIN",
            Directive::End => "END",
        };
        write!(f, "{directive} {}", self.operand)
    }
}

/// The live mode vector together with the stack of states saved by group
/// operations.
///
/// Cloning is cheap, which makes a `State` its own snapshot.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct State {
    modes: ModeState,
    stack: EcoVec<ModeState>,
}

impl State {
    /// A state with the given modes and an empty group stack.
    pub fn new(modes: ModeState) -> Self {
        Self { modes, stack: EcoVec::new() }
    }

    /// The live modes.
    pub fn modes(&self) -> ModeState {
        self.modes
    }

    /// How many groups are currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Apply a list of operations, yielding the resulting state.
    ///
    /// Plain mode operations are buffered and only become visible when the
    /// list ends or a group begins. A group begin commits the buffer and saves
    /// a copy of the live modes. A group end drops the buffer and restores the
    /// saved modes.
    pub fn apply(&self, operations: &[Operation]) -> Result<Self, UnbalancedGroup> {
        let mut modes = self.modes;
        let mut stack = self.stack.clone();
        let mut pending = ModeMap::new();

        for op in operations {
            match (op.operand, op.directive) {
                (Operand::Mode(mode), directive) => {
                    pending.set(mode, directive == Directive::Begin);
                }
                (Operand::Group, Directive::Begin) => {
                    modes.update(&pending);
                    stack.push(modes);
                    pending = ModeMap::new();
                }
                (Operand::Group, Directive::End) => {
                    pending = ModeMap::new();
                    modes = stack.pop().ok_or(UnbalancedGroup)?;
                }
            }
        }

        modes.update(&pending);
        Ok(Self { modes, stack })
    }
}

/// A group end was applied while no group was open.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UnbalancedGroup;

impl Display for UnbalancedGroup {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad("cannot end a group when no group is open")
    }
}

impl std::error::Error for UnbalancedGroup {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(list: &[(Directive, Operand)]) -> Vec<Operation> {
        list.iter()
            .map(|&(directive, operand)| Operation { directive, operand })
            .collect()
    }

    #[test]
    fn test_mode_state_default() {
        let state = ModeState::default();
        assert!(state.get(Mode::Text));
        assert!(!state.get(Mode::Math));
        assert_eq!(state.to_string(), "TEXT");
    }

    #[test]
    fn test_mode_state_test_and_update() {
        let mut state = ModeState::default();
        let map = ModeMap::new().with(Mode::Math, true).with(Mode::Text, false);
        assert!(!state.test(&map));
        assert!(state.test(&ModeMap::new()));

        let copy = state;
        assert_eq!(copy.test(&map), state.test(&map));

        state.update(&map);
        assert!(state.test(&map));
        assert!(state.get(Mode::Math));
        assert!(!state.get(Mode::Text));
        assert!(!state.get(Mode::List));
        assert_eq!(state.to_string(), "MATH");

        // Updating leaves unspecified modes alone.
        state.update(&ModeMap::new().with(Mode::List, true));
        assert_eq!(state, ModeState::MATH | ModeState::LIST);
    }

    #[test]
    fn test_mode_state_every_single_mode() {
        for mode in Mode::ALL {
            for on in [true, false] {
                let map = ModeMap::new().with(mode, on);
                let mut state = ModeState::default();
                state.update(&map);
                assert!(state.test(&map));
                assert_eq!(state.get(mode), on);
            }
        }
    }

    #[test]
    fn test_mode_map_parse() {
        let map: ModeMap = serde_json::from_str(r#"{"MATH": true, "TEXT": false}"#).unwrap();
        assert_eq!(map.get(Mode::Math), Some(true));
        assert_eq!(map.get(Mode::Text), Some(false));
        assert_eq!(map.get(Mode::List), None);
        assert!(serde_json::from_str::<ModeMap>(r#"{"PROSE": true}"#).is_err());
    }

    #[test]
    fn test_operation_parse() {
        let op: Operation =
            serde_json::from_str(r#"{"directive": "BEGIN", "operand": "GROUP"}"#).unwrap();
        assert_eq!(op, Operation::begin(Operand::Group));
        let op: Operation =
            serde_json::from_str(r#"{"directive": "END", "operand": "MATH"}"#).unwrap();
        assert_eq!(op, Operation::end(Operand::Mode(Mode::Math)));
        assert_eq!(op.to_string(), "END MATH");
        assert!(
            serde_json::from_str::<Operation>(r#"{"directive": "END", "operand": "X"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_apply_plain() {
        use Directive::*;
        let state = State::default();
        let next = state
            .apply(&ops(&[(Begin, Operand::Mode(Mode::Math)), (End, Operand::Mode(Mode::Text))]))
            .unwrap();
        assert_eq!(next.modes(), ModeState::MATH);
        assert_eq!(next.depth(), 0);
        // The original is untouched.
        assert_eq!(state.modes(), ModeState::TEXT);
    }

    #[test]
    fn test_apply_balanced_group_restores() {
        use Directive::*;
        let state = State::new(ModeState::TEXT | ModeState::LIST);
        let opened = state
            .apply(&ops(&[
                (Begin, Operand::Group),
                (Begin, Operand::Mode(Mode::Math)),
                (End, Operand::Mode(Mode::Text)),
            ]))
            .unwrap();
        assert_eq!(opened.modes(), ModeState::MATH | ModeState::LIST);
        assert_eq!(opened.depth(), 1);

        let closed = opened
            .apply(&ops(&[(Begin, Operand::Mode(Mode::Table)), (End, Operand::Group)]))
            .unwrap();
        assert_eq!(closed, state);
    }

    #[test]
    fn test_apply_group_snapshot_sees_committed_changes() {
        use Directive::*;
        // The change before the group begin is committed before the snapshot,
        // the change inside the group is dropped by the group end.
        let next = State::default()
            .apply(&ops(&[
                (Begin, Operand::Mode(Mode::Vertical)),
                (Begin, Operand::Group),
                (Begin, Operand::Mode(Mode::Math)),
                (End, Operand::Group),
            ]))
            .unwrap();
        assert_eq!(next.modes(), ModeState::TEXT | ModeState::VERTICAL);
        assert_eq!(next.depth(), 0);
    }

    #[test]
    fn test_apply_unbalanced_group() {
        use Directive::*;
        assert_eq!(State::default().apply(&ops(&[(End, Operand::Group)])), Err(UnbalancedGroup));
        let nested = State::default().apply(&ops(&[(Begin, Operand::Group)])).unwrap();
        assert!(nested.apply(&ops(&[(End, Operand::Group), (End, Operand::Group)])).is_err());
    }
}
