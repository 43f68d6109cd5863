//! Scenario tests for recognizing documents against a fixture style package.

use texpat_syntax::{
    Context, Mode, ModeMap, ModeState, NodeKind, NodeRef, Operand, Operation, ParseError,
    Registry, State, StylePackage, Tree, parse, parse_with,
};

const LATEX: &str = include_str!("../styles/latex.json");

fn registry() -> Registry {
    let mut registry = Registry::new();
    let package = StylePackage::from_json(LATEX).unwrap();
    registry.load_package("latex", package).unwrap();
    registry
}

fn roots(tree: &Tree) -> Vec<NodeRef<'_>> {
    tree.roots().collect()
}

#[track_caller]
fn single(tree: &Tree) -> NodeRef<'_> {
    assert_eq!(tree.roots().len(), 1, "expected a single token in {tree:?}");
    tree.roots().next().unwrap()
}

#[track_caller]
fn test_roundtrip(registry: &Registry, text: &str) {
    let tree = parse(text, registry).unwrap();
    let normalized = tree.to_string();
    let reparsed = parse(&normalized, registry).unwrap();
    assert_eq!(reparsed.to_string(), normalized);
    assert_eq!(reparsed.roots().len(), tree.roots().len());
}

#[test]
fn test_scenario_empty() {
    let tree = parse("", &registry()).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_scenario_comments() {
    let tree = parse("% comment\n % comment", &registry()).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_scenario_space() {
    let tree = parse(" ", &registry()).unwrap();
    let space = single(&tree);
    assert!(matches!(space.kind(), NodeKind::Space { line_breaks: 0 }));
    assert_eq!(space.to_string(), " ");
}

#[test]
fn test_scenario_backslashes() {
    let tree = parse("\\\\", &registry()).unwrap();
    let symbol = single(&tree);
    assert_eq!(symbol.symbol().unwrap().pattern().as_str(), "\\\\");
    assert_eq!(symbol.to_string(), "\\\\");
}

#[test]
fn test_scenario_command_braced() {
    let tree = parse("\\author{Name}", &registry()).unwrap();
    let command = single(&tree);
    assert_eq!(command.command().unwrap().name(), "author");
    assert_eq!(command.symbol().unwrap().pattern().as_str(), "#1");
    assert_eq!(command.children().len(), 1);

    let param = command.child(0).unwrap();
    assert!(matches!(param.kind(), NodeKind::Parameter { braced: true, .. }));
    assert_eq!(param.lexeme(), Some("NAME"));
    assert_eq!(param.children().map(|c| c.to_string()).collect::<String>(), "Name");
}

#[test]
fn test_scenario_command_spaced() {
    let tree = parse("\\author [Opt Name] {Name}", &registry()).unwrap();
    let command = single(&tree);
    assert_eq!(command.symbol().unwrap().pattern().as_str(), " [#1]#2");

    let params: Vec<_> = command.children().collect();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].to_string(), "Opt Name");
    assert!(matches!(
        params[1].kind(),
        NodeKind::Parameter { index: 1, braced: true, space_prefix: true }
    ));
    assert_eq!(params[1].to_string(), " {Name}");
}

#[test]
fn test_scenario_environment() {
    let tree = parse("\\begin{document}\\end{document}", &registry()).unwrap();
    let env = single(&tree);
    assert!(env.is_recognized());
    assert_eq!(env.environment().unwrap().name(), "document");

    let children: Vec<_> = env.children().collect();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].command().unwrap().name(), "document");
    assert!(matches!(children[1].kind(), NodeKind::EnvironmentBody));
    assert_eq!(children[1].children().len(), 0);
    assert_eq!(children[2].command().unwrap().name(), "enddocument");
    assert_eq!(env.descendants(), 4);
}

#[test]
fn test_math_switches_modes() {
    let tree = parse("$x$ x \\alpha $\\alpha$", &registry()).unwrap();
    let roots = roots(&tree);
    assert_eq!(roots.len(), 7);

    assert_eq!(roots[0].lexeme(), Some("MATH"));
    let formula = roots[0].child(0).unwrap();
    assert_eq!(formula.lexeme(), Some("FORMULA"));
    assert_eq!(formula.child(0).unwrap().lexeme(), Some("VAR"));

    assert!(!roots[2].is_recognized());
    assert!(!roots[4].is_recognized());

    let greek = roots[6].child(0).unwrap().child(0).unwrap();
    assert!(greek.is_recognized());
    assert_eq!(greek.lexeme(), Some("GREEK"));
}

#[test]
fn test_environment_operations() {
    let text = "\\begin{tabular}{lc}a & b\\\\\\end{tabular}&";
    let tree = parse(text, &registry()).unwrap();
    let roots = roots(&tree);
    assert_eq!(roots.len(), 2);

    let env = roots[0];
    assert_eq!(env.lexeme(), Some("TABLE"));
    assert_eq!(env.child(0).unwrap().child(0).unwrap().lexeme(), Some("COLUMNS"));

    let body = env.child(1).unwrap();
    let ampersand = body.children().find(|c| c.to_string() == "&").unwrap();
    assert_eq!(ampersand.lexeme(), Some("AMPERSAND"));
    assert!(!roots[1].is_recognized());
    assert_eq!(tree.to_string(), text);
}

#[test]
fn test_raw_environment() {
    let text = "\\begin{verbatim}\\author{%x}\\end{verbatim}";
    let tree = parse(text, &registry()).unwrap();
    let body = single(&tree).child(1).unwrap();
    let source = body.child(0).unwrap();
    assert_eq!(body.children().len(), 1);
    assert_eq!(source.lexeme(), Some("CODE"));
    assert!(matches!(source.kind(), NodeKind::Source { text, .. } if text == "\\author{%x}"));
    assert_eq!(tree.to_string(), text);
}

#[test]
fn test_symbol_declaration_order() {
    let tree = parse("--- -", &registry()).unwrap();
    let lexemes: Vec<_> = tree.roots().map(|node| node.lexeme()).collect();
    assert_eq!(lexemes, [Some("DASH"), Some("HYPHEN"), None, Some("HYPHEN")]);
}

#[test]
fn test_later_package_overrides() {
    let mut registry = registry();
    let package = StylePackage::from_json(
        r#"{"symbols": [{"lexeme": "ENDASH", "pattern": "--", "modes": {"TEXT": true}}]}"#,
    )
    .unwrap();
    registry.load_package("override", package).unwrap();

    let tree = parse("--", &registry).unwrap();
    assert_eq!(single(&tree).lexeme(), Some("ENDASH"));

    assert!(registry.unload_package("override"));
    let tree = parse("--", &registry).unwrap();
    assert_eq!(single(&tree).lexeme(), Some("DASH"));
}

#[test]
fn test_without_styles() {
    let registry = Registry::new();
    let text = "a \\foo{b} \\begin{x}y\\end{x} $\\";
    let tree = parse(text, &registry).unwrap();
    assert!(tree.roots().all(|node| node.kind().is_token()));
    assert_eq!(tree.to_string(), text);

    let env = tree.roots().find(|node| matches!(node.kind(), NodeKind::Environment { .. }));
    assert!(!env.unwrap().is_recognized());
}

#[test]
fn test_unknown_input_always_advances() {
    let registry = registry();
    for text in ["}", "\\", "\\begin", "\\begin{", "\\end{document}", "#", "$", "{"] {
        let tree = parse(text, &registry).unwrap();
        assert!(!tree.is_empty(), "nothing recognized in {text:?}");
        assert_eq!(tree.roots().last().unwrap().range().end, text.len());
    }
}

#[test]
fn test_unterminated_environment() {
    let mut ctx = Context::new();
    parse_with("\\begin{document}\nbody", &registry(), &mut ctx).unwrap();
    let env = single(ctx.tree());
    assert!(matches!(env.kind(), NodeKind::Environment { terminated: false, .. }));
    assert_eq!(env.children().len(), 3);
    assert_eq!(ctx.diagnostics().len(), 1);
    assert_eq!(ctx.diagnostics()[0].line, 0);
}

#[test]
fn test_incremental_feeding() {
    let registry = registry();
    let mut ctx = Context::new();
    parse_with("\\author{A}\n", &registry, &mut ctx).unwrap();
    let roots = parse_with("\\author [B] {C}", &registry, &mut ctx).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(ctx.offset(), 26);
    assert_eq!(ctx.line(), 1);

    let command = ctx.tree().get(roots[0]).unwrap();
    assert_eq!(command.range(), 11..26);
    assert_eq!(ctx.tree().to_string(), "\\author{A}\n\\author [B] {C}");
}

#[test]
fn test_unbalanced_group() {
    let mut registry = registry();
    let package = StylePackage::from_json(
        r#"{"symbols": [{"pattern": "!", "operations": [{"directive": "END", "operand": "GROUP"}]}]}"#,
    )
    .unwrap();
    registry.load_package("broken", package).unwrap();

    let mut ctx = Context::new();
    parse_with("ok", &registry, &mut ctx).unwrap();
    let err = parse_with("a!", &registry, &mut ctx).unwrap_err();
    assert!(matches!(err, ParseError::UnbalancedGroup { offset: 3 }));
    assert_eq!(ctx.tree().roots().len(), 2);
    assert_eq!(ctx.offset(), 2);
}

#[test]
fn test_group_restores_modes() {
    let start = State::new(ModeState::TEXT);
    let ops = [
        Operation::begin(Operand::Group),
        Operation::begin(Operand::Mode(Mode::Math)),
        Operation::end(Operand::Mode(Mode::Text)),
        Operation::begin(Operand::Group),
        Operation::begin(Operand::Mode(Mode::Table)),
        Operation::end(Operand::Group),
        Operation::end(Operand::Group),
    ];
    assert_eq!(start.apply(&ops).unwrap(), start);
    assert!(State::default().apply(&[Operation::end(Operand::Group)]).is_err());
}

#[test]
fn test_mode_map_update() {
    let map = ModeMap::new().with(Mode::Math, true).with(Mode::Text, false);
    let mut state = ModeState::TEXT | ModeState::LIST;
    let copy = state;
    assert_eq!(copy.test(&map), state.test(&map));
    state.update(&map);
    assert!(state.test(&map));
    assert!(state.get(Mode::List));
}

#[test]
fn test_roundtrips() {
    let registry = registry();
    test_roundtrip(&registry, "\\author  [A]   {B}\n\n\n\\author{C}");
    test_roundtrip(&registry, "\\begin{document}$x$ -- \\\\ % note\n\\end{document}");
    test_roundtrip(&registry, "\\begin{tabular}{l}a & b\\end{tabular}");
    test_roundtrip(&registry, "\\unknown{\\begin{verbatim}%raw\\end{verbatim}}");
}

#[test]
fn test_serialize_tree() {
    let tree = parse("\\author{Ada}", &registry()).unwrap();
    let value = serde_json::to_value(&tree).unwrap();
    assert_eq!(value[0]["kind"], "command");
    assert_eq!(value[0]["name"], "author");
    assert_eq!(value[0]["children"][0]["lexeme"], "NAME");
}
