//! Type queries over whole modules: annotations come back out the way
//! they were written, and inferred types flow through statements.

use scillac::lex::lex;
use scillac::parse::parse;
use scillac::resolve::{Builtins, NoImports};
use scillac::tree::{view, NodeId, NodeKind, SyntaxTree};
use scillac::ty::infer::TypeEngine;
use scillac::NoopDriver;

fn parse_source(src: &str) -> SyntaxTree {
    let mut driver = NoopDriver;
    let tokens = lex(&mut driver, src, 0);
    parse(&mut driver, tokens, 0)
}

fn find_named(tree: &SyntaxTree, kind: NodeKind, name: &str) -> NodeId {
    tree.nodes_of_kind(kind)
        .find(|n| view::name(tree, *n) == Some(name))
        .unwrap_or_else(|| panic!("no {kind:?} named {name}"))
}

#[test]
fn annotations_present_as_written() {
    let cases = [
        ("a", "Uint32"),
        ("b", "Map String (Option Int32)"),
        ("c", "Int32 -> Int32 -> Int32"),
        ("d", "(Int32 -> Int32) -> Int32"),
        ("e", "forall 'A. 'A -> 'A"),
        ("f", "List Uint32"),
        ("g", "Pair Int32 String"),
    ];

    let mut src = String::from("scilla_version 0\nlibrary Types\n");
    for (name, ty) in cases {
        src.push_str(&format!("let {name} : {ty} = {name}\n"));
    }

    let tree = parse_source(&src);
    let builtins = Builtins::new();
    let engine = TypeEngine::new(&tree, &NoImports, &builtins);

    for (name, expected) in cases {
        let def = find_named(&tree, NodeKind::LibraryLetDef, name);
        assert_eq!(engine.own_type(def).to_string(), expected);
    }
}

#[test]
fn unrefined_address_annotations_present_as_bystr20() {
    let tree = parse_source(
        "scilla_version 0\n\
         contract Test(other: ByStr20 with end)\n",
    );

    let builtins = Builtins::new();
    let engine = TypeEngine::new(&tree, &NoImports, &builtins);

    let param = find_named(&tree, NodeKind::IdWithType, "other");
    assert_eq!(engine.own_type(param).to_string(), "ByStr20");
}

#[test]
fn library_values_type_transition_statements() {
    let tree = parse_source(
        "scilla_version 0\n\
         library Demo\n\
         let base = Uint64 10\n\
         contract Demo(owner: ByStr20)\n\
         field total: Uint64 = base\n\
         transition Go(amount: Uint64)\n\
           t <- total;\n\
           s = builtin add t amount;\n\
           total := s\n\
         end\n",
    );

    let builtins = Builtins::new();
    let engine = TypeEngine::new(&tree, &NoImports, &builtins);

    let field = find_named(&tree, NodeKind::FieldDef, "total");
    assert_eq!(engine.own_type(field).to_string(), "Uint64");

    let load = find_named(&tree, NodeKind::LoadStmt, "t");
    assert_eq!(engine.own_type(load).to_string(), "Uint64");

    // The add builtin picks the Uint64 overload from its arguments.
    let bind = find_named(&tree, NodeKind::BindStmt, "s");
    assert_eq!(engine.own_type(bind).to_string(), "Uint64");
}

#[test]
fn map_lookups_are_optional_values() {
    let tree = parse_source(
        "scilla_version 0\n\
         contract Maps()\n\
         field scores: Map String Uint32 = Emp String Uint32\n\
         transition Go(key: String)\n\
           found <- scores[key];\n\
           here <- exists scores[key]\n\
         end\n",
    );

    let builtins = Builtins::new();
    let engine = TypeEngine::new(&tree, &NoImports, &builtins);

    let found = find_named(&tree, NodeKind::MapGetStmt, "found");
    assert_eq!(engine.own_type(found).to_string(), "Option Uint32");

    let here = find_named(&tree, NodeKind::MapGetStmt, "here");
    assert_eq!(engine.own_type(here).to_string(), "Bool");
}

#[test]
fn broken_inputs_still_answer_type_queries() {
    // Unresolvable names and half-finished syntax degrade to "?" instead
    // of failing the query.
    let tree = parse_source(
        "scilla_version 0\n\
         library Broken\n\
         let a = missing\n\
         let b : = Uint32 1\n",
    );

    let builtins = Builtins::new();
    let engine = TypeEngine::new(&tree, &NoImports, &builtins);

    let a = find_named(&tree, NodeKind::LibraryLetDef, "a");
    assert_eq!(engine.own_type(a).to_string(), "?");

    for def in tree.nodes_of_kind(NodeKind::LibraryLetDef) {
        let _ = engine.own_type(def);
    }
}
