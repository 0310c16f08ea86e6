//! End-to-end parser behavior: the tree is total over its input, garbage
//! is contained, and recovery keeps making progress.

use scillac::lex::lex;
use scillac::parse::parse;
use scillac::tree::{view, Child, NodeId, NodeKind, SyntaxTree};
use scillac::{CollectingDriver, NoopDriver};

const SAMPLE: &str = "\
scilla_version 0

import BoolUtils as B

library Demo

(* plain constants *)
let zero = Uint32 0
let greeting = \"hello\"
let inc =
  fun (x: Uint32) =>
    builtin add x zero

type Shape =
| Circle of Uint32
| Point

contract Demo(owner: ByStr20, start: Uint128)

field total: Uint128 = start
field entries: Map String Uint32 = Emp String Uint32

procedure Record(key: String)
  entries[key] := zero
end

transition Go(amount: Uint128)
  t <- total;
  total := amount;
  Record greeting;
  match t with
  | _ => accept
  end
end
";

fn parse_counted(src: &str) -> (SyntaxTree, usize) {
    let mut driver = CollectingDriver::new();
    let tokens = lex(&mut driver, src, 0);
    let tree = parse(&mut driver, tokens, 0);
    (tree, driver.msgs.len())
}

fn token_count(tree: &SyntaxTree, node: NodeId) -> usize {
    tree.children(node)
        .iter()
        .map(|child| match child {
            Child::Token(..) => 1,
            Child::Node(id) => token_count(tree, *id),
        })
        .sum()
}

/// Every lexed token must appear in the tree, in any input at all.
fn assert_total(src: &str) {
    let mut driver = NoopDriver;
    let tokens = lex(&mut driver, src, 0);
    let expected = tokens.len();

    let tree = parse(&mut driver, tokens, 0);
    assert_eq!(
        token_count(&tree, tree.root()),
        expected,
        "tokens went missing for input {src:?}"
    );
}

#[test]
fn well_formed_contract_parses_cleanly() {
    let (tree, errors) = parse_counted(SAMPLE);
    assert_eq!(errors, 0);

    assert_eq!(tree.kind(tree.root()), NodeKind::Root);
    assert_eq!(tree.nodes_of_kind(NodeKind::LibraryDef).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::ContractDef).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::FieldDef).count(), 2);
    assert_eq!(tree.nodes_of_kind(NodeKind::TransitionDef).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::ProcedureDef).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::LibraryTypeDef).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::Garbage).count(), 0);
}

#[test]
fn every_token_lands_in_the_tree() {
    assert_total(SAMPLE);
}

#[test]
fn every_prefix_parses() {
    let mut boundaries: Vec<usize> = SAMPLE.char_indices().map(|(at, _)| at).collect();
    boundaries.push(SAMPLE.len());

    for at in boundaries {
        assert_total(&SAMPLE[..at]);
    }
}

#[test]
fn wild_inputs_terminate_and_stay_total() {
    let inputs = [
        "",
        ";;;;",
        "let let let",
        "match match with with",
        "((((((",
        "end end end",
        "| | | =>",
        "scilla_version",
        "scilla_version contract",
        "\"unterminated",
        "(* unterminated comment",
        "0x0z 0x 0xgg",
        "contract transition procedure end",
    ];

    for input in inputs {
        assert_total(input);
    }
}

#[test]
fn empty_contract_parses() {
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         contract Empty()\n",
    );

    assert_eq!(errors, 0);
    let contract = tree
        .nodes_of_kind(NodeKind::ContractDef)
        .next()
        .expect("no contract");
    assert_eq!(view::name(&tree, contract), Some("Empty"));
}

#[test]
fn comments_disappear_entirely() {
    let (tree, errors) = parse_counted(
        "(* before *) scilla_version (* inside *) 0\n\
         library (* nested (* comments *) too *) Demo\n\
         let a = Uint32 1 (* after *)\n",
    );

    assert_eq!(errors, 0);
    assert_eq!(tree.nodes_of_kind(NodeKind::LibraryLetDef).count(), 1);
}

#[test]
fn statement_garbage_does_not_take_the_rest_down() {
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         contract Test()\n\
         transition Go()\n\
           x = Uint32 1;\n\
           = := =;\n\
           y = Uint32 2\n\
         end\n",
    );

    assert!(errors > 0);

    // Both bindings around the garbage survive.
    let binds: Vec<_> = tree.nodes_of_kind(NodeKind::BindStmt).collect();
    assert_eq!(binds.len(), 2);
    assert_eq!(view::name(&tree, binds[0]), Some("x"));
    assert_eq!(view::name(&tree, binds[1]), Some("y"));
}

#[test]
fn declarations_in_statement_position_are_contained() {
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         contract Test()\n\
         transition Go()\n\
           field f: Uint32 = zero;\n\
           x = Uint32 1\n\
         end\n",
    );

    assert!(errors > 0);
    assert_eq!(tree.nodes_of_kind(NodeKind::Error).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::BindStmt).count(), 1);
}

#[test]
fn top_level_garbage_is_swept_into_one_node() {
    // A component without a contract is garbage, but its insides still
    // parse and get their own diagnostics.
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         transition Go()\n\
           x = Uint32 1\n\
         end\n",
    );

    assert!(errors > 0);
    assert_eq!(tree.nodes_of_kind(NodeKind::Garbage).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::TransitionDef).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::BindStmt).count(), 1);
}

#[test]
fn missing_end_still_yields_the_component() {
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         contract Test()\n\
         transition Go()\n\
           x = Uint32 1\n",
    );

    assert!(errors > 0);
    assert_eq!(tree.nodes_of_kind(NodeKind::TransitionDef).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::BindStmt).count(), 1);
}

#[test]
fn expression_forms_all_parse() {
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         library Exprs\n\
         let a = let b = Uint32 1 in b\n\
         let c = fun (x: Uint32) => x\n\
         let d = builtin add a a\n\
         let e = Some {Uint32} a\n\
         let f = match a with\n\
         | Some x => x\n\
         | _ => a\n\
         end\n\
         let g = tfun 'T => fun (x: 'T) => x\n\
         let h = @g Uint32\n\
         let m = { _tag : \"call\"; _amount : a }\n",
    );

    assert_eq!(errors, 0);
    assert_eq!(tree.nodes_of_kind(NodeKind::LetExpr).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::FunExpr).count(), 2);
    assert_eq!(tree.nodes_of_kind(NodeKind::BuiltinExpr).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::ConstrExpr).count(), 1);

    // The constructor's name sits inside its ref child, not among the
    // node's own tokens.
    let constr = tree.nodes_of_kind(NodeKind::ConstrExpr).next().unwrap();
    assert_eq!(view::name(&tree, constr), Some("Some"));
    assert_eq!(tree.nodes_of_kind(NodeKind::MatchExpr).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::TFunExpr).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::TAppExpr).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::MessageExpr).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::MessageEntry).count(), 2);
}

#[test]
fn hex_qualified_types_parse() {
    // Remote library types are named through the library's address, both
    // standalone and in argument position.
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         library Remote\n\
         let a : 0x1234567890123456789012345678901234567890.Token = a\n\
         let b : Option 0x1234567890123456789012345678901234567890.Token = b\n",
    );

    assert_eq!(errors, 0);
    assert_eq!(tree.nodes_of_kind(NodeKind::HexQualifiedRef).count(), 2);
    assert_eq!(tree.nodes_of_kind(NodeKind::Error).count(), 0);
}

#[test]
fn statement_forms_all_parse() {
    let (tree, errors) = parse_counted(
        "scilla_version 0\n\
         contract Stmts()\n\
         field m: Map String Uint32 = Emp String Uint32\n\
         transition Go(key: String, v: Uint32)\n\
           m[key] := v;\n\
           got <- m[key];\n\
           here <- exists m[key];\n\
           delete m[key];\n\
           blk <- & BLOCKNUMBER;\n\
           accept;\n\
           msg = { _tag : \"done\"; _amount : v };\n\
           send msg;\n\
           event msg;\n\
           throw\n\
         end\n",
    );

    assert_eq!(errors, 0);
    assert_eq!(tree.nodes_of_kind(NodeKind::MapUpdateStmt).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::MapGetStmt).count(), 2);
    assert_eq!(tree.nodes_of_kind(NodeKind::MapDeleteStmt).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::ReadFromBcStmt).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::AcceptStmt).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::SendStmt).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::EventStmt).count(), 1);
    assert_eq!(tree.nodes_of_kind(NodeKind::ThrowStmt).count(), 1);
}
