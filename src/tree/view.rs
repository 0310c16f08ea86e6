//! Read-only structural queries over the tree. The parser guarantees the
//! rough shape of each node kind; these helpers pick out the interesting
//! parts and shrug (return `None`) when error recovery left a hole.

use crate::lex::Token;
use crate::message::Span;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

/// The defining or referencing name token of a node. For qualified refs
/// this is the part after the dot.
pub fn name_token(tree: &SyntaxTree, node: NodeId) -> Option<(&Token, Span)> {
    match tree.kind(node) {
        NodeKind::QualifiedRef | NodeKind::HexQualifiedRef => {
            tree.tokens(node).filter(|(tok, _)| tok.is_ident()).last()
        }
        NodeKind::RefExpr
        | NodeKind::ConstrExpr
        | NodeKind::ConstructorPattern
        | NodeKind::MessageEntry
        | NodeKind::RefType => {
            let inner = ref_of(tree, node)?;
            name_token(tree, inner)
        }
        _ => tree.tokens(node).find(|(tok, _)| tok.is_ident()),
    }
}

pub fn name(tree: &SyntaxTree, node: NodeId) -> Option<&str> {
    name_token(tree, node).and_then(|(tok, _)| tok.text())
}

/// The span a diagnostic about this node should point at: its name when it
/// has one, the whole node otherwise.
pub fn name_span(tree: &SyntaxTree, node: NodeId) -> Option<Span> {
    name_token(tree, node)
        .map(|(_, span)| span)
        .or_else(|| tree.span(node))
}

/// The ref node under a wrapper like a ref expression or constructor
/// pattern.
pub fn ref_of(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.child_nodes(node).find(|n| tree.kind(*n).is_ref())
}

/// The namespace part of a qualified reference, if any.
pub fn namespace(tree: &SyntaxTree, node: NodeId) -> Option<&str> {
    match tree.kind(node) {
        NodeKind::QualifiedRef => tree
            .tokens(node)
            .find(|(tok, _)| matches!(tok, Token::Cid(..)))
            .and_then(|(tok, _)| tok.text()),
        _ => None,
    }
}

pub fn child_of_kind(tree: &SyntaxTree, node: NodeId, kind: NodeKind) -> Option<NodeId> {
    tree.child_nodes(node).find(|n| tree.kind(*n) == kind)
}

pub fn children_of_kind(
    tree: &SyntaxTree,
    node: NodeId,
    kind: NodeKind,
) -> impl Iterator<Item = NodeId> + '_ {
    tree.child_nodes(node).filter(move |n| tree.kind(*n) == kind)
}

pub fn nth_expression(tree: &SyntaxTree, node: NodeId, n: usize) -> Option<NodeId> {
    tree.child_nodes(node)
        .filter(|c| tree.kind(*c).is_expression())
        .nth(n)
}

pub fn first_expression(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    nth_expression(tree, node, 0)
}

pub fn first_type(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.child_nodes(node).find(|c| tree.kind(*c).is_type())
}

pub fn type_args(tree: &SyntaxTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.child_nodes(node).filter(|c| tree.kind(*c).is_type())
}

pub fn first_pattern(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.child_nodes(node).find(|c| tree.kind(*c).is_pattern())
}

pub fn patterns(tree: &SyntaxTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.child_nodes(node).filter(|c| tree.kind(*c).is_pattern())
}

/// The annotation of a `let`, field, or typed parameter.
pub fn annotation(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    first_type(tree, node)
}

/// The right-hand side of a `let`, field definition, or bind statement.
pub fn initializer(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    first_expression(tree, node)
}

/// The `in` part of a let expression.
pub fn let_body(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    nth_expression(tree, node, 1)
}

/// The body of a `fun` or `tfun` expression.
pub fn fun_body(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    first_expression(tree, node)
}

/// The parameter-list node of a contract, component, or function.
pub fn param_list(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.child_nodes(node).find(|c| {
        matches!(
            tree.kind(*c),
            NodeKind::ContractParams
                | NodeKind::ComponentParams
                | NodeKind::ContractRefParams
                | NodeKind::FunctionParams
        )
    })
}

/// The typed parameters inside a parameter-list node.
pub fn params(tree: &SyntaxTree, list: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    children_of_kind(tree, list, NodeKind::IdWithType)
}

/// The scrutinee of a match expression or statement.
pub fn match_subject(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    child_of_kind(tree, node, NodeKind::RefExpr)
}

pub fn match_clauses(tree: &SyntaxTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.child_nodes(node).filter(|c| {
        matches!(
            tree.kind(*c),
            NodeKind::PatternMatchClause | NodeKind::ExprPatternMatchClause
        )
    })
}

pub fn clause_pattern(tree: &SyntaxTree, clause: NodeId) -> Option<NodeId> {
    first_pattern(tree, clause)
}

/// The body of an expression-match clause.
pub fn clause_body(tree: &SyntaxTree, clause: NodeId) -> Option<NodeId> {
    first_expression(tree, clause)
}

pub fn statement_list(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    child_of_kind(tree, node, NodeKind::StatementList)
}

pub fn statements(tree: &SyntaxTree, list: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.child_nodes(list)
        .filter(|c| tree.kind(*c).is_statement())
}

pub fn map_accesses(tree: &SyntaxTree, stmt: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    children_of_kind(tree, stmt, NodeKind::MapAccess)
}

/// The field reference of a load, store, or delete statement.
pub fn field_ref(tree: &SyntaxTree, stmt: NodeId) -> Option<NodeId> {
    child_of_kind(tree, stmt, NodeKind::FieldRef)
}

/// The local a fetch or bind statement introduces.
pub fn binder_token(tree: &SyntaxTree, stmt: NodeId) -> Option<(&Token, Span)> {
    if !tree.kind(stmt).is_var_binding_statement() {
        return None;
    }
    tree.tokens(stmt)
        .find(|(tok, _)| matches!(tok, Token::Id(..)))
}

pub fn library_of(tree: &SyntaxTree) -> Option<NodeId> {
    child_of_kind(tree, tree.root(), NodeKind::LibraryDef)
}

pub fn contract_of(tree: &SyntaxTree) -> Option<NodeId> {
    child_of_kind(tree, tree.root(), NodeKind::ContractDef)
}

pub fn import_entries(tree: &SyntaxTree) -> Vec<NodeId> {
    match child_of_kind(tree, tree.root(), NodeKind::Imports) {
        Some(imports) => children_of_kind(tree, imports, NodeKind::ImportEntry).collect(),
        None => Vec::new(),
    }
}

/// The library an import entry names.
pub fn import_library(tree: &SyntaxTree, entry: NodeId) -> Option<&str> {
    tree.tokens(entry)
        .find(|(tok, _)| matches!(tok, Token::Cid(..)))
        .and_then(|(tok, _)| tok.text())
}

/// The namespace an import is bound to: the name after `as`, or the
/// library name itself.
pub fn import_namespace(tree: &SyntaxTree, entry: NodeId) -> Option<&str> {
    let mut saw_as = false;
    for (tok, _) in tree.tokens(entry) {
        if saw_as {
            if let Token::Cid(text) = tok {
                return Some(text);
            }
        }
        if matches!(tok, Token::As) {
            saw_as = true;
        }
    }
    import_library(tree, entry)
}

/// Library entries, in declaration order.
pub fn library_entries(tree: &SyntaxTree, library: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.child_nodes(library).filter(|c| {
        matches!(
            tree.kind(*c),
            NodeKind::LibraryLetDef | NodeKind::LibraryTypeDef
        )
    })
}

pub fn type_constructors(tree: &SyntaxTree, typedef: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    children_of_kind(tree, typedef, NodeKind::LibraryTypeCtor)
}

pub fn contract_fields(tree: &SyntaxTree, contract: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    children_of_kind(tree, contract, NodeKind::FieldDef)
}

pub fn contract_components(tree: &SyntaxTree, contract: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.child_nodes(contract)
        .filter(|c| tree.kind(*c).is_component())
}

/// The enclosing node of the given kind-class, if any.
pub fn enclosing(
    tree: &SyntaxTree,
    node: NodeId,
    pred: impl Fn(NodeKind) -> bool,
) -> Option<NodeId> {
    tree.ancestors(node).find(|n| pred(tree.kind(*n)))
}
