mod args;
mod console_driver;

use std::fs;

use anyhow::Context;
use clap::Parser;
use codespan_reporting::files::SimpleFiles;
use log::debug;

use scillac::lex::lex;
use scillac::message::Messages;
use scillac::parse::parse;
use scillac::resolve::{Analyzer, Builtins, NoImports};
use scillac::tree::{view, NodeId, NodeKind, SyntaxTree};
use scillac::ty::infer::TypeEngine;
use scillac::Driver;

use args::{Arguments, Command};
use console_driver::ConsoleDriver;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let arguments = Arguments::parse();
    match &arguments.command {
        Command::Check(opts) => check(opts),
    }
}

fn check(opts: &args::Options) -> anyhow::Result<()> {
    let name = opts.path.display().to_string();
    let src = fs::read_to_string(&opts.path).with_context(|| format!("could not read '{name}'"))?;

    let mut files = SimpleFiles::new();
    let file = files.add(name, src.clone());
    let mut driver = ConsoleDriver::new(files);

    let tokens = lex(&mut driver, &src, file);
    let tree = parse(&mut driver, tokens, file);

    let builtins = Builtins::new();
    let analyzer = Analyzer::new(&tree, &NoImports, &builtins);
    let engine = TypeEngine::new(&tree, &NoImports, &builtins);

    let mut messages = Messages::new();
    for node in tree.preorder() {
        if checkable_reference(&tree, node) {
            resolve_reference(&analyzer, &tree, node, &mut messages);
        }

        if tree.kind(node).is_var_binding_statement()
            || matches!(
                tree.kind(node),
                NodeKind::LibraryLetDef | NodeKind::FieldDef | NodeKind::IdWithType
            )
        {
            let ty = engine.own_type(node);
            if let Some(name) = view::name(&tree, node) {
                debug!("{name}: {ty}");
            }
        }
    }

    driver.report(messages);

    match driver.errors() {
        0 => Ok(()),
        1 => anyhow::bail!("found 1 error"),
        n => anyhow::bail!("found {n} errors"),
    }
}

/// Whether `node` is a reference the resolver can be asked about. Remote
/// field reads and hex-qualified references point into other contracts,
/// so an empty resolution for them is not an error.
fn checkable_reference(tree: &SyntaxTree, node: NodeId) -> bool {
    match tree.kind(node) {
        NodeKind::RefExpr
        | NodeKind::ConstrExpr
        | NodeKind::ConstructorPattern
        | NodeKind::RefType
        | NodeKind::TypeVarType
        | NodeKind::BuiltinExpr
        | NodeKind::CallStmt => {}

        NodeKind::FieldRef => {
            if matches!(
                tree.parent(node).map(|p| tree.kind(p)),
                Some(NodeKind::RemoteLoadStmt) | Some(NodeKind::RemoteMapGetStmt)
            ) {
                return false;
            }
        }

        _ => return false,
    }

    !matches!(
        view::ref_of(tree, node).map(|r| tree.kind(r)),
        Some(NodeKind::HexQualifiedRef)
    )
}

fn resolve_reference(
    analyzer: &Analyzer,
    tree: &SyntaxTree,
    node: NodeId,
    messages: &mut Messages,
) {
    let Some(name) = view::name(tree, node) else {
        return;
    };
    let Some(span) = view::name_span(tree, node) else {
        return;
    };

    if !analyzer.namespace_resolves(node) {
        let namespace = view::ref_of(tree, node)
            .and_then(|refn| view::namespace(tree, refn))
            .unwrap_or(name);
        messages.at(span).resolve_unknown_namespace(namespace);
        return;
    }

    if analyzer.resolve(node).is_empty() {
        messages.at(span).resolve_unknown_name(name);
    }
}
