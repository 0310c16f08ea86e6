//! Type computation over the syntax tree. Every query degrades to
//! [`Type::Unknown`] rather than failing: a half-parsed tree still gets
//! as many types as it can support.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::lex::Token;
use crate::resolve::{Analyzer, Builtins, Declaration, ImportResolver};
use crate::tree::{view, NodeId, NodeKind, SyntaxTree};
use crate::ty::{Algebraic, Constructor, Primitive, Substitution, Type, TypeVar};

/// Whether a memoized entry is the type a node declares (`Own`) or the
/// type it evaluates to (`Expr`). A `let` expression has both, and they
/// differ.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
enum Mode {
    Own,
    Expr,
}

type Key = (u64, NodeId, Mode);

pub struct TypeEngine<'a> {
    tree: &'a SyntaxTree,
    imports: &'a dyn ImportResolver,
    builtins: &'a Builtins,
    memo: RefCell<HashMap<Key, Type>>,
    busy: RefCell<HashSet<Key>>,
}

impl<'a> TypeEngine<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        imports: &'a dyn ImportResolver,
        builtins: &'a Builtins,
    ) -> Self {
        Self {
            tree,
            imports,
            builtins,
            memo: RefCell::new(HashMap::new()),
            busy: RefCell::new(HashSet::new()),
        }
    }

    fn analyzer(&self) -> Analyzer<'a> {
        Analyzer::new(self.tree, self.imports, self.builtins)
    }

    /// Memoizes `compute` under `(node, mode)`. Re-entering a node that
    /// is still being computed is a definition cycle, which degrades to
    /// `Unknown` instead of recursing forever.
    fn cached(&self, node: NodeId, mode: Mode, compute: impl FnOnce(&Self) -> Type) -> Type {
        let key = (self.tree.generation(), node, mode);

        if let Some(ty) = self.memo.borrow().get(&key) {
            return ty.clone();
        }
        if !self.busy.borrow_mut().insert(key) {
            return Type::Unknown;
        }

        let ty = compute(self);

        self.busy.borrow_mut().remove(&key);
        self.memo.borrow_mut().insert(key, ty.clone());
        ty
    }

    /// The type a declaration-like node gives the name it binds, or the
    /// denotation of a type element.
    pub fn own_type(&self, node: NodeId) -> Type {
        self.cached(node, Mode::Own, |this| this.compute_own_type(node))
    }

    /// The type an expression evaluates to.
    pub fn expr_type(&self, node: NodeId) -> Type {
        self.cached(node, Mode::Expr, |this| this.compute_expr_type(node))
    }

    /// The type of whatever a reference resolved to.
    pub fn declaration_type(&self, decl: &Declaration) -> Type {
        match decl {
            Declaration::Node(tree, node) => {
                if std::ptr::eq(*tree, self.tree) {
                    self.own_type(*node)
                } else {
                    // A declaration from an imported library gets typed
                    // in its own tree.
                    let engine = TypeEngine::new(tree, self.imports, self.builtins);
                    engine.own_type(*node)
                }
            }
            Declaration::BuiltinFunction(_) => Type::Unknown,
            Declaration::BuiltinValue(_, ty)
            | Declaration::BuiltinType(_, ty)
            | Declaration::BuiltinCtor(_, ty) => ty.clone(),
        }
    }

    fn resolved_type(&self, node: NodeId) -> Type {
        match self.analyzer().resolve(node).first() {
            Some(decl) => self.declaration_type(decl),
            None => Type::Unknown,
        }
    }

    fn compute_own_type(&self, node: NodeId) -> Type {
        let tree = self.tree;

        match tree.kind(node) {
            NodeKind::IdWithType => self.annotation_type(node),

            NodeKind::LetExpr | NodeKind::LibraryLetDef => {
                match view::annotation(tree, node) {
                    Some(ann) => self.own_type(ann),
                    None => match view::initializer(tree, node) {
                        Some(init) => self.expr_type(init),
                        None => Type::Unknown,
                    },
                }
            }

            NodeKind::FieldDef => self.annotation_type(node),

            NodeKind::BindStmt => match view::initializer(tree, node) {
                Some(init) => self.expr_type(init),
                None => Type::Unknown,
            },

            NodeKind::LoadStmt => self.field_type(node),

            NodeKind::MapGetStmt => {
                if self.has_exists(node) {
                    return self.builtins.bool_ty();
                }

                let mut ty = self.field_type(node);
                for _ in view::map_accesses(tree, node) {
                    match ty {
                        Type::Map(_, value) => ty = *value,
                        _ => return Type::Unknown,
                    }
                }
                self.builtins.option_of(ty)
            }

            NodeKind::RemoteMapGetStmt if self.has_exists(node) => self.builtins.bool_ty(),

            // Remote contract state is out of reach for typing.
            NodeKind::RemoteLoadStmt | NodeKind::RemoteMapGetStmt => Type::Unknown,

            NodeKind::ReadFromBcStmt => Type::Primitive(Primitive::BNum),

            NodeKind::TypeCastStmt => {
                match view::child_of_kind(tree, node, NodeKind::AddressType) {
                    Some(address) => self.builtins.option_of(self.own_type(address)),
                    None => Type::Unknown,
                }
            }

            NodeKind::BinderPattern => self.binder_pattern_type(node),

            NodeKind::LibraryTypeDef => self.typedef_type(node),
            NodeKind::LibraryTypeCtor => match tree.parent(node) {
                Some(typedef) => self.own_type(typedef),
                None => Type::Unknown,
            },

            // A tfun binds its name as a type variable in its body.
            NodeKind::TFunExpr => match view::name(tree, node) {
                Some(name) => Type::Var(TypeVar::new(name)),
                None => Type::Unknown,
            },

            NodeKind::RefType => self.ref_type(node),

            NodeKind::MapType => {
                let mut parts = view::type_args(tree, node);
                let key = parts.next();
                let value = parts.next();
                match (key, value) {
                    (Some(key), Some(value)) => Type::Map(
                        Box::new(self.own_type(key)),
                        Box::new(self.own_type(value)),
                    ),
                    _ => Type::Unknown,
                }
            }

            NodeKind::FunType => {
                let mut parts = view::type_args(tree, node);
                let param = parts.next();
                let result = parts.next();
                match (param, result) {
                    (Some(param), Some(result)) => Type::Fun(
                        Box::new(self.own_type(param)),
                        Box::new(self.own_type(result)),
                    ),
                    _ => Type::Unknown,
                }
            }

            NodeKind::PolyType => {
                let var = match view::name(tree, node) {
                    Some(name) => TypeVar::new(name),
                    None => return Type::Unknown,
                };
                let body = match view::first_type(tree, node) {
                    Some(body) => self.own_type(body),
                    None => Type::Unknown,
                };
                Type::Forall(var, Box::new(body))
            }

            NodeKind::TypeVarType => match view::name(tree, node) {
                Some(name) => Type::Var(TypeVar::new(name)),
                None => Type::Unknown,
            },

            NodeKind::ParenType => match view::first_type(tree, node) {
                Some(inner) => self.own_type(inner),
                None => Type::Unknown,
            },

            NodeKind::AddressType => self.address_type(node),

            _ => Type::Unknown,
        }
    }

    fn compute_expr_type(&self, node: NodeId) -> Type {
        let tree = self.tree;

        match tree.kind(node) {
            NodeKind::LiteralExpr => self.literal_type(node),

            NodeKind::RefExpr => self.resolved_type(node),

            NodeKind::LetExpr => match view::let_body(tree, node) {
                Some(body) => self.expr_type(body),
                None => Type::Unknown,
            },

            NodeKind::MessageExpr => Type::Primitive(Primitive::Message),

            NodeKind::FunExpr => {
                let param = view::param_list(tree, node)
                    .and_then(|list| view::params(tree, list).next())
                    .map(|param| self.own_type(param))
                    .unwrap_or(Type::Unknown);
                let body = view::fun_body(tree, node)
                    .map(|body| self.expr_type(body))
                    .unwrap_or(Type::Unknown);

                Type::Fun(Box::new(param), Box::new(body))
            }

            NodeKind::AppExpr => {
                let mut exprs = tree
                    .child_nodes(node)
                    .filter(|c| tree.kind(*c).is_expression());
                let mut ty = match exprs.next() {
                    Some(function) => self.expr_type(function),
                    None => return Type::Unknown,
                };

                for _arg in exprs {
                    match ty {
                        Type::Fun(_, result) => ty = *result,
                        _ => return Type::Unknown,
                    }
                }
                ty
            }

            NodeKind::ConstrExpr => {
                let ty = self.resolved_type(node);

                let args: Vec<Type> = view::type_args(tree, node)
                    .map(|arg| self.own_type(arg))
                    .collect();
                if args.is_empty() {
                    return ty;
                }

                match ty {
                    Type::PolyAlgebraic(origin) => Type::TypeApp(origin, args),
                    _ => Type::Unknown,
                }
            }

            NodeKind::MatchExpr => {
                match view::match_clauses(tree, node)
                    .next()
                    .and_then(|clause| view::clause_body(tree, clause))
                {
                    Some(body) => self.expr_type(body),
                    None => Type::Unknown,
                }
            }

            NodeKind::BuiltinExpr => self.builtin_call_type(node),

            NodeKind::TFunExpr => {
                let var = match view::name(tree, node) {
                    Some(name) => TypeVar::new(name),
                    None => return Type::Unknown,
                };
                let body = view::fun_body(tree, node)
                    .map(|body| self.expr_type(body))
                    .unwrap_or(Type::Unknown);

                Type::Forall(var, Box::new(body))
            }

            NodeKind::TAppExpr => {
                let mut ty = match view::first_expression(tree, node) {
                    Some(function) => self.expr_type(function),
                    None => return Type::Unknown,
                };

                for arg in view::type_args(tree, node) {
                    match ty {
                        Type::Forall(param, body) => {
                            let sub = Substitution::new(param, self.own_type(arg));
                            ty = sub.apply(&body);
                        }
                        _ => return Type::Unknown,
                    }
                }
                ty
            }

            _ => Type::Unknown,
        }
    }

    fn literal_type(&self, node: NodeId) -> Type {
        let tree = self.tree;
        let first = tree.tokens(node).next();

        match first {
            Some((Token::Cid(name), _)) => Primitive::lookup(name)
                .map(Type::Primitive)
                .unwrap_or(Type::Unknown),

            Some((Token::Str(..), _)) => Type::Primitive(Primitive::String),

            Some((Token::Hex(text), _)) => {
                let digits = text.len().saturating_sub(2);
                Type::ByStr(digits / 2)
            }

            Some((Token::Emp, _)) => {
                let mut parts = view::type_args(tree, node);
                let key = parts.next();
                let value = parts.next();
                match (key, value) {
                    (Some(key), Some(value)) => Type::Map(
                        Box::new(self.own_type(key)),
                        Box::new(self.own_type(value)),
                    ),
                    _ => Type::Unknown,
                }
            }

            _ => Type::Unknown,
        }
    }

    fn builtin_call_type(&self, node: NodeId) -> Type {
        let tree = self.tree;

        let name = match view::name(tree, node) {
            Some(name) => name,
            None => return Type::Unknown,
        };
        let function = match self.builtins.function(name) {
            Some(function) => function,
            None => return Type::Unknown,
        };

        let args: Vec<Type> = tree
            .child_nodes(node)
            .filter(|c| tree.kind(*c).is_expression())
            .map(|arg| self.expr_type(arg))
            .collect();

        function.select(&args).unwrap_or(Type::Unknown)
    }

    fn annotation_type(&self, node: NodeId) -> Type {
        match view::annotation(self.tree, node) {
            Some(ann) => self.own_type(ann),
            None => Type::Unknown,
        }
    }

    /// The declared type of the field a fetch statement reads.
    fn field_type(&self, node: NodeId) -> Type {
        match view::field_ref(self.tree, node) {
            Some(field) => self.resolved_type(field),
            None => Type::Unknown,
        }
    }

    fn has_exists(&self, node: NodeId) -> bool {
        self.tree
            .tokens(node)
            .any(|(tok, _)| matches!(tok, Token::Exists))
    }

    fn ref_type(&self, node: NodeId) -> Type {
        let ty = self.resolved_type(node);

        let args: Vec<Type> = view::type_args(self.tree, node)
            .map(|arg| self.own_type(arg))
            .collect();
        if args.is_empty() {
            return ty;
        }

        match ty {
            Type::PolyAlgebraic(origin) => Type::TypeApp(origin, args),
            _ => Type::Unknown,
        }
    }

    fn address_type(&self, node: NodeId) -> Type {
        let tree = self.tree;

        let mut fields = Vec::new();
        for field in view::children_of_kind(tree, node, NodeKind::AddressTypeField) {
            if let Some(binding) = view::child_of_kind(tree, field, NodeKind::IdWithType) {
                if let Some(name) = view::name(tree, binding) {
                    fields.push((name.to_string(), self.own_type(binding)));
                }
            }
        }

        let refined = !fields.is_empty()
            || tree
                .tokens(node)
                .any(|(tok, _)| matches!(tok, Token::Contract));

        if refined {
            Type::Address(Some(fields))
        } else {
            Type::Address(None)
        }
    }

    /// The algebraic type a library `type` declaration defines.
    fn typedef_type(&self, node: NodeId) -> Type {
        let tree = self.tree;

        let name = match view::name(tree, node) {
            Some(name) => name.to_string(),
            None => return Type::Unknown,
        };

        let constructors = view::type_constructors(tree, node)
            .map(|ctor| {
                let ctor_name = view::name(tree, ctor).unwrap_or_default().to_string();
                let fields = view::type_args(tree, ctor)
                    .map(|arg| self.own_type(arg))
                    .collect();
                Constructor::new(ctor_name, fields)
            })
            .collect();

        Type::Algebraic(Rc::new(Algebraic::new(name, constructors)))
    }

    /// Types a binder pattern by walking the enclosing clause's pattern
    /// top-down from the match subject's type.
    fn binder_pattern_type(&self, binder: NodeId) -> Type {
        let tree = self.tree;

        let clause = match tree.ancestors(binder).find(|anc| {
            matches!(
                tree.kind(*anc),
                NodeKind::PatternMatchClause | NodeKind::ExprPatternMatchClause
            )
        }) {
            Some(clause) => clause,
            None => return Type::Unknown,
        };

        let subject = tree
            .parent(clause)
            .and_then(|m| view::match_subject(tree, m))
            .map(|subject| self.expr_type(subject))
            .unwrap_or(Type::Unknown);

        match view::clause_pattern(tree, clause) {
            Some(pattern) => self
                .find_in_pattern(pattern, &subject, binder)
                .unwrap_or(Type::Unknown),
            None => Type::Unknown,
        }
    }

    fn find_in_pattern(&self, pattern: NodeId, expected: &Type, target: NodeId) -> Option<Type> {
        let tree = self.tree;

        if pattern == target {
            return Some(expected.clone());
        }

        match tree.kind(pattern) {
            NodeKind::ParenPattern => {
                let inner = view::first_pattern(tree, pattern)?;
                self.find_in_pattern(inner, expected, target)
            }

            NodeKind::ConstructorPattern => {
                let name = view::name(tree, pattern)?;
                let fields = constructor_fields(name, expected)?;

                for (sub, field_ty) in view::patterns(tree, pattern).zip(fields) {
                    if let Some(found) = self.find_in_pattern(sub, &field_ty, target) {
                        return Some(found);
                    }
                }
                None
            }

            _ => None,
        }
    }
}

/// The field types of the named constructor under `expected`, with any
/// type application already substituted through.
fn constructor_fields(name: &str, expected: &Type) -> Option<Vec<Type>> {
    match expected {
        Type::TypeApp(origin, args) => origin.constructor_fields(name, args),
        Type::PolyAlgebraic(poly) => poly.body.constructor(name).map(|c| c.fields().to_vec()),
        Type::Algebraic(adt) => adt.constructor(name).map(|c| c.fields().to_vec()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::NoImports;
    use crate::NoopDriver;

    fn parse(src: &str) -> SyntaxTree {
        let mut driver = NoopDriver;
        let tokens = crate::lex::lex(&mut driver, src, 0);
        crate::parse::parse(&mut driver, tokens, 0)
    }

    fn find_named(tree: &SyntaxTree, kind: NodeKind, name: &str) -> NodeId {
        tree.nodes_of_kind(kind)
            .find(|n| view::name(tree, *n) == Some(name))
            .unwrap_or_else(|| panic!("no {kind:?} named {name}"))
    }

    #[test]
    fn literal_types() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let a = Uint32 42\n\
             let b = \"hello\"\n\
             let c = 0x11223344\n\
             let m = Emp String Uint128\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let a = find_named(&tree, NodeKind::LibraryLetDef, "a");
        assert_eq!(engine.own_type(a), Type::Primitive(Primitive::Uint32));

        let b = find_named(&tree, NodeKind::LibraryLetDef, "b");
        assert_eq!(engine.own_type(b), Type::Primitive(Primitive::String));

        let c = find_named(&tree, NodeKind::LibraryLetDef, "c");
        assert_eq!(engine.own_type(c), Type::ByStr(4));

        let m = find_named(&tree, NodeKind::LibraryLetDef, "m");
        assert_eq!(
            engine.own_type(m),
            Type::Map(
                Box::new(Type::Primitive(Primitive::String)),
                Box::new(Type::Primitive(Primitive::Uint128)),
            )
        );
    }

    #[test]
    fn fun_literal_presents_as_arrow() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let f = fun (a: Int32) => a\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let f = find_named(&tree, NodeKind::LibraryLetDef, "f");
        assert_eq!(engine.own_type(f).to_string(), "Int32 -> Int32");
    }

    #[test]
    fn application_peels_function_layers() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let f = fun (a: Int32) => fun (b: Int32) => b\n\
             let one = Int32 1\n\
             let g = f one\n\
             let h = f one one\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let g = find_named(&tree, NodeKind::LibraryLetDef, "g");
        assert_eq!(engine.own_type(g).to_string(), "Int32 -> Int32");

        let h = find_named(&tree, NodeKind::LibraryLetDef, "h");
        assert_eq!(engine.own_type(h), Type::Primitive(Primitive::Int32));
    }

    #[test]
    fn annotation_beats_initializer() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let a: Uint128 = Uint32 1\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let a = find_named(&tree, NodeKind::LibraryLetDef, "a");
        assert_eq!(engine.own_type(a), Type::Primitive(Primitive::Uint128));
    }

    #[test]
    fn builtin_overloads_pick_by_argument_type() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let one = Uint128 1\n\
             let two = Uint128 2\n\
             let sum = builtin add one two\n\
             let cmp = builtin lt one two\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let sum = find_named(&tree, NodeKind::LibraryLetDef, "sum");
        assert_eq!(engine.own_type(sum), Type::Primitive(Primitive::Uint128));

        let cmp = find_named(&tree, NodeKind::LibraryLetDef, "cmp");
        assert_eq!(engine.own_type(cmp), builtins.bool_ty());
    }

    #[test]
    fn type_application_substitutes_foralls() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let id = tfun 'T => fun (x: 'T) => x\n\
             let id_int = @id Int32\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let id = find_named(&tree, NodeKind::LibraryLetDef, "id");
        assert_eq!(engine.own_type(id).to_string(), "forall 'T. 'T -> 'T");

        let id_int = find_named(&tree, NodeKind::LibraryLetDef, "id_int");
        assert_eq!(engine.own_type(id_int).to_string(), "Int32 -> Int32");
    }

    #[test]
    fn constructor_expressions_apply_type_arguments() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let one = Uint32 1\n\
             let s = Some {Uint32} one\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let s = find_named(&tree, NodeKind::LibraryLetDef, "s");
        assert_eq!(
            engine.own_type(s),
            builtins.option_of(Type::Primitive(Primitive::Uint32))
        );
    }

    #[test]
    fn statement_bindings_get_types() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test()\n\
             field votes: Map String Uint32 = Emp String Uint32\n\
             field owner: ByStr20 = 0x0000000000000000000000000000000000000000\n\
             transition Go()\n\
               o <- owner;\n\
               v <- votes[o];\n\
               seen <- exists votes[o];\n\
               blk <- & BLOCKNUMBER\n\
             end\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let load = find_named(&tree, NodeKind::LoadStmt, "o");
        assert_eq!(engine.own_type(load), Type::ByStr(20));

        let get = find_named(&tree, NodeKind::MapGetStmt, "v");
        assert_eq!(
            engine.own_type(get),
            builtins.option_of(Type::Primitive(Primitive::Uint32))
        );

        let exists = find_named(&tree, NodeKind::MapGetStmt, "seen");
        assert_eq!(engine.own_type(exists), builtins.bool_ty());

        let blk = find_named(&tree, NodeKind::ReadFromBcStmt, "blk");
        assert_eq!(engine.own_type(blk), Type::Primitive(Primitive::BNum));
    }

    #[test]
    fn match_binders_are_typed_from_the_subject() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let one = Uint32 1\n\
             let s = Some {Uint32} one\n\
             let r = match s with\n\
             | Some inner => inner\n\
             | None => one\n\
             end\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let binder = find_named(&tree, NodeKind::BinderPattern, "inner");
        assert_eq!(engine.own_type(binder), Type::Primitive(Primitive::Uint32));

        // The match takes the type of its first clause body.
        let r = find_named(&tree, NodeKind::LibraryLetDef, "r");
        assert_eq!(engine.own_type(r), Type::Primitive(Primitive::Uint32));
    }

    #[test]
    fn recursive_type_definitions_do_not_loop() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             type Tree =\n\
             | Leaf\n\
             | Node of Tree Tree\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let typedef = find_named(&tree, NodeKind::LibraryTypeDef, "Tree");
        match engine.own_type(typedef) {
            Type::Algebraic(adt) => {
                assert_eq!(adt.name, "Tree");
                assert_eq!(adt.constructors.len(), 2);
                // The recursive occurrence degraded to Unknown instead of
                // hanging; the names are what matter for equality.
                assert_eq!(adt.constructors[1].name(), "Node");
            }
            other => panic!("expected an algebraic type, got {other}"),
        }
    }

    #[test]
    fn type_cast_statements_produce_optional_addresses() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test(other: ByStr20)\n\
             transition Go()\n\
               maybe <- & other as ByStr20 with end\n\
             end\n",
        );

        let builtins = Builtins::new();
        let engine = TypeEngine::new(&tree, &NoImports, &builtins);

        let cast = find_named(&tree, NodeKind::TypeCastStmt, "maybe");
        assert_eq!(
            engine.own_type(cast),
            builtins.option_of(Type::Address(None))
        );
    }
}
