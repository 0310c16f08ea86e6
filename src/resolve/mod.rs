//! Name resolution. An [`Analyzer`] answers "what does this reference
//! mean?" by walking the lexical scopes the tree encodes, consulting the
//! builtin tables and imported libraries where the walk runs out.

pub mod builtins;

pub use builtins::{BuiltinFunction, Builtins, Signature};

use crate::tree::{view, NodeId, NodeKind, SyntaxTree};
use crate::ty::{Primitive, Type};

/// Supplies the syntax trees of imported libraries by name.
pub trait ImportResolver {
    fn lookup_library(&self, name: &str) -> Option<&SyntaxTree>;
}

/// Resolves every import to nothing.
pub struct NoImports;

impl ImportResolver for NoImports {
    fn lookup_library(&self, _name: &str) -> Option<&SyntaxTree> {
        None
    }
}

/// Something a reference can resolve to: a node of some tree, or one of
/// the builtin entities that exist without being written anywhere.
#[derive(Clone)]
pub enum Declaration<'a> {
    Node(&'a SyntaxTree, NodeId),
    BuiltinFunction(&'a BuiltinFunction),
    BuiltinValue(String, Type),
    BuiltinType(String, Type),
    BuiltinCtor(String, Type),
}

impl Declaration<'_> {
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Node(tree, node) => view::name(tree, *node),
            Declaration::BuiltinFunction(function) => Some(function.name),
            Declaration::BuiltinValue(name, _)
            | Declaration::BuiltinType(name, _)
            | Declaration::BuiltinCtor(name, _) => Some(name),
        }
    }
}

/// How a reference is qualified.
enum Path<'t> {
    Simple,
    Namespaced(&'t str),
    Hex,
}

pub struct Analyzer<'a> {
    tree: &'a SyntaxTree,
    imports: &'a dyn ImportResolver,
    builtins: &'a Builtins,
}

/// `true` from a processor callback stops the search.
type Sink<'a, 'f> = &'f mut dyn FnMut(Declaration<'a>) -> bool;

impl<'a> Analyzer<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        imports: &'a dyn ImportResolver,
        builtins: &'a Builtins,
    ) -> Self {
        Self {
            tree,
            imports,
            builtins,
        }
    }

    /// What `node` refers to. Scopes are searched inside out and the
    /// first producer with a matching name wins; an unresolvable
    /// reference gives an empty vec.
    pub fn resolve(&self, node: NodeId) -> Vec<Declaration<'a>> {
        let Some(name) = view::name(self.tree, node) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        self.process(node, Some(name), &mut |decl| {
            if decl.name() == Some(name) {
                found.push(decl);
                true
            } else {
                false
            }
        });

        found
    }

    /// Everything `node` could refer to, unfiltered. Completion-style.
    pub fn candidates(&self, node: NodeId) -> Vec<Declaration<'a>> {
        let mut found = Vec::new();
        self.process(node, None, &mut |decl| {
            found.push(decl);
            false
        });

        found
    }

    /// Whether the namespace of a qualified reference names an import.
    pub fn namespace_resolves(&self, node: NodeId) -> bool {
        let refn = self.ref_node(node);
        match self.path_of(refn) {
            Path::Namespaced(ns) => self.imported_library(ns).is_some(),
            _ => true,
        }
    }

    fn process(&self, node: NodeId, query: Option<&str>, f: Sink<'a, '_>) -> bool {
        match self.tree.kind(node) {
            NodeKind::RefExpr => self.process_value_ref(node, f),
            NodeKind::ConstrExpr | NodeKind::ConstructorPattern => self.process_ctor_ref(node, f),
            NodeKind::RefType => self.process_type_ref(node, query, f),
            NodeKind::TypeVarType => self.process_type_var_binders(node, f),
            NodeKind::FieldRef => self.process_field_ref(node, f),
            NodeKind::BuiltinExpr => self.process_builtin_functions(f),
            NodeKind::CallStmt => self.process_procedures(f),
            kind if kind.is_ref() => match self.tree.parent(node) {
                Some(parent) => self.process(parent, query, f),
                None => false,
            },
            _ => false,
        }
    }

    fn ref_node(&self, node: NodeId) -> NodeId {
        if self.tree.kind(node).is_ref() {
            node
        } else {
            view::ref_of(self.tree, node).unwrap_or(node)
        }
    }

    fn path_of(&self, refn: NodeId) -> Path<'a> {
        match self.tree.kind(refn) {
            NodeKind::HexQualifiedRef => Path::Hex,
            NodeKind::QualifiedRef => match view::namespace(self.tree, refn) {
                Some(ns) => Path::Namespaced(ns),
                None => Path::Simple,
            },
            _ => Path::Simple,
        }
    }

    fn imported_library(&self, namespace: &str) -> Option<&'a SyntaxTree> {
        for entry in view::import_entries(self.tree) {
            if view::import_namespace(self.tree, entry) == Some(namespace) {
                let library = view::import_library(self.tree, entry)?;
                return self.imports.lookup_library(library);
            }
        }
        None
    }

    fn process_value_ref(&self, node: NodeId, f: Sink<'a, '_>) -> bool {
        match self.path_of(self.ref_node(node)) {
            Path::Hex => false,
            Path::Namespaced(ns) => match self.imported_library(ns) {
                Some(library) => self.process_library_values(library, f),
                None => false,
            },
            Path::Simple => self.process_lexical_values(node, f),
        }
    }

    /// The inside-out scope walk for an unqualified value reference.
    fn process_lexical_values(&self, origin: NodeId, f: Sink<'a, '_>) -> bool {
        let tree = self.tree;
        let mut prev = origin;

        for anc in tree.ancestors(origin) {
            let kind = tree.kind(anc);

            if kind.is_statement() {
                // Statements scope sequentially: only earlier bindings in
                // the same list are visible.
                for sibling in tree.preceding_siblings(anc) {
                    if tree.kind(sibling).is_var_binding_statement()
                        && f(Declaration::Node(tree, sibling))
                    {
                        return true;
                    }
                }
            }

            match kind {
                NodeKind::LetExpr => {
                    // The binding is visible in the body, not its own
                    // initializer or annotation.
                    if Some(prev) == view::let_body(tree, anc)
                        && f(Declaration::Node(tree, anc))
                    {
                        return true;
                    }
                }

                NodeKind::FunExpr => {
                    if self.process_params(anc, f) {
                        return true;
                    }
                }

                NodeKind::PatternMatchClause | NodeKind::ExprPatternMatchClause => {
                    if let Some(pattern) = view::clause_pattern(tree, anc) {
                        for binder in tree.descendants(pattern) {
                            if tree.kind(binder) == NodeKind::BinderPattern
                                && f(Declaration::Node(tree, binder))
                            {
                                return true;
                            }
                        }
                    }
                }

                NodeKind::TransitionDef | NodeKind::ProcedureDef => {
                    if self.process_params(anc, f) {
                        return true;
                    }
                    for (name, ty) in [
                        ("_sender", Type::Address(None)),
                        ("_amount", Type::Primitive(Primitive::Uint128)),
                        ("_origin", Type::Address(None)),
                    ] {
                        if f(Declaration::BuiltinValue(name.to_string(), ty)) {
                            return true;
                        }
                    }
                }

                NodeKind::ContractDef => {
                    if self.process_params(anc, f) {
                        return true;
                    }
                    for (name, ty) in [
                        ("_this_address", Type::ByStr(20)),
                        ("_creation_block", Type::Primitive(Primitive::BNum)),
                        ("_scilla_version", Type::Primitive(Primitive::Uint32)),
                    ] {
                        if f(Declaration::BuiltinValue(name.to_string(), ty)) {
                            return true;
                        }
                    }
                }

                NodeKind::Root => {
                    for (name, ty) in self.builtins.folds() {
                        if f(Declaration::BuiltinValue(name.to_string(), ty.clone())) {
                            return true;
                        }
                    }
                    if self.process_libraries(&mut |library| {
                        self.process_library_values(library, f)
                    }) {
                        return true;
                    }
                }

                _ => {}
            }

            prev = anc;
        }

        false
    }

    fn process_params(&self, owner: NodeId, f: Sink<'a, '_>) -> bool {
        let tree = self.tree;
        if let Some(list) = view::param_list(tree, owner) {
            for param in view::params(tree, list) {
                if f(Declaration::Node(tree, param)) {
                    return true;
                }
            }
        }
        false
    }

    /// Runs `f` over the current library (if any) and then each imported
    /// one, in import order.
    fn process_libraries(&self, f: &mut dyn FnMut(&'a SyntaxTree) -> bool) -> bool {
        if view::library_of(self.tree).is_some() && f(self.tree) {
            return true;
        }

        for entry in view::import_entries(self.tree) {
            if let Some(name) = view::import_library(self.tree, entry) {
                if let Some(library) = self.imports.lookup_library(name) {
                    if f(library) {
                        return true;
                    }
                }
            }
        }

        false
    }

    fn process_library_values(&self, tree: &'a SyntaxTree, f: Sink<'a, '_>) -> bool {
        if let Some(library) = view::library_of(tree) {
            for entry in view::library_entries(tree, library) {
                if tree.kind(entry) == NodeKind::LibraryLetDef && f(Declaration::Node(tree, entry))
                {
                    return true;
                }
            }
        }
        false
    }

    fn process_ctor_ref(&self, node: NodeId, f: Sink<'a, '_>) -> bool {
        match self.path_of(self.ref_node(node)) {
            Path::Hex => false,
            Path::Namespaced(ns) => match self.imported_library(ns) {
                Some(library) => self.process_library_ctors(library, f),
                None => false,
            },
            Path::Simple => {
                for (adt, ctor) in self.builtins.constructors() {
                    if f(Declaration::BuiltinCtor(ctor.name().to_string(), adt)) {
                        return true;
                    }
                }
                self.process_libraries(&mut |library| self.process_library_ctors(library, f))
            }
        }
    }

    fn process_library_ctors(&self, tree: &'a SyntaxTree, f: Sink<'a, '_>) -> bool {
        if let Some(library) = view::library_of(tree) {
            for entry in view::library_entries(tree, library) {
                if tree.kind(entry) != NodeKind::LibraryTypeDef {
                    continue;
                }
                for ctor in view::type_constructors(tree, entry) {
                    if f(Declaration::Node(tree, ctor)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn process_type_ref(&self, node: NodeId, query: Option<&str>, f: Sink<'a, '_>) -> bool {
        match self.path_of(self.ref_node(node)) {
            Path::Hex => false,
            Path::Namespaced(ns) => match self.imported_library(ns) {
                Some(library) => self.process_library_types(library, f),
                None => false,
            },
            Path::Simple => {
                for p in Primitive::ALL {
                    if f(Declaration::BuiltinType(
                        p.name().to_string(),
                        Type::Primitive(p),
                    )) {
                        return true;
                    }
                }

                for adt in self.builtins.adts() {
                    let name = adt.name().unwrap_or("?").to_string();
                    if f(Declaration::BuiltinType(name, adt)) {
                        return true;
                    }
                }

                // ByStrN types exist for every N; only the one actually
                // named can be offered when resolving.
                match query {
                    Some(name) => {
                        if let Some(size) = name
                            .strip_prefix("ByStr")
                            .filter(|rest| !rest.is_empty())
                            .and_then(|rest| rest.parse::<usize>().ok())
                        {
                            if f(Declaration::BuiltinType(
                                name.to_string(),
                                Type::ByStr(size),
                            )) {
                                return true;
                            }
                        }
                    }
                    None => {
                        for size in [20, 32] {
                            if f(Declaration::BuiltinType(
                                format!("ByStr{size}"),
                                Type::ByStr(size),
                            )) {
                                return true;
                            }
                        }
                    }
                }

                self.process_libraries(&mut |library| self.process_library_types(library, f))
            }
        }
    }

    fn process_library_types(&self, tree: &'a SyntaxTree, f: Sink<'a, '_>) -> bool {
        if let Some(library) = view::library_of(tree) {
            for entry in view::library_entries(tree, library) {
                if tree.kind(entry) == NodeKind::LibraryTypeDef && f(Declaration::Node(tree, entry))
                {
                    return true;
                }
            }
        }
        false
    }

    /// `'A` resolves to the nearest enclosing `tfun` or `forall` binding
    /// the same name.
    fn process_type_var_binders(&self, node: NodeId, f: Sink<'a, '_>) -> bool {
        for anc in self.tree.ancestors(node) {
            if matches!(
                self.tree.kind(anc),
                NodeKind::TFunExpr | NodeKind::PolyType
            ) && f(Declaration::Node(self.tree, anc))
            {
                return true;
            }
        }
        false
    }

    fn process_field_ref(&self, node: NodeId, f: Sink<'a, '_>) -> bool {
        // Remote fields live in some other contract; nothing local to
        // resolve them against.
        if matches!(
            self.tree.parent(node).map(|p| self.tree.kind(p)),
            Some(NodeKind::RemoteLoadStmt) | Some(NodeKind::RemoteMapGetStmt)
        ) {
            return false;
        }

        if f(Declaration::BuiltinValue(
            "_balance".to_string(),
            Type::Primitive(Primitive::Uint128),
        )) {
            return true;
        }

        if let Some(contract) = view::contract_of(self.tree) {
            for field in view::contract_fields(self.tree, contract) {
                if f(Declaration::Node(self.tree, field)) {
                    return true;
                }
            }
        }

        false
    }

    fn process_builtin_functions(&self, f: Sink<'a, '_>) -> bool {
        for function in self.builtins.functions() {
            if f(Declaration::BuiltinFunction(function)) {
                return true;
            }
        }
        false
    }

    fn process_procedures(&self, f: Sink<'a, '_>) -> bool {
        if let Some(contract) = view::contract_of(self.tree) {
            for component in view::contract_components(self.tree, contract) {
                if self.tree.kind(component) == NodeKind::ProcedureDef
                    && f(Declaration::Node(self.tree, component))
                {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;
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
    fn transition_parameter_resolves() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test(owner: ByStr20)\n\
             transition Go(amount: Uint128)\n\
               x = amount;\n\
               y = missing\n\
             end\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let amount = find_named(&tree, NodeKind::RefExpr, "amount");
        let found = analyzer.resolve(amount);
        assert_eq!(found.len(), 1);
        assert!(matches!(
            found[0],
            Declaration::Node(_, param) if tree.kind(param) == NodeKind::IdWithType
        ));

        let missing = find_named(&tree, NodeKind::RefExpr, "missing");
        assert!(analyzer.resolve(missing).is_empty());
    }

    #[test]
    fn statements_scope_sequentially() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test()\n\
             transition Go()\n\
               x = Uint32 1;\n\
               x = Uint32 2;\n\
               y = x\n\
             end\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let binds: Vec<_> = tree
            .nodes_of_kind(NodeKind::BindStmt)
            .filter(|n| view::name(&tree, *n) == Some("x"))
            .collect();
        assert_eq!(binds.len(), 2);

        let usage = find_named(&tree, NodeKind::RefExpr, "x");
        let found = analyzer.resolve(usage);
        assert_eq!(found.len(), 1);

        // The nearer of the two bindings shadows the earlier one.
        match found[0] {
            Declaration::Node(_, node) => assert_eq!(node, binds[1]),
            _ => panic!("expected a node declaration"),
        }
    }

    #[test]
    fn let_binding_is_not_visible_in_its_own_initializer() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let a = let b = b in b\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let refs: Vec<_> = tree
            .nodes_of_kind(NodeKind::RefExpr)
            .filter(|n| view::name(&tree, *n) == Some("b"))
            .collect();
        assert_eq!(refs.len(), 2);

        // First occurrence is the initializer, second the body.
        assert!(analyzer.resolve(refs[0]).is_empty());
        assert_eq!(analyzer.resolve(refs[1]).len(), 1);
    }

    #[test]
    fn builtin_constructors_resolve() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let t = True\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let t = find_named(&tree, NodeKind::ConstrExpr, "True");
        let found = analyzer.resolve(t);
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], Declaration::BuiltinCtor(..)));
    }

    #[test]
    fn builtin_call_names_resolve_against_the_table() {
        let tree = parse(
            "scilla_version 0\n\
             library Test\n\
             let one = Uint32 1\n\
             let s = builtin add one one\n\
             let t = builtin frobnicate one\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let add = find_named(&tree, NodeKind::BuiltinExpr, "add");
        let found = analyzer.resolve(add);
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], Declaration::BuiltinFunction(..)));

        // A misspelled builtin has nothing to resolve to.
        let unknown = find_named(&tree, NodeKind::BuiltinExpr, "frobnicate");
        assert!(analyzer.resolve(unknown).is_empty());
    }

    #[test]
    fn component_implicits_resolve() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test()\n\
             transition Go()\n\
               x = _sender\n\
             end\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let sender = find_named(&tree, NodeKind::RefExpr, "_sender");
        let found = analyzer.resolve(sender);
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], Declaration::BuiltinValue(..)));
    }

    #[test]
    fn fields_resolve_against_contract_declarations() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test()\n\
             field total: Uint128 = Uint128 0\n\
             transition Go()\n\
               t <- total;\n\
               b <- _balance;\n\
               w <- wrong\n\
             end\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let total = find_named(&tree, NodeKind::FieldRef, "total");
        assert_eq!(analyzer.resolve(total).len(), 1);

        let balance = find_named(&tree, NodeKind::FieldRef, "_balance");
        assert!(matches!(
            analyzer.resolve(balance).first(),
            Some(Declaration::BuiltinValue(..))
        ));

        let wrong = find_named(&tree, NodeKind::FieldRef, "wrong");
        assert!(analyzer.resolve(wrong).is_empty());
    }

    #[test]
    fn qualified_refs_search_only_their_namespace() {
        let library = parse(
            "scilla_version 0\n\
             library Helpers\n\
             let shared = Uint32 1\n",
        );

        struct OneLibrary(SyntaxTree);
        impl ImportResolver for OneLibrary {
            fn lookup_library(&self, name: &str) -> Option<&SyntaxTree> {
                (name == "Helpers").then_some(&self.0)
            }
        }

        let imports = OneLibrary(library);
        let tree = parse(
            "scilla_version 0\n\
             import Helpers as H\n\
             library Test\n\
             let a = H.shared\n\
             let b = Wrong.shared\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &imports, &builtins);

        let good = find_named(&tree, NodeKind::RefExpr, "shared");
        assert_eq!(analyzer.resolve(good).len(), 1);
        assert!(analyzer.namespace_resolves(good));

        let bad = tree
            .nodes_of_kind(NodeKind::RefExpr)
            .filter(|n| view::name(&tree, *n) == Some("shared"))
            .nth(1)
            .unwrap();
        assert!(analyzer.resolve(bad).is_empty());
        assert!(!analyzer.namespace_resolves(bad));
    }

    #[test]
    fn bystr_types_resolve_by_suffix() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test(addr: ByStr33, bad: ByStrX)\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let addr = find_named(&tree, NodeKind::RefType, "ByStr33");
        let found = analyzer.resolve(addr);
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0],
            Declaration::BuiltinType(_, Type::ByStr(33))
        ));

        let bad = find_named(&tree, NodeKind::RefType, "ByStrX");
        assert!(analyzer.resolve(bad).is_empty());
    }

    #[test]
    fn call_statements_resolve_to_procedures() {
        let tree = parse(
            "scilla_version 0\n\
             contract Test()\n\
             procedure Helper(x: Uint32)\n\
             end\n\
             transition Go()\n\
               one = Uint32 1;\n\
               Helper one\n\
             end\n",
        );

        let builtins = Builtins::new();
        let analyzer = Analyzer::new(&tree, &NoImports, &builtins);

        let call = find_named(&tree, NodeKind::CallStmt, "Helper");
        let found = analyzer.resolve(call);
        assert_eq!(found.len(), 1);
        assert!(matches!(
            found[0],
            Declaration::Node(_, node) if tree.kind(node) == NodeKind::ProcedureDef
        ));
    }
}
