//! The ambient Scilla environment: the builtin ADTs, the overloaded
//! `builtin` functions, and the file-level fold combinators.

use std::rc::Rc;

use crate::ty::{Algebraic, Constructor, Deduction, PolyAlgebraic, Primitive, Type, TypeVar};

/// One overload of a builtin function. `type_params` is empty for the
/// monomorphic ones.
pub struct Signature {
    pub type_params: Vec<TypeVar>,
    pub ret: Type,
    pub params: Vec<Type>,
}

impl Signature {
    fn mono(ret: Type, params: Vec<Type>) -> Self {
        Self {
            type_params: Vec::new(),
            ret,
            params,
        }
    }
}

pub struct BuiltinFunction {
    pub name: &'static str,
    pub signatures: Vec<Signature>,
}

impl BuiltinFunction {
    /// The return type of the first overload accepting `args`.
    /// Polymorphic overloads go through deduction; a deduction conflict
    /// rejects the overload outright.
    pub fn select(&self, args: &[Type]) -> Option<Type> {
        for sig in &self.signatures {
            if sig.type_params.is_empty() {
                if sig.params == args {
                    return Some(sig.ret.clone());
                }
            } else if sig.params.len() == args.len() {
                let mut deduction = Deduction::new();
                for (param, arg) in sig.params.iter().zip(args) {
                    deduction.deduce(param, arg);
                }
                if !deduction.is_conflicted() {
                    return Some(deduction.apply(&sig.ret));
                }
            }
        }
        None
    }
}

/// The builtin tables, constructed once and shared by reference.
pub struct Builtins {
    pub bool_adt: Rc<Algebraic>,
    pub nat_adt: Rc<Algebraic>,
    pub option_adt: Rc<PolyAlgebraic>,
    pub list_adt: Rc<PolyAlgebraic>,
    pub pair_adt: Rc<PolyAlgebraic>,
    functions: Vec<BuiltinFunction>,
    folds: Vec<(&'static str, Type)>,
}

fn fun(param: Type, result: Type) -> Type {
    Type::Fun(Box::new(param), Box::new(result))
}

fn var(name: &str) -> Type {
    Type::Var(TypeVar::new(name))
}

impl Builtins {
    pub fn new() -> Self {
        let a = TypeVar::new("'A");
        let b = TypeVar::new("'B");

        let bool_adt = Rc::new(Algebraic::new(
            "Bool",
            vec![
                Constructor::new("True", vec![]),
                Constructor::new("False", vec![]),
            ],
        ));

        let nat_adt = Rc::new(Algebraic::new(
            "Nat",
            vec![
                Constructor::new("Zero", vec![]),
                Constructor::new("Succ", vec![]),
            ],
        ));

        let option_adt = Rc::new(PolyAlgebraic::new(
            vec![a.clone()],
            Algebraic::new(
                "Option",
                vec![
                    Constructor::new("Some", vec![Type::Var(a.clone())]),
                    Constructor::new("None", vec![]),
                ],
            ),
        ));

        let pair_adt = Rc::new(PolyAlgebraic::new(
            vec![a.clone(), b.clone()],
            Algebraic::new(
                "Pair",
                vec![Constructor::new(
                    "Pair",
                    vec![Type::Var(a.clone()), Type::Var(b.clone())],
                )],
            ),
        ));

        // Cons mentions List itself, so its fields are tied afterwards.
        let list_adt = Rc::new(PolyAlgebraic::new(
            vec![a.clone()],
            Algebraic::new(
                "List",
                vec![
                    Constructor::deferred("Cons"),
                    Constructor::new("Nil", vec![]),
                ],
            ),
        ));
        if let Some(cons) = list_adt.body.constructor("Cons") {
            cons.tie(vec![
                Type::Var(a.clone()),
                Type::TypeApp(list_adt.clone(), vec![Type::Var(a.clone())]),
            ]);
        }

        let mut builtins = Self {
            bool_adt,
            nat_adt,
            option_adt,
            list_adt,
            pair_adt,
            functions: Vec::new(),
            folds: Vec::new(),
        };

        builtins.functions = builtins.function_table();
        builtins.folds = builtins.fold_table();
        builtins
    }

    pub fn bool_ty(&self) -> Type {
        Type::Algebraic(self.bool_adt.clone())
    }

    pub fn nat_ty(&self) -> Type {
        Type::Algebraic(self.nat_adt.clone())
    }

    pub fn option_of(&self, inner: Type) -> Type {
        Type::TypeApp(self.option_adt.clone(), vec![inner])
    }

    pub fn list_of(&self, inner: Type) -> Type {
        Type::TypeApp(self.list_adt.clone(), vec![inner])
    }

    pub fn pair_of(&self, first: Type, second: Type) -> Type {
        Type::TypeApp(self.pair_adt.clone(), vec![first, second])
    }

    /// The builtin ADTs as named types, for type-reference search.
    pub fn adts(&self) -> Vec<Type> {
        vec![
            self.bool_ty(),
            Type::PolyAlgebraic(self.option_adt.clone()),
            Type::PolyAlgebraic(self.list_adt.clone()),
            Type::PolyAlgebraic(self.pair_adt.clone()),
            self.nat_ty(),
        ]
    }

    /// Every `(adt, constructor)` pair, for constructor-reference search.
    pub fn constructors(&self) -> Vec<(Type, &Constructor)> {
        let mut res = Vec::new();
        for ctor in &self.bool_adt.constructors {
            res.push((self.bool_ty(), ctor));
        }
        for ctor in &self.option_adt.body.constructors {
            res.push((Type::PolyAlgebraic(self.option_adt.clone()), ctor));
        }
        for ctor in &self.list_adt.body.constructors {
            res.push((Type::PolyAlgebraic(self.list_adt.clone()), ctor));
        }
        for ctor in &self.pair_adt.body.constructors {
            res.push((Type::PolyAlgebraic(self.pair_adt.clone()), ctor));
        }
        for ctor in &self.nat_adt.constructors {
            res.push((self.nat_ty(), ctor));
        }
        res
    }

    pub fn function(&self, name: &str) -> Option<&BuiltinFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn functions(&self) -> &[BuiltinFunction] {
        &self.functions
    }

    /// The file-scope fold combinators (`list_foldl` and friends).
    pub fn folds(&self) -> &[(&'static str, Type)] {
        &self.folds
    }

    fn function_table(&self) -> Vec<BuiltinFunction> {
        let bool_ty = self.bool_ty();
        let integers: Vec<Type> = Primitive::INTEGERS
            .iter()
            .map(|p| Type::Primitive(*p))
            .collect();
        let string = Type::Primitive(Primitive::String);
        let bnum = Type::Primitive(Primitive::BNum);
        let bystr = Type::Primitive(Primitive::ByStr);
        let uint32 = Type::Primitive(Primitive::Uint32);

        let mut table = Vec::new();

        let mut simple = |name, sigs| table.push(BuiltinFunction { name, signatures: sigs });

        let eq_args: Vec<Type> = integers
            .iter()
            .cloned()
            .chain([string.clone(), bnum.clone()])
            .collect();
        simple(
            "eq",
            eq_args
                .iter()
                .map(|t| Signature::mono(bool_ty.clone(), vec![t.clone(), t.clone()]))
                .collect(),
        );

        simple(
            "lt",
            integers
                .iter()
                .map(|t| Signature::mono(bool_ty.clone(), vec![t.clone(), t.clone()]))
                .collect(),
        );

        for name in ["add", "sub", "mul", "div", "rem", "pow"] {
            simple(
                name,
                integers
                    .iter()
                    .map(|t| Signature::mono(t.clone(), vec![t.clone(), t.clone()]))
                    .collect(),
            );
        }

        simple(
            "sqrt",
            integers
                .iter()
                .map(|t| Signature::mono(t.clone(), vec![t.clone()]))
                .collect(),
        );

        let convertible: Vec<Type> = integers
            .iter()
            .cloned()
            .chain([string.clone()])
            .collect();
        for (name, target) in [
            ("to_int32", Primitive::Int32),
            ("to_int64", Primitive::Int64),
            ("to_int128", Primitive::Int128),
            ("to_int256", Primitive::Int256),
            ("to_uint32", Primitive::Uint32),
            ("to_uint64", Primitive::Uint64),
            ("to_uint128", Primitive::Uint128),
            ("to_uint256", Primitive::Uint256),
        ] {
            simple(
                name,
                convertible
                    .iter()
                    .map(|t| {
                        Signature::mono(
                            self.option_of(Type::Primitive(target)),
                            vec![t.clone()],
                        )
                    })
                    .collect(),
            );
        }

        simple(
            "to_nat",
            vec![Signature::mono(self.nat_ty(), vec![uint32.clone()])],
        );

        simple(
            "to_string",
            integers
                .iter()
                .cloned()
                .chain([bystr.clone()])
                .map(|t| Signature::mono(string.clone(), vec![t]))
                .collect(),
        );
        simple(
            "concat",
            vec![Signature::mono(
                string.clone(),
                vec![string.clone(), string.clone()],
            )],
        );
        simple(
            "substr",
            vec![Signature::mono(
                string.clone(),
                vec![string.clone(), uint32.clone(), uint32.clone()],
            )],
        );
        simple(
            "strlen",
            vec![Signature::mono(uint32.clone(), vec![string.clone()])],
        );
        simple(
            "strrev",
            vec![Signature::mono(string.clone(), vec![string.clone()])],
        );
        simple(
            "to_ascii",
            vec![Signature::mono(string.clone(), vec![bystr.clone()])],
        );

        simple(
            "badd",
            Primitive::UINTEGERS
                .iter()
                .map(|u| {
                    Signature::mono(bnum.clone(), vec![bnum.clone(), Type::Primitive(*u)])
                })
                .collect(),
        );
        simple(
            "blt",
            vec![Signature::mono(
                bool_ty.clone(),
                vec![bnum.clone(), bnum.clone()],
            )],
        );
        simple(
            "bsub",
            vec![Signature::mono(
                Type::Primitive(Primitive::Int256),
                vec![bnum.clone(), bnum.clone()],
            )],
        );

        let k = TypeVar::new("'K");
        let v = TypeVar::new("'V");
        let kv = vec![k.clone(), v.clone()];
        let map_kv = Type::Map(Box::new(var("'K")), Box::new(var("'V")));

        let poly = |name, ret, params| BuiltinFunction {
            name,
            signatures: vec![Signature {
                type_params: kv.clone(),
                ret,
                params,
            }],
        };

        table.push(poly(
            "put",
            map_kv.clone(),
            vec![map_kv.clone(), var("'K"), var("'V")],
        ));
        table.push(poly("get", var("'V"), vec![map_kv.clone(), var("'K")]));
        table.push(poly(
            "contains",
            bool_ty.clone(),
            vec![map_kv.clone(), var("'K")],
        ));
        table.push(poly(
            "remove",
            map_kv.clone(),
            vec![map_kv.clone(), var("'K")],
        ));
        table.push(poly("size", uint32, vec![map_kv.clone()]));
        table.push(poly(
            "to_list",
            self.list_of(self.pair_of(var("'K"), var("'V"))),
            vec![map_kv],
        ));

        table
    }

    fn fold_table(&self) -> Vec<(&'static str, Type)> {
        let a = TypeVar::new("'A");
        let b = TypeVar::new("'B");
        let t = TypeVar::new("'T");

        let forall2 = |body: Type| {
            Type::Forall(
                a.clone(),
                Box::new(Type::Forall(b.clone(), Box::new(body))),
            )
        };

        let list_a = self.list_of(var("'A"));
        let nat = self.nat_ty();

        vec![
            (
                "list_foldl",
                forall2(fun(
                    fun(var("'B"), fun(var("'A"), var("'B"))),
                    fun(var("'B"), fun(list_a.clone(), var("'B"))),
                )),
            ),
            (
                "list_foldr",
                forall2(fun(
                    fun(var("'A"), fun(var("'B"), var("'B"))),
                    fun(var("'B"), fun(list_a.clone(), var("'B"))),
                )),
            ),
            (
                "list_foldk",
                forall2(fun(
                    fun(
                        var("'B"),
                        fun(var("'A"), fun(fun(var("'B"), var("'B")), var("'B"))),
                    ),
                    fun(var("'B"), fun(list_a, var("'B"))),
                )),
            ),
            (
                "nat_fold",
                Type::Forall(
                    t.clone(),
                    Box::new(fun(
                        fun(var("'T"), fun(nat.clone(), var("'T"))),
                        fun(var("'T"), fun(nat.clone(), var("'T"))),
                    )),
                ),
            ),
            (
                "nat_foldk",
                Type::Forall(
                    t,
                    Box::new(fun(
                        fun(
                            var("'T"),
                            fun(nat.clone(), fun(fun(var("'T"), var("'T")), var("'T"))),
                        ),
                        fun(var("'T"), fun(nat, var("'T"))),
                    )),
                ),
            ),
        ]
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_picks_the_matching_width() {
        let builtins = Builtins::new();
        let add = builtins.function("add").unwrap();

        let args = [
            Type::Primitive(Primitive::Uint128),
            Type::Primitive(Primitive::Uint128),
        ];
        assert_eq!(add.select(&args), Some(Type::Primitive(Primitive::Uint128)));
    }

    #[test]
    fn add_rejects_mixed_widths() {
        let builtins = Builtins::new();
        let add = builtins.function("add").unwrap();

        let args = [
            Type::Primitive(Primitive::Uint128),
            Type::Primitive(Primitive::Uint32),
        ];
        assert_eq!(add.select(&args), None);
    }

    #[test]
    fn map_get_deduces_the_value_type() {
        let builtins = Builtins::new();
        let get = builtins.function("get").unwrap();

        let map = Type::Map(
            Box::new(Type::Primitive(Primitive::String)),
            Box::new(Type::Primitive(Primitive::Uint32)),
        );
        let args = [map, Type::Primitive(Primitive::String)];

        assert_eq!(get.select(&args), Some(Type::Primitive(Primitive::Uint32)));
    }

    #[test]
    fn map_put_rejects_a_mismatched_key() {
        let builtins = Builtins::new();
        let put = builtins.function("put").unwrap();

        let map = Type::Map(
            Box::new(Type::Primitive(Primitive::String)),
            Box::new(Type::Primitive(Primitive::Uint32)),
        );
        let args = [
            map,
            Type::Primitive(Primitive::BNum),
            Type::Primitive(Primitive::Uint32),
        ];

        assert_eq!(put.select(&args), None);
    }

    #[test]
    fn overload_selection_is_deterministic() {
        let builtins = Builtins::new();
        let eq = builtins.function("eq").unwrap();

        let args = [
            Type::Primitive(Primitive::String),
            Type::Primitive(Primitive::String),
        ];
        let first = eq.select(&args);
        for _ in 0..10 {
            assert_eq!(eq.select(&args), first);
        }
    }

    #[test]
    fn list_cons_refers_back_to_list() {
        let builtins = Builtins::new();
        let fields = builtins
            .list_adt
            .constructor_fields("Cons", &[Type::Primitive(Primitive::Uint32)])
            .unwrap();

        assert_eq!(
            fields,
            vec![
                Type::Primitive(Primitive::Uint32),
                builtins.list_of(Type::Primitive(Primitive::Uint32)),
            ]
        );
    }
}
