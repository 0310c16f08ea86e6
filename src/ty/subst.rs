use std::collections::HashSet;

use super::{Type, TypeVar};

/// Replaces one type variable with a type, renaming inner `forall`
/// binders when they would capture a free variable of the replacement.
pub struct Substitution {
    var: TypeVar,
    replacement: Type,
    free: HashSet<TypeVar>,
}

impl Substitution {
    pub fn new(var: TypeVar, replacement: Type) -> Self {
        let mut free = HashSet::new();
        free_vars(&replacement, &mut free);

        Self {
            var,
            replacement,
            free,
        }
    }

    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Unknown
            | Type::Primitive(..)
            | Type::ByStr(..)
            | Type::Algebraic(..)
            | Type::PolyAlgebraic(..)
            | Type::Address(..) => ty.clone(),

            Type::Var(var) => {
                if *var == self.var {
                    self.replacement.clone()
                } else {
                    ty.clone()
                }
            }

            Type::Fun(param, result) => Type::Fun(
                Box::new(self.apply(param)),
                Box::new(self.apply(result)),
            ),

            Type::Map(key, value) => Type::Map(
                Box::new(self.apply(key)),
                Box::new(self.apply(value)),
            ),

            Type::TypeApp(origin, args) => Type::TypeApp(
                origin.clone(),
                args.iter().map(|arg| self.apply(arg)).collect(),
            ),

            Type::Forall(param, body) => {
                if *param == self.var {
                    // The inner binder shadows the variable being replaced.
                    ty.clone()
                } else if self.free.contains(param) {
                    let renamed = param.increment();
                    let rename =
                        Substitution::new(param.clone(), Type::Var(renamed.clone()));
                    let body = rename.apply(body);
                    Type::Forall(renamed, Box::new(self.apply(&body)))
                } else {
                    Type::Forall(param.clone(), Box::new(self.apply(body)))
                }
            }
        }
    }
}

/// The free type variables of `ty`, accumulated into `acc`.
pub fn free_vars(ty: &Type, acc: &mut HashSet<TypeVar>) {
    match ty {
        Type::Unknown
        | Type::Primitive(..)
        | Type::ByStr(..)
        | Type::Algebraic(..)
        | Type::PolyAlgebraic(..)
        | Type::Address(..) => {}

        Type::Var(var) => {
            acc.insert(var.clone());
        }

        Type::Fun(param, result) => {
            free_vars(param, acc);
            free_vars(result, acc);
        }

        Type::Map(key, value) => {
            free_vars(key, acc);
            free_vars(value, acc);
        }

        Type::Forall(param, body) => {
            let mut inner = HashSet::new();
            free_vars(body, &mut inner);
            inner.remove(param);
            acc.extend(inner);
        }

        Type::TypeApp(_, args) => {
            for arg in args {
                free_vars(arg, acc);
            }
        }
    }
}
