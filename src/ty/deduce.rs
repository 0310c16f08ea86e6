use super::{Substitution, Type, TypeVar};

/// Matches a parametric type against a concrete one, collecting an
/// assignment for each type variable. A variable deduced twice with
/// different types is a conflict, and a conflicted deduction rejects
/// the candidate it was built for.
#[derive(Debug, Default)]
pub struct Deduction {
    // Insertion-ordered so substitution is deterministic.
    assignments: Vec<(TypeVar, Type)>,
    conflicted: bool,
}

impl Deduction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_conflicted(&self) -> bool {
        self.conflicted
    }

    pub fn deduce(&mut self, pattern: &Type, actual: &Type) {
        match pattern {
            Type::Var(var) => {
                match self.assignments.iter().find(|(v, _)| v == var) {
                    Some((_, old)) if old != actual => self.conflicted = true,
                    Some(_) => {}
                    None => self.assignments.push((var.clone(), actual.clone())),
                }
            }

            Type::Map(pk, pv) => match actual {
                Type::Map(ak, av) => {
                    self.deduce(pk, ak);
                    self.deduce(pv, av);
                }
                Type::Unknown => {
                    self.deduce(pk, &Type::Unknown);
                    self.deduce(pv, &Type::Unknown);
                }
                _ => self.conflicted = true,
            },

            Type::Fun(pp, pr) => match actual {
                Type::Fun(ap, ar) => {
                    self.deduce(pp, ap);
                    self.deduce(pr, ar);
                }
                Type::Unknown => {
                    self.deduce(pp, &Type::Unknown);
                    self.deduce(pr, &Type::Unknown);
                }
                _ => self.conflicted = true,
            },

            Type::TypeApp(origin, args) => match actual {
                Type::TypeApp(actual_origin, actual_args)
                    if Type::PolyAlgebraic(origin.clone())
                        == Type::PolyAlgebraic(actual_origin.clone())
                        && args.len() == actual_args.len() =>
                {
                    for (p, a) in args.iter().zip(actual_args) {
                        self.deduce(p, a);
                    }
                }
                Type::Unknown => {
                    for p in args {
                        self.deduce(p, &Type::Unknown);
                    }
                }
                _ => self.conflicted = true,
            },

            // Ground types have to match outright.
            _ => {
                if pattern != actual && !actual.is_unknown() {
                    self.conflicted = true;
                }
            }
        }
    }

    /// Applies every deduced assignment to `ty`, in deduction order.
    pub fn apply(&self, ty: &Type) -> Type {
        let mut result = ty.clone();
        for (var, assigned) in &self.assignments {
            result = Substitution::new(var.clone(), assigned.clone()).apply(&result);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Primitive;

    fn var(name: &str) -> Type {
        Type::Var(TypeVar::new(name))
    }

    fn int32() -> Type {
        Type::Primitive(Primitive::Int32)
    }

    fn string() -> Type {
        Type::Primitive(Primitive::String)
    }

    #[test]
    fn binds_on_first_encounter() {
        let mut deduction = Deduction::new();
        deduction.deduce(
            &Type::Map(Box::new(var("'K")), Box::new(var("'V"))),
            &Type::Map(Box::new(string()), Box::new(int32())),
        );

        assert!(!deduction.is_conflicted());
        assert_eq!(deduction.apply(&var("'K")), string());
        assert_eq!(deduction.apply(&var("'V")), int32());
    }

    #[test]
    fn conflicting_binding_rejects() {
        let mut deduction = Deduction::new();
        deduction.deduce(&var("'K"), &string());
        deduction.deduce(&var("'K"), &int32());

        assert!(deduction.is_conflicted());
    }

    #[test]
    fn repeated_consistent_binding_is_fine() {
        let mut deduction = Deduction::new();
        deduction.deduce(&var("'K"), &string());
        deduction.deduce(&var("'K"), &string());

        assert!(!deduction.is_conflicted());
    }

    #[test]
    fn ground_mismatch_rejects() {
        let mut deduction = Deduction::new();
        deduction.deduce(&int32(), &string());

        assert!(deduction.is_conflicted());
    }

    #[test]
    fn unknown_matches_anything() {
        let mut deduction = Deduction::new();
        deduction.deduce(
            &Type::Map(Box::new(var("'K")), Box::new(var("'V"))),
            &Type::Unknown,
        );

        assert!(!deduction.is_conflicted());
        assert_eq!(deduction.apply(&var("'K")), Type::Unknown);
    }

    #[test]
    fn function_shapes_deduce_componentwise() {
        let mut deduction = Deduction::new();
        deduction.deduce(
            &Type::Fun(Box::new(var("'A")), Box::new(var("'B"))),
            &Type::Fun(Box::new(int32()), Box::new(string())),
        );

        assert!(!deduction.is_conflicted());
        assert_eq!(deduction.apply(&var("'A")), int32());
        assert_eq!(deduction.apply(&var("'B")), string());
    }
}
