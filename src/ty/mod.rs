mod deduce;
mod subst;

pub mod infer;

pub use deduce::Deduction;
pub use subst::Substitution;

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

/// A structural Scilla type. Everything a declaration or expression can
/// have; `Unknown` stands in wherever typing gives up.
#[derive(Clone, Debug)]
pub enum Type {
    Unknown,
    Primitive(Primitive),
    /// A fixed-width byte string such as `ByStr20`.
    ByStr(usize),
    Algebraic(Rc<Algebraic>),
    PolyAlgebraic(Rc<PolyAlgebraic>),
    /// A polymorphic ADT applied to arguments, like `Option Uint32`.
    TypeApp(Rc<PolyAlgebraic>, Vec<Type>),
    Map(Box<Type>, Box<Type>),
    Fun(Box<Type>, Box<Type>),
    Forall(TypeVar, Box<Type>),
    Var(TypeVar),
    /// A contract address. `None` is a plain `CID with end` address;
    /// `Some` carries the declared remote fields.
    Address(Option<Vec<(String, Type)>>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Primitive {
    Int32,
    Int64,
    Int128,
    Int256,
    Uint32,
    Uint64,
    Uint128,
    Uint256,
    String,
    BNum,
    Message,
    Event,
    ByStr,
}

impl Primitive {
    pub const ALL: [Primitive; 13] = [
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Int128,
        Primitive::Int256,
        Primitive::Uint32,
        Primitive::Uint64,
        Primitive::Uint128,
        Primitive::Uint256,
        Primitive::String,
        Primitive::BNum,
        Primitive::Message,
        Primitive::Event,
        Primitive::ByStr,
    ];

    pub const INTEGERS: [Primitive; 8] = [
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Int128,
        Primitive::Int256,
        Primitive::Uint32,
        Primitive::Uint64,
        Primitive::Uint128,
        Primitive::Uint256,
    ];

    pub const UINTEGERS: [Primitive; 4] = [
        Primitive::Uint32,
        Primitive::Uint64,
        Primitive::Uint128,
        Primitive::Uint256,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Int32 => "Int32",
            Primitive::Int64 => "Int64",
            Primitive::Int128 => "Int128",
            Primitive::Int256 => "Int256",
            Primitive::Uint32 => "Uint32",
            Primitive::Uint64 => "Uint64",
            Primitive::Uint128 => "Uint128",
            Primitive::Uint256 => "Uint256",
            Primitive::String => "String",
            Primitive::BNum => "BNum",
            Primitive::Message => "Message",
            Primitive::Event => "Event",
            Primitive::ByStr => "ByStr",
        }
    }

    pub fn lookup(name: &str) -> Option<Primitive> {
        Primitive::ALL.iter().copied().find(|p| p.name() == name)
    }
}

/// A type variable like `'A`. The counter disambiguates fresh copies made
/// during alpha-renaming; it is zero for every variable written in source.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TypeVar {
    name: String,
    counter: u32,
}

static VAR_COUNTER: AtomicU32 = AtomicU32::new(1);

impl TypeVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counter: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A distinct variable with the same source name. The counter comes
    /// from a process-wide sequence and is never reused.
    pub fn increment(&self) -> TypeVar {
        Self {
            name: self.name.clone(),
            counter: VAR_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.counter == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.name, self.counter)
        }
    }
}

/// One constructor of an algebraic type. The field list sits behind a
/// cell so `List`'s `Cons` can refer back to the type being built.
#[derive(Debug)]
pub struct Constructor {
    name: String,
    fields: OnceCell<Vec<Type>>,
}

impl Constructor {
    pub fn new(name: impl Into<String>, fields: Vec<Type>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(fields);
        Self {
            name: name.into(),
            fields: cell,
        }
    }

    /// A constructor whose fields are supplied later via [`tie`].
    ///
    /// [`tie`]: Constructor::tie
    pub(crate) fn deferred(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: OnceCell::new(),
        }
    }

    pub(crate) fn tie(&self, fields: Vec<Type>) {
        let _ = self.fields.set(fields);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Type] {
        self.fields.get().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug)]
pub struct Algebraic {
    pub name: String,
    pub constructors: Vec<Constructor>,
}

impl Algebraic {
    pub fn new(name: impl Into<String>, constructors: Vec<Constructor>) -> Self {
        Self {
            name: name.into(),
            constructors,
        }
    }

    pub fn constructor(&self, name: &str) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.name() == name)
    }
}

/// An ADT abstracted over type parameters, like `Option` before it is
/// applied to anything.
#[derive(Debug)]
pub struct PolyAlgebraic {
    pub params: Vec<TypeVar>,
    pub body: Rc<Algebraic>,
}

impl PolyAlgebraic {
    pub fn new(params: Vec<TypeVar>, body: Algebraic) -> Self {
        Self {
            params,
            body: Rc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.body.name
    }

    /// The field types of `constructor` with this ADT's parameters
    /// replaced by `args`.
    pub fn constructor_fields(&self, constructor: &str, args: &[Type]) -> Option<Vec<Type>> {
        let ctor = self.body.constructor(constructor)?;
        let mut fields = ctor.fields().to_vec();

        for (param, arg) in self.params.iter().zip(args) {
            let sub = Substitution::new(param.clone(), arg.clone());
            fields = fields.iter().map(|f| sub.apply(f)).collect();
        }

        Some(fields)
    }
}

impl Type {
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Primitive(p) => Some(p.name()),
            Type::Algebraic(adt) => Some(&adt.name),
            Type::PolyAlgebraic(adt) => Some(adt.name()),
            Type::TypeApp(origin, _) => Some(origin.name()),
            Type::Var(var) => Some(var.name()),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Writes this type with parentheses if it would bind too loosely as
    /// a component of a larger type.
    fn fmt_atom(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::TypeApp(..) | Type::Fun(..) | Type::Map(..) | Type::Forall(..) => {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Unknown => write!(f, "?"),
            Type::Primitive(p) => write!(f, "{}", p.name()),
            Type::ByStr(size) => write!(f, "ByStr{size}"),
            Type::Algebraic(adt) => write!(f, "{}", adt.name),

            Type::PolyAlgebraic(adt) => {
                for param in &adt.params {
                    write!(f, "forall {param}. ")?;
                }
                write!(f, "{}", adt.body.name)
            }

            Type::TypeApp(origin, args) => {
                write!(f, "{}", origin.name())?;

                // A partial application still shows the leftover parameters.
                let rest = origin.params.iter().skip(args.len());
                let rest = rest.map(|var| Type::Var(var.clone()));
                for arg in args.iter().cloned().chain(rest) {
                    write!(f, " ")?;
                    match arg {
                        Type::PolyAlgebraic(..) => write!(f, "({arg})")?,
                        _ => arg.fmt_atom(f)?,
                    }
                }

                Ok(())
            }

            Type::Map(key, value) => {
                write!(f, "Map ")?;
                key.fmt_atom(f)?;
                write!(f, " ")?;
                value.fmt_atom(f)
            }

            Type::Fun(param, result) => {
                param.fmt_atom(f)?;
                write!(f, " -> {result}")
            }

            Type::Forall(var, body) => write!(f, "forall {var}. {body}"),
            Type::Var(var) => write!(f, "{var}"),

            Type::Address(fields) => {
                if fields.is_some() {
                    write!(f, "ByStr20 with end")
                } else {
                    write!(f, "ByStr20")
                }
            }
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Unknown, Type::Unknown) => true,
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::ByStr(a), Type::ByStr(b)) => a == b,
            (Type::Algebraic(a), Type::Algebraic(b)) => algebraic_eq(a, b),
            (Type::PolyAlgebraic(a), Type::PolyAlgebraic(b)) => poly_eq(a, b),
            (Type::TypeApp(a, args), Type::TypeApp(b, brgs)) => poly_eq(a, b) && args == brgs,
            (Type::Map(ak, av), Type::Map(bk, bv)) => ak == bk && av == bv,
            (Type::Fun(ap, ar), Type::Fun(bp, br)) => ap == bp && ar == br,
            (Type::Forall(av, ab), Type::Forall(bv, bb)) => av == bv && ab == bb,
            (Type::Var(a), Type::Var(b)) => a == b,
            // Addresses are all ByStr20 underneath; the field lists only
            // refine what can be fetched, not what the value is.
            (Type::Address(..), Type::Address(..)) => true,
            _ => false,
        }
    }
}

impl Eq for Type {}

/// Compares by name and constructor names. Comparing constructor fields
/// would recurse forever through `List`'s `Cons`.
fn algebraic_eq(a: &Algebraic, b: &Algebraic) -> bool {
    a.name == b.name
        && a.constructors.len() == b.constructors.len()
        && a.constructors
            .iter()
            .zip(&b.constructors)
            .all(|(x, y)| x.name() == y.name())
}

fn poly_eq(a: &PolyAlgebraic, b: &PolyAlgebraic) -> bool {
    a.params == b.params && algebraic_eq(&a.body, &b.body)
}
