/// Every kind of node the parser produces. The tree is untyped; consumers
/// dispatch on this and read children positionally through `view`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    Root,
    Version,
    Imports,
    ImportEntry,
    Garbage,
    Error,

    LibraryDef,
    LibraryLetDef,
    LibraryTypeDef,
    LibraryTypeCtor,

    ContractDef,
    ContractConstraint,
    FieldDef,
    TransitionDef,
    ProcedureDef,

    ContractParams,
    ComponentParams,
    ContractRefParams,
    FunctionParams,
    IdWithType,

    SimpleRef,
    QualifiedRef,
    HexQualifiedRef,

    RefType,
    MapType,
    FunType,
    PolyType,
    AddressType,
    AddressTypeField,
    TypeVarType,
    ParenType,

    WildcardPattern,
    BinderPattern,
    ConstructorPattern,
    ParenPattern,
    PatternMatchClause,
    ExprPatternMatchClause,

    LiteralExpr,
    RefExpr,
    LetExpr,
    MessageExpr,
    MessageEntry,
    FunExpr,
    AppExpr,
    ConstrExpr,
    MatchExpr,
    BuiltinExpr,
    TFunExpr,
    TAppExpr,

    StatementList,
    LoadStmt,
    RemoteLoadStmt,
    MapGetStmt,
    RemoteMapGetStmt,
    ReadFromBcStmt,
    TypeCastStmt,
    StoreStmt,
    MapUpdateStmt,
    BindStmt,
    MapDeleteStmt,
    CallStmt,
    IterateStmt,
    AcceptStmt,
    SendStmt,
    EventStmt,
    ThrowStmt,
    MatchStmt,

    MapAccess,
    FieldRef,
}

impl NodeKind {
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Self::LiteralExpr
                | Self::RefExpr
                | Self::LetExpr
                | Self::MessageExpr
                | Self::FunExpr
                | Self::AppExpr
                | Self::ConstrExpr
                | Self::MatchExpr
                | Self::BuiltinExpr
                | Self::TFunExpr
                | Self::TAppExpr
        )
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::LoadStmt
                | Self::RemoteLoadStmt
                | Self::MapGetStmt
                | Self::RemoteMapGetStmt
                | Self::ReadFromBcStmt
                | Self::TypeCastStmt
                | Self::StoreStmt
                | Self::MapUpdateStmt
                | Self::BindStmt
                | Self::MapDeleteStmt
                | Self::CallStmt
                | Self::IterateStmt
                | Self::AcceptStmt
                | Self::SendStmt
                | Self::EventStmt
                | Self::ThrowStmt
                | Self::MatchStmt
        )
    }

    /// Statements that bind a new local on their left-hand side.
    pub fn is_var_binding_statement(&self) -> bool {
        matches!(
            self,
            Self::LoadStmt
                | Self::RemoteLoadStmt
                | Self::MapGetStmt
                | Self::RemoteMapGetStmt
                | Self::ReadFromBcStmt
                | Self::TypeCastStmt
                | Self::BindStmt
        )
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Self::RefType
                | Self::MapType
                | Self::FunType
                | Self::PolyType
                | Self::AddressType
                | Self::TypeVarType
                | Self::ParenType
        )
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Self::WildcardPattern
                | Self::BinderPattern
                | Self::ConstructorPattern
                | Self::ParenPattern
        )
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Self::TransitionDef | Self::ProcedureDef)
    }

    pub fn is_ref(&self) -> bool {
        matches!(
            self,
            Self::SimpleRef | Self::QualifiedRef | Self::HexQualifiedRef
        )
    }
}
