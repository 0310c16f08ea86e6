use crate::lex::Token;
use crate::tree::NodeKind;

use super::{cid, id, int, Parser};

impl Parser<'_> {
    const PARAM_STOPPERS: &'static [Token] = &[
        Token::RParen,
        Token::Let,
        Token::Type,
        Token::End,
        Token::Contract,
        Token::Library,
        Token::Transition,
        Token::Procedure,
    ];

    /// ```abnf
    /// module = version [imports] [library] [contract] garbage
    /// ```
    pub(super) fn parse_module(&mut self) {
        let m = self.open();
        self.skip_invalid();

        self.parse_version();

        if self.peek(Token::Import) {
            self.parse_imports();
        }

        if self.peek(Token::Library) {
            self.parse_library();
        }

        if self.peek(Token::Contract) {
            self.parse_contract();
        }

        if !self.is_done() {
            self.parse_garbage();
        }

        self.close(m, NodeKind::Root);
    }

    /// ```abnf
    /// version = "scilla_version" INT
    /// ```
    fn parse_version(&mut self) {
        let m = self.open();

        if self.expect_advance(Token::ScillaVersion, "'scilla_version'") {
            self.expect_advance(int(), "a version number");
        }

        self.close(m, NodeKind::Version);
    }

    /// ```abnf
    /// imports = "import" *import-entry
    /// import-entry = CID ["as" CID]
    /// ```
    fn parse_imports(&mut self) {
        let m = self.open();
        self.advance();

        while self.peek(Self::IDENTS) {
            let entry = self.open();
            self.expect_advance(cid(), "a library name");
            if self.consume(Token::As) {
                self.expect_advance(cid(), "a namespace name");
            }
            self.close(entry, NodeKind::ImportEntry);
        }

        self.close(m, NodeKind::Imports);
    }

    /// Everything after the contract (or in place of one) is swept into a
    /// single garbage node. Declarations inside it still parse, so their
    /// contents get diagnostics of their own.
    fn parse_garbage(&mut self) {
        let m = self.open();
        let at = self.here();
        self.msgs.at(at).parse_top_level_garbage();

        while !self.is_done() {
            if self.peek(Token::Let) || self.peek(Token::Type) {
                self.parse_library_entry();
            } else if self.peek(Token::Field) {
                self.parse_field();
            } else if self.peek(Token::Transition) || self.peek(Token::Procedure) {
                self.try_parse_component();
            } else {
                self.advance();
            }
        }

        self.close(m, NodeKind::Garbage);
    }

    /// ```abnf
    /// library = "library" CID *library-entry
    /// ```
    fn parse_library(&mut self) {
        let m = self.open();
        self.advance();
        self.expect_advance(cid(), "a library name");

        while !self.is_done() && !self.peek(Token::Contract) {
            if self.peek(Token::Let) || self.peek(Token::Type) {
                self.parse_library_entry();
            } else if self.peek(Token::Transition) || self.peek(Token::Procedure) {
                // reported when the contract is parsed
                break;
            } else {
                self.error_advance("a let binding, type declaration or contract definition");
            }
        }

        self.close(m, NodeKind::LibraryDef);
    }

    /// ```abnf
    /// library-entry = "let" ID [":" type] "=" expr
    /// library-entry =/ "type" CID ["=" 1*type-constructor]
    /// ```
    pub(super) fn parse_library_entry(&mut self) {
        if self.peek(Token::Let) {
            self.parse_let(true);
        } else if self.peek(Token::Type) {
            let m = self.open();
            self.advance();
            self.expect_advance(cid(), "a type name");

            if self.consume(Token::Equal) {
                while self.peek(Token::Pipe) || self.detect_scid() || self.detect_sid() {
                    self.parse_type_constructor();
                }
            }

            self.close(m, NodeKind::LibraryTypeDef);
        }
    }

    /// ```abnf
    /// type-constructor = "|" CID ["of" 1*type-arg]
    /// ```
    fn parse_type_constructor(&mut self) {
        let m = self.open();
        self.expect_advance(Token::Pipe, "'|' before the type constructor name");
        self.expect_advance(cid(), "a type constructor name");

        if self.consume(Token::Of) {
            if !self.try_parse_type_arg() {
                self.expected("a type parameter");
            } else {
                while !self.is_done() {
                    if !self.try_parse_type_arg() {
                        break;
                    }
                }
            }
        }

        self.close(m, NodeKind::LibraryTypeCtor);
    }

    /// ```abnf
    /// contract = "contract" CID "(" params ")" [constraint] *field *component
    /// ```
    fn parse_contract(&mut self) {
        let m = self.open();
        self.advance();
        self.expect_advance(cid(), "a contract name");

        if self.peek(Token::LParen) {
            self.parse_parameter_list(NodeKind::ContractParams);
        } else {
            self.expected("a contract parameter list");
        }

        if self.peek(Token::With) {
            self.parse_contract_constraint();
        }

        while self.peek(Token::Field) {
            self.parse_field();
        }

        while !self.is_done() {
            if !self.try_parse_component() {
                self.error_advance("a transition or procedure declaration");
            }
        }

        self.close(m, NodeKind::ContractDef);
    }

    /// ```abnf
    /// constraint = "with" expr "->"
    /// ```
    fn parse_contract_constraint(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_expression();
        self.expect_advance(Token::MinArrow, "'->'");
        self.close(m, NodeKind::ContractConstraint);
    }

    pub(super) fn parse_parameter_list(&mut self, kind: NodeKind) {
        let m = self.open();
        self.advance();

        self.parse_loop(
            "a parameter",
            Some((Token::Comma, "','")),
            Self::PARAM_STOPPERS,
            |parser| parser.parse_id_with_type("a parameter name"),
        );

        self.expect_advance(Token::RParen, "')'");
        self.close(m, kind);
    }

    /// ```abnf
    /// field = "field" ID ":" type "=" expr
    /// ```
    pub(super) fn parse_field(&mut self) {
        let m = self.open();
        self.advance();

        self.expect_advance(id(), "a field name");
        self.parse_type_annotation();

        if self.expect_advance(Token::Equal, "'='") {
            self.parse_expression();
        }

        self.close(m, NodeKind::FieldDef);
    }

    /// ```abnf
    /// component = ("transition" / "procedure") name "(" params ")" statements "end"
    /// ```
    pub(super) fn try_parse_component(&mut self) -> bool {
        let transition = if self.peek(Token::Transition) {
            true
        } else if self.peek(Token::Procedure) {
            false
        } else {
            return false;
        };

        let m = self.open();
        self.advance();

        if self.peek(id()) || self.peek(cid()) {
            self.advance();
        } else if transition {
            self.expected("a transition name");
        } else {
            self.expected("a procedure name");
        }

        if self.peek(Token::LParen) {
            self.parse_parameter_list(NodeKind::ComponentParams);
        } else {
            self.expected("a parameter list in parentheses");
        }

        self.parse_statement_list();
        self.expect_advance(Token::End, "'end'");

        let kind = if transition {
            NodeKind::TransitionDef
        } else {
            NodeKind::ProcedureDef
        };
        self.close(m, kind);

        true
    }
}
