use crate::lex::Token;
use crate::tree::NodeKind;

use super::{cid, id, int, tid, Parser, LOWER_HINT, UPPER_HINT};

impl Parser<'_> {
    /// ```abnf
    /// expr = literal / constr-app / let / fun / tfun / builtin-call
    /// expr =/ message / match-expr / type-app / application / sid
    /// ```
    pub(super) fn parse_expression(&mut self) {
        if self.try_parse_int_literal() {
            return;
        }
        if self.try_parse_constructor_application() {
            return;
        }
        if self.try_parse_literal() {
            return;
        }

        match self.nth(0) {
            Some(Token::Let) => self.parse_let(false),
            Some(Token::Fun) => self.parse_fun_expression(),
            Some(Token::Builtin) => self.parse_builtin_call(),
            Some(Token::LBrace) => self.parse_message_construction(),
            Some(Token::Match) => self.parse_match_expression(),
            Some(Token::Tfun) => self.parse_type_fun_expression(),
            Some(Token::At) => self.parse_type_application(),
            Some(Token::Id(..)) | Some(Token::Spid(..)) | Some(Token::Cid(..)) => {
                self.parse_application()
            }
            _ => self.expected("an expression"),
        }
    }

    /// ```abnf
    /// sid  = ID / SPID / CID "." ID
    /// scid = CID / CID "." CID / HEX "." CID
    /// ```
    ///
    /// Parses whichever shape is present and reports when it is not the one
    /// the caller wanted. Produces a ref node either way so resolution has
    /// something to hang on to.
    pub(super) fn parse_sid_or_scid(&mut self, want_scid: bool, what: &str) {
        let m = self.open();
        let at = self.here();

        match self.nth(0) {
            Some(Token::Cid(..)) => {
                self.advance();
                if self.consume(Token::Dot) {
                    if want_scid {
                        self.expect_advance(cid(), what);
                    } else {
                        self.expect_advance(id(), what);
                    }
                    self.close(m, NodeKind::QualifiedRef);
                } else {
                    self.close(m, NodeKind::SimpleRef);
                    if !want_scid {
                        self.expected_at(at, &format!("{what} {LOWER_HINT}"));
                    }
                }
            }

            Some(Token::Id(..)) | Some(Token::Spid(..)) => {
                self.advance();
                self.close(m, NodeKind::SimpleRef);
                if want_scid {
                    self.expected_at(at, &format!("{what} {UPPER_HINT}"));
                }
            }

            Some(Token::Hex(..)) => {
                self.advance();
                if self.expect_advance(Token::Dot, "'.'") {
                    if want_scid {
                        self.expect_advance(cid(), what);
                        self.close(m, NodeKind::HexQualifiedRef);
                    } else {
                        if self.peek(Self::IDENTS) {
                            self.advance();
                        }
                        self.close(m, NodeKind::HexQualifiedRef);
                        self.expected_at(at, &format!("{what} {LOWER_HINT}"));
                    }
                } else {
                    self.close(m, NodeKind::HexQualifiedRef);
                    self.expected_at(at, &format!("{what} {LOWER_HINT}"));
                }
            }

            _ => {
                self.close(m, NodeKind::SimpleRef);
                let hint = if want_scid { UPPER_HINT } else { LOWER_HINT };
                self.expected_at(at, &format!("{what} {hint}"));
            }
        }
    }

    pub(super) fn detect_sid(&self) -> bool {
        match self.nth(0) {
            Some(Token::Id(..)) | Some(Token::Spid(..)) => true,
            Some(Token::Cid(..)) => {
                matches!(self.nth(1), Some(Token::Dot))
                    && matches!(self.nth(2), Some(Token::Id(..)))
            }
            _ => false,
        }
    }

    pub(super) fn detect_scid(&self) -> bool {
        match self.nth(0) {
            Some(Token::Cid(..)) => {
                !(matches!(self.nth(1), Some(Token::Dot))
                    && matches!(self.nth(2), Some(Token::Id(..))))
            }
            Some(Token::Hex(..)) => {
                matches!(self.nth(1), Some(Token::Dot))
                    && matches!(self.nth(2), Some(Token::Cid(..)))
            }
            _ => false,
        }
    }

    pub(super) fn parse_ref_expression(&mut self, what: &str) {
        let m = self.open();
        self.parse_sid_or_scid(false, what);
        self.close(m, NodeKind::RefExpr);
    }

    /// ```abnf
    /// let = "let" ID [":" type] "=" expr "in" expr
    /// ```
    ///
    /// A library-level `let` is the same production without the `in` part.
    pub(super) fn parse_let(&mut self, library_entry: bool) {
        let m = self.open();
        self.advance();

        self.expect_advance(id(), "a binding name");
        if self.consume(Token::Colon) {
            self.parse_type();
        }
        self.expect_advance(Token::Equal, "'='");
        self.parse_expression();

        if library_entry {
            self.close(m, NodeKind::LibraryLetDef);
        } else {
            self.expect_advance(Token::In, "'in'");
            self.parse_expression();
            self.close(m, NodeKind::LetExpr);
        }
    }

    /// ```abnf
    /// fun = "fun" "(" ID ":" type ")" "=>" expr
    /// ```
    fn parse_fun_expression(&mut self) {
        let m = self.open();
        self.advance();

        if self.peek(Token::LParen) {
            self.parse_parameter_list(NodeKind::FunctionParams);
            self.expect_advance(Token::EqArrow, "a function arrow ('=>')");
            self.parse_expression();
        } else {
            self.expected("a function parameter");
        }

        self.close(m, NodeKind::FunExpr);
    }

    /// ```abnf
    /// tfun = "tfun" TID "=>" expr
    /// ```
    fn parse_type_fun_expression(&mut self) {
        let m = self.open();
        self.advance();

        if self.expect_advance(tid(), "a type function parameter") {
            if self.expect_advance(Token::EqArrow, "a type function arrow ('=>')") {
                self.parse_expression();
            } else if self.peek(Token::Dot) {
                // "tfun 'A . e" in the term language
                self.error_advance("'=>'");
                if self.peek(Self::ARROWS) {
                    self.advance();
                }
                self.parse_expression();
            }
        }

        self.close(m, NodeKind::TFunExpr);
    }

    /// ```abnf
    /// builtin-call = "builtin" ID ["{" *type-arg "}"] (1*sid / "(" ")")
    /// ```
    fn parse_builtin_call(&mut self) {
        let m = self.open();
        self.advance();
        self.expect_advance(id(), "a builtin function");

        if self.consume(Token::LBrace) {
            self.parse_loop("a type argument", None, &[Token::RBrace], |parser| {
                parser.try_parse_type_arg();
            });
            self.expect_advance(Token::RBrace, "'}'");
        }

        if self.consume(Token::LParen) {
            self.expect_advance(Token::RParen, "')'");
        } else if !self.detect_sid() {
            self.expected("a builtin function argument");
        } else {
            while self.detect_sid() {
                self.parse_ref_expression("an argument");
            }
        }

        self.close(m, NodeKind::BuiltinExpr);
    }

    /// A `CID INT` literal like `Uint32 42` is only distinguishable from a
    /// constructor reference by the token after the CID, so this parse is
    /// speculative.
    fn try_parse_int_literal(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        let m = self.open();

        if self.peek(cid()) {
            self.advance();
            if self.peek(int()) {
                self.advance();
                self.close(m, NodeKind::LiteralExpr);
                return true;
            }
        }

        self.rollback(checkpoint);
        false
    }

    /// ```abnf
    /// literal = CID INT / HEX / STRING / "Emp" map-key map-value
    /// ```
    pub(super) fn try_parse_literal(&mut self) -> bool {
        if self.try_parse_int_literal() {
            return true;
        }

        match self.nth(0) {
            Some(Token::Hex(..)) | Some(Token::Str(..)) => {
                let m = self.open();
                self.advance();
                self.close(m, NodeKind::LiteralExpr);
                true
            }
            Some(Token::Emp) => {
                let m = self.open();
                self.advance();
                self.parse_map_key();
                self.parse_map_value(false);
                self.close(m, NodeKind::LiteralExpr);
                true
            }
            _ => false,
        }
    }

    /// ```abnf
    /// constr-app = scid ["{" *type-arg "}"] *sid
    /// ```
    fn try_parse_constructor_application(&mut self) -> bool {
        if !self.detect_scid() {
            return false;
        }

        let m = self.open();
        self.parse_sid_or_scid(true, "a constructor");

        if self.consume(Token::LBrace) {
            self.parse_loop("a type argument", None, &[Token::RBrace], |parser| {
                parser.try_parse_type_arg();
            });
            self.expect_advance(Token::RBrace, "'}'");
        }

        while self.detect_sid() {
            self.parse_ref_expression("an argument");
        }

        self.close(m, NodeKind::ConstrExpr);
        true
    }

    /// ```abnf
    /// message = "{" *(msg-entry ";") "}"
    /// msg-entry = sid ":" (literal / sid)
    /// ```
    fn parse_message_construction(&mut self) {
        let m = self.open();
        self.advance();

        self.parse_loop(
            "a message entry",
            Some((Token::Semi, "';'")),
            &[Token::RBrace],
            |parser| {
                let entry = parser.open();
                parser.parse_sid_or_scid(false, "a message field");
                parser.expect_advance(Token::Colon, "':'");
                if !parser.try_parse_literal() {
                    parser.parse_ref_expression(&format!("a literal or value {LOWER_HINT}"));
                }
                parser.close(entry, NodeKind::MessageEntry);
            },
        );

        self.expect_advance(Token::RBrace, "'}'");
        self.close(m, NodeKind::MessageExpr);
    }

    /// ```abnf
    /// match-expr = "match" sid "with" *clause "end"
    /// ```
    fn parse_match_expression(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_ref_expression("a value");
        self.expect_advance(Token::With, "'with'");

        while self.try_parse_match_clause(false) {}

        self.expect_advance(Token::End, "'end'");
        self.close(m, NodeKind::MatchExpr);
    }

    /// ```abnf
    /// clause = "|" pattern "=>" (expr / statements)
    /// ```
    pub(super) fn try_parse_match_clause(&mut self, statement: bool) -> bool {
        if !self.peek(Token::Pipe) {
            return false;
        }

        let m = self.open();
        self.advance();

        if !self.try_parse_pattern(false) {
            let at = self.here();
            self.msgs.at(at).parse_expected_pattern();
        }

        if self.expect_advance(Token::EqArrow, "'=>'") {
            if statement {
                self.parse_statement_list();
            } else {
                self.parse_expression();
            }
        }

        let kind = if statement {
            NodeKind::PatternMatchClause
        } else {
            NodeKind::ExprPatternMatchClause
        };
        self.close(m, kind);

        true
    }

    /// ```abnf
    /// pattern = "_" / ID / scid *arg-pattern
    /// arg-pattern = "_" / ID / scid / "(" pattern ")"
    /// ```
    fn try_parse_pattern(&mut self, arg: bool) -> bool {
        if self.detect_scid() {
            let m = self.open();
            self.parse_sid_or_scid(true, "an ADT constructor");

            while !arg && self.try_parse_pattern(true) {}

            self.close(m, NodeKind::ConstructorPattern);
            return true;
        }

        match self.nth(0) {
            Some(Token::Underscore) => {
                let m = self.open();
                self.advance();
                self.close(m, NodeKind::WildcardPattern);
                true
            }
            Some(Token::Id(..)) => {
                let m = self.open();
                self.advance();
                self.close(m, NodeKind::BinderPattern);
                true
            }
            Some(Token::LParen) => {
                let m = self.open();
                if arg {
                    self.advance();
                } else {
                    self.error_advance("a pattern without parentheses");
                }

                self.try_parse_pattern(false);
                self.expect_advance(Token::RParen, "')'");
                self.close(m, NodeKind::ParenPattern);
                true
            }
            _ => false,
        }
    }

    /// ```abnf
    /// application = sid 1*sid
    /// ```
    fn parse_application(&mut self) {
        let m = self.open();
        self.parse_ref_expression("a function");

        if self.detect_sid() {
            while self.detect_sid() {
                self.parse_ref_expression("an argument");
            }
            self.close(m, NodeKind::AppExpr);
        } else {
            self.abandon(m);
        }
    }

    /// ```abnf
    /// type-app = "@" sid *type-arg
    /// ```
    fn parse_type_application(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_ref_expression("a type function");

        while !self.is_done() {
            if !self.try_parse_type_arg() {
                break;
            }
        }

        self.close(m, NodeKind::TAppExpr);
    }
}
