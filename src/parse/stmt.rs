use crate::lex::Token;
use crate::tree::NodeKind;

use super::{cid, id, spid, Parser, LOWER_HINT};

impl Parser<'_> {
    const STATEMENT_STOPPERS: &'static [Token] = &[
        Token::End,
        Token::Pipe,
        Token::Contract,
        Token::Library,
        Token::Transition,
        Token::Procedure,
    ];

    pub(super) fn parse_statement_list(&mut self) {
        let m = self.open();

        self.parse_loop(
            "a statement",
            Some((Token::Semi, "';'")),
            Self::STATEMENT_STOPPERS,
            |parser| parser.statement_or_recover(),
        );

        self.close(m, NodeKind::StatementList);
    }

    fn statement_or_recover(&mut self) {
        if self.try_parse_statement() {
            return;
        }

        // A declaration in statement position is a common slip; swallow it
        // whole so the rest of the body still parses.
        if self.peek(Token::Field) || self.peek(Token::Let) || self.peek(Token::Type) {
            let at = self.here();
            let m = self.open();

            if self.peek(Token::Field) {
                self.parse_field();
            } else if self.peek(Token::Let) {
                self.parse_let(false);
            } else {
                self.parse_library_entry();
            }

            self.close(m, NodeKind::Error);
            self.msgs.at(at).parse_expected_statement();
        }
    }

    /// ```abnf
    /// statement = ID "<-" fetch-rhs
    /// statement =/ ID *map-access ":=" sid
    /// statement =/ ID "=" expr
    /// statement =/ component-id *sid
    /// statement =/ "delete" ID 1*map-access
    /// statement =/ "accept" / "send" sid / "event" sid / "throw" [sid]
    /// statement =/ "match" sid "with" *clause "end"
    /// statement =/ "forall" sid component-id
    /// ```
    fn try_parse_statement(&mut self) -> bool {
        match self.nth(0) {
            Some(Token::Id(..)) => {
                match self.nth(1) {
                    Some(Token::FetchArrow) => self.parse_fetch_statement(),
                    Some(Token::Assign) | Some(Token::LBracket) => self.parse_store_statement(),
                    Some(Token::Equal) => self.parse_bind_statement(),
                    Some(Token::Id(..)) | Some(Token::Spid(..)) | Some(Token::Cid(..)) => {
                        self.parse_call_statement()
                    }
                    _ => self.error_advance("a statement"),
                }
                true
            }
            Some(Token::Cid(..)) => {
                self.parse_call_statement();
                true
            }
            Some(Token::Accept) => {
                let m = self.open();
                self.advance();
                self.close(m, NodeKind::AcceptStmt);
                true
            }
            Some(Token::Delete) => {
                self.parse_delete_statement();
                true
            }
            Some(Token::Send) => {
                self.parse_send_statement();
                true
            }
            Some(Token::Event) => {
                self.parse_event_statement();
                true
            }
            Some(Token::Throw) => {
                self.parse_throw_statement();
                true
            }
            Some(Token::Match) => {
                self.parse_match_statement();
                true
            }
            Some(Token::Forall) => {
                self.parse_iterate_statement();
                true
            }
            _ => false,
        }
    }

    /// The many statements that start with `ID "<-"`: a plain field load, a
    /// map lookup or existence check, a blockchain read, and the remote
    /// (`&`-prefixed) variants including the address cast.
    fn parse_fetch_statement(&mut self) {
        let m = self.open();
        self.advance();
        self.advance();

        let remote = self.consume(Token::Ampersand);

        let kind = match self.nth(0) {
            Some(Token::Id(..)) | Some(Token::Spid(..)) => {
                let mut kind;

                if remote {
                    self.parse_ref_expression("a remote contract address");
                    kind = NodeKind::RemoteLoadStmt;

                    if self.consume(Token::As) {
                        self.parse_address_type();
                        kind = NodeKind::TypeCastStmt;
                    } else {
                        self.expect_advance(Token::Dot, "'.'");
                        if self.consume(Token::LParen) {
                            self.expect_advance(id(), "a remote contract parameter");
                            self.expect_advance(Token::RParen, "')'");
                        } else {
                            self.parse_field_ref();
                        }
                    }
                } else {
                    self.parse_field_ref();
                    kind = NodeKind::LoadStmt;
                }

                while self.peek(Token::LBracket) {
                    self.parse_map_access();
                    kind = if remote {
                        NodeKind::RemoteMapGetStmt
                    } else {
                        NodeKind::MapGetStmt
                    };
                }

                kind
            }

            Some(Token::Cid(..)) => {
                self.advance();
                NodeKind::ReadFromBcStmt
            }

            Some(Token::Exists) => {
                self.advance();

                if remote {
                    let r = self.open();
                    let name = self.open();
                    self.expect_advance(id(), "the address of a contract");
                    self.close(name, NodeKind::SimpleRef);
                    self.close(r, NodeKind::RefExpr);
                    self.expect_advance(Token::Dot, "'.'");
                }

                self.parse_field_ref();
                while self.peek(Token::LBracket) {
                    self.parse_map_access();
                }

                if remote {
                    NodeKind::RemoteMapGetStmt
                } else {
                    NodeKind::MapGetStmt
                }
            }

            _ => NodeKind::LoadStmt,
        };

        self.close(m, kind);
    }

    pub(super) fn parse_field_ref(&mut self) {
        let m = self.open();

        if self.peek(id()) || self.peek(spid()) {
            self.advance();
        } else {
            self.expected(&format!("a field name {LOWER_HINT}"));
        }

        self.close(m, NodeKind::FieldRef);
    }

    fn parse_store_statement(&mut self) {
        let m = self.open();
        self.parse_field_ref();

        let mut map_update = false;
        while self.peek(Token::LBracket) {
            self.parse_map_access();
            map_update = true;
        }

        self.expect_advance(Token::Assign, "':='");
        self.parse_ref_expression("a value");

        let kind = if map_update {
            NodeKind::MapUpdateStmt
        } else {
            NodeKind::StoreStmt
        };
        self.close(m, kind);
    }

    fn parse_bind_statement(&mut self) {
        let m = self.open();
        self.advance();
        self.expect_advance(Token::Equal, "'='");
        self.parse_expression();
        self.close(m, NodeKind::BindStmt);
    }

    fn parse_call_statement(&mut self) {
        let m = self.open();
        self.advance();

        while self.detect_sid() {
            self.parse_ref_expression("an argument");
        }

        self.close(m, NodeKind::CallStmt);
    }

    fn parse_iterate_statement(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_ref_expression("a list");

        if self.peek(id()) || self.peek(cid()) {
            self.advance();
        } else {
            self.expected("a component name");
        }

        self.close(m, NodeKind::IterateStmt);
    }

    fn parse_match_statement(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_ref_expression("a value");
        self.expect_advance(Token::With, "'with'");

        while self.try_parse_match_clause(true) {}

        self.expect_advance(Token::End, "'end'");
        self.close(m, NodeKind::MatchStmt);
    }

    fn parse_throw_statement(&mut self) {
        let m = self.open();
        self.advance();

        if self.detect_sid() {
            self.parse_ref_expression("an exception");
        }

        self.close(m, NodeKind::ThrowStmt);
    }

    fn parse_event_statement(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_ref_expression("a message");
        self.close(m, NodeKind::EventStmt);
    }

    fn parse_send_statement(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_ref_expression("a list of messages");
        self.close(m, NodeKind::SendStmt);
    }

    fn parse_delete_statement(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_field_ref();

        if !self.peek(Token::LBracket) {
            self.expected("'['");
        }
        while self.peek(Token::LBracket) {
            self.parse_map_access();
        }

        self.close(m, NodeKind::MapDeleteStmt);
    }

    /// ```abnf
    /// map-access = "[" sid "]"
    /// ```
    pub(super) fn parse_map_access(&mut self) {
        let m = self.open();
        self.advance();
        self.parse_ref_expression("a key");
        self.expect_advance(Token::RBracket, "']'");
        self.close(m, NodeKind::MapAccess);
    }
}
