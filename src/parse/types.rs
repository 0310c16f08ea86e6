use crate::lex::Token;
use crate::tree::NodeKind;

use super::{cid, hex, id, tid, MarkClosed, Parser};

impl Parser<'_> {
    const ADDRESS_FIELD_STOPPERS: &'static [Token] = &[
        Token::End,
        Token::RParen,
        Token::Let,
        Token::Type,
        Token::Contract,
        Token::Library,
        Token::Transition,
        Token::Procedure,
    ];

    /// ```abnf
    /// type = scid *type-arg
    /// type =/ "Map" map-key map-value
    /// type =/ type "->" type
    /// type =/ "(" type ")"
    /// type =/ address-type
    /// type =/ "forall" TID "." type
    /// type =/ TID
    /// ```
    pub(super) fn parse_type(&mut self) {
        self.parse_type_inner(false);
    }

    /// A type argument is the same grammar minus applications and arrows;
    /// those need parentheses in argument position.
    pub(super) fn try_parse_type_arg(&mut self) -> bool {
        match self.nth(0) {
            Some(Token::Tid(..))
            | Some(Token::Map)
            | Some(Token::LParen)
            | Some(Token::Cid(..))
            | Some(Token::Hex(..)) => {
                self.parse_type_inner(true);
                true
            }
            _ => false,
        }
    }

    fn parse_type_inner(&mut self, type_arg: bool) {
        let m = self.open();

        let closed = match self.nth(0) {
            Some(Token::Tid(..)) => {
                if matches!(self.nth(1), Some(Token::Dot)) {
                    // "'A. T" is a forall that lost its keyword
                    let at = self.here();
                    self.msgs.at(at).parse_missing_forall();
                    self.advance();
                    self.advance();
                    self.parse_type();
                    self.close(m, NodeKind::PolyType)
                } else {
                    self.advance();
                    self.close(m, NodeKind::TypeVarType)
                }
            }

            Some(Token::Map) => {
                self.advance();
                self.parse_map_key();
                self.parse_map_value(false);
                self.close(m, NodeKind::MapType)
            }

            Some(Token::LParen) => {
                self.advance();
                self.parse_type();
                self.expect_advance(Token::RParen, "')'");
                self.close(m, NodeKind::ParenType)
            }

            // A remote library type, `HEX.CID`.
            Some(Token::Hex(..)) => {
                self.parse_sid_or_scid(true, "a type");
                while !type_arg && !self.is_done() {
                    if !self.try_parse_type_arg() {
                        break;
                    }
                }
                self.close(m, NodeKind::RefType)
            }

            Some(Token::Cid(..)) | Some(Token::Id(..)) | Some(Token::Spid(..)) => {
                if matches!(self.nth(1), Some(Token::With)) {
                    self.abandon(m);
                    self.parse_address_type()
                } else {
                    self.parse_sid_or_scid(true, "a type");
                    while !type_arg && !self.is_done() {
                        if !self.try_parse_type_arg() {
                            break;
                        }
                    }
                    self.close(m, NodeKind::RefType)
                }
            }

            Some(Token::Forall) => {
                self.advance();
                if type_arg {
                    self.expected("a type argument");
                } else if self.expect_advance(tid(), "a type variable") {
                    self.expect_advance(Token::Dot, "'.'");
                    self.parse_type();
                }
                self.close(m, NodeKind::PolyType)
            }

            _ => {
                let at = self.here();
                self.msgs.at(at).parse_expected_type();
                self.close(m, NodeKind::Error)
            }
        };

        if !type_arg && self.peek(Token::MinArrow) {
            self.advance();
            let f = self.open_before(closed);
            self.parse_type();
            self.close(f, NodeKind::FunType);
        }
    }

    /// ```abnf
    /// address-type = CID "with" "end"
    /// address-type =/ CID "with" "contract" ["(" params ")"] *(field ",") "end"
    /// ```
    pub(super) fn parse_address_type(&mut self) -> MarkClosed {
        let m = self.open();
        self.expect_advance(cid(), "an address type name");
        self.expect_advance(Token::With, "'with'");

        if self.consume(Token::End) {
            return self.close(m, NodeKind::AddressType);
        }

        if self.expect_advance(Token::Contract, "'contract' or 'end'") && self.peek(Token::LParen) {
            self.parse_parameter_list(NodeKind::ContractRefParams);
        }

        self.parse_loop(
            "a field",
            Some((Token::Comma, "','")),
            Self::ADDRESS_FIELD_STOPPERS,
            |parser| parser.parse_address_type_field(),
        );
        self.expect_advance(Token::End, "'end'");

        self.close(m, NodeKind::AddressType)
    }

    /// ```abnf
    /// address-type-field = "field" ID ":" type
    /// ```
    fn parse_address_type_field(&mut self) {
        if self.peek(Token::Field) {
            let m = self.open();
            self.advance();
            self.parse_id_with_type("a field name");
            self.close(m, NodeKind::AddressTypeField);
        } else if self.peek(Self::IDENTS) {
            let m = self.open();
            self.expected("the 'field' keyword");
            self.parse_id_with_type("a field name");
            self.close(m, NodeKind::AddressTypeField);
        }
    }

    /// ```abnf
    /// map-key = scid / "(" scid ")" / address-type / "(" address-type ")"
    /// ```
    ///
    /// Only primitive-ish types may key a map. A parenthesized key that
    /// turns out to be a function or applied type still becomes a proper
    /// type node, with the dedicated diagnostic alongside.
    pub(super) fn parse_map_key(&mut self) {
        if self.peek(Token::LParen) {
            let m = self.open();
            self.advance();

            if self.peek(hex()) || self.peek(Self::IDENTS) {
                let ty = self.parse_scid_type_or_address_type(false);
                if self.peek(Token::MinArrow) {
                    let at = self.here();
                    self.advance();
                    let f = self.open_before(ty);
                    self.parse_type();
                    self.close(f, NodeKind::FunType);
                    self.msgs.at(at).parse_map_key_not_primitive();
                } else {
                    // an applied type like (Option Uint32) cannot key a map
                    let at = self.here();
                    let mut applied = false;
                    while self.try_parse_type_arg() {
                        applied = true;
                    }
                    if applied {
                        self.msgs.at(at).parse_map_key_not_primitive();
                    }
                }
            } else {
                let at = self.here();
                self.parse_type();
                self.msgs.at(at).parse_map_key_not_primitive();
            }

            self.expect_advance(Token::RParen, "')'");
            self.close(m, NodeKind::ParenType);
        } else {
            self.parse_scid_type_or_address_type(false);
        }
    }

    /// ```abnf
    /// map-value = scid / "Map" map-key map-value / "(" map-value-args ")"
    /// map-value =/ address-type
    /// ```
    ///
    /// Type arguments are only allowed under parentheses.
    pub(super) fn parse_map_value(&mut self, allow_type_args: bool) {
        match self.nth(0) {
            Some(Token::Map) => {
                let m = self.open();
                self.advance();
                self.parse_map_key();
                self.parse_map_value(false);
                self.close(m, NodeKind::MapType);
            }
            Some(Token::LParen) => {
                let m = self.open();
                self.advance();
                self.parse_map_value(true);
                self.expect_advance(Token::RParen, "')'");
                self.close(m, NodeKind::ParenType);
            }
            _ => {
                self.parse_scid_type_or_address_type(allow_type_args);
            }
        }
    }

    fn parse_scid_type_or_address_type(&mut self, allow_type_args: bool) -> MarkClosed {
        if matches!(self.nth(0), Some(Token::Hex(..))) {
            return self.parse_scid_with_value_args(allow_type_args);
        }

        if self.peek(Self::IDENTS) && matches!(self.nth(1), Some(Token::With)) {
            return self.parse_address_type();
        }

        self.parse_scid_with_value_args(allow_type_args)
    }

    fn parse_scid_with_value_args(&mut self, allow_type_args: bool) -> MarkClosed {
        let m = self.open();
        self.parse_sid_or_scid(true, "a type");

        if allow_type_args {
            self.parse_loop("a map value argument", None, &[Token::RParen], |parser| {
                parser.parse_map_value(false);
            });
        }

        self.close(m, NodeKind::RefType)
    }

    /// ```abnf
    /// id-with-type = ID ":" type
    /// ```
    pub(super) fn parse_id_with_type(&mut self, what: &str) {
        let m = self.open();
        self.expect_advance(id(), what);
        self.parse_type_annotation();
        self.close(m, NodeKind::IdWithType);
    }

    pub(super) fn parse_type_annotation(&mut self) {
        self.expect_advance(Token::Colon, "':'");
        self.parse_type();
    }
}
