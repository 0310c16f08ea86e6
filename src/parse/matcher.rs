use crate::lex::Token;

pub trait Matcher {
    fn matches(&self, tok: &Token) -> bool;
}

impl Matcher for Token {
    fn matches(&self, tok: &Token) -> bool {
        match (self, tok) {
            (Token::Id(..), Token::Id(..))
            | (Token::Cid(..), Token::Cid(..))
            | (Token::Tid(..), Token::Tid(..))
            | (Token::Spid(..), Token::Spid(..))
            | (Token::Int(..), Token::Int(..))
            | (Token::Hex(..), Token::Hex(..))
            | (Token::Str(..), Token::Str(..)) => true,
            (t, u) => t == u,
        }
    }
}

impl Matcher for &Token {
    fn matches(&self, tok: &Token) -> bool {
        <Token as Matcher>::matches(self, tok)
    }
}

impl Matcher for &[Token] {
    fn matches(&self, tok: &Token) -> bool {
        self.iter().any(|other| other.matches(tok))
    }
}

impl<F: Fn(&Token) -> bool> Matcher for F {
    fn matches(&self, tok: &Token) -> bool {
        self(tok)
    }
}
