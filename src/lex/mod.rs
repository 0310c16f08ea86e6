mod token;

use log::{info, trace};
use logos::Logos;

use crate::message::{File, Messages, Span};
use crate::Driver;
use token::FreeToken;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Forall,
    Builtin,
    Library,
    Import,
    Let,
    In,
    Match,
    With,
    End,
    Fun,
    Tfun,
    Contract,
    Transition,
    Procedure,
    Send,
    Event,
    Field,
    Accept,
    Exists,
    Delete,
    Throw,
    Emp,
    Map,
    ScillaVersion,
    Type,
    Of,
    As,
    Try,
    Catch,

    Semi,
    Colon,
    Dot,
    Pipe,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,

    EqArrow,
    MinArrow,
    FetchArrow,
    Assign,
    Equal,
    Ampersand,
    At,
    Underscore,

    Id(String),
    Cid(String),
    Tid(String),
    Spid(String),
    Int(String),
    Hex(String),
    Str(String),

    Invalid,
}

pub fn lex(driver: &mut impl Driver, src: impl AsRef<str>, file: File) -> Vec<(Token, Span)> {
    info!("lexing file with id {file}");
    let mut lexer = Lexer::new(src.as_ref(), file);
    lexer.lex();
    driver.report(lexer.msgs);
    trace!("done lexing {file}");
    lexer.res
}

impl Token {
    /// Any of the four identifier shapes.
    pub fn is_ident(&self) -> bool {
        matches!(
            self,
            Self::Id(..) | Self::Cid(..) | Self::Tid(..) | Self::Spid(..)
        )
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Id(text)
            | Self::Cid(text)
            | Self::Tid(text)
            | Self::Spid(text)
            | Self::Int(text)
            | Self::Hex(text)
            | Self::Str(text) => Some(text),

            _ => None,
        }
    }
}

struct Lexer<'src> {
    lex: logos::SpannedIter<'src, FreeToken<'src>>,
    file: File,
    res: Vec<(Token, Span)>,
    msgs: Messages,
}

impl<'src> Lexer<'src> {
    fn new(src: &'src str, file: File) -> Self {
        Self {
            lex: FreeToken::lexer(src).spanned(),
            file,
            res: Vec::new(),
            msgs: Messages::new(),
        }
    }

    fn lex(&mut self) {
        while self.dispatch() {}
    }

    fn dispatch(&mut self) -> bool {
        if let Some((tok, span)) = self.lex.next() {
            let span = Span::new(self.file, span.start, span.end);
            let tok = match tok {
                FreeToken::Forall => Token::Forall,
                FreeToken::Builtin => Token::Builtin,
                FreeToken::Library => Token::Library,
                FreeToken::Import => Token::Import,
                FreeToken::Let => Token::Let,
                FreeToken::In => Token::In,
                FreeToken::Match => Token::Match,
                FreeToken::With => Token::With,
                FreeToken::End => Token::End,
                FreeToken::Fun => Token::Fun,
                FreeToken::Tfun => Token::Tfun,
                FreeToken::Contract => Token::Contract,
                FreeToken::Transition => Token::Transition,
                FreeToken::Procedure => Token::Procedure,
                FreeToken::Send => Token::Send,
                FreeToken::Event => Token::Event,
                FreeToken::Field => Token::Field,
                FreeToken::Accept => Token::Accept,
                FreeToken::Exists => Token::Exists,
                FreeToken::Delete => Token::Delete,
                FreeToken::Throw => Token::Throw,
                FreeToken::Emp => Token::Emp,
                FreeToken::Map => Token::Map,
                FreeToken::ScillaVersion => Token::ScillaVersion,
                FreeToken::Type => Token::Type,
                FreeToken::Of => Token::Of,
                FreeToken::As => Token::As,
                FreeToken::Try => Token::Try,
                FreeToken::Catch => Token::Catch,

                FreeToken::Semi => Token::Semi,
                FreeToken::Colon => Token::Colon,
                FreeToken::Dot => Token::Dot,
                FreeToken::Pipe => Token::Pipe,
                FreeToken::LBracket => Token::LBracket,
                FreeToken::RBracket => Token::RBracket,
                FreeToken::LParen => Token::LParen,
                FreeToken::RParen => Token::RParen,
                FreeToken::LBrace => Token::LBrace,
                FreeToken::RBrace => Token::RBrace,
                FreeToken::Comma => Token::Comma,

                FreeToken::EqArrow => Token::EqArrow,
                FreeToken::MinArrow => Token::MinArrow,
                FreeToken::FetchArrow => Token::FetchArrow,
                FreeToken::Assign => Token::Assign,
                FreeToken::Equal => Token::Equal,
                FreeToken::Ampersand => Token::Ampersand,
                FreeToken::At => Token::At,
                FreeToken::Underscore => Token::Underscore,

                FreeToken::Id(text) => Token::Id(text.into()),
                FreeToken::Cid(text) => Token::Cid(text.into()),
                FreeToken::Tid(text) => Token::Tid(text.into()),
                FreeToken::Spid(text) => Token::Spid(text.into()),
                FreeToken::Int(text) => Token::Int(text.into()),
                FreeToken::Hex(text) => Token::Hex(text.into()),
                FreeToken::Str(text) => Token::Str(text.into()),

                FreeToken::Error => {
                    self.msgs.at(span).lex_invalid();
                    Token::Invalid
                }
            };

            self.res.push((tok, span));
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoopDriver;

    fn tokens(src: &str) -> Vec<Token> {
        lex(&mut NoopDriver, src, 0)
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    #[test]
    fn identifier_shapes() {
        assert_eq!(
            tokens("x Cons 'A _sender _"),
            vec![
                Token::Id("x".into()),
                Token::Cid("Cons".into()),
                Token::Tid("'A".into()),
                Token::Spid("_sender".into()),
                Token::Underscore,
            ]
        );
    }

    #[test]
    fn arrows_and_assignment() {
        assert_eq!(
            tokens("x <- f; y := z; a = b -> c => d"),
            vec![
                Token::Id("x".into()),
                Token::FetchArrow,
                Token::Id("f".into()),
                Token::Semi,
                Token::Id("y".into()),
                Token::Assign,
                Token::Id("z".into()),
                Token::Semi,
                Token::Id("a".into()),
                Token::Equal,
                Token::Id("b".into()),
                Token::MinArrow,
                Token::Id("c".into()),
                Token::EqArrow,
                Token::Id("d".into()),
            ]
        );
    }

    #[test]
    fn nested_comments() {
        assert_eq!(
            tokens("a (* outer (* inner *) still outer *) b"),
            vec![Token::Id("a".into()), Token::Id("b".into())]
        );
    }

    #[test]
    fn unterminated_comment_swallows_rest() {
        assert_eq!(tokens("a (* no close"), vec![Token::Id("a".into())]);
    }

    #[test]
    fn literals() {
        assert_eq!(
            tokens(r#"42 -1 0x1f "hi""#),
            vec![
                Token::Int("42".into()),
                Token::Int("-1".into()),
                Token::Hex("0x1f".into()),
                Token::Str(r#""hi""#.into()),
            ]
        );
    }

    #[test]
    fn keywords_beat_identifiers() {
        assert_eq!(
            tokens("let letter Map Mapping"),
            vec![
                Token::Let,
                Token::Id("letter".into()),
                Token::Map,
                Token::Cid("Mapping".into()),
            ]
        );
    }

    #[test]
    fn invalid_characters_become_tokens() {
        assert_eq!(
            tokens("a ? b"),
            vec![Token::Id("a".into()), Token::Invalid, Token::Id("b".into())]
        );
    }
}
