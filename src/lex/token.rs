use logos::{Logos, Skip};

#[derive(Logos, Debug)]
pub enum FreeToken<'src> {
    #[token("forall")]
    Forall,

    #[token("builtin")]
    Builtin,

    #[token("library")]
    Library,

    #[token("import")]
    Import,

    #[token("let")]
    Let,

    #[token("in")]
    In,

    #[token("match")]
    Match,

    #[token("with")]
    With,

    #[token("end")]
    End,

    #[token("fun")]
    Fun,

    #[token("tfun")]
    Tfun,

    #[token("contract")]
    Contract,

    #[token("transition")]
    Transition,

    #[token("procedure")]
    Procedure,

    #[token("send")]
    Send,

    #[token("event")]
    Event,

    #[token("field")]
    Field,

    #[token("accept")]
    Accept,

    #[token("exists")]
    Exists,

    #[token("delete")]
    Delete,

    #[token("throw")]
    Throw,

    #[token("Emp")]
    Emp,

    #[token("Map")]
    Map,

    #[token("scilla_version")]
    ScillaVersion,

    #[token("type")]
    Type,

    #[token("of")]
    Of,

    #[token("as")]
    As,

    #[token("try")]
    Try,

    #[token("catch")]
    Catch,

    #[token(";")]
    Semi,

    #[token(":=")]
    Assign,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    #[token("|")]
    Pipe,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token("=>")]
    EqArrow,

    #[token("->")]
    MinArrow,

    #[token("=")]
    Equal,

    #[token("&")]
    Ampersand,

    #[token("<-")]
    FetchArrow,

    #[token("@")]
    At,

    #[token("_")]
    Underscore,

    #[regex(r"[a-z][a-zA-Z0-9_]*")]
    Id(&'src str),

    #[regex(r"[A-Z][a-zA-Z0-9_]*")]
    Cid(&'src str),

    #[regex(r"'[A-Z][a-zA-Z0-9_]*")]
    Tid(&'src str),

    #[regex(r"_[a-zA-Z0-9_]+")]
    Spid(&'src str),

    #[regex(r"-?[0-9]+")]
    Int(&'src str),

    #[regex(r"0[xX][0-9a-fA-F]+")]
    Hex(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str(&'src str),

    #[error]
    #[regex(r"[ \t\v\f\n\r]+", logos::skip)]
    #[token("(*", block_comment)]
    Error,
}

/// Skips a `(* ... *)` comment, counting nested delimiters. An unterminated
/// comment swallows the rest of the input.
fn block_comment<'src>(lex: &mut logos::Lexer<'src, FreeToken<'src>>) -> Skip {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1;
    let mut i = 0;

    while i < bytes.len() && depth > 0 {
        match (bytes[i], bytes.get(i + 1)) {
            (b'(', Some(&b'*')) => {
                depth += 1;
                i += 2;
            }

            (b'*', Some(&b')')) => {
                depth -= 1;
                i += 2;
            }

            _ => i += 1,
        }
    }

    lex.bump(i);
    Skip
}
