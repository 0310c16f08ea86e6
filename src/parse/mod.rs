mod expr;
mod matcher;
mod module;
mod stmt;
mod types;

use log::{info, trace};

use crate::lex::Token;
use crate::message::{File, Messages, Span};
use crate::tree::{Child, NodeData, NodeId, NodeKind, SyntaxTree};
use crate::Driver;
use matcher::Matcher;

/// Parses a whole contract module. Total: every token of the input ends up
/// in the produced tree, and every problem becomes a message.
pub fn parse(driver: &mut impl Driver, tokens: Vec<(Token, Span)>, file: File) -> SyntaxTree {
    info!("parsing file with id {file}");

    let mut parser = Parser::new(&tokens, file);
    parser.parse_module();

    let Parser { events, msgs, .. } = parser;
    driver.report(msgs);

    let tree = build_tree(events, tokens);
    trace!("done parsing file {file}");

    tree
}

const LOWER_HINT: &str = "(identifier beginning with a lowercase letter)";
const UPPER_HINT: &str = "(capitalized identifier)";
const UNDER_HINT: &str = "(identifier beginning with '_')";
const QUOTE_HINT: &str = "(identifier beginning with ')";

fn id() -> Token {
    Token::Id(String::new())
}

fn cid() -> Token {
    Token::Cid(String::new())
}

fn tid() -> Token {
    Token::Tid(String::new())
}

fn spid() -> Token {
    Token::Spid(String::new())
}

fn int() -> Token {
    Token::Int(String::new())
}

fn hex() -> Token {
    Token::Hex(String::new())
}

/// The parser records what it did as a flat list of events. Each `Advance`
/// consumes exactly one input token; `Open`/`Close` bracket them into nodes.
/// Rewriting the list afterwards is what makes `open_before` and rollback
/// cheap.
#[derive(Debug)]
enum Event {
    Open { kind: NodeKind },
    Tombstone,
    Close,
    Advance,
}

#[derive(Debug)]
struct MarkOpened {
    index: usize,
}

#[derive(Clone, Copy, Debug)]
struct MarkClosed {
    index: usize,
}

#[derive(Debug)]
struct Checkpoint {
    pos: usize,
    events: usize,
    msgs: usize,
}

#[derive(Debug)]
struct Parser<'a> {
    tokens: &'a [(Token, Span)],
    pos: usize,
    file: File,
    events: Vec<Event>,
    msgs: Messages,
}

impl<'a> Parser<'a> {
    const IDENTS: &'static [Token] = &[
        Token::Id(String::new()),
        Token::Cid(String::new()),
        Token::Tid(String::new()),
        Token::Spid(String::new()),
    ];

    const ARROWS: &'static [Token] = &[Token::EqArrow, Token::MinArrow];

    const ASSIGNMENTS: &'static [Token] = &[Token::Equal, Token::Assign, Token::FetchArrow];

    fn new(tokens: &'a [(Token, Span)], file: File) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
            events: Vec::new(),
            msgs: Messages::new(),
        }
    }

    /// The `n`th upcoming meaningful token. Invalid tokens are invisible to
    /// lookahead; `advance` sweeps them into the tree.
    fn nth(&self, n: usize) -> Option<&Token> {
        self.tokens[self.pos..]
            .iter()
            .map(|(tok, _)| tok)
            .filter(|tok| !matches!(tok, Token::Invalid))
            .nth(n)
    }

    fn is_done(&self) -> bool {
        self.nth(0).is_none()
    }

    /// Where to point a diagnostic right now.
    fn here(&self) -> Span {
        if let Some((_, span)) = self.tokens.get(self.pos) {
            *span
        } else if let Some((_, span)) = self.tokens.last() {
            Span::new(self.file, span.end, span.end)
        } else {
            Span::new(self.file, 0, 0)
        }
    }

    fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: NodeKind::Error,
        });
        mark
    }

    fn close(&mut self, mark: MarkOpened, kind: NodeKind) -> MarkClosed {
        self.events[mark.index] = Event::Open { kind };
        self.events.push(Event::Close);
        MarkClosed { index: mark.index }
    }

    /// Wraps an already-closed node in a new one, like noticing `A -> B`
    /// only after `A` has been parsed.
    fn open_before(&mut self, mark: MarkClosed) -> MarkOpened {
        self.events.insert(
            mark.index,
            Event::Open {
                kind: NodeKind::Error,
            },
        );
        MarkOpened { index: mark.index }
    }

    /// Discards an open mark; its children attach to the parent instead.
    fn abandon(&mut self, mark: MarkOpened) {
        self.events[mark.index] = Event::Tombstone;
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            events: self.events.len(),
            msgs: self.msgs.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.events.truncate(checkpoint.events);
        self.msgs.truncate(checkpoint.msgs);
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
        self.skip_invalid();
    }

    fn skip_invalid(&mut self) {
        while matches!(self.tokens.get(self.pos), Some((Token::Invalid, _))) {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    fn peek(&self, matcher: impl Matcher) -> bool {
        self.nth(0).map(|tok| matcher.matches(tok)).unwrap_or(false)
    }

    fn consume(&mut self, matcher: impl Matcher) -> bool {
        if self.peek(matcher) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expected(&mut self, what: &str) {
        let at = self.here();
        self.msgs.at(at).parse_expected(what);
    }

    fn expected_at(&mut self, at: Span, what: &str) {
        self.msgs.at(at).parse_expected(what);
    }

    /// Reports the expectation, with the identifier-shape hint when the
    /// expected token is one of the four identifier shapes.
    fn expected_shaped(&mut self, expected: &Token, what: &str) {
        let suffix = match expected {
            Token::Id(..) => LOWER_HINT,
            Token::Cid(..) => UPPER_HINT,
            Token::Spid(..) => UNDER_HINT,
            Token::Tid(..) => QUOTE_HINT,
            _ => "",
        };

        if suffix.is_empty() {
            self.expected(what);
        } else {
            let what = format!("{what} {suffix}");
            let at = self.here();
            self.msgs.at(at).parse_expected(&what);
        }
    }

    /// Consumes the expected token and answers whether the caller may treat
    /// it as present. A token of the wrong identifier, arrow or assignment
    /// shape is consumed too (wrapped in an error node), so one misspelled
    /// name does not derail the rest of the production.
    fn expect_advance(&mut self, expected: Token, what: &str) -> bool {
        if self.peek(&expected) {
            self.advance();
            true
        } else if self.same_shape_class(&expected) {
            self.expected_shaped(&expected, what);
            let m = self.open();
            self.advance();
            self.close(m, NodeKind::Error);
            true
        } else {
            self.expected_shaped(&expected, what);
            false
        }
    }

    fn same_shape_class(&self, expected: &Token) -> bool {
        let actual = match self.nth(0) {
            Some(tok) => tok,
            None => return false,
        };

        for class in [Self::IDENTS, Self::ARROWS, Self::ASSIGNMENTS] {
            if class.matches(expected) && class.matches(actual) {
                return true;
            }
        }

        false
    }

    /// Consumes one token into an error node. The resync of last resort.
    fn error_advance(&mut self, what: &str) {
        self.expected(what);
        let m = self.open();
        self.advance();
        self.close(m, NodeKind::Error);
    }

    /// Separated-list loop shared by every list-shaped production. The body
    /// must consume at least one token per item; when it cannot, a single
    /// token is skipped so the loop always makes progress.
    fn parse_loop(
        &mut self,
        item: &str,
        separator: Option<(Token, &str)>,
        stoppers: &[Token],
        mut body: impl FnMut(&mut Self),
    ) {
        while !self.is_done() && !self.peek(stoppers) {
            let before = self.pos;
            body(self);

            if self.pos == before {
                self.error_advance(item);
                continue;
            }

            if let Some((sep, name)) = &separator {
                if self.peek(sep) {
                    self.advance();
                } else if self.peek(stoppers) {
                    break;
                } else {
                    self.expected(name);
                }
            }
        }
    }
}

fn build_tree(events: Vec<Event>, tokens: Vec<(Token, Span)>) -> SyntaxTree {
    let mut nodes: Vec<NodeData> = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut tokens = tokens.into_iter();
    let mut root = None;

    for event in events {
        match event {
            Event::Open { kind } => {
                let node = NodeId(nodes.len() as u32);
                let parent = stack.last().copied();
                nodes.push(NodeData {
                    kind,
                    parent,
                    children: Vec::new(),
                });

                if let Some(parent) = parent {
                    nodes[parent.0 as usize].children.push(Child::Node(node));
                } else if root.is_none() {
                    root = Some(node);
                }

                stack.push(node);
            }

            Event::Tombstone => {}

            Event::Close => {
                stack.pop();
            }

            Event::Advance => {
                if let Some((tok, span)) = tokens.next() {
                    if let Some(&top) = stack.last() {
                        nodes[top.0 as usize].children.push(Child::Token(tok, span));
                    }
                }
            }
        }
    }

    let root = match root {
        Some(root) => root,
        None => {
            nodes.push(NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            });
            NodeId(nodes.len() as u32 - 1)
        }
    };

    // Anything the parser never advanced over still belongs to the tree.
    let leftover: Vec<_> = tokens.collect();
    for (tok, span) in leftover {
        nodes[root.0 as usize].children.push(Child::Token(tok, span));
    }

    SyntaxTree::new(nodes, root)
}
