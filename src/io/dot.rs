//! Graphviz DOT for the `digraph` subset the builders emit:
//!
//! ```text
//! digraph g {
//!     3[label="1"];
//!     0 -> 1 [label="a"];
//! }
//! ```
//!
//! Vertex ids are integers and vertex 0 is the root. A vertex whose `label`
//! is `1` is terminal. Every edge needs a `label`. Graph attributes,
//! `graph`/`node`/`edge` defaults, other attributes and comments are skipped.

use std::fmt::Display;
use std::io::{BufRead, Write};

use tracing::debug;

use super::{IoError, TripleList};
use crate::dafsa::{Automaton, LabelChar, VertexId};

/// Writes an automaton in Graphviz DOT syntax.
///
/// Terminal vertices carry `[label="1"]`; edges carry their label.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the write fails.
pub fn write_dot<C: LabelChar + Display>(
    mut writer: impl Write,
    automaton: &Automaton<C>,
) -> Result<(), IoError> {
    writeln!(writer, "digraph g {{")?;
    for vertex in automaton.terminals() {
        writeln!(writer, "    {vertex}[label=\"1\"];")?;
    }
    for edge in automaton.edges() {
        let label = edge.label.to_string().replace('\\', "\\\\").replace('"', "\\\"");
        writeln!(writer, "    {} -> {} [label=\"{label}\"];", edge.source, edge.target)?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

/// Reads a DOT digraph and builds the automaton it describes.
///
/// The vertex count is one more than the largest id mentioned, so an empty
/// graph is the root alone.
///
/// # Errors
///
/// Returns [`IoError::Dot`] for syntax outside the supported subset and
/// [`IoError::Malformed`] if the graph is not a valid automaton.
pub fn read_dot(mut reader: impl BufRead) -> Result<Automaton<char>, IoError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let tokens = Lexer::new(&text).tokenize()?;
    let document = Parser { tokens, pos: 0 }.graph()?;
    debug!(
        vertices = document.vertices,
        edges = document.edges.len(),
        terminals = document.terminals.len(),
        "read DOT graph"
    );
    Ok(document.into_automaton()?)
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    /// Bare identifier or number.
    Id(String),
    /// Double-quoted string, unescaped.
    Quoted(String),
    Arrow,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Equals,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

impl Lexer {
    fn new(text: &str) -> Self {
        Lexer {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> IoError {
        IoError::Dot {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Skips whitespace, `//` and `#` line comments, and `/* */` blocks.
    fn skip_trivia(&mut self) -> Result<(), IoError> {
        while let Some(c) = self.peek() {
            let next = self.chars.get(self.pos + 1).copied();
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' || (c == '/' && next == Some('/')) {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if c == '/' && next == Some('*') {
                self.pos += 2;
                loop {
                    match self.bump() {
                        Some('*') if self.peek() == Some('/') => {
                            self.pos += 1;
                            break;
                        }
                        Some(_) => {}
                        None => return Err(self.error("unterminated comment")),
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn quoted(&mut self) -> Result<String, IoError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => value.push(c),
                    Some(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => break,
                },
                Some(c) => value.push(c),
                None => break,
            }
        }
        Err(self.error("unterminated string"))
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, IoError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let line = self.line;
            let Some(c) = self.bump() else {
                return Ok(tokens);
            };
            let token = match c {
                '{' => Token::LBrace,
                '}' => Token::RBrace,
                '[' => Token::LBracket,
                ']' => Token::RBracket,
                ';' => Token::Semi,
                ',' => Token::Comma,
                '=' => Token::Equals,
                '-' if self.peek() == Some('>') => {
                    self.bump();
                    Token::Arrow
                }
                '"' => Token::Quoted(self.quoted()?),
                c if is_id_char(c) || c == '-' => {
                    let mut id = String::from(c);
                    while let Some(c) = self.peek().filter(|&c| is_id_char(c)) {
                        id.push(c);
                        self.bump();
                    }
                    Token::Id(id)
                }
                other => return Err(self.error(format!("unexpected character {other:?}"))),
            };
            tokens.push((token, line));
        }
    }
}

fn mention(document: &mut TripleList, vertex: VertexId) {
    document.vertices = document.vertices.max(vertex as usize + 1);
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |&(_, line)| line)
    }

    fn error(&self, message: impl Into<String>) -> IoError {
        IoError::Dot {
            line: self.line(),
            message: message.into(),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn id(&mut self) -> Result<String, IoError> {
        match self.peek() {
            Some(Token::Id(_) | Token::Quoted(_)) => match self.next() {
                Some(Token::Id(id) | Token::Quoted(id)) => Ok(id),
                _ => Err(self.error("expected an identifier")),
            },
            Some(other) => Err(self.error(format!("expected an identifier, found {other:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn vertex(&self, id: &str) -> Result<VertexId, IoError> {
        id.parse()
            .map_err(|_| self.error(format!("vertex id {id:?} is not a non-negative integer")))
    }

    /// An optional `[key=value, ...]` list.
    fn attributes(&mut self) -> Result<Vec<(String, String)>, IoError> {
        let mut attributes = Vec::new();
        while self.eat(&Token::LBracket) {
            while !self.eat(&Token::RBracket) {
                let key = self.id()?;
                if !self.eat(&Token::Equals) {
                    return Err(self.error(format!("attribute {key:?} has no value")));
                }
                attributes.push((key, self.id()?));
                if !self.eat(&Token::Comma) {
                    self.eat(&Token::Semi);
                }
            }
        }
        Ok(attributes)
    }

    fn graph(mut self) -> Result<TripleList, IoError> {
        let mut kind = self.id()?;
        if kind.eq_ignore_ascii_case("strict") {
            kind = self.id()?;
        }
        if !kind.eq_ignore_ascii_case("digraph") {
            return Err(self.error(format!("expected digraph, found {kind:?}")));
        }
        if matches!(self.peek(), Some(Token::Id(_) | Token::Quoted(_))) {
            self.id()?;
        }
        if !self.eat(&Token::LBrace) {
            return Err(self.error("expected '{'"));
        }

        let mut document = TripleList {
            vertices: 1,
            edges: Vec::new(),
            terminals: Vec::new(),
        };
        loop {
            match self.peek() {
                Some(Token::RBrace) => break,
                Some(Token::Semi) => {
                    self.pos += 1;
                    continue;
                }
                None => return Err(self.error("missing '}'")),
                _ => {}
            }
            let first = self.id()?;
            if self.eat(&Token::Equals) {
                // graph attribute
                self.id()?;
            } else if self.eat(&Token::Arrow) {
                let second = self.id()?;
                let (source, target) = (self.vertex(&first)?, self.vertex(&second)?);
                let label = self
                    .attributes()?
                    .into_iter()
                    .find_map(|(key, value)| (key == "label").then_some(value))
                    .ok_or_else(|| self.error(format!("edge {source} -> {target} has no label")))?;
                mention(&mut document, source);
                mention(&mut document, target);
                document.edges.push((source, target, label));
            } else {
                let attributes = self.attributes()?;
                if matches!(first.as_str(), "graph" | "node" | "edge") {
                    continue;
                }
                let vertex = self.vertex(&first)?;
                mention(&mut document, vertex);
                if attributes.iter().any(|(key, value)| key == "label" && value == "1") {
                    document.terminals.push(vertex);
                }
            }
        }
        Ok(document)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dafsa::{build_trie, compress};

    fn read(text: &str) -> Result<Automaton<char>, IoError> {
        read_dot(text.as_bytes())
    }

    #[test]
    fn dot_output() {
        let input = r#"{"vertices":2,"edges":[[0,1,"a\"b"]],"terminals":[1]}"#;
        let automaton = crate::io::read_triples(input.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_dot(&mut out, &automaton).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "digraph g {\n    1[label=\"1\"];\n    0 -> 1 [label=\"a\\\"b\"];\n}\n"
        );
    }

    #[test]
    fn written_dot_reads_back() {
        let trie = build_trie::<char, _>(["a.com", "b\"q", "b.com", "b.net"]).unwrap();
        for automaton in [trie.clone(), compress(&trie).unwrap()] {
            let mut out = Vec::new();
            write_dot(&mut out, &automaton).unwrap();
            let back = read_dot(out.as_slice()).unwrap();
            assert_eq!(back.to_triples(), automaton.to_triples());
            assert_eq!(
                back.terminals().collect::<Vec<_>>(),
                automaton.terminals().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn builder_output_without_trailing_newline() {
        let automaton = read("digraph g {\n    0 -> 1 [label=\"a\"];\n    0 -> 2 [label=\"b\"];\n}").unwrap();
        assert_eq!(automaton.vertex_count(), 3);
        assert_eq!(automaton.edge_count(), 2);
        assert_eq!(automaton.terminals().count(), 0);
    }

    #[test]
    fn lenient_syntax() {
        let text = r#"
            /* exported */
            strict digraph "names" {
                rankdir = LR
                node [shape=circle];
                // word end
                2 [shape=doublecircle, label="1"]
                0->1 [label=a]
                1 -> 2 [color=red; label="bc"]
            }
        "#;
        let automaton = read(text).unwrap();
        assert_eq!(automaton.vertex_count(), 3);
        assert!(automaton.accepts("abc"));
        assert!(!automaton.accepts("a"));
    }

    #[test]
    fn empty_graph_is_the_root() {
        let automaton = read("digraph g {}").unwrap();
        assert_eq!(automaton.vertex_count(), 1);
    }

    #[test]
    fn errors_carry_lines() {
        assert!(matches!(
            read("digraph g {\n  0 -> 1;\n}"),
            Err(IoError::Dot { line: 2, .. })
        ));
        assert!(matches!(
            read("digraph g {\n\n  x -> 1 [label=\"a\"];\n}"),
            Err(IoError::Dot { line: 3, .. })
        ));
        assert!(matches!(read("graph g { 0 -- 1 }"), Err(IoError::Dot { line: 1, .. })));
        assert!(matches!(read("digraph g { 0 -> 1 [label=\"a"), Err(IoError::Dot { .. })));
        assert!(matches!(read("digraph g { 0 -> 1 [label=a]"), Err(IoError::Dot { .. })));
    }

    #[test]
    fn invalid_automaton_is_malformed() {
        assert!(matches!(
            read("digraph g { 0 -> 2 [label=a]; 1 -> 2 [label=b]; }"),
            Err(IoError::Malformed(_))
        ));
    }
}
