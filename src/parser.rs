use crate::ast::{Node, Sexp};
use crate::cursor::Cursor;
use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

const MAX_NESTING_DEPTH: u32 = 256;

/// Recursive-descent reader: turns a character stream into a forest of
/// position-annotated tree nodes. Grammar: `node := atom | '(' node* ')'`.
pub struct Parser<'src> {
    cursor: Cursor<'src>,
    depth: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            depth: 0,
        }
    }

    /// Parse the whole input. Aborts at the first structural error,
    /// with the offending position attached.
    pub fn parse_forest(mut self) -> Result<Vec<Node>, Vec<Diagnostic>> {
        let mut forest = Vec::new();
        loop {
            self.skip_whitespace();
            match self.cursor.peek() {
                None => return Ok(forest),
                Some(b')') => {
                    let begin = self.cursor.pos();
                    self.cursor.next();
                    return Err(vec![Diagnostic::error(
                        "unbalanced parenthesis: `)` with no open list".to_string(),
                        Span::new(begin, self.cursor.pos()),
                    )]);
                }
                Some(b'(') => match self.parse_list() {
                    Ok(node) => forest.push(node),
                    Err(diag) => return Err(vec![diag]),
                },
                Some(_) => match self.parse_atom() {
                    Ok(node) => forest.push(node),
                    Err(diag) => return Err(vec![diag]),
                },
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.peek(), Some(ch) if ch.is_ascii_whitespace()) {
            self.cursor.next();
        }
    }

    /// Parse a list whose `(` is the next character. The list's span
    /// runs from the `(` to just after the matching `)`.
    fn parse_list(&mut self) -> Result<Node, Diagnostic> {
        let begin = self.cursor.pos();
        self.cursor.next(); // consume '('

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(Diagnostic::error(
                format!("nesting depth exceeded (maximum {} levels)", MAX_NESTING_DEPTH),
                Span::new(begin, self.cursor.pos()),
            )
            .with_help("flatten deeply nested forms into separate top-level forms".to_string()));
        }

        let mut children = Vec::new();
        loop {
            self.skip_whitespace();
            match self.cursor.peek() {
                None => {
                    return Err(Diagnostic::error(
                        "unterminated input: list is never closed".to_string(),
                        Span::new(begin, self.cursor.pos()),
                    )
                    .with_note(format!(
                        "the list opened at {}:{} is still open at end of input",
                        begin.line(),
                        begin.col + 1
                    )));
                }
                Some(b')') => {
                    self.cursor.next();
                    self.depth -= 1;
                    return Ok(Spanned::new(
                        Sexp::List(children),
                        Span::new(begin, self.cursor.pos()),
                    ));
                }
                Some(b'(') => children.push(self.parse_list()?),
                Some(_) => children.push(self.parse_atom()?),
            }
        }
    }

    /// Parse an atom: a maximal run of non-whitespace, non-`)`
    /// characters. If the first character is a quote (`"` or `'`), the
    /// atom instead consumes verbatim, quotes included, until the same
    /// quote character appears unescaped.
    fn parse_atom(&mut self) -> Result<Node, Diagnostic> {
        let begin = self.cursor.pos();
        let mut bytes = Vec::new();

        match self.cursor.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.cursor.next();
                bytes.push(quote);
                loop {
                    match self.cursor.next() {
                        None => {
                            return Err(Diagnostic::error(
                                "unterminated input: quoted atom is never closed".to_string(),
                                Span::new(begin, self.cursor.pos()),
                            )
                            .with_note(format!(
                                "the quote opened at {}:{} has no unescaped closing `{}`",
                                begin.line(),
                                begin.col + 1,
                                quote as char
                            )));
                        }
                        Some(ch) => {
                            bytes.push(ch);
                            if ch == quote && !escaped(&bytes) {
                                break;
                            }
                        }
                    }
                }
            }
            _ => {
                while let Some(ch) = self.cursor.peek() {
                    if ch.is_ascii_whitespace() || ch == b')' {
                        break;
                    }
                    self.cursor.next();
                    bytes.push(ch);
                }
            }
        }

        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Spanned::new(
            Sexp::Atom(text),
            Span::new(begin, self.cursor.pos()),
        ))
    }
}

/// True if the last byte is preceded by an odd number of consecutive
/// backslashes (i.e. the closing quote candidate is escaped).
fn escaped(bytes: &[u8]) -> bool {
    let mut escapes = 0;
    let mut idx = bytes.len() - 1;
    while idx > 0 && bytes[idx - 1] == b'\\' {
        escapes += 1;
        idx -= 1;
    }
    escapes % 2 == 1
}
