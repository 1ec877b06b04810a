/// A source position: zero-based row and column, plus the byte offset
/// into the source text (used only for diagnostic rendering).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub row: u32,
    pub col: u32,
    pub byte: u32,
}

impl Pos {
    pub fn new(row: u32, col: u32, byte: u32) -> Self {
        Self { row, col, byte }
    }

    /// The 1-based source row, as used in `#line` directives.
    pub fn line(&self) -> u32 {
        self.row + 1
    }
}

/// Row-major ordering: positions compare by row, then column.
impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.col, self.byte).cmp(&(other.row, other.col, other.byte))
    }
}

/// A source range: `begin` is the position of the first character
/// consumed for a node, `end` the position immediately after its last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub begin: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(begin: Pos, end: Pos) -> Self {
        Self { begin, end }
    }

    pub fn dummy() -> Self {
        Self::default()
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }
}

/// A value annotated with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn dummy(node: T) -> Self {
        Self {
            node,
            span: Span::dummy(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}
