use crate::span::Pos;

/// Character-level reader over the input text. Tracks row/column as it
/// advances and offers exactly one character of lookahead.
pub struct Cursor<'src> {
    source: &'src [u8],
    pos: Pos,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: Pos::default(),
        }
    }

    /// The position of the next unconsumed character.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Next character without consuming it, or None at end of input.
    pub fn peek(&self) -> Option<u8> {
        self.source.get(self.pos.byte as usize).copied()
    }

    /// Consume and return the next character, advancing the position:
    /// row += 1 and col = 0 on `\n`, col += 1 otherwise.
    pub fn next(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos.byte += 1;
        if ch == b'\n' {
            self.pos.row += 1;
            self.pos.col = 0;
        } else {
            self.pos.col += 1;
        }
        Some(ch)
    }

    /// True once the whole input has been consumed.
    pub fn finished(&self) -> bool {
        self.pos.byte as usize >= self.source.len()
    }
}
