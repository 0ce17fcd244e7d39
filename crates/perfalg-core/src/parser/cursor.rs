use crate::error::GrammarError;

/// Position in the source; line and column are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pos {
    pub(crate) offset: usize,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

/// Character cursor over algorithm text.
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: Pos,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: Pos {
                offset: 0,
                line: 1,
                column: 1,
            },
        }
    }

    #[inline]
    pub(crate) fn pos(&self) -> Pos {
        self.pos
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    /// Consume `c` if it is next.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos.offset;
        while self.peek().is_some_and(&mut pred) {
            self.bump();
        }
        &self.src[start..self.pos.offset]
    }

    /// Skip whitespace and `#` comments.
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            if self.peek() == Some('#') {
                self.eat_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    pub(crate) fn error_at(&self, pos: Pos, message: impl Into<String>) -> GrammarError {
        let near: String = self.src[pos.offset..]
            .chars()
            .take_while(|c| *c != '\n')
            .take(24)
            .collect();
        GrammarError {
            message: message.into(),
            line: pos.line,
            column: pos.column,
            near,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos.offset..]
    }
}
