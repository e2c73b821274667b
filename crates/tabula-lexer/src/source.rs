// Copyright (C) 2026 The Tabula Authors.
// This file is part of the tabula interpreter.

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! Character sources for the tabula lexer.
//!
//! Mirrors the reference implementation's `raw -> positional -> unified`
//! pipeline (`data/source/raw.py`, `unified.py`, `positional.py`): a raw
//! source hands out characters one at a time, and [`PositionedChars`]
//! wraps it to normalise end-of-line conventions and track `(row, col)`.

use std::fs;
use std::io;
use std::path::Path;

use tabula_span::Position;

/// Supplies one character at a time. The scanner only ever needs a single
/// character of raw lookahead, so implementations don't need to support
/// seeking or peeking themselves.
pub trait RawSource {
    /// Returns the next character, or `None` at end of input.
    fn raw_next(&mut self) -> Option<char>;
}

/// An in-memory source, used by tests and by anything embedding the
/// interpreter without going through the filesystem.
pub struct StrSource {
    chars: std::vec::IntoIter<char>,
}

impl StrSource {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { chars: text.chars().collect::<Vec<_>>().into_iter() }
    }
}

impl RawSource for StrSource {
    fn raw_next(&mut self) -> Option<char> {
        self.chars.next()
    }
}

/// A source backed by a file on disk. Reads the whole file up front —
/// the interpreter has no use for streaming a source larger than memory,
/// and this keeps the "CLI / file opening" external collaborator from
/// spec §1 as thin as the spec asks for.
pub struct FileSource {
    inner: StrSource,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self { inner: StrSource::new(text) })
    }
}

impl RawSource for FileSource {
    fn raw_next(&mut self) -> Option<char> {
        self.inner.raw_next()
    }
}

/// The IBM NEL control character (octal `\025`), one of the five spellings
/// of "end of line" spec §4.1 requires collapsing to a single `\n`.
const NEL: char = '\u{15}';

/// Normalises every line-ending convention in the wrapped [`RawSource`] to
/// a single `\n` and tracks `(row, col)` over the resulting stream.
///
/// `\n`, `\r`, `\r\n`, `\n\r` and NEL all become one `\n`. `row` increments
/// exactly once per emitted `\n`; `col` resets to `0` on it, so the first
/// character of the following line is reported at column 1.
pub struct PositionedChars<S> {
    source: S,
    pushback: Option<char>,
    row: u32,
    col: u32,
}

impl<S: RawSource> PositionedChars<S> {
    pub fn new(source: S) -> Self {
        Self { source, pushback: None, row: 1, col: 0 }
    }

    fn raw_next(&mut self) -> Option<char> {
        self.pushback.take().or_else(|| self.source.raw_next())
    }

    /// Returns the next normalised character, or `None` at end of input.
    /// `position()` immediately after this call reports this character's
    /// own `(row, col)`.
    pub fn next_char(&mut self) -> Option<char> {
        let normalised = match self.raw_next()? {
            '\r' => {
                match self.raw_next() {
                    Some('\n') => {}
                    Some(other) => self.pushback = Some(other),
                    None => {}
                }
                '\n'
            }
            '\n' => {
                match self.raw_next() {
                    Some('\r') => {}
                    Some(other) => self.pushback = Some(other),
                    None => {}
                }
                '\n'
            }
            NEL => '\n',
            other => other,
        };

        if normalised == '\n' {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(normalised)
    }

    /// The `(row, col)` of the character most recently returned by
    /// [`Self::next_char`]. Fixed at its last value once the stream is
    /// exhausted, per spec §4.1.
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> (String, Vec<Position>) {
        let mut chars = PositionedChars::new(StrSource::new(text));
        let mut out = String::new();
        let mut positions = Vec::new();
        while let Some(c) = chars.next_char() {
            out.push(c);
            positions.push(chars.position());
        }
        (out, positions)
    }

    #[test]
    fn normalises_every_line_ending() {
        let (text, _) = collect("a\nb\rc\r\nd\n\re\u{15}f");
        assert_eq!(text, "a\nb\nc\nd\ne\nf");
        assert_eq!(text.matches('\r').count(), 0);
        assert_eq!(text.matches('\u{15}').count(), 0);
    }

    #[test]
    fn column_resets_after_newline() {
        let (_, positions) = collect("ab\ncd");
        assert_eq!(positions[0], Position::new(1, 1)); // 'a'
        assert_eq!(positions[1], Position::new(1, 2)); // 'b'
        assert_eq!(positions[3], Position::new(2, 1)); // 'c', first char of line 2
        assert_eq!(positions[4], Position::new(2, 2)); // 'd'
    }

    #[test]
    fn position_is_stable_past_eof() {
        let mut chars = PositionedChars::new(StrSource::new("x"));
        chars.next_char();
        let pos = chars.position();
        assert_eq!(chars.next_char(), None);
        assert_eq!(chars.position(), pos);
    }
}
