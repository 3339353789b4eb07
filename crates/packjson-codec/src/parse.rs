//! JSON text input straight into the packed layout.
//!
//! A small state machine per object level:
//!
//! ```text
//! Start ──'"'──▶ Name ──':' value──▶ Member ──','──▶ Name
//!   │                                   │
//!   └────'}'────▶ End ◀──────'}'────────┘
//! ```
//!
//! Keys and string values are borrowed as sub-slices of the input and
//! copied into the arena; no escape sequences are decoded. Nested objects
//! are parsed in place: the remaining parent space is reserved for the
//! child, the child is filled, then the reservation is trimmed.

use packjson_arena::layout::{self, MAX_NESTING_DEPTH};
use packjson_arena::Arena;
use packjson_core::JsonError;

use crate::numeric::{string_to_float, string_to_int};

/// Parse one JSON object from the start of `text` into `arena`.
///
/// Members are inserted alongside whatever the arena already holds.
/// Returns the number of input bytes consumed, up to and including the
/// closing `}`.
///
/// Not transactional: on error the arena may hold the members parsed so
/// far. Engine errors ([`JsonError::TableFull`], [`JsonError::BufferFull`],
/// [`JsonError::KeyExists`]) propagate unchanged so an owner can grow the
/// arena, clear it, and parse again.
pub fn parse<B>(arena: &mut Arena<B>, text: impl AsRef<[u8]>) -> Result<usize, JsonError>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let mut parser = Parser {
        text: text.as_ref(),
        pos: 0,
    };
    parser.object(arena, 0)?;
    Ok(parser.pos)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Start,
    Name,
    Member,
    End,
}

struct Parser<'t> {
    text: &'t [u8],
    pos: usize,
}

impl<'t> Parser<'t> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn syntax(&self, expected: &'static str) -> JsonError {
        JsonError::Syntax {
            position: self.pos,
            expected,
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), JsonError> {
        if self.peek() != Some(byte) {
            return Err(self.syntax(expected));
        }
        self.pos += 1;
        Ok(())
    }

    fn object<B>(&mut self, arena: &mut Arena<B>, depth: usize) -> Result<(), JsonError>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        if depth > MAX_NESTING_DEPTH {
            return Err(JsonError::generic(format!(
                "objects nested deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }
        self.skip_ws();
        self.expect(b'{', "'{'")?;
        let mut state = State::Start;
        loop {
            self.skip_ws();
            state = match state {
                State::Start => match self.peek() {
                    Some(b'}') => State::End,
                    Some(b'"') => State::Name,
                    _ => return Err(self.syntax("'\"' or '}'")),
                },
                State::Name => {
                    let key = self.string()?;
                    self.skip_ws();
                    self.expect(b':', "':'")?;
                    self.value(arena, key, depth)?;
                    State::Member
                }
                State::Member => match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        State::Name
                    }
                    Some(b'}') => State::End,
                    _ => return Err(self.syntax("',' or '}'")),
                },
                State::End => {
                    self.pos += 1;
                    return Ok(());
                }
            };
        }
    }

    /// A quoted span. Returns the text between the quotes.
    fn string(&mut self) -> Result<&'t str, JsonError> {
        self.expect(b'"', "'\"'")?;
        let start = self.pos;
        let len = self.text[start..]
            .iter()
            .position(|&b| b == b'"')
            .ok_or_else(|| self.syntax("closing '\"'"))?;
        let span = &self.text[start..start + len];
        let text = std::str::from_utf8(span).map_err(|_| self.syntax("UTF-8 text"))?;
        self.pos = start + len + 1;
        Ok(text)
    }

    fn value<B>(&mut self, arena: &mut Arena<B>, key: &str, depth: usize) -> Result<(), JsonError>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.skip_ws();
        match self.peek() {
            Some(b'"') => {
                let text = self.string()?;
                arena.insert_str(key, text)?;
            }
            Some(b'-' | b'0'..=b'9') => self.number(arena, key)?,
            Some(b'{') => self.child(arena, key, depth)?,
            Some(b'n') if self.text[self.pos..].starts_with(b"null") => {
                arena.insert_null(key)?;
                self.pos += 4;
            }
            _ => return Err(self.syntax("a value")),
        }
        Ok(())
    }

    fn number<B>(&mut self, arena: &mut Arena<B>, key: &str) -> Result<(), JsonError>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let rest = &self.text[self.pos..];
        let mut end = usize::from(rest.first() == Some(&b'-'));
        while rest.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if matches!(rest.get(end), Some(b'.' | b'e' | b'E')) {
            let parsed = string_to_float(rest).ok_or_else(|| self.syntax("a number"))?;
            arena.insert_float(key, parsed.value)?;
            self.pos += parsed.consumed;
        } else {
            let parsed =
                string_to_int(rest).ok_or_else(|| self.syntax("an integer within i32 range"))?;
            arena.insert_int(key, parsed.value)?;
            self.pos += parsed.consumed;
        }
        Ok(())
    }

    /// Parse a nested object into the rest of the parent's free space.
    fn child<B>(&mut self, arena: &mut Arena<B>, key: &str, depth: usize) -> Result<(), JsonError>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let table_size = count_members(&self.text[self.pos..]).max(1).next_power_of_two();
        let required = layout::required_size(table_size);
        let size = arena
            .remaining()
            .saturating_sub(key.len() + 1)
            .max(required);
        let slot = arena.insert_empty_object(key, size, table_size)?;

        let result = match arena.object_mut_at(slot) {
            Some(mut child) => self.object(&mut child, depth + 1),
            None => Err(JsonError::generic("reserved slot lost its object")),
        };
        match result {
            Ok(()) => {
                arena.trim_object(slot)?;
                Ok(())
            }
            Err(e) => {
                arena.release_reservation(slot)?;
                Err(e)
            }
        }
    }
}

/// Members of the object starting at `text[0] == '{'`: commas at the top
/// level plus one, or zero if no member begins. An upper bound for any
/// text the parser accepts, since members must be comma-separated.
fn count_members(text: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut commas = 0;
    let mut any = false;
    for &b in text {
        if in_string {
            in_string = b != b'"';
            continue;
        }
        match b {
            b'"' => {
                in_string = true;
                any |= depth == 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            b',' if depth == 1 => commas += 1,
            _ => {}
        }
    }
    if any {
        commas + 1
    } else {
        0
    }
}
