//! Path-instruction codec
//!
//! Paths serialize to a compact SVG-subset instruction string and parse back.
//! The grammar covers `M/m L/l H/h V/v C/c S/s Q/q T/t A/a Z/z`; lowercase
//! commands take coordinates relative to the current point. Serialization
//! canonicalizes everything to absolute `M L Q C Z`, so the round trip
//! reproduces the command stream exactly rather than the original text.

use crate::path::{Path, PathBuilder, PathCommand};
use thiserror::Error;
use vexel_core::Point;

/// Path-instruction parse failure
///
/// `offset` is the 1-based character position of the offending byte, except
/// for the missing-leading-move error which cites position 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("path instruction error at {offset}: {message}")]
pub struct PathParseError {
    pub offset: usize,
    pub message: &'static str,
}

impl PathParseError {
    fn at(offset: usize, message: &'static str) -> Self {
        Self { offset, message }
    }
}

impl Path {
    /// Parse a path-instruction string
    pub fn from_instructions(text: &str) -> Result<Path, PathParseError> {
        parse(text)
    }

    /// Serialize to the canonical path-instruction string
    pub fn to_instructions(&self) -> String {
        serialize(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

fn is_command(b: u8) -> bool {
    matches!(
        b,
        b'M' | b'm'
            | b'L'
            | b'l'
            | b'H'
            | b'h'
            | b'V'
            | b'v'
            | b'C'
            | b'c'
            | b'S'
            | b's'
            | b'Q'
            | b'q'
            | b'T'
            | b't'
            | b'A'
            | b'a'
            | b'Z'
            | b'z'
    )
}

fn is_number_start(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+')
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Skip whitespace plus at most one comma, as allowed between values
    fn skip_separators(&mut self) {
        self.skip_whitespace();
        if self.peek() == Some(b',') {
            self.pos += 1;
            self.skip_whitespace();
        }
    }

    /// Scan one literal number
    fn number(&mut self) -> Result<f32, PathParseError> {
        self.skip_separators();
        let start = self.pos;
        if self.at_end() {
            return Err(PathParseError::at(self.pos + 1, "unexpected end of path data"));
        }

        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut digits = 0;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            digits += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
                digits += 1;
            }
        }
        if digits == 0 {
            return Err(PathParseError::at(start + 1, "invalid number"));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            let mut exp_digits = 0;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
                exp_digits += 1;
            }
            if exp_digits == 0 {
                return Err(PathParseError::at(start + 1, "invalid number"));
            }
        }

        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("ascii slice");
        text.parse::<f32>()
            .map_err(|_| PathParseError::at(start + 1, "invalid number"))
    }

    fn pair(&mut self) -> Result<Point, PathParseError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point::new(x, y))
    }
}

fn parse(text: &str) -> Result<Path, PathParseError> {
    let mut scanner = Scanner::new(text);
    scanner.skip_whitespace();
    if scanner.at_end() {
        return Ok(Path::new());
    }
    if !matches!(scanner.peek(), Some(b'M' | b'm')) {
        return Err(PathParseError::at(0, "path must begin with a move command"));
    }

    let mut builder = PathBuilder::new();
    let mut cur = Point::ZERO;
    let mut subpath_start = Point::ZERO;
    // Reflection state for the S/T shorthands; cleared by any command of a
    // different curve family
    let mut prev_cubic_control: Option<Point> = None;
    let mut prev_quad_control: Option<Point> = None;
    let mut cmd: u8 = 0;

    loop {
        scanner.skip_whitespace();
        let Some(b) = scanner.peek() else { break };

        let letter = if is_command(b) {
            scanner.pos += 1;
            b
        } else if is_number_start(b) {
            // Implicit repetition of the previous command. A repeated move
            // becomes the matching line; close takes no parameters so a
            // number after it cannot start anything.
            match cmd {
                b'M' => b'L',
                b'm' => b'l',
                b'Z' | b'z' => {
                    return Err(PathParseError::at(
                        scanner.pos + 1,
                        "path command character expected",
                    ))
                }
                c => c,
            }
        } else {
            return Err(PathParseError::at(scanner.pos + 1, "unrecognized character"));
        };

        let relative = letter.is_ascii_lowercase();
        let resolve = |p: Point, cur: Point| {
            if relative {
                cur + p
            } else {
                p
            }
        };
        match letter.to_ascii_uppercase() {
            b'M' => {
                let p = resolve(scanner.pair()?, cur);
                builder.push_move(p);
                cur = p;
                subpath_start = p;
                prev_cubic_control = None;
                prev_quad_control = None;
            }
            b'L' => {
                let p = resolve(scanner.pair()?, cur);
                builder.push_line(p);
                cur = p;
                prev_cubic_control = None;
                prev_quad_control = None;
            }
            b'H' => {
                let x = scanner.number()?;
                let p = Point::new(if relative { cur.x + x } else { x }, cur.y);
                builder.push_line(p);
                cur = p;
                prev_cubic_control = None;
                prev_quad_control = None;
            }
            b'V' => {
                let y = scanner.number()?;
                let p = Point::new(cur.x, if relative { cur.y + y } else { y });
                builder.push_line(p);
                cur = p;
                prev_cubic_control = None;
                prev_quad_control = None;
            }
            b'C' => {
                let c1 = resolve(scanner.pair()?, cur);
                let c2 = resolve(scanner.pair()?, cur);
                let end = resolve(scanner.pair()?, cur);
                builder.push_cubic(c1, c2, end);
                cur = end;
                prev_cubic_control = Some(c2);
                prev_quad_control = None;
            }
            b'S' => {
                let c2 = resolve(scanner.pair()?, cur);
                let end = resolve(scanner.pair()?, cur);
                let c1 = match prev_cubic_control {
                    Some(prev) => Point::new(2.0 * cur.x - prev.x, 2.0 * cur.y - prev.y),
                    None => cur,
                };
                builder.push_cubic(c1, c2, end);
                cur = end;
                prev_cubic_control = Some(c2);
                prev_quad_control = None;
            }
            b'Q' => {
                let control = resolve(scanner.pair()?, cur);
                let end = resolve(scanner.pair()?, cur);
                builder.push_quad(control, end);
                cur = end;
                prev_quad_control = Some(control);
                prev_cubic_control = None;
            }
            b'T' => {
                let end = resolve(scanner.pair()?, cur);
                let control = match prev_quad_control {
                    Some(prev) => Point::new(2.0 * cur.x - prev.x, 2.0 * cur.y - prev.y),
                    None => cur,
                };
                builder.push_quad(control, end);
                cur = end;
                prev_quad_control = Some(control);
                prev_cubic_control = None;
            }
            b'A' => {
                let radii = Point::new(scanner.number()?, scanner.number()?);
                let rotation = scanner.number()?.to_radians();
                let large_arc = scanner.number()? != 0.0;
                let sweep = scanner.number()? != 0.0;
                let end = resolve(scanner.pair()?, cur);
                builder = builder.arc_to(radii, rotation, large_arc, sweep, end.x, end.y);
                cur = end;
                prev_cubic_control = None;
                prev_quad_control = None;
            }
            b'Z' => {
                builder.push_close();
                cur = subpath_start;
                prev_cubic_control = None;
                prev_quad_control = None;
            }
            _ => unreachable!("is_command admitted an unknown letter"),
        }

        cmd = letter;
    }

    Ok(builder.build())
}

// ─────────────────────────────────────────────────────────────────────────────
// Serialization
// ─────────────────────────────────────────────────────────────────────────────

fn serialize(path: &Path) -> String {
    let mut out = String::new();
    let mut last: Option<char> = None;

    for cmd in path.commands() {
        match *cmd {
            // A repeated move must keep its letter: without it the second
            // pair would re-parse as an implicit line
            PathCommand::MoveTo(p) => {
                out.push('M');
                write_numbers(&mut out, &[p.x, p.y], true);
                last = Some('M');
            }
            PathCommand::LineTo(p) => {
                write_command(&mut out, &mut last, 'L', &[p.x, p.y]);
            }
            PathCommand::QuadTo { control, end } => {
                write_command(
                    &mut out,
                    &mut last,
                    'Q',
                    &[control.x, control.y, end.x, end.y],
                );
            }
            PathCommand::CubicTo {
                control1,
                control2,
                end,
            } => {
                write_command(
                    &mut out,
                    &mut last,
                    'C',
                    &[
                        control1.x, control1.y, control2.x, control2.y, end.x, end.y,
                    ],
                );
            }
            PathCommand::Close => {
                out.push('Z');
                last = Some('Z');
            }
        }
    }

    out
}

fn write_command(out: &mut String, last: &mut Option<char>, letter: char, values: &[f32]) {
    let repeated = *last == Some(letter);
    if !repeated {
        out.push(letter);
    }
    write_numbers(out, values, !repeated);
    *last = Some(letter);
}

/// Append numbers with the minimal separators: a space before each value
/// unless it directly follows a command letter or carries its own minus sign
fn write_numbers(out: &mut String, values: &[f32], after_letter: bool) {
    for (i, v) in values.iter().enumerate() {
        let text = format!("{v}");
        if !(i == 0 && after_letter) && !text.starts_with('-') {
            out.push(' ');
        }
        out.push_str(&text);
    }
}
