//! Pixel dimensions and `WIDTHxHEIGHT` argument parsing

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Error parsing a dimension argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("invalid {what} '{value}', expected {expected}")]
    Malformed {
        what: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{what} should be greater than zero, got '{value}'")]
    NotPositive { what: &'static str, value: String },
}

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d+)x(\d+)\s*$").expect("static regex"))
}

fn width_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d+)\s*$").expect("static regex"))
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of `tile`-sized cells needed to cover this size, rounding up.
    pub fn tiles_in(&self, tile: Size) -> Size {
        Size::new(self.width.div_ceil(tile.width), self.height.div_ceil(tile.height))
    }

    /// Whether both dimensions are exact multiples of `tile`.
    pub fn is_multiple_of(&self, tile: Size) -> bool {
        self.width % tile.width == 0 && self.height % tile.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn parse_number(what: &'static str, digits: &str, raw: &str) -> Result<u32, DimensionError> {
    let n: u32 = digits.parse().map_err(|_| DimensionError::Malformed {
        what,
        value: raw.to_string(),
        expected: "a number that fits in 32 bits",
    })?;
    if n == 0 {
        return Err(DimensionError::NotPositive { what, value: raw.to_string() });
    }
    Ok(n)
}

/// Parse a `WIDTHxHEIGHT` argument (e.g. `"16x16"`). Both values must be > 0.
pub fn parse_size(what: &'static str, s: &str) -> Result<Size, DimensionError> {
    let caps = size_pattern().captures(s).ok_or_else(|| DimensionError::Malformed {
        what,
        value: s.to_string(),
        expected: "<number>x<number>",
    })?;
    let width = parse_number(what, &caps[1], s)?;
    let height = parse_number(what, &caps[2], s)?;
    Ok(Size::new(width, height))
}

/// Requested sheet geometry: a pixel width and an optional expected height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSize {
    pub width: u32,
    pub height: Option<u32>,
}

impl SheetSize {
    /// Parse either `WIDTH` or `WIDTHxHEIGHT`.
    pub fn parse(s: &str) -> Result<Self, DimensionError> {
        if let Some(caps) = width_pattern().captures(s) {
            let width = parse_number("sheet width", &caps[1], s)?;
            return Ok(Self { width, height: None });
        }
        match parse_size("sheet dimensions", s) {
            Ok(size) => Ok(Self { width: size.width, height: Some(size.height) }),
            Err(DimensionError::Malformed { value, .. }) => Err(DimensionError::Malformed {
                what: "sheet dimensions",
                value,
                expected: "<number> or <number>x<number>",
            }),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for SheetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.height {
            Some(h) => write!(f, "{}x{}", self.width, h),
            None => write!(f, "{}", self.width),
        }
    }
}
