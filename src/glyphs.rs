#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! glyphs implements the conversion between a code and its fixed-length glyph representation.
//!
//! Every code in [0, VOCAB_SIZE) is written as CODE_LEN base-BASE digits, most significant digit
//! first, and every digit is drawn as one glyph:
//!
//! ```text
//! 0: △   1: □   2: ○   3: ×   4: •   5: ◇   6: ☆
//! ```
//!
//! Since 7^4 = 2401 and the vocabulary only has 2048 entries, 353 glyph sequences are well formed
//! but do not name a word. Those are rejected with Error::InvalidCode rather than wrapped.

use crate::error::{Error, Result};

/// BASE is the number of distinct glyphs, and therefore the numeric base of a code.
pub const BASE: u32 = 7;

/// CODE_LEN is the fixed number of glyphs used for every word.
pub const CODE_LEN: usize = 4;

/// VOCAB_SIZE is the number of words in a dictionary. BASE^CODE_LEN must be at least this large.
pub const VOCAB_SIZE: usize = 2048;

/// GLYPHS is the ordered glyph alphabet; GLYPHS[d] draws digit d.
pub const GLYPHS: [char; BASE as usize] = ['△', '□', '○', '×', '•', '◇', '☆'];

/// Digits is the digit representation of a single code.
pub type Digits = [u8; CODE_LEN];

/// digit_of returns the digit drawn by a glyph. Besides the canonical glyphs, 'x' and 'X' are
/// accepted for '×' since most keyboards cannot type the latter.
pub fn digit_of(symbol: char) -> Option<u8> {
    match symbol {
        '△' => Some(0),
        '□' => Some(1),
        '○' => Some(2),
        '×' | 'x' | 'X' => Some(3),
        '•' => Some(4),
        '◇' => Some(5),
        '☆' => Some(6),
        _ => None,
    }
}

/// to_digits converts a code into CODE_LEN base-BASE digits, most significant first.
pub fn to_digits(code: u32) -> Result<Digits> {
    if code as usize >= VOCAB_SIZE {
        return Err(Error::InvalidCode(code));
    }
    let mut digits: Digits = [0u8; CODE_LEN];
    let mut rest = code;
    for i in (0..CODE_LEN).rev() {
        digits[i] = (rest % BASE) as u8;
        rest /= BASE;
    }
    Ok(digits)
}

/// from_digits converts digits back into a code. The digit count, every digit, and the final
/// code are all range checked.
pub fn from_digits(digits: &[u8]) -> Result<u32> {
    if digits.len() != CODE_LEN {
        return Err(Error::InvalidLength {
            expected: CODE_LEN,
            got: digits.len(),
        });
    }
    let mut code: u32 = 0;
    for (position, &digit) in digits.iter().enumerate() {
        if u32::from(digit) >= BASE {
            return Err(Error::InvalidDigit { digit, position });
        }
        code = code * BASE + u32::from(digit);
    }
    if code as usize >= VOCAB_SIZE {
        return Err(Error::InvalidCode(code));
    }
    Ok(code)
}

/// render draws a code as a glyph string.
pub fn render(code: u32) -> Result<String> {
    let digits = to_digits(code)?;
    Ok(digits.iter().map(|&d| GLYPHS[d as usize]).collect())
}

/// parse reads a glyph string back into a code. The length is checked in symbols, not bytes,
/// before any symbol is looked up.
pub fn parse(token: &str) -> Result<u32> {
    let got = token.chars().count();
    if got != CODE_LEN {
        return Err(Error::InvalidLength {
            expected: CODE_LEN,
            got,
        });
    }
    let mut digits: Digits = [0u8; CODE_LEN];
    for (position, symbol) in token.chars().enumerate() {
        digits[position] = digit_of(symbol).ok_or(Error::InvalidSymbol { symbol, position })?;
    }
    from_digits(&digits)
}

/// insert_separator places sep between every glyph of a token. Some fonts draw the glyphs
/// tightly enough that a separator helps when copying them by hand.
pub fn insert_separator(token: &str, sep: &str) -> String {
    if sep.is_empty() {
        return token.to_string();
    }
    let mut out = String::with_capacity(token.len() + sep.len() * CODE_LEN);
    for (i, symbol) in token.chars().enumerate() {
        if i != 0 {
            out += sep;
        }
        out.push(symbol);
    }
    out
}

/// strip_separator removes every occurrence of sep and all whitespace from a token, undoing
/// insert_separator and tolerating hand-typed spacing.
pub fn strip_separator(token: &str, sep: &str) -> String {
    let stripped = if sep.is_empty() {
        token.to_string()
    } else {
        token.replace(sep, "")
    };
    stripped.chars().filter(|c| !c.is_whitespace()).collect()
}

/// looks_like_glyphs reports whether every token is made entirely of CODE_LEN recognised glyphs
/// once separators are stripped. It does not check that the codes are in range, so a caller can
/// use it to pick between encoding and decoding and still get a precise error from decode.
pub fn looks_like_glyphs<S: AsRef<str>>(tokens: &[S], sep: &str) -> bool {
    if tokens.is_empty() {
        return false;
    }
    tokens.iter().all(|token| {
        let stripped = strip_separator(token.as_ref(), sep);
        stripped.chars().count() == CODE_LEN && stripped.chars().all(|c| digit_of(c).is_some())
    })
}
