#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! error defines the error type shared by every operation in the crate. None of the messages
//! carry key material; the only user input that is ever echoed is the offending word or glyph.

/// Error covers every way that encoding, decoding, or key derivation can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input word is not part of the active dictionary.
    #[error("word {0:?} is not in the active dictionary")]
    WordNotFound(String),

    /// A glyph sequence contains a character that is neither a glyph nor an accepted alias.
    #[error("invalid glyph {symbol:?} at position {position}")]
    InvalidSymbol {
        /// symbol is the unrecognised character.
        symbol: char,
        /// position is the zero-based index of the character within the sequence.
        position: usize,
    },

    /// A digit sequence contains a value outside the glyph base.
    #[error("digit {digit} at position {position} is out of range")]
    InvalidDigit {
        /// digit is the out-of-range value.
        digit: u8,
        /// position is the zero-based index of the digit.
        position: usize,
    },

    /// A glyph sequence does not have the fixed number of glyphs.
    #[error("glyph sequence must be exactly {expected} symbols, got {got}")]
    InvalidLength {
        /// expected is the fixed code length.
        expected: usize,
        /// got is the number of symbols that were supplied.
        got: usize,
    },

    /// The glyphs are valid individually but their combination lies outside the vocabulary.
    #[error("glyph code {0} does not map to any word")]
    InvalidCode(u32),

    /// The passphrase does not meet the minimum strength for this context.
    #[error("weak key: {0}")]
    WeakKey(String),

    /// The key policy names an unknown KDF or carries an unusable cost parameter.
    #[error("invalid kdf configuration: {0}")]
    KdfConfig(String),

    /// A verified encode failed to reproduce its own input. This indicates a bug, not bad input.
    #[error("round-trip mismatch: {0}")]
    RoundTripMismatch(String),

    /// A word list could not be turned into a dictionary.
    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    /// No words were supplied to an operation that needs at least one.
    #[error("no words provided")]
    EmptyInput,
}

/// Result is the result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
