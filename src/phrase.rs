#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! phrase implements functions for moving between a seed phrase and its glyph encoding.
//!
//! Encoding a word looks up its dictionary index, finds the position of that index in the keyed
//! permutation, and renders the position as glyphs. Decoding runs the same steps backwards. A
//! Codec derives its permutation once, so every word of a phrase is handled under the same key
//! without paying for the derivation more than once.

use tracing::debug;

use crate::dictionary::{normalize_word, Dictionary};
use crate::error::{Error, Result};
use crate::glyphs;
use crate::keypolicy::{seed_for_phrase, KeyPolicy};
use crate::permutation::Permutation;
use crate::Seed;

/// Codec pairs a dictionary with the permutation for one key.
#[derive(Debug, Clone)]
pub struct Codec<'a> {
    dictionary: &'a Dictionary,
    permutation: Permutation,
    keyed: bool,
}

/// TableRow is one line of the full mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow<'a> {
    /// index is the position of the word in the dictionary.
    pub index: usize,
    /// word is the dictionary word.
    pub word: &'a str,
    /// glyphs is the encoding of the word under the codec's key.
    pub glyphs: String,
}

impl<'a> Codec<'a> {
    /// new creates a codec for a seed. Without a seed the dictionary order is used as is.
    pub fn new(dictionary: &'a Dictionary, seed: Option<&Seed>) -> Codec<'a> {
        Codec {
            dictionary,
            permutation: Permutation::derive(dictionary.len(), seed),
            keyed: seed.is_some(),
        }
    }

    /// from_passphrase resolves a passphrase through the key policy and creates the codec. The
    /// strength requirement follows from word_count, the length of the phrase being protected. An
    /// empty passphrase selects the unkeyed codec.
    pub fn from_passphrase(
        dictionary: &'a Dictionary,
        passphrase: &str,
        word_count: usize,
        policy: &KeyPolicy,
    ) -> Result<Codec<'a>> {
        let seed = seed_for_phrase(passphrase, word_count, policy)?;
        Ok(Codec::new(dictionary, seed.as_ref()))
    }

    /// is_keyed reports whether the codec was created with a key.
    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// dictionary returns the dictionary the codec maps onto.
    pub fn dictionary(&self) -> &'a Dictionary {
        self.dictionary
    }

    /// permutation returns the permutation the codec was derived with.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// encode_word converts a single word into its glyphs.
    pub fn encode_word(&self, word: &str) -> Result<String> {
        let index = self
            .dictionary
            .index_of(word)
            .ok_or_else(|| Error::WordNotFound(word.trim().to_string()))?;
        let position = self
            .permutation
            .position_of(index)
            .ok_or_else(|| {
                Error::RoundTripMismatch(format!(
                    "dictionary index {} has no place in a permutation of {}",
                    index,
                    self.permutation.len()
                ))
            })?;
        glyphs::render(position as u32)
    }

    /// encode converts every word of a phrase into glyphs, keeping the input order. Blank entries
    /// are skipped.
    pub fn encode<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(words.len());
        for word in words {
            let word = word.as_ref();
            if word.trim().is_empty() {
                continue;
            }
            out.push(self.encode_word(word)?);
        }
        Ok(out)
    }

    /// decode_token converts one glyph sequence back into its word. Surrounding whitespace is
    /// ignored; separators between glyphs must already be stripped.
    pub fn decode_token(&self, token: &str) -> Result<&'a str> {
        let code = glyphs::parse(token.trim())?;
        let dictionary: &'a Dictionary = self.dictionary;
        self.permutation
            .index_at(code as usize)
            .and_then(|index| dictionary.word(index))
            .ok_or(Error::InvalidCode(code))
    }

    /// decode converts every glyph sequence back into its word, keeping the input order.
    pub fn decode<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        tokens
            .iter()
            .map(|token| self.decode_token(token.as_ref()).map(str::to_string))
            .collect()
    }

    /// encode_verified encodes the words and immediately decodes the result, failing unless the
    /// decoded phrase matches the normalised input word for word. No glyphs are returned from a
    /// failed check.
    pub fn encode_verified<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        let normalized: Vec<String> = words
            .iter()
            .map(|w| normalize_word(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        if normalized.is_empty() {
            return Err(Error::EmptyInput);
        }

        let encoded = self.encode(&normalized)?;
        let decoded = self
            .decode(&encoded)
            .map_err(|e| Error::RoundTripMismatch(format!("decode failed: {}", e)))?;
        if decoded.len() != normalized.len() {
            return Err(Error::RoundTripMismatch(format!(
                "decoded {} words but encoded {}",
                decoded.len(),
                normalized.len()
            )));
        }
        for (i, (have, want)) in decoded.iter().zip(&normalized).enumerate() {
            if have != want {
                return Err(Error::RoundTripMismatch(format!(
                    "word {} decoded as {:?}, expected {:?}",
                    i + 1,
                    have,
                    want
                )));
            }
        }

        debug!(words = normalized.len(), keyed = self.keyed, "verified glyph encoding");
        Ok(encoded)
    }

    /// table returns the glyphs of every dictionary word, in dictionary order.
    pub fn table(&self) -> Result<Vec<TableRow<'a>>> {
        let dictionary: &'a Dictionary = self.dictionary;
        dictionary
            .words()
            .iter()
            .enumerate()
            .map(|(index, word)| -> Result<TableRow<'a>> {
                Ok(TableRow {
                    index,
                    word: word.as_str(),
                    glyphs: self.encode_word(word)?,
                })
            })
            .collect()
    }
}

/// encode_verified converts a seed phrase into glyphs under a passphrase, verifying the round
/// trip before returning. The passphrase has to be strong enough for the length of the phrase
/// unless the policy allows weak keys; an empty passphrase means no key.
pub fn encode_verified<S: AsRef<str>>(
    words: &[S],
    dictionary: &Dictionary,
    passphrase: &str,
    policy: &KeyPolicy,
) -> Result<Vec<String>> {
    let word_count = words.iter().filter(|w| !w.as_ref().trim().is_empty()).count();
    if word_count == 0 {
        return Err(Error::EmptyInput);
    }
    let codec = Codec::from_passphrase(dictionary, passphrase, word_count, policy)?;
    codec.encode_verified(words)
}

/// verify_round_trip returns an error unless the phrase survives encoding and decoding under the
/// passphrase. It is encode_verified with the glyphs thrown away.
pub fn verify_round_trip<S: AsRef<str>>(
    words: &[S],
    dictionary: &Dictionary,
    passphrase: &str,
    policy: &KeyPolicy,
) -> Result<()> {
    encode_verified(words, dictionary, passphrase, policy).map(|_| ())
}

/// decode_phrase converts glyph sequences back into a seed phrase under a passphrase. The key
/// strength requirement follows from the number of sequences.
pub fn decode_phrase<S: AsRef<str>>(
    tokens: &[S],
    dictionary: &Dictionary,
    passphrase: &str,
    policy: &KeyPolicy,
) -> Result<Vec<String>> {
    if tokens.is_empty() {
        return Err(Error::EmptyInput);
    }
    let codec = Codec::from_passphrase(dictionary, passphrase, tokens.len(), policy)?;
    codec.decode(tokens)
}
