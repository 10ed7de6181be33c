#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! dictionary holds the ordered word list that glyphs are mapped onto. The built-in list is the
//! BIP-39 English list; callers with their own list hand it to Dictionary::new, which only checks
//! the invariants the codec relies on. Reading word lists from disk is left to the caller.

use std::collections::HashMap;
use std::sync::OnceLock;

use bip39::Language;

use crate::error::{Error, Result};
use crate::glyphs::VOCAB_SIZE;

/// DEFAULT_ALIASES maps common misspellings or near-misses onto dictionary words.
pub const DEFAULT_ALIASES: &str = "academic:acoustic";

/// normalize_word trims and lowercases a word the same way every lookup does.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Dictionary is an ordered list of exactly VOCAB_SIZE unique, lowercase, non-empty words,
/// together with an index from word to position in the list.
#[derive(Debug, Clone)]
pub struct Dictionary {
    name: String,
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    /// new builds a dictionary from a word list. Every word is trimmed and lowercased; the list
    /// must then contain exactly VOCAB_SIZE words with no blanks and no duplicates.
    pub fn new<I, S>(name: &str, words: I) -> Result<Dictionary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| normalize_word(w.as_ref()))
            .collect();
        if words.len() != VOCAB_SIZE {
            return Err(Error::InvalidDictionary(format!(
                "expecting {} words but got {} words",
                VOCAB_SIZE,
                words.len()
            )));
        }

        let mut index = HashMap::with_capacity(words.len());
        for (i, w) in words.iter().enumerate() {
            if w.is_empty() {
                return Err(Error::InvalidDictionary(format!("word {} is empty", i + 1)));
            }
            if let Some(first) = index.insert(w.clone(), i) {
                return Err(Error::InvalidDictionary(format!(
                    "duplicate word {:?} at positions {} and {}",
                    w,
                    first + 1,
                    i + 1
                )));
            }
        }
        Ok(Dictionary {
            name: name.to_string(),
            words,
            index,
        })
    }

    /// bip39_english returns the BIP-39 English word list. It is built once per process.
    pub fn bip39_english() -> &'static Dictionary {
        static ENGLISH: OnceLock<Dictionary> = OnceLock::new();
        ENGLISH.get_or_init(|| {
            let words: Vec<String> = Language::English
                .word_list()
                .iter()
                .map(|w| w.to_string())
                .collect();
            let index = words
                .iter()
                .enumerate()
                .map(|(i, w)| (w.clone(), i))
                .collect();
            Dictionary {
                name: "bip39-en".to_string(),
                words,
                index,
            }
        })
    }

    /// name returns the name the dictionary was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// len returns the number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// is_empty reports whether the dictionary has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// words returns the ordered word list.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// word returns the word at an index.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// index_of returns the position of a word, ignoring case and surrounding whitespace.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(&normalize_word(word)).copied()
    }
}

/// WordAliases rewrites input words before they are looked up, so that a user who wrote down a
/// near-miss of a dictionary word still gets the intended glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAliases {
    map: HashMap<String, String>,
}

impl WordAliases {
    /// parse reads a comma separated list of from:to pairs, such as "academic:acoustic". Pairs
    /// that are missing a side are skipped.
    pub fn parse(pairs: &str) -> WordAliases {
        let mut map = HashMap::new();
        for pair in pairs.split(',') {
            let Some((from, to)) = pair.split_once(':') else {
                continue;
            };
            let from = normalize_word(from);
            let to = normalize_word(to);
            if from.is_empty() || to.is_empty() {
                continue;
            }
            map.insert(from, to);
        }
        WordAliases { map }
    }

    /// none returns an empty alias set.
    pub fn none() -> WordAliases {
        WordAliases {
            map: HashMap::new(),
        }
    }

    /// get returns the replacement for a word, if it has one.
    pub fn get(&self, word: &str) -> Option<&str> {
        self.map.get(&normalize_word(word)).map(String::as_str)
    }

    /// len returns the number of aliases.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// is_empty reports whether there are no aliases.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// apply replaces every aliased word and passes the others through untouched.
    pub fn apply<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        words
            .iter()
            .map(|w| match self.get(w.as_ref()) {
                Some(to) => to.to_string(),
                None => w.as_ref().to_string(),
            })
            .collect()
    }
}

impl Default for WordAliases {
    fn default() -> Self {
        WordAliases::parse(DEFAULT_ALIASES)
    }
}
