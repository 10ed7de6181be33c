#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! selftest exercises the full encode and decode path on random phrases. It is meant to be run by
//! a user on their own machine before trusting the glyphs with a real seed phrase.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::dictionary::Dictionary;
use crate::drbg::HashDrbg;
use crate::keypolicy::{min_bits_for_context, min_chars_for_bits, KeyPolicy};
use crate::phrase::Codec;
use crate::random_seed;

/// SetOutcome records what happened to one random phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    /// words is the random phrase that was tested.
    pub words: Vec<String>,
    /// glyphs is the encoding of the phrase, empty if encoding failed.
    pub glyphs: Vec<String>,
    /// failure describes what went wrong, or is None if the phrase survived the round trip.
    pub failure: Option<String>,
}

impl SetOutcome {
    /// passed reports whether the phrase survived the round trip.
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// SelfTestReport collects the outcome of every phrase in a self-test run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfTestReport {
    /// keyed reports whether the run used a key.
    pub keyed: bool,
    /// sets holds one outcome per requested phrase, in request order.
    pub sets: Vec<SetOutcome>,
}

impl SelfTestReport {
    /// failed returns the number of phrases that did not survive the round trip.
    pub fn failed(&self) -> usize {
        self.sets.iter().filter(|s| !s.passed()).count()
    }

    /// passed reports whether every phrase survived.
    pub fn passed(&self) -> bool {
        self.failed() == 0
    }
}

/// run_self_test encodes and decodes one random phrase per entry of set_sizes under the
/// passphrase, which may be empty for no key. The words of a phrase are distinct. The key is
/// checked against the strength needed for the longest phrase.
pub fn run_self_test(
    dictionary: &Dictionary,
    passphrase: &str,
    policy: &KeyPolicy,
    set_sizes: &[usize],
) -> Result<SelfTestReport> {
    if set_sizes.is_empty() {
        bail!("no phrase sizes requested");
    }
    for &size in set_sizes {
        if size == 0 || size > dictionary.len() {
            bail!(
                "phrase size {} is out of range, must be between 1 and {}",
                size,
                dictionary.len()
            );
        }
    }

    let longest = set_sizes.iter().copied().max().unwrap_or(0);
    let codec = Codec::from_passphrase(dictionary, passphrase, longest, policy)
        .context("unable to set up the self-test key")?;

    let mut drbg = HashDrbg::new(&random_seed());
    let mut report = SelfTestReport {
        keyed: codec.is_keyed(),
        sets: Vec::with_capacity(set_sizes.len()),
    };
    for &size in set_sizes {
        let words = random_words(&codec, &mut drbg, size)?;
        report.sets.push(check_phrase(&codec, words));
    }

    if report.passed() {
        info!(sets = report.sets.len(), keyed = report.keyed, "self-test passed");
    } else {
        warn!(
            sets = report.sets.len(),
            failed = report.failed(),
            keyed = report.keyed,
            "self-test failed"
        );
    }
    Ok(report)
}

/// run_standard_self_test runs the four standard checks: a 12 word and a 24 word phrase, each
/// without a key and with a freshly generated key that just meets the strength requirement.
pub fn run_standard_self_test(
    dictionary: &Dictionary,
    policy: &KeyPolicy,
) -> Result<Vec<SelfTestReport>> {
    let mut reports = Vec::with_capacity(4);
    for size in [12, 24] {
        reports.push(run_self_test(dictionary, "", policy, &[size])?);
        let key = random_passphrase(dictionary, min_chars_for_bits(min_bits_for_context(size)));
        reports.push(run_self_test(dictionary, &key, policy, &[size])?);
    }
    Ok(reports)
}

/// random_passphrase joins random dictionary words with spaces until the result is at least
/// min_chars characters long.
pub fn random_passphrase(dictionary: &Dictionary, min_chars: usize) -> Zeroizing<String> {
    let mut drbg = HashDrbg::new(&random_seed());
    let mut key = Zeroizing::new(String::new());
    if dictionary.is_empty() {
        return key;
    }
    while key.chars().count() < min_chars {
        let index = drbg.uniform(dictionary.len() as u64) as usize;
        if !key.is_empty() {
            key.push(' ');
        }
        key.push_str(dictionary.word(index).unwrap_or_default());
    }
    key
}

// random_words picks size distinct words. Positions are drawn in the permuted order, which is as
// random as drawing dictionary indexes directly but also exercises the permutation lookup.
fn random_words(codec: &Codec, drbg: &mut HashDrbg, size: usize) -> Result<Vec<String>> {
    let n = codec.dictionary().len();
    let mut seen = HashSet::with_capacity(size);
    let mut words = Vec::with_capacity(size);
    while words.len() < size {
        let position = drbg.uniform(n as u64) as usize;
        if !seen.insert(position) {
            continue;
        }
        let word = codec
            .permutation()
            .index_at(position)
            .and_then(|index| codec.dictionary().word(index))
            .with_context(|| format!("position {} has no word", position))?;
        words.push(word.to_string());
    }
    Ok(words)
}

// check_phrase encodes and decodes one phrase and records the result.
fn check_phrase(codec: &Codec, words: Vec<String>) -> SetOutcome {
    let glyphs = match codec.encode(&words) {
        Ok(glyphs) => glyphs,
        Err(e) => {
            return SetOutcome {
                words,
                glyphs: Vec::new(),
                failure: Some(format!("encode failed: {}", e)),
            }
        }
    };
    let failure = match codec.decode(&glyphs) {
        Ok(decoded) if decoded == words => None,
        Ok(decoded) => Some(format!("decoded {:?}", decoded)),
        Err(e) => Some(format!("decode failed: {}", e)),
    };
    SetOutcome {
        words,
        glyphs,
        failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::CODE_LEN;
    use crate::Seed;

    fn cheap() -> KeyPolicy {
        KeyPolicy {
            kdf_mem_mb: 1,
            kdf_time: 1,
            ..KeyPolicy::default()
        }
    }

    #[test]
    // A self-test with and without a key passes and reports distinct words.
    fn check_self_test() {
        let english = Dictionary::bip39_english();
        let report = run_self_test(english, "", &cheap(), &[12, 24, 3]).unwrap();
        assert!(!report.keyed);
        assert!(report.passed());
        assert_eq!(report.sets.len(), 3);
        for (set, size) in report.sets.iter().zip([12usize, 24, 3]) {
            assert_eq!(set.words.len(), size);
            assert_eq!(set.glyphs.len(), size);
            let distinct: HashSet<&String> = set.words.iter().collect();
            assert_eq!(distinct.len(), size);
            for g in &set.glyphs {
                assert_eq!(g.chars().count(), CODE_LEN);
            }
        }

        let report = run_self_test(english, "twenty-four character key", &cheap(), &[24]).unwrap();
        assert!(report.keyed);
        assert!(report.passed());
    }

    #[test]
    // Bad sizes and weak keys are reported as errors rather than failed sets.
    fn check_unhappy_self_test() {
        let english = Dictionary::bip39_english();
        run_self_test(english, "", &cheap(), &[]).unwrap_err();
        run_self_test(english, "", &cheap(), &[0]).unwrap_err();
        run_self_test(english, "", &cheap(), &[2049]).unwrap_err();
        let err = run_self_test(english, "weak", &cheap(), &[12]).unwrap_err();
        if !format!("{:#}", err).contains("weak key") {
            panic!("expected a weak key error, got {:#}", err);
        }
    }

    #[test]
    // A broken phrase is recorded as a failure with its reason.
    fn check_failed_outcome() {
        let english = Dictionary::bip39_english();
        let codec = Codec::new(english, Some(&Seed::from_bytes([3u8; 32])));
        let outcome = check_phrase(&codec, vec!["zoo".to_string(), "notaword".to_string()]);
        assert!(!outcome.passed());
        assert!(outcome.glyphs.is_empty());
        assert!(outcome.failure.unwrap().contains("notaword"));

        let report = SelfTestReport {
            keyed: true,
            sets: vec![check_phrase(&codec, vec!["zoo".to_string()])],
        };
        assert!(report.passed());
        assert_eq!(report.failed(), 0);
    }

    #[test]
    // Generated passphrases are long enough and made of dictionary words.
    fn check_random_passphrase() {
        let english = Dictionary::bip39_english();
        for min in [1, 16, 20, 64] {
            let key = random_passphrase(english, min);
            assert!(key.chars().count() >= min);
            for word in key.split(' ') {
                assert!(english.index_of(word).is_some());
            }
        }
        assert_ne!(*random_passphrase(english, 64), *random_passphrase(english, 64));
    }

    #[test]
    // The standard run covers both phrase lengths with and without a key.
    fn check_standard_self_test() {
        let reports = run_standard_self_test(Dictionary::bip39_english(), &cheap()).unwrap();
        assert_eq!(reports.len(), 4);
        let keyed: Vec<bool> = reports.iter().map(|r| r.keyed).collect();
        assert_eq!(keyed, vec![false, true, false, true]);
        assert!(reports.iter().all(|r| r.passed()));
        assert_eq!(reports[2].sets[0].words.len(), 24);
    }
}
