#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(unused_mut)]

//! keypolicy turns a user passphrase into the canonical seed and refuses passphrases that are too
//! weak for the phrase they protect.
//!
//! Two KDFs are supported. Argon2id (the default) runs the passphrase through a memory-hard hash
//! with a fixed domain-separation salt and then hashes the output with SHA-256. Because each guess
//! is expensive, the strength rule is a minimum length in characters. The plain KDF is a single
//! SHA-256, so the passphrase itself has to carry the entropy: only a 12 or 24 word BIP-39
//! phrase, a long enough hex string, or a long enough base64 string is accepted.

use std::str::FromStr;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::{Seed, SEED_SIZE};

/// DOMAIN_SALT is the Argon2id salt. It separates this protocol version from every other use of
/// the same passphrase; it is not secret and does not vary per user.
pub const DOMAIN_SALT: &[u8] = b"seedglyph/v1/argon2id/domain-sep";

/// DEFAULT_KDF_MEM_MB is the default Argon2id memory cost in megabytes.
pub const DEFAULT_KDF_MEM_MB: u32 = 512;

/// DEFAULT_KDF_TIME is the default Argon2id iteration count.
pub const DEFAULT_KDF_TIME: u32 = 3;

/// DEFAULT_KDF_PARALLEL is the default Argon2id lane count.
pub const DEFAULT_KDF_PARALLEL: u32 = 1;

/// KdfMode selects how a passphrase becomes a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KdfMode {
    /// Argon2id followed by SHA-256.
    #[default]
    #[serde(rename = "argon2id")]
    Argon2id,
    /// A single SHA-256 of the passphrase.
    #[serde(rename = "none")]
    Plain,
}

impl KdfMode {
    /// name returns the configuration name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            KdfMode::Argon2id => "argon2id",
            KdfMode::Plain => "none",
        }
    }
}

impl FromStr for KdfMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<KdfMode> {
        match s.trim().to_lowercase().as_str() {
            "" | "argon2id" => Ok(KdfMode::Argon2id),
            "none" => Ok(KdfMode::Plain),
            other => Err(Error::KdfConfig(format!(
                "unknown KDF {:?} (supported: argon2id, none)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for KdfMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// KeyPolicy holds the KDF selection, its cost parameters, and the weak key override. Missing
/// fields take their defaults when deserialised, so a policy can be embedded in a larger config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPolicy {
    /// kdf selects the key derivation function.
    pub kdf: KdfMode,
    /// kdf_mem_mb is the Argon2id memory cost in megabytes.
    pub kdf_mem_mb: u32,
    /// kdf_time is the Argon2id iteration count.
    pub kdf_time: u32,
    /// kdf_parallel is the Argon2id degree of parallelism.
    pub kdf_parallel: u32,
    /// allow_weak disables every strength check. Meant for testing and advisory use only.
    pub allow_weak: bool,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        KeyPolicy {
            kdf: KdfMode::Argon2id,
            kdf_mem_mb: DEFAULT_KDF_MEM_MB,
            kdf_time: DEFAULT_KDF_TIME,
            kdf_parallel: DEFAULT_KDF_PARALLEL,
            allow_weak: false,
        }
    }
}

impl KeyPolicy {
    /// validate checks the cost parameters. They are only consulted by Argon2id, but a zero cost
    /// is a configuration bug regardless of the mode in use.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_mem_mb == 0 {
            return Err(Error::KdfConfig("kdf_mem_mb must be at least 1".to_string()));
        }
        if self.kdf_time == 0 {
            return Err(Error::KdfConfig("kdf_time must be at least 1".to_string()));
        }
        if self.kdf_parallel == 0 {
            return Err(Error::KdfConfig("kdf_parallel must be at least 1".to_string()));
        }
        self.mem_kib()?;
        Ok(())
    }

    fn mem_kib(&self) -> Result<u32> {
        self.kdf_mem_mb.checked_mul(1024).ok_or_else(|| {
            Error::KdfConfig(format!("kdf_mem_mb {} is too large", self.kdf_mem_mb))
        })
    }
}

/// min_bits_for_context returns the key strength required for a phrase of the given length: 256
/// bits for 24 words or more, 128 bits otherwise.
pub fn min_bits_for_context(word_count: usize) -> u32 {
    if word_count >= 24 {
        256
    } else {
        128
    }
}

/// min_chars_for_bits returns the minimum passphrase length, in characters, accepted by the
/// Argon2id mode for a strength requirement.
pub fn min_chars_for_bits(min_bits: u32) -> usize {
    if min_bits >= 256 {
        20
    } else {
        16
    }
}

/// validate_key_strength returns an error if the passphrase is too weak for min_bits under the
/// policy. Leading and trailing whitespace does not count towards the strength.
pub fn validate_key_strength(passphrase: &str, min_bits: u32, policy: &KeyPolicy) -> Result<()> {
    if policy.allow_weak {
        warn!(kdf = %policy.kdf, min_bits, "key strength enforcement bypassed by policy");
        return Ok(());
    }

    let key = passphrase.trim();
    if key.is_empty() {
        return Err(Error::WeakKey(
            "key is empty; provide a strong key or allow weak keys".to_string(),
        ));
    }

    match policy.kdf {
        KdfMode::Argon2id => {
            // Count characters rather than bytes, so multi-byte input gets no extra credit.
            let min_chars = min_chars_for_bits(min_bits);
            if key.chars().count() < min_chars {
                return Err(Error::WeakKey(format!(
                    "key too short: need {}+ characters for a {}-bit context with argon2id",
                    min_chars, min_bits
                )));
            }
            Ok(())
        }
        KdfMode::Plain => {
            if satisfies_entropy_formats(key, min_bits) {
                return Ok(());
            }
            Err(Error::WeakKey(format!(
                "key does not meet the {}-bit minimum without a KDF: use a 12/24 word BIP-39 \
                 phrase, {}+ hex characters, or base64 of {}+ bytes",
                min_bits,
                min_bits / 4,
                min_bits / 8
            )))
        }
    }
}

// satisfies_entropy_formats reports whether the key is in a format whose entropy can be read off
// directly, and whether that entropy reaches min_bits.
fn satisfies_entropy_formats(key: &str, min_bits: u32) -> bool {
    if let Some(bits) = bip39_phrase_bits(key) {
        return bits >= min_bits;
    }
    is_strong_hex(key, min_bits) || is_strong_base64(key, min_bits)
}

// bip39_phrase_bits returns 128 or 256 for a 12 or 24 word phrase made only of BIP-39 English
// words. The checksum is not checked; only the entropy tier matters here.
fn bip39_phrase_bits(key: &str) -> Option<u32> {
    let lowered = key.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let bits = match words.len() {
        12 => 128,
        24 => 256,
        _ => return None,
    };
    let english = Dictionary::bip39_english();
    if words.iter().all(|w| english.index_of(w).is_some()) {
        Some(bits)
    } else {
        None
    }
}

fn is_strong_hex(key: &str, min_bits: u32) -> bool {
    if key.is_empty() || key.len() % 2 != 0 {
        return false;
    }
    if hex::decode(key).is_err() {
        return false;
    }
    key.len() * 4 >= min_bits as usize
}

fn is_strong_base64(key: &str, min_bits: u32) -> bool {
    let decoded = STANDARD
        .decode(key)
        .or_else(|_| URL_SAFE_NO_PAD.decode(key))
        .or_else(|_| STANDARD_NO_PAD.decode(key));
    match decoded {
        Ok(data) => {
            let data = Zeroizing::new(data);
            data.len() * 8 >= min_bits as usize
        }
        Err(_) => false,
    }
}

// effective_key_material derives the canonical seed from a passphrase without any strength check.
// Everything outside this module goes through derive_seed.
pub(crate) fn effective_key_material(passphrase: &str, policy: &KeyPolicy) -> Result<Seed> {
    policy.validate()?;
    let mut seed = [0u8; SEED_SIZE];
    match policy.kdf {
        KdfMode::Argon2id => {
            debug!(
                mem_mb = policy.kdf_mem_mb,
                time = policy.kdf_time,
                parallel = policy.kdf_parallel,
                "deriving seed with argon2id"
            );
            let params = Params::new(
                policy.mem_kib()?,
                policy.kdf_time,
                policy.kdf_parallel,
                Some(SEED_SIZE),
            )
            .map_err(|e| Error::KdfConfig(e.to_string()))?;
            let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            let mut derived = Zeroizing::new([0u8; SEED_SIZE]);
            argon
                .hash_password_into(passphrase.as_bytes(), DOMAIN_SALT, &mut derived[..])
                .map_err(|e| Error::KdfConfig(e.to_string()))?;
            // Hash once more to canonicalise.
            seed.copy_from_slice(&Sha256::digest(&derived[..]));
        }
        KdfMode::Plain => {
            debug!("deriving seed with sha256");
            seed.copy_from_slice(&Sha256::digest(passphrase.as_bytes()));
        }
    }
    let out = Seed::from_bytes(seed);
    zeroize::Zeroize::zeroize(&mut seed);
    Ok(out)
}

/// derive_seed checks the passphrase against min_bits (unless the policy allows weak keys) and
/// then derives the seed. This is the entry point for turning a passphrase into a seed.
pub fn derive_seed(passphrase: &str, min_bits: u32, policy: &KeyPolicy) -> Result<Seed> {
    validate_key_strength(passphrase, min_bits, policy)?;
    effective_key_material(passphrase, policy)
}

/// seed_for_phrase resolves the key for a phrase of word_count words. An empty or whitespace-only
/// passphrase means no key, and yields None without running the KDF.
pub fn seed_for_phrase(
    passphrase: &str,
    word_count: usize,
    policy: &KeyPolicy,
) -> Result<Option<Seed>> {
    if passphrase.trim().is_empty() {
        return Ok(None);
    }
    derive_seed(passphrase, min_bits_for_context(word_count), policy).map(Some)
}
