use proptest::prelude::*;

use seedglyph::glyphs::{self, CODE_LEN, VOCAB_SIZE};
use seedglyph::{derive_seed, Codec, Dictionary, Error, KdfMode, KeyPolicy, Permutation, Seed};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn keyed_word_roundtrip(seed in any::<[u8; 32]>(), index in 0..VOCAB_SIZE) {
        let english = Dictionary::bip39_english();
        let codec = Codec::new(english, Some(&Seed::from_bytes(seed)));
        let word = english.word(index).unwrap();
        let token = codec.encode_word(word).unwrap();
        prop_assert_eq!(token.chars().count(), CODE_LEN);
        prop_assert_eq!(codec.decode_token(&token).unwrap(), word);
    }

    #[test]
    fn permutation_is_bijection(seed in any::<[u8; 32]>(), n in 0usize..600) {
        let p = Permutation::derive(n, Some(&Seed::from_bytes(seed)));
        let mut sorted = p.as_slice().to_vec();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..n).collect::<Vec<_>>());
        for pos in 0..n {
            prop_assert_eq!(p.position_of(p.index_at(pos).unwrap()), Some(pos));
        }
    }

    #[test]
    fn plain_passphrase_roundtrip(passphrase in "[a-z ]{1,40}", index in 0..VOCAB_SIZE) {
        let english = Dictionary::bip39_english();
        let policy = KeyPolicy {
            kdf: KdfMode::Plain,
            allow_weak: true,
            ..KeyPolicy::default()
        };
        let seed = derive_seed(&passphrase, 128, &policy).unwrap();
        let codec = Codec::new(english, Some(&seed));
        let word = english.word(index).unwrap();
        let tokens = codec.encode_verified(&[word]).unwrap();
        prop_assert_eq!(codec.decode(&tokens).unwrap(), vec![word.to_string()]);
    }

    #[test]
    fn parse_never_panics(token in "\\PC{0,8}") {
        match glyphs::parse(&token) {
            Ok(code) => prop_assert!((code as usize) < VOCAB_SIZE),
            Err(Error::InvalidLength { got, .. }) => prop_assert_ne!(got, CODE_LEN),
            Err(Error::InvalidSymbol { position, .. }) => prop_assert!(position < CODE_LEN),
            Err(Error::InvalidCode(code)) => prop_assert!((code as usize) >= VOCAB_SIZE),
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }

    #[test]
    fn glyph_only_tokens(digits in prop::collection::vec(0u8..7, CODE_LEN)) {
        let token: String = digits.iter().map(|&d| glyphs::GLYPHS[d as usize]).collect();
        match glyphs::from_digits(&digits) {
            Ok(code) => prop_assert_eq!(glyphs::parse(&token).unwrap(), code),
            Err(e) => prop_assert_eq!(glyphs::parse(&token).unwrap_err(), e),
        }
    }
}
