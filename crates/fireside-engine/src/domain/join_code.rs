//! Join-code generation.

use fireside_dice::RandomSource;

/// Code alphabet, excluding the easily confused 0/O/1/I/l.
const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Length of a join code.
pub const JOIN_CODE_LEN: usize = 6;

/// Generates a fresh join code from the engine RNG.
pub fn generate(rng: &dyn RandomSource) -> String {
    (0..JOIN_CODE_LEN)
        .map(|_| {
            let idx = (rng.roll(ALPHABET.len() as u32) - 1) as usize;
            ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireside_dice::{SeededSource, ThreadRngSource};

    #[test]
    fn test_codes_are_six_chars_from_alphabet() {
        let rng = ThreadRngSource;
        for _ in 0..100 {
            let code = generate(&rng);
            assert_eq!(code.len(), JOIN_CODE_LEN);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_confusable_characters_never_appear() {
        let rng = SeededSource::new(11);
        for _ in 0..200 {
            let code = generate(&rng);
            for banned in ['0', 'O', '1', 'I', 'l'] {
                assert!(!code.contains(banned));
            }
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        assert_eq!(
            generate(&SeededSource::new(3)),
            generate(&SeededSource::new(3))
        );
    }
}
