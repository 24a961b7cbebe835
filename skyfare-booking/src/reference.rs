use rand::Rng;

/// PNR alphabet: uppercase alphanumerics with 0, O, 1 and I dropped to avoid
/// lookalike confusion when the code is read back over the phone.
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const REFERENCE_LENGTH: usize = 6;

/// Generate a candidate booking reference. Uniqueness is enforced by the
/// store's unique constraint, not here; the orchestrator regenerates on a
/// collision.
pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERENCE_LENGTH)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_use_the_restricted_alphabet() {
        for _ in 0..200 {
            let reference = generate_reference();
            assert_eq!(reference.len(), REFERENCE_LENGTH);
            for c in reference.bytes() {
                assert!(REFERENCE_ALPHABET.contains(&c), "unexpected char {}", c as char);
                assert!(!b"0O1I".contains(&c));
            }
        }
    }
}
