//! Byte layouts shared by the devnet registry and relayer.
//!
//! Clear values travel as 32-byte big-endian words, one per handle. Proofs are
//! SHA-256 digests keyed by the relayer's key commitment.

use ipvault_core::CiphertextHandle;
use sha2::{Digest, Sha256};

pub const WORD_LEN: usize = 32;

pub fn encode_words(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * WORD_LEN);
    for value in values {
        out.extend_from_slice(&[0u8; WORD_LEN - 8]);
        out.extend_from_slice(&value.to_be_bytes());
    }
    out
}

/// Decode words produced by [`encode_words`]. `None` on bad length or a value
/// that does not fit in 64 bits.
pub fn decode_words(bytes: &[u8]) -> Option<Vec<u64>> {
    if bytes.is_empty() || bytes.len() % WORD_LEN != 0 {
        return None;
    }
    bytes
        .chunks(WORD_LEN)
        .map(|word| {
            let (high, low) = word.split_at(WORD_LEN - 8);
            if high.iter().any(|byte| *byte != 0) {
                return None;
            }
            let mut buf = [0u8; 8];
            buf.copy_from_slice(low);
            Some(u64::from_be_bytes(buf))
        })
        .collect()
}

/// Proof that `ciphertext` was produced for `contract` on behalf of `user`.
pub fn input_proof(commitment: &[u8; 32], contract: &str, user: &str, ciphertext: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(b"ipvault/input");
    hasher.update(commitment);
    hasher.update(contract.to_ascii_lowercase().as_bytes());
    hasher.update(user.to_ascii_lowercase().as_bytes());
    hasher.update(ciphertext);
    hasher.finalize().to_vec()
}

/// Proof binding `abi_values` to the handles they were decrypted from.
pub fn decryption_proof(
    commitment: &[u8; 32],
    handles: &[CiphertextHandle],
    abi_values: &[u8],
) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(b"ipvault/decrypt");
    hasher.update(commitment);
    for handle in handles {
        hasher.update(handle.as_str().as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(abi_values);
    hasher.finalize().to_vec()
}

/// Handle under which the registry publishes a stored ciphertext.
pub fn ciphertext_handle(ciphertext: &[u8]) -> CiphertextHandle {
    let digest = Sha256::digest(ciphertext);
    CiphertextHandle(format!("0x{}", hex::encode(digest)))
}

pub fn tx_hash(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    format!("0x{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_right_aligned() {
        let encoded = encode_words(&[1, u64::MAX]);
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 1);
        assert!(encoded[..31].iter().all(|b| *b == 0));
        assert_eq!(decode_words(&encoded), Some(vec![1, u64::MAX]));
    }

    #[test]
    fn malformed_words_are_rejected() {
        assert_eq!(decode_words(&[]), None);
        assert_eq!(decode_words(&[0u8; 31]), None);
        let mut overflow = encode_words(&[5]);
        overflow[0] = 1;
        assert_eq!(decode_words(&overflow), None);
    }

    #[test]
    fn input_proof_ignores_address_case() {
        let commitment = [7u8; 32];
        assert_eq!(
            input_proof(&commitment, "0xABC", "0xDEF", b"ct"),
            input_proof(&commitment, "0xabc", "0xdef", b"ct")
        );
        assert_ne!(
            input_proof(&commitment, "0xabc", "0xdef", b"ct"),
            input_proof(&commitment, "0xabc", "0xdee", b"ct")
        );
    }
}
