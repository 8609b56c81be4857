//! Cipher and digest primitives shared by the request encoder and the
//! callback decoder.
//!
//! The gateway fixes every parameter: AES-256-CBC, PKCS#7 padding, a static
//! IV and base64 on the wire.

use aes::Aes256;
use base64::{engine::general_purpose, Engine};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::GatewayError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const KEY_LENGTH: usize = 32;

/// Static IV mandated by the gateway protocol.
///
/// Reusing one IV for every message is a deviation from normal AES-CBC
/// practice. The gateway decrypts with this exact IV, so it must not be
/// replaced with a random one.
pub const GATEWAY_IV: &[u8; 16] = b"0123456789abcdef";

/// AES-256-CBC cipher bound to a merchant's decoded key.
#[derive(Clone)]
pub struct GatewayCipher {
    key: [u8; KEY_LENGTH],
}

impl GatewayCipher {
    /// Decodes the base64 key issued by the gateway. Keys that decode to
    /// anything but 32 bytes are rejected rather than truncated or padded.
    pub fn from_base64_key(encoded: &str) -> Result<Self, GatewayError> {
        let decoded = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| GatewayError::KeyFormat("key is not valid base64".to_string()))?;

        let key: [u8; KEY_LENGTH] = decoded.as_slice().try_into().map_err(|_| {
            GatewayError::KeyFormat(format!(
                "expected {} bytes after base64 decode, got {}",
                KEY_LENGTH,
                decoded.len()
            ))
        })?;

        Ok(Self { key })
    }

    pub fn encrypt_to_base64(&self, plaintext: &str) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &(*GATEWAY_IV).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        general_purpose::STANDARD.encode(ciphertext)
    }

    pub fn decrypt_from_base64(&self, encoded: &str) -> Result<String, GatewayError> {
        let ciphertext = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| GatewayError::Decryption("ciphertext is not valid base64".to_string()))?;

        let plaintext = Aes256CbcDec::new(&self.key.into(), &(*GATEWAY_IV).into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| {
                GatewayError::Decryption("cipher rejected ciphertext (length or padding)".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|_| GatewayError::Decryption("plaintext is not valid UTF-8".to_string()))
    }
}

impl fmt::Debug for GatewayCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Lowercase hex SHA-256, used by the outbound request hash.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Base64 of the raw SHA-256 digest, used by the inbound callback hash.
pub fn sha256_base64(input: &str) -> String {
    general_purpose::STANDARD.encode(Sha256::digest(input.as_bytes()))
}

/// Compares two byte strings without short-circuiting on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> String {
        general_purpose::STANDARD.encode([7u8; KEY_LENGTH])
    }

    #[test]
    fn accepts_32_byte_key() {
        assert!(GatewayCipher::from_base64_key(&test_key()).is_ok());
    }

    #[test]
    fn rejects_short_keys() {
        for len in [16usize, 24] {
            let key = general_purpose::STANDARD.encode(vec![1u8; len]);
            let err = GatewayCipher::from_base64_key(&key).unwrap_err();
            assert!(matches!(err, GatewayError::KeyFormat(_)), "len {len}");
        }
    }

    #[test]
    fn rejects_non_base64_key() {
        let err = GatewayCipher::from_base64_key("not base64 !!").unwrap_err();
        assert!(matches!(err, GatewayError::KeyFormat(_)));
    }

    #[test]
    fn encryption_is_deterministic_and_reversible() {
        let cipher = GatewayCipher::from_base64_key(&test_key()).unwrap();
        let first = cipher.encrypt_to_base64("yagout|M1|RIDE_1000");
        let second = cipher.encrypt_to_base64("yagout|M1|RIDE_1000");

        assert_eq!(first, second);
        assert_eq!(
            cipher.decrypt_from_base64(&first).unwrap(),
            "yagout|M1|RIDE_1000"
        );
    }

    #[test]
    fn ciphertext_is_block_aligned() {
        let cipher = GatewayCipher::from_base64_key(&test_key()).unwrap();
        for plaintext in ["", "a", "0123456789abcdef", "0123456789abcdef0"] {
            let raw = general_purpose::STANDARD
                .decode(cipher.encrypt_to_base64(plaintext))
                .unwrap();
            assert_eq!(raw.len() % 16, 0);
            assert!(raw.len() > plaintext.len());
        }
    }

    #[test]
    fn decrypt_rejects_truncated_ciphertext() {
        let cipher = GatewayCipher::from_base64_key(&test_key()).unwrap();
        let raw = general_purpose::STANDARD
            .decode(cipher.encrypt_to_base64("some message"))
            .unwrap();
        let truncated = general_purpose::STANDARD.encode(&raw[..raw.len() - 3]);

        let err = cipher.decrypt_from_base64(&truncated).unwrap_err();
        assert!(matches!(err, GatewayError::Decryption(_)));
    }

    #[test]
    fn decrypt_with_wrong_key_fails_or_differs() {
        let cipher = GatewayCipher::from_base64_key(&test_key()).unwrap();
        let other = GatewayCipher::from_base64_key(
            &general_purpose::STANDARD.encode([9u8; KEY_LENGTH]),
        )
        .unwrap();
        let encrypted = cipher.encrypt_to_base64("status|order");

        match other.decrypt_from_base64(&encrypted) {
            Ok(plaintext) => assert_ne!(plaintext, "status|order"),
            Err(err) => assert!(matches!(err, GatewayError::Decryption(_))),
        }
    }

    #[test]
    fn sha256_hex_is_lowercase() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_base64_encodes_raw_digest() {
        assert_eq!(
            sha256_base64("abc"),
            "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0="
        );
    }

    #[test]
    fn constant_time_eq_matches_exact_equality() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let cipher = GatewayCipher::from_base64_key(&test_key()).unwrap();
        let rendered = format!("{cipher:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("7, 7"));
    }
}
