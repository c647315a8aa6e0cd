//! Password encryption for backup files.
//!
//! Layout: base64(salt[16] || iv[12] || ciphertext+tag). The key is
//! PBKDF2-HMAC-SHA256 over the password with 100 000 rounds, used as an
//! AES-256-GCM key.

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use base64::Engine;
use rand::RngCore;
use sha2::Sha256;

pub const SALT_LEN: usize = 16;
pub const IV_LEN: usize = 12;
pub const PBKDF2_ROUNDS: u32 = 100_000;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Encrypted content too short ({0} bytes)")]
    Truncated(usize),
    #[error("Decryption failed")]
    Decryption,
    #[error("Encryption failed")]
    Encryption,
    #[error("Decrypted content is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

pub fn encrypt(plaintext: &str, password: &str) -> Result<String, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new(GenericArray::from_slice(&key));
    let ciphertext = cipher
        .encrypt(GenericArray::from_slice(&iv), plaintext.as_bytes())
        .map_err(|_| CryptoError::Encryption)?;

    let mut combined = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);

    Ok(base64::engine::general_purpose::STANDARD.encode(combined))
}

pub fn decrypt(encoded: &str, password: &str) -> Result<String, CryptoError> {
    let combined = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
    if combined.len() < SALT_LEN + IV_LEN {
        return Err(CryptoError::Truncated(combined.len()));
    }

    let (salt, rest) = combined.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);

    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new(GenericArray::from_slice(&key));
    let plaintext = cipher
        .decrypt(GenericArray::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::Decryption)?;

    Ok(String::from_utf8(plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Produced by a WebCrypto-compatible implementation with a fixed salt and iv
    const KNOWN_CIPHERTEXT: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxYLZkG62j8DphCjDA2tV75bxYnJe9zBfav5bQEC/O+qkSqdjlNNDC8=";

    #[test]
    fn test_decrypts_known_backup() {
        let plaintext = decrypt(KNOWN_CIPHERTEXT, "hunter2").unwrap();
        assert_eq!(plaintext, r#"{"version":1,"memos":[]}"#);
    }

    #[test]
    fn test_wrong_password_fails() {
        assert!(matches!(
            decrypt(KNOWN_CIPHERTEXT, "hunter3"),
            Err(CryptoError::Decryption)
        ));
    }

    #[test]
    fn test_encrypt_then_decrypt_uses_fresh_salt() {
        let first = encrypt("secret memo", "pw").unwrap();
        let second = encrypt("secret memo", "pw").unwrap();

        assert_ne!(first, second);
        assert_eq!(decrypt(&first, "pw").unwrap(), "secret memo");
    }

    #[test]
    fn test_truncated_and_malformed_input() {
        assert!(matches!(decrypt("AAEC", "pw"), Err(CryptoError::Truncated(3))));
        assert!(matches!(decrypt("not base64!", "pw"), Err(CryptoError::Base64(_))));
    }
}
