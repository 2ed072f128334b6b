//! AES-256-GCM encryption for stored provider API keys.
//!
//! Keys are encrypted at rest and never returned to clients; list and detail
//! responses carry only a short hint derived from the stored ciphertext.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose};

/// Decodes a base64 encryption key and checks it is 256 bits.
pub fn decode_key(key_b64: &str) -> Result<[u8; 32], anyhow::Error> {
    let key_bytes = general_purpose::STANDARD
        .decode(key_b64)
        .map_err(|e| anyhow::anyhow!("Failed to decode encryption key: {}", e))?;

    key_bytes
        .try_into()
        .map_err(|v: Vec<u8>| anyhow::anyhow!("Encryption key must be 32 bytes (256 bits), got {} bytes", v.len()))
}

/// Encrypts data using AES-256-GCM with the given 256-bit key.
///
/// # Returns
///
/// The encrypted data as a base64-encoded string (nonce + ciphertext).
pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<String, anyhow::Error> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| anyhow::anyhow!("Failed to create cipher: {}", e))?;

    // Random 96-bit nonce
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| anyhow::anyhow!("Encryption failed: {}", e))?;

    // Combine nonce + ciphertext and encode as base64
    let mut result = nonce.to_vec();
    result.extend_from_slice(&ciphertext);

    Ok(general_purpose::STANDARD.encode(result))
}

/// Decrypts data that was encrypted with [`encrypt`].
///
/// # Errors
///
/// Returns an error if the input is not valid base64, is too short to hold a
/// nonce, or fails authentication (wrong key or tampered data).
pub fn decrypt(key: &[u8; 32], encrypted_b64: &str) -> Result<Vec<u8>, anyhow::Error> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| anyhow::anyhow!("Failed to create cipher: {}", e))?;

    let encrypted_data = general_purpose::STANDARD
        .decode(encrypted_b64)
        .map_err(|e| anyhow::anyhow!("Failed to decode encrypted data: {}", e))?;

    if encrypted_data.len() < 12 {
        return Err(anyhow::anyhow!("Encrypted data too short"));
    }

    let (nonce_bytes, ciphertext) = encrypted_data.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| anyhow::anyhow!("Decryption failed: {}", e))?;

    Ok(plaintext)
}

/// Derives the display hint shown in place of a stored API key.
///
/// Takes the first eight characters of the stored (encrypted) form, so the
/// hint is stable per credential without revealing plaintext.
pub fn api_key_hint(stored: &str) -> String {
    let prefix: String = stored.chars().take(8).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        [0u8; 32]
    }

    #[test]
    fn test_decode_key_roundtrip() {
        let encoded = general_purpose::STANDARD.encode([7u8; 32]);
        let decoded = decode_key(&encoded).unwrap();
        assert_eq!(decoded, [7u8; 32]);
    }

    #[test]
    fn test_decode_key_wrong_length() {
        let encoded = general_purpose::STANDARD.encode([0u8; 16]);
        let result = decode_key(&encoded);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("32 bytes"));
    }

    #[test]
    fn test_decode_key_invalid_base64() {
        assert!(decode_key("not base64!!!").is_err());
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"sk-live-abcdef1234567890";

        let encrypted = encrypt(&key, plaintext).expect("Encryption should succeed");

        // Should be valid base64
        assert!(general_purpose::STANDARD.decode(&encrypted).is_ok());

        let decrypted = decrypt(&key, &encrypted).expect("Decryption should succeed");
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_with_wrong_key() {
        let encrypted = encrypt(&test_key(), b"secret").unwrap();

        let wrong_key = [1u8; 32];
        assert!(decrypt(&wrong_key, &encrypted).is_err());
    }

    #[test]
    fn test_decrypt_too_short() {
        let short = general_purpose::STANDARD.encode([0u8; 5]);
        assert!(decrypt(&test_key(), &short).is_err());
    }

    #[test]
    fn test_encryption_produces_different_ciphertexts() {
        let key = test_key();
        let plaintext = b"same plaintext";

        let encrypted1 = encrypt(&key, plaintext).expect("Encryption should succeed");
        let encrypted2 = encrypt(&key, plaintext).expect("Encryption should succeed");

        // Different nonces, different ciphertexts
        assert_ne!(encrypted1, encrypted2);

        assert_eq!(decrypt(&key, &encrypted1).unwrap(), plaintext);
        assert_eq!(decrypt(&key, &encrypted2).unwrap(), plaintext);
    }

    #[test]
    fn test_api_key_hint() {
        assert_eq!(api_key_hint("AbCdEfGhIjKl"), "AbCdEfGh...");
        assert_eq!(api_key_hint("short"), "short...");
    }
}
