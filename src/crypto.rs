// src/crypto.rs

//! Symmetric encryption of short secrets, such as passwords kept in config
//! files, as Fernet tokens.

use std::fmt;

use fernet::Fernet;

use crate::errors::{Result, UtilError};

/// Base64 of a token's version byte (0x80) followed by the high, always-zero
/// bytes of its timestamp.
const TOKEN_PREFIX: &str = "gAAAAA";

/// Encrypts and decrypts strings with one Fernet key.
pub struct Cipher {
    key: String,
    fernet: Fernet,
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

impl Cipher {
    /// A fresh url-safe base64 key.
    pub fn generate_key() -> String {
        Fernet::generate_key()
    }

    /// Cipher over a newly generated key; read it back with [`Cipher::key`].
    pub fn generate() -> Result<Self> {
        Self::new(&Self::generate_key())
    }

    pub fn new(key: &str) -> Result<Self> {
        let fernet = Fernet::new(key.trim()).ok_or(UtilError::InvalidKey)?;
        Ok(Self {
            key: key.trim().to_string(),
            fernet,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn encode(&self, plain: &str) -> String {
        self.fernet.encrypt(plain.as_bytes())
    }

    pub fn decode(&self, token: &str) -> Result<String> {
        let token = token.trim();
        let bytes = self.fernet.decrypt(token).map_err(|_| {
            let reason = if token.starts_with(TOKEN_PREFIX) {
                "Encrypted with another private key"
            } else {
                "Not encrypted"
            };
            UtilError::InvalidToken(reason.to_string())
        })?;
        String::from_utf8(bytes)
            .map_err(|_| UtilError::InvalidToken("Decrypted value is not UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "sMZo38VwRdigN78FBnHj8mETNlofL4Qhj_x5cvyxJsc=";
    const OTHER_KEY: &str = "wN3dIm9VeT_dtDi1rQoJVehdmUtG_lIFyGRGv9p4cAs=";
    const TEST_TOKEN: &str = "gAAAAABls-0f8Krl0SGvMrcJWv3fpa8cUfkcqb-yivz6KZS4jb0-N6K2AGkwq8GkVa5Btfpht9hiVVLcF8v0Vwj0_U2o799QbQ==";

    #[test]
    fn generated_keys_are_usable() {
        let cipher = Cipher::generate().unwrap();
        assert!(Cipher::new(cipher.key()).is_ok());
        assert_ne!(Cipher::generate_key(), Cipher::generate_key());
    }

    #[test]
    fn encode_then_decode() {
        let cipher = Cipher::new(KEY).unwrap();
        let token = cipher.encode("s3cr3t password");
        assert!(token.starts_with(TOKEN_PREFIX));
        assert_ne!(token, cipher.encode("s3cr3t password"));
        assert_eq!(cipher.decode(&token).unwrap(), "s3cr3t password");
    }

    #[test]
    fn decodes_existing_token() {
        let cipher = Cipher::new(KEY).unwrap();
        assert_eq!(cipher.decode(TEST_TOKEN).unwrap(), "test");
    }

    #[test]
    fn malformed_key_is_rejected() {
        let err = Cipher::new("not a private key").unwrap_err();
        assert!(matches!(err, UtilError::InvalidKey));
        assert_eq!(
            err.to_string(),
            "Fernet key must be 32 url-safe base64-encoded bytes."
        );
    }

    #[test]
    fn plain_text_is_not_encrypted() {
        let cipher = Cipher::new(KEY).unwrap();
        let err = cipher.decode("not encrypted password").unwrap_err();
        assert!(matches!(err, UtilError::InvalidToken(ref r) if r == "Not encrypted"));
    }

    #[test]
    fn wrong_key_is_reported() {
        let cipher = Cipher::new(OTHER_KEY).unwrap();
        let err = cipher.decode(TEST_TOKEN).unwrap_err();
        assert!(
            matches!(err, UtilError::InvalidToken(ref r) if r == "Encrypted with another private key")
        );
    }

    #[test]
    fn debug_hides_the_key() {
        let cipher = Cipher::new(KEY).unwrap();
        assert!(!format!("{cipher:?}").contains(KEY));
    }
}
