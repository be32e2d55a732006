//! AES-256-GCM encryption of whole journal files.
//!
//! Every blob starts with a one-byte format version so the key handling can
//! change without silently misreading older files:
//!
//! ```text
//! 0x01 | nonce (12) | ciphertext + tag (16)            passphrase is the key
//! 0x02 | salt (16) | nonce (12) | ciphertext + tag (16)  key = Argon2id(passphrase, salt)
//! ```
//!
//! The nonce is drawn from the OS random source on every call. No associated
//! data is authenticated.

use crate::constants::{
    FORMAT_VERSION_ARGON2ID, FORMAT_VERSION_RAW_KEY, KEY_LEN, NONCE_LEN, SALT_LEN, TAG_LEN,
};
use crate::crypto::Passphrase;
use crate::errors::{AppResult, CryptoError};
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

/// How the AES key is obtained from the passphrase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyDerivation {
    /// The 32-byte passphrase is the key.
    #[default]
    None,
    /// The key is stretched from the passphrase with Argon2id and a random salt.
    Argon2id,
}

impl KeyDerivation {
    fn version(self) -> u8 {
        match self {
            KeyDerivation::None => FORMAT_VERSION_RAW_KEY,
            KeyDerivation::Argon2id => FORMAT_VERSION_ARGON2ID,
        }
    }
}

/// Smallest blob `decrypt` will look at: version byte plus nonce.
const MIN_BLOB_LEN: usize = 1 + NONCE_LEN;

/// Encrypt `plaintext` under `passphrase`.
///
/// Returns `version ‖ [salt ‖] nonce ‖ ciphertext ‖ tag` ready to be written as
/// the new journal file contents.
///
/// # Errors
///
/// - `CryptoError::InvalidKeySize` if the passphrase is not exactly 32 bytes
/// - `CryptoError::EntropyFailure` if the OS random source fails
/// - `CryptoError::KeyDerivation` if Argon2id rejects its inputs
///
/// # Example
///
/// ```
/// use jrnl::crypto::{decrypt, encrypt, KeyDerivation, Passphrase};
///
/// let passphrase = Passphrase::new(vec![7u8; 32]);
/// let blob = encrypt(b"dear diary", &passphrase, KeyDerivation::None)?;
/// let plaintext = decrypt(&blob, &passphrase)?;
/// assert_eq!(plaintext.as_slice(), b"dear diary");
/// # Ok::<(), jrnl::AppError>(())
/// ```
pub fn encrypt(plaintext: &[u8], passphrase: &Passphrase, kdf: KeyDerivation) -> AppResult<Vec<u8>> {
    check_key_len(passphrase)?;

    let mut output = Vec::with_capacity(1 + SALT_LEN + NONCE_LEN + plaintext.len() + TAG_LEN);
    output.push(kdf.version());

    let key = match kdf {
        KeyDerivation::None => raw_key(passphrase),
        KeyDerivation::Argon2id => {
            let mut salt = [0u8; SALT_LEN];
            fill_random(&mut salt)?;
            output.extend_from_slice(&salt);
            derive_key(passphrase, &salt)?
        }
    };

    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::InvalidKeySize {
        expected: KEY_LEN,
        actual: key.len(),
    })?;

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    debug!(
        version = kdf.version(),
        plaintext_len = plaintext.len(),
        blob_len = output.len(),
        "Encrypted journal payload"
    );
    Ok(output)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// The key derivation is chosen from the blob's version byte, independent of
/// the current configuration. Nothing is returned unless the tag verifies.
///
/// # Errors
///
/// - `CryptoError::InvalidKeySize` if the passphrase is not exactly 32 bytes
/// - `CryptoError::TruncatedCiphertext` if the blob cannot hold its header and nonce
/// - `CryptoError::AuthenticationFailure` for a wrong passphrase, any modified
///   byte, or an unrecognized version byte
pub fn decrypt(blob: &[u8], passphrase: &Passphrase) -> AppResult<Zeroizing<Vec<u8>>> {
    check_key_len(passphrase)?;

    if blob.len() < MIN_BLOB_LEN {
        return Err(CryptoError::TruncatedCiphertext {
            minimum: MIN_BLOB_LEN,
            actual: blob.len(),
        }
        .into());
    }

    let (version, rest) = (blob[0], &blob[1..]);
    let (key, body) = match version {
        FORMAT_VERSION_RAW_KEY => (raw_key(passphrase), rest),
        FORMAT_VERSION_ARGON2ID => {
            let minimum = 1 + SALT_LEN + NONCE_LEN;
            if blob.len() < minimum {
                return Err(CryptoError::TruncatedCiphertext {
                    minimum,
                    actual: blob.len(),
                }
                .into());
            }
            let (salt, body) = rest.split_at(SALT_LEN);
            (derive_key(passphrase, salt)?, body)
        }
        other => {
            debug!(version = other, "Unrecognized journal format byte");
            return Err(CryptoError::AuthenticationFailure.into());
        }
    };

    let (nonce, ciphertext) = body.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::InvalidKeySize {
        expected: KEY_LEN,
        actual: key.len(),
    })?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)?;

    Ok(Zeroizing::new(plaintext))
}

fn check_key_len(passphrase: &Passphrase) -> AppResult<()> {
    if !passphrase.has_key_len() {
        return Err(CryptoError::InvalidKeySize {
            expected: KEY_LEN,
            actual: passphrase.len(),
        }
        .into());
    }
    Ok(())
}

fn raw_key(passphrase: &Passphrase) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(passphrase.expose());
    key
}

fn derive_key(passphrase: &Passphrase, salt: &[u8]) -> AppResult<Zeroizing<[u8; KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    Argon2::default()
        .hash_password_into(passphrase.expose(), salt, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

fn fill_random(buf: &mut [u8]) -> AppResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::EntropyFailure(e.to_string()).into())
}
