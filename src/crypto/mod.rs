//! Cryptographic operations for journal encryption and security.
//!
//! This module provides encryption, passphrase handling, and secure temporary file
//! handling for the jrnl journaling system. Journal files are sealed with
//! AES-256-GCM under a 32-byte passphrase.
//!
//! # Module Structure
//!
//! - `cipher`: Whole-file authenticated encryption/decryption and the on-disk format
//! - `passphrase`: The zeroizing, redacting passphrase type
//! - `temp`: Scratch copies with guaranteed removal and tmpfs preference
//!
//! # Example
//!
//! ```no_run
//! use jrnl::crypto::{decrypt, encrypt, KeyDerivation, Passphrase};
//!
//! let passphrase = Passphrase::new(vec![42u8; 32]);
//!
//! let plaintext = b"Secret journal entry";
//! let encrypted = encrypt(plaintext, &passphrase, KeyDerivation::None)?;
//! let decrypted = decrypt(&encrypted, &passphrase)?;
//! assert_eq!(plaintext, decrypted.as_slice());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cipher;
pub mod passphrase;
pub mod temp;

// Re-export commonly used types
pub use self::cipher::{decrypt, encrypt, KeyDerivation};
pub use self::passphrase::Passphrase;
pub use self::temp::{get_secure_temp_dir, ScratchCopy};
