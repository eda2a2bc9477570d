//! Encryption for RPC endpoint URLs at rest.
//!
//! Endpoint URLs commonly embed provider API keys in their path, so they
//! are stored as AES-256-GCM ciphertext. The key is derived from the
//! `ENDPOINT_ENCRYPTION_KEY` environment secret.

use aes_gcm::{
	aead::{Aead, OsRng},
	AeadCore, Aes256Gcm, KeyInit, Nonce,
};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Environment variable holding the encryption secret.
pub const ENDPOINT_KEY_ENV: &str = "ENDPOINT_ENCRYPTION_KEY";

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
	#[error("encryption secret not set ({0})")]
	MissingKey(&'static str),

	#[error("ciphertext is not valid hex: {0}")]
	Encoding(#[from] hex::FromHexError),

	#[error("ciphertext too short to contain a nonce")]
	Truncated,

	#[error("cipher operation failed")]
	Aead,
}

/// AES-256-GCM cipher for endpoint URLs.
///
/// Ciphertext wire format: hex(nonce || ciphertext), with a fresh random
/// nonce per encryption.
#[derive(Clone)]
pub struct UrlCipher {
	cipher: Aes256Gcm,
}

impl UrlCipher {
	/// Derives the cipher key from `ENDPOINT_ENCRYPTION_KEY`.
	pub fn from_env() -> Result<Self, CipherError> {
		let secret = std::env::var(ENDPOINT_KEY_ENV)
			.map_err(|_| CipherError::MissingKey(ENDPOINT_KEY_ENV))?;
		Ok(Self::from_secret(&secret))
	}

	/// Derives a 256-bit key from an arbitrary secret string.
	pub fn from_secret(secret: &str) -> Self {
		let digest = Sha256::digest(secret.as_bytes());
		Self {
			cipher: Aes256Gcm::new(&digest),
		}
	}

	pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
		let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
		let ciphertext = self
			.cipher
			.encrypt(&nonce, plaintext.as_bytes())
			.map_err(|_| CipherError::Aead)?;

		let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
		payload.extend_from_slice(nonce.as_slice());
		payload.extend_from_slice(&ciphertext);
		Ok(hex::encode(payload))
	}

	pub fn decrypt(&self, encoded: &str) -> Result<String, CipherError> {
		let payload = hex::decode(encoded)?;
		if payload.len() <= NONCE_LEN {
			return Err(CipherError::Truncated);
		}

		let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
		let plaintext = self
			.cipher
			.decrypt(Nonce::from_slice(nonce), ciphertext)
			.map_err(|_| CipherError::Aead)?;

		String::from_utf8(plaintext).map_err(|_| CipherError::Aead)
	}
}

impl std::fmt::Debug for UrlCipher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("UrlCipher").finish_non_exhaustive()
	}
}
