// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! At-rest encryption for OAuth tokens.
//!
//! AES-256-GCM with a key derived from `SECRET_KEY` through HKDF-SHA256.
//! Every ciphertext is bound to its owner with the additional authenticated
//! data `user_id:<id>`, so a token copied onto another user's row fails to
//! decrypt. Stored form is base64(nonce || ciphertext || tag).

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hkdf::Hkdf;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::sync::Arc;

const KEY_INFO: &[u8] = b"yahoo-token-encryption-v1";

/// Symmetric cipher for Yahoo tokens.
#[derive(Clone)]
pub struct TokenCipher {
    key: Arc<LessSafeKey>,
    rng: SystemRandom,
}

impl TokenCipher {
    /// Derive the encryption key from the application secret.
    pub fn new(secret: &[u8]) -> Result<Self, AppError> {
        let hk = Hkdf::<Sha256>::new(None, secret);
        let mut okm = [0u8; 32];
        hk.expand(KEY_INFO, &mut okm)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HKDF expand failed: {}", e)))?;

        let unbound = UnboundKey::new(&AES_256_GCM, &okm)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid AES-256-GCM key")))?;

        Ok(Self {
            key: Arc::new(LessSafeKey::new(unbound)),
            rng: SystemRandom::new(),
        })
    }

    pub fn encrypt(&self, plaintext: &str, user_id: i64) -> Result<String, AppError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Nonce generation failed")))?;

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(aad(user_id)),
                &mut in_out,
            )
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Token encryption failed")))?;

        let mut out = Vec::with_capacity(NONCE_LEN + in_out.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&in_out);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str, user_id: i64) -> Result<String, AppError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Base64 decode failed: {}", e)))?;

        if bytes.len() < NONCE_LEN {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Ciphertext shorter than nonce"
            )));
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid nonce")))?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(aad(user_id)), &mut in_out)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Token decryption failed")))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("UTF-8 decode failed: {}", e)))
    }

    /// Encrypt an access/refresh token pair for storage.
    pub fn encrypt_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
        user_id: i64,
    ) -> Result<(String, String), AppError> {
        Ok((
            self.encrypt(access_token, user_id)?,
            self.encrypt(refresh_token, user_id)?,
        ))
    }
}

fn aad(user_id: i64) -> Vec<u8> {
    format!("user_id:{}", user_id).into_bytes()
}
