//! Access session tokens
//!
//! A verified code grants a short-lived, narrowly scoped session: permission
//! to mutate one endorsement, proven for one email address. The grant is a
//! self-contained signed token (no server-side session row), shaped as
//! `base64url(json-claims) "." base64url(hmac-sha256(claims-component))`.
//!
//! Verification proves only that this server minted the token and that it has
//! not expired. Whether the email is still authoritative for the record is
//! re-checked against the live record at use time, which is what revokes
//! outstanding tokens when an endorsement's email changes.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::crypto::constant_time_compare;
use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Claims embedded in an access session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// The endorsement this session may mutate.
    pub endorsement_id: String,
    /// Normalized email the code was verified for.
    pub email: String,
    /// Absolute expiry as a Unix timestamp in milliseconds. No refresh: a new
    /// code flow is required after this passes.
    pub expires_at_ms: i64,
}

/// Mints and verifies access session tokens with a server-side secret.
#[derive(Clone)]
pub struct AccessTokenCodec {
    secret: Vec<u8>,
}

impl std::fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenCodec").finish_non_exhaustive()
    }
}

impl AccessTokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Encode and sign the claims.
    pub fn mint(&self, claims: &AccessTokenClaims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims)
            .map_err(|e| TokenError::InvalidClaims(e.to_string()))?;
        let payload_b64 = BASE64_URL_SAFE_NO_PAD.encode(payload);
        let signature = self.sign(payload_b64.as_bytes());

        Ok(format!(
            "{payload_b64}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify signature, shape, and expiry; return the claims only when every
    /// check passes.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if payload_b64.is_empty() || signature_b64.is_empty() {
            return Err(TokenError::Malformed);
        }

        let provided = BASE64_URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let expected = self.sign(payload_b64.as_bytes());

        // The comparator checks length before the timing-safe byte pass
        if !constant_time_compare(&provided, &expected) {
            return Err(TokenError::SignatureMismatch);
        }

        let payload = BASE64_URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let claims: AccessTokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.endorsement_id.is_empty() {
            return Err(TokenError::InvalidClaims(
                "endorsement_id must be non-empty".to_string(),
            ));
        }
        if claims.email.is_empty() {
            return Err(TokenError::InvalidClaims(
                "email must be non-empty".to_string(),
            ));
        }
        if claims.expires_at_ms <= Utc::now().timestamp_millis() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}
