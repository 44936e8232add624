//! Signed session-token codec
//!
//! Token format: `base64url(JSON(payload)) "." base64url(HMAC-SHA256(secret, encoded))`.
//! Verification never panics and never errors; anything malformed is
//! indistinguishable from "no token".

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use agrisense_common::constant_time_eq;

use crate::claims::SessionPayload;

type HmacSha256 = Hmac<Sha256>;

/// Current claim-shape version; tokens carrying any other version are
/// rejected by `verify`.
pub const TOKEN_VERSION: u8 = 1;

/// Number of random bytes backing an auto-generated nonce
const NONCE_LEN: usize = 6;

/// Encodes and verifies session payloads against a process-wide secret.
///
/// When a max-age is configured it is enforced inside `verify`, so Bearer
/// callers (which never see cookie expiry) get the same freshness bound.
#[derive(Clone)]
pub struct SessionCodec {
    secret: String,
    max_age_millis: Option<u64>,
}

impl SessionCodec {
    pub fn new(secret: impl Into<String>, max_age_seconds: Option<u64>) -> Self {
        Self {
            secret: secret.into(),
            max_age_millis: max_age_seconds.map(|s| s.saturating_mul(1000)),
        }
    }

    /// Sign a payload into a compact URL-safe token.
    ///
    /// Fills in a random nonce when the caller did not supply one, so two
    /// tokens minted with otherwise-identical claims are never byte-equal.
    pub fn sign(&self, payload: &SessionPayload) -> Result<String, serde_json::Error> {
        let mut payload = payload.clone();
        if payload.nonce.is_none() {
            payload.nonce = Some(random_nonce());
        }

        let body = serde_json::to_string(&payload)?;
        let encoded = URL_SAFE_NO_PAD.encode(body);
        let signature = self.signature(&encoded);
        Ok(format!("{encoded}.{signature}"))
    }

    /// Verify a token, returning its payload only when the signature,
    /// structure, required claims, version, and (if configured) age all
    /// check out.
    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        let (encoded, signature) = token.rsplit_once('.')?;
        if encoded.is_empty() || signature.is_empty() {
            return None;
        }

        let expected = self.signature(encoded);
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            tracing::debug!("session token signature mismatch");
            return None;
        }

        let body = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let payload: SessionPayload = serde_json::from_slice(&body).ok()?;

        if payload.sub.is_empty() {
            return None;
        }
        if payload.version != TOKEN_VERSION {
            tracing::debug!(version = payload.version, "unsupported session token version");
            return None;
        }

        if let Some(max_age) = self.max_age_millis {
            let now = chrono::Utc::now().timestamp_millis() as u64;
            if now.saturating_sub(payload.iat) > max_age {
                tracing::debug!(sub = %payload.sub, "session token past max age");
                return None;
            }
        }

        Some(payload)
    }

    fn signature(&self, encoded: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(encoded.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

fn random_nonce() -> String {
    let mut bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
