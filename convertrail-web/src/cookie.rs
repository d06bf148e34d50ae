//! Signed session cookies.
//!
//! The cookie value is `<session id>.<hex HMAC-SHA256(id)>`. A cookie whose
//! signature does not verify is treated exactly like a missing cookie.
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "convertrail_session";

const RANDOM_KEY_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CookieError {
    #[error("session signing key must not be empty")]
    EmptyKey,
    #[error("session signing key rejected: {0}")]
    InvalidKey(String),
}

/// Signs and verifies session ids.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

impl CookieSigner {
    /// # Errors
    ///
    /// Returns `CookieError` if the key is empty.
    pub fn new(key: &[u8]) -> Result<Self, CookieError> {
        if key.is_empty() {
            return Err(CookieError::EmptyKey);
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|err| CookieError::InvalidKey(err.to_string()))?;
        Ok(Self { mac })
    }

    /// Signer with a fresh random key. Cookies do not survive a restart.
    ///
    /// # Errors
    ///
    /// Returns `CookieError` if the generated key is rejected.
    pub fn random() -> Result<Self, CookieError> {
        let mut key = [0u8; RANDOM_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(&key)
    }

    fn signature(&self, session_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Cookie value for `session_id`.
    #[must_use]
    pub fn sign(&self, session_id: &str) -> String {
        format!("{session_id}.{}", self.signature(session_id))
    }

    /// Session id carried by a signed value, or `None` if the signature is
    /// missing or wrong. Comparison is constant-time.
    #[must_use]
    pub fn verify(&self, value: &str) -> Option<String> {
        let (session_id, signature) = value.rsplit_once('.')?;
        if session_id.is_empty() {
            return None;
        }
        let expected = hex::decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        mac.verify_slice(&expected).ok()?;
        Some(session_id.to_string())
    }

    /// `Set-Cookie` header value binding the browser to `session_id`.
    #[must_use]
    pub fn set_cookie(&self, session_id: &str) -> String {
        format!(
            "{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/",
            self.sign(session_id)
        )
    }

    /// Verified session id from the request's `Cookie` headers.
    #[must_use]
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        let raw = cookie_value(headers, SESSION_COOKIE)?;
        let verified = self.verify(raw);
        if verified.is_none() {
            log::warn!("ignoring session cookie with invalid signature");
        }
        verified
    }
}

/// First value of cookie `name` across all `Cookie` headers.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(key, value)| (key == name).then_some(value))
}
