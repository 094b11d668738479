use crate::error::{LoginError, Result};
use crate::helpers::community_url;
use crate::http::HttpClient;
use crate::time::get_system_time_millis;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};
use rsa::rand_core::OsRng;
use serde::Deserialize;

/// Most requests made for a key before giving up.
pub const MAX_KEY_FETCH_ATTEMPTS: u32 = 5;

/// A single-use public key for encrypting the password of one login attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RsaKey {
    public_key: RsaPublicKey,
    /// Identifies the key to Steam. Sent back along with the encrypted password.
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct GetRsaKeyResponse {
    publickey_mod: Option<String>,
    publickey_exp: Option<String>,
    timestamp: Option<String>,
}

impl RsaKey {
    /// Creates a key from its hex-encoded modulus and exponent. `None` if either is not valid.
    pub fn from_hex(modulus: &str, exponent: &str, timestamp: String) -> Option<Self> {
        let n = BigUint::parse_bytes(modulus.as_bytes(), 16)?;
        let e = BigUint::parse_bytes(exponent.as_bytes(), 16)?;
        let public_key = RsaPublicKey::new(n, e).ok()?;

        Some(Self {
            public_key,
            timestamp,
        })
    }

    /// Encrypts `password` using PKCS#1 v1.5, base64-encoded.
    pub fn encrypt(&self, password: &str) -> Result<String> {
        let encrypted = self.public_key.encrypt(&mut OsRng, Pkcs1v15Encrypt, password.as_bytes())?;

        Ok(STANDARD.encode(encrypted))
    }

    fn from_response(response: GetRsaKeyResponse) -> Option<Self> {
        Self::from_hex(
            &response.publickey_mod?,
            &response.publickey_exp?,
            response.timestamp?,
        )
    }
}

/// Fetches a key for logging in as `username`.
///
/// Malformed responses are fetched again, up to [`MAX_KEY_FETCH_ATTEMPTS`] requests in total.
/// Transport errors are returned as they are.
pub async fn fetch_key(http: &HttpClient, username: &str) -> Result<RsaKey> {
    let uri = community_url("/login/getrsakey/");

    for attempt in 1..=MAX_KEY_FETCH_ATTEMPTS {
        let donotcache = get_system_time_millis().to_string();
        let request = http.post(&uri)
            .form(&[
                ("username", username),
                ("donotcache", &donotcache),
            ]);
        let key = http.send(request).await?
            .into_json::<GetRsaKeyResponse>()
            .ok()
            .and_then(RsaKey::from_response);

        match key {
            Some(key) => return Ok(key),
            None => log::debug!("Malformed RSA key response (attempt {attempt} of {MAX_KEY_FETCH_ATTEMPTS})"),
        }
    }

    Err(LoginError::KeyFetch {
        attempts: MAX_KEY_FETCH_ATTEMPTS,
    }.into())
}
