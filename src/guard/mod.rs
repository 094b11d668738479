//! Steam Guard codes and mobile confirmation signatures.
//!
//! Confirmation keys and device IDs come from `another-steam-totp`. Login codes are generated
//! here so they can be made for an exact timestamp.

use crate::error::{Error, Result};
use crate::time::get_system_time;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use steamid_ng::SteamID;

pub use another_steam_totp::Tag;

type HmacSha1 = Hmac<Sha1>;

/// Characters a code is made of.
const CODE_CHARACTERS: &[u8] = b"23456789BCDFGHJKMNPQRTVWXY";
/// Length of a code.
const CODE_LENGTH: usize = 5;
/// Seconds each code is valid for.
const CODE_PERIOD: u64 = 30;

fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let decoded = STANDARD.decode(secret.trim())
        .map_err(|error| Error::InvalidSecret(error.to_string()))?;

    if decoded.is_empty() {
        return Err(Error::InvalidSecret("Secret is empty".into()));
    }

    Ok(decoded)
}

fn hmac_sha1(key: &[u8], message: &[u8]) -> Result<[u8; 20]> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|error| Error::InvalidSecret(error.to_string()))?;

    mac.update(message);

    let mut hash = [0u8; 20];

    hash.copy_from_slice(&mac.finalize().into_bytes());

    Ok(hash)
}

/// Generates a Steam Guard code from `shared_secret`. Uses the current system time when `time`
/// is `None`.
///
/// The code is the same for every time within a 30 second window.
pub fn generate_auth_code(shared_secret: &str, time: Option<u64>) -> Result<String> {
    let secret = decode_secret(shared_secret)?;
    let time = time.unwrap_or_else(get_system_time);
    let hmac = hmac_sha1(&secret, &(time / CODE_PERIOD).to_be_bytes())?;
    let start = (hmac[19] & 0x0f) as usize;
    let mut full_code = u32::from_be_bytes([
        hmac[start],
        hmac[start + 1],
        hmac[start + 2],
        hmac[start + 3],
    ]) & 0x7fff_ffff;
    let mut code = String::with_capacity(CODE_LENGTH);

    for _ in 0..CODE_LENGTH {
        let index = (full_code % CODE_CHARACTERS.len() as u32) as usize;

        code.push(CODE_CHARACTERS[index] as char);
        full_code /= CODE_CHARACTERS.len() as u32;
    }

    Ok(code)
}

/// Generates the key which signs a confirmation request. The key is made for the system time
/// adjusted by `time_offset` and is returned along with that time.
pub fn generate_confirmation_key(
    identity_secret: &str,
    tag: Tag,
    time_offset: i64,
) -> Result<(String, u64)> {
    another_steam_totp::generate_confirmation_key(identity_secret, tag, Some(time_offset))
        .map_err(|error| Error::InvalidSecret(error.to_string()))
}

/// The device ID Steam expects confirmation requests to come from.
pub fn get_device_id(steamid: SteamID) -> String {
    another_steam_totp::get_device_id(u64::from(steamid))
}
