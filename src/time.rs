use std::time::{SystemTime, UNIX_EPOCH};
use chrono::{DateTime, Utc};

/// A date from Steam's servers.
pub type ServerTime = DateTime<Utc>;

/// Current unix time in seconds.
pub fn get_system_time() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_secs(),
        // should never occur
        Err(_) => 0,
    }
}

/// Current unix time in milliseconds. Used for `donotcache` parameters.
pub fn get_system_time_millis() -> u128 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_millis(),
        Err(_) => 0,
    }
}

/// Our best guess of Steam's current time given how many seconds we are behind.
pub fn server_time(time_offset: i64) -> i64 {
    get_system_time() as i64 + time_offset
}
