mod poller;
mod snapshot;

pub(crate) use poller::Poller;
pub use snapshot::TradeOfferSnapshot;

use std::time::Duration;
use tokio::task::JoinHandle;

/// Options for polling.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    /// Interval to poll at. Default is 5 seconds.
    pub poll_interval: Duration,
    /// Also poll for community notifications. Default is `false`.
    pub poll_notifications: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            poll_notifications: false,
        }
    }
}

/// A running poller. Stops the poller when dropped.
#[derive(Debug)]
pub(crate) struct Polling {
    handle: JoinHandle<()>,
}

impl Polling {
    pub fn spawn(poller: Poller) -> Self {
        Self {
            handle: tokio::spawn(poller.run()),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Polling {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
