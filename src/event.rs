//! Events sent from the client.

use crate::enums::NotificationKind;
use crate::error::Error;
use crate::response::TradeOffer;

/// Something that happened to the client.
#[derive(Debug)]
pub enum Event {
    /// A session was established. Sent again after the poller logs back in.
    Login,
    /// The session was torn down.
    Logout,
    /// A trade offer we already knew about changed.
    TradeReceive(TradeOffer),
    /// New community notifications arrived.
    Notification(Notification),
    /// The poller could not recover and has stopped.
    PollingFailed(Error),
}

/// New community notifications. Each variant carries how many arrived since the last check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Comment {
        count: u32,
    },
    ItemsReceived {
        count: u32,
    },
    InviteReceived {
        count: u32,
    },
    GiftReceived {
        count: u32,
    },
}

impl Notification {
    pub fn new(kind: NotificationKind, count: u32) -> Self {
        match kind {
            NotificationKind::Comment => Self::Comment { count },
            NotificationKind::ItemsReceived => Self::ItemsReceived { count },
            NotificationKind::InviteReceived => Self::InviteReceived { count },
            NotificationKind::GiftReceived => Self::GiftReceived { count },
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Comment { .. } => NotificationKind::Comment,
            Self::ItemsReceived { .. } => NotificationKind::ItemsReceived,
            Self::InviteReceived { .. } => NotificationKind::InviteReceived,
            Self::GiftReceived { .. } => NotificationKind::GiftReceived,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            Self::Comment { count } |
            Self::ItemsReceived { count } |
            Self::InviteReceived { count } |
            Self::GiftReceived { count } => *count,
        }
    }
}
