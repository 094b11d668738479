use num_enum::{TryFromPrimitive, IntoPrimitive};
use strum_macros::Display;

/// A kind of community notification, keyed by the code Steam reports counts under.
#[derive(Display, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum NotificationKind {
    /// New comments.
    Comment = 4,
    /// New items in the inventory.
    ItemsReceived = 5,
    /// New friend invites.
    InviteReceived = 6,
    /// New gifts.
    GiftReceived = 8,
}

impl NotificationKind {
    /// Every kind, in code order.
    pub const ALL: [Self; 4] = [
        Self::Comment,
        Self::ItemsReceived,
        Self::InviteReceived,
        Self::GiftReceived,
    ];
}
