//! Enumerated types.

mod confirmation_method;
mod confirmation_type;
mod notification_kind;
mod trade_offer_state;

pub use confirmation_method::ConfirmationMethod;
pub use confirmation_type::ConfirmationType;
pub use notification_kind::NotificationKind;
pub use trade_offer_state::TradeOfferState;
