//! Models for responses.

mod accepted_offer;
mod asset;
mod confirmation;
mod trade_offer;

pub use accepted_offer::AcceptedOffer;
pub use asset::Asset;
pub use confirmation::Confirmation;
pub use trade_offer::TradeOffer;
