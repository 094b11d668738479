use crate::enums::ConfirmationType;
use crate::types::{ServerTime, TradeOfferId};
use crate::serialize;
use std::fmt;
use chrono::serde::ts_seconds;
use serde::{Serialize, Deserialize};

/// Mobile confirmation. Used primarily for confirming trade offers or listing items on the market.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Confirmation {
    /// The ID of the confirmation.
    #[serde(with = "serialize::string")]
    pub id: u64,
    /// Trade offer ID or market transaction ID.
    #[serde(with = "serialize::string")]
    pub creator_id: u64,
    /// The time the confirmation was created.
    #[serde(with = "ts_seconds")]
    pub creation_time: ServerTime,
    /// The nonce. Sent as `ck` when acting on the confirmation.
    #[serde(with = "serialize::string")]
    pub nonce: u64,
    /// The cancel text.
    pub cancel: String,
    /// The accept text e.g. "Accept" or "Send Offer".
    pub accept: String,
    /// `true` if can be confirmed with multiple other confirmations.
    #[serde(default)]
    pub multi: bool,
    /// The confirmation type.
    #[serde(default)]
    pub r#type: ConfirmationType,
    pub type_name: String,
    pub headline: String,
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub warn: Option<Vec<String>>,
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.r#type, self.headline)
    }
}

impl Confirmation {
    /// Whether this confirms the trade offer with the given ID.
    pub fn is_for_offer(&self, tradeofferid: TradeOfferId) -> bool {
        self.r#type == ConfirmationType::Trade && self.creator_id == tradeofferid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trade_offer_confirmation() {
        let confirmation: Confirmation = serde_json::from_str(include_str!("fixtures/confirmation.json")).unwrap();

        assert_eq!(confirmation.id, 13799599785);
        assert_eq!(confirmation.nonce, 9141945700999917347);
        assert_eq!(confirmation.r#type, ConfirmationType::Trade);
        assert!(confirmation.is_for_offer(6330106046));
        assert!(!confirmation.is_for_offer(13799599785));
    }
}
