use super::Asset;
use crate::enums::{ConfirmationMethod, TradeOfferState};
use crate::serialize::{self, option_string_0_as_none, ts_seconds_option_none_when_zero};
use crate::types::{ServerTime, TradeId, TradeOfferId};
use chrono::serde::ts_seconds;
use serde::{Serialize, Deserialize};
use steamid_ng::SteamID;

/// A trade offer as returned by the Steam Web API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TradeOffer {
    /// The ID for this offer.
    #[serde(with = "serialize::string")]
    pub tradeofferid: TradeOfferId,
    /// The trade ID for this offer. This should be present when the `trade_offer_state` of this
    /// offer is [`TradeOfferState::Accepted`].
    #[serde(default, with = "option_string_0_as_none")]
    pub tradeid: Option<TradeId>,
    /// The 32-bit account ID of our partner.
    pub accountid_other: u32,
    /// The message included in the offer.
    #[serde(default)]
    pub message: Option<String>,
    /// The items we're receiving in this offer.
    #[serde(default)]
    pub items_to_receive: Vec<Asset>,
    /// The items we're giving in this offer.
    #[serde(default)]
    pub items_to_give: Vec<Asset>,
    /// Whether this offer was created by us or not.
    #[serde(default)]
    pub is_our_offer: bool,
    /// Whether this offer originated from a real time trade.
    #[serde(default)]
    pub from_real_time_trade: bool,
    /// The time before the offer expires if it has not been acted on.
    #[serde(with = "ts_seconds")]
    pub expiration_time: ServerTime,
    /// The time this offer was created.
    #[serde(with = "ts_seconds")]
    pub time_created: ServerTime,
    /// The time this offer last had an action e.g. accepting or declining the offer.
    #[serde(with = "ts_seconds")]
    pub time_updated: ServerTime,
    /// The state of this offer.
    pub trade_offer_state: TradeOfferState,
    /// The end date if this trade is in escrow.
    #[serde(default, with = "ts_seconds_option_none_when_zero")]
    pub escrow_end_date: Option<ServerTime>,
    /// The confirmation method for this offer.
    #[serde(default)]
    pub confirmation_method: ConfirmationMethod,
}

impl TradeOffer {
    /// The SteamID of our partner.
    pub fn partner(&self) -> SteamID {
        SteamID::new(
            self.accountid_other,
            steamid_ng::Instance::Desktop,
            steamid_ng::AccountType::Individual,
            steamid_ng::Universe::Public,
        )
    }
}
