use crate::serialize;
use crate::types::TradeId;
use serde::{Serialize, Deserialize};

/// Response from accepting a trade offer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct AcceptedOffer {
    /// The trade ID. Absent when the trade still needs to be confirmed.
    #[serde(default, with = "serialize::option_string_0_as_none")]
    pub tradeid: Option<TradeId>,
    #[serde(default)]
    pub needs_mobile_confirmation: bool,
    #[serde(default)]
    pub needs_email_confirmation: bool,
    #[serde(default)]
    pub email_domain: Option<String>,
}
