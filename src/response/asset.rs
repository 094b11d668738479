use crate::serialize::{option_string_0_as_none, string};
use crate::types::{Amount, AppId, AssetId, ClassId, ContextId, InstanceId};
use serde::{Serialize, Deserialize};

/// An item in a trade offer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    pub appid: AppId,
    #[serde(with = "string")]
    pub contextid: ContextId,
    #[serde(with = "string")]
    pub assetid: AssetId,
    #[serde(with = "string")]
    pub classid: ClassId,
    #[serde(default, with = "option_string_0_as_none")]
    pub instanceid: InstanceId,
    #[serde(with = "string")]
    pub amount: Amount,
    /// The item is no longer in the inventory it was offered from.
    #[serde(default)]
    pub missing: bool,
}
