use crate::response::TradeOffer;
use crate::types::TradeOfferId;
use std::collections::HashMap;

/// The offers returned by one poll, keyed by ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeOfferSnapshot(HashMap<TradeOfferId, TradeOffer>);

impl TradeOfferSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, tradeofferid: &TradeOfferId) -> Option<&TradeOffer> {
        self.0.get(tradeofferid)
    }

    /// Offers present in both snapshots which differ from their previous value, ordered by ID.
    ///
    /// Offers which are new or which have disappeared are not included.
    pub fn changed_since(&self, previous: &TradeOfferSnapshot) -> Vec<&TradeOffer> {
        let mut changed = self.0
            .iter()
            .filter(|(tradeofferid, offer)| {
                previous.0.get(*tradeofferid)
                    .map(|previous_offer| previous_offer != *offer)
                    .unwrap_or(false)
            })
            .map(|(_, offer)| offer)
            .collect::<Vec<_>>();

        changed.sort_by_key(|offer| offer.tradeofferid);
        changed
    }
}

impl FromIterator<TradeOffer> for TradeOfferSnapshot {
    fn from_iter<I: IntoIterator<Item = TradeOffer>>(iter: I) -> Self {
        Self(iter
            .into_iter()
            .map(|offer| (offer.tradeofferid, offer))
            .collect())
    }
}
