//! Requests for trade offers and notifications.

use crate::enums::NotificationKind;
use crate::error::{Error, ParameterError, Result};
use crate::helpers::{api_url, community_url};
use crate::http::HttpClient;
use crate::login::Credentials;
use crate::response::{AcceptedOffer, TradeOffer};
use crate::serialize::{self, steamid_as_string};
use crate::session::Session;
use crate::types::TradeOfferId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use reqwest::header::REFERER;
use serde::{Deserialize, Serialize};
use steamid_ng::SteamID;

/// Counts of each kind of notification.
pub type NotificationCounts = HashMap<NotificationKind, u32>;

/// The underlying API for trade offers.
#[derive(Debug, Clone)]
pub struct TradeOfferAPI {
    http: HttpClient,
    credentials: Arc<Credentials>,
    session: Arc<RwLock<Option<Session>>>,
}

#[derive(Serialize, Debug)]
struct SessionForm<'a> {
    sessionid: &'a str,
}

#[derive(Deserialize, Debug)]
struct TradeOfferIdResponse {
    #[serde(with = "serialize::string")]
    tradeofferid: TradeOfferId,
}

impl TradeOfferAPI {
    pub fn new(
        http: HttpClient,
        credentials: Arc<Credentials>,
        session: Arc<RwLock<Option<Session>>>,
    ) -> Self {
        Self {
            http,
            credentials,
            session,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.credentials.api_key.as_deref()
            .ok_or(Error::Parameter(ParameterError::MissingApiKey))
    }

    fn sessionid(&self) -> Result<String> {
        self.session.read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.sessionid.clone())
            .ok_or(Error::NotLoggedIn)
    }

    /// Gets active offers we have received.
    pub async fn get_trade_offers(&self) -> Result<Vec<TradeOffer>> {
        #[derive(Serialize, Debug)]
        struct Params<'a> {
            key: &'a str,
            active_only: u8,
            get_sent_offers: u8,
            get_received_offers: u8,
            get_descriptions: u8,
        }

        #[derive(Deserialize, Debug)]
        struct Offers {
            #[serde(default)]
            trade_offers_received: Vec<TradeOffer>,
        }

        #[derive(Deserialize, Debug)]
        struct Response {
            response: Offers,
        }

        let request = self.http.get(&api_url("IEconService", "GetTradeOffers", 1))
            .query(&Params {
                key: self.api_key()?,
                active_only: 1,
                get_sent_offers: 0,
                get_received_offers: 1,
                get_descriptions: 0,
            });
        let body: Response = self.http.send(request).await?.into_json()?;

        Ok(body.response.trade_offers_received)
    }

    /// Gets a trade offer.
    pub async fn get_trade_offer(
        &self,
        tradeofferid: TradeOfferId,
    ) -> Result<TradeOffer> {
        #[derive(Serialize, Debug)]
        struct Params<'a> {
            key: &'a str,
            tradeofferid: TradeOfferId,
        }

        #[derive(Deserialize, Debug)]
        struct Body {
            offer: Option<TradeOffer>,
        }

        #[derive(Deserialize, Debug)]
        struct Response {
            response: Body,
        }

        let request = self.http.get(&api_url("IEconService", "GetTradeOffer", 1))
            .query(&Params {
                key: self.api_key()?,
                tradeofferid,
            });
        let body: Response = self.http.send(request).await?.into_json()?;

        body.response.offer
            .ok_or_else(|| Error::NotFound(format!("Trade offer {tradeofferid}")))
    }

    /// Accepts an offer. The offer may still need to be confirmed, check the response.
    pub async fn accept_offer(
        &self,
        tradeofferid: TradeOfferId,
        partner: SteamID,
    ) -> Result<AcceptedOffer> {
        #[derive(Serialize, Debug)]
        struct AcceptOfferParams<'a> {
            sessionid: &'a str,
            serverid: u32,
            #[serde(with = "serialize::string")]
            tradeofferid: TradeOfferId,
            #[serde(serialize_with = "steamid_as_string")]
            partner: SteamID,
            captcha: &'static str,
        }

        let sessionid = self.sessionid()?;
        let referer = community_url(&format!("/tradeoffer/{tradeofferid}"));
        let request = self.http.post(&community_url(&format!("/tradeoffer/{tradeofferid}/accept")))
            .header(REFERER, referer)
            .form(&AcceptOfferParams {
                sessionid: &sessionid,
                serverid: 1,
                tradeofferid,
                partner,
                captcha: "",
            });

        self.http.send(request).await?.into_json()
    }

    /// Declines an offer we received.
    pub async fn decline_offer(
        &self,
        tradeofferid: TradeOfferId,
    ) -> Result<TradeOfferId> {
        self.act_on_offer(tradeofferid, "decline").await
    }

    /// Cancels an offer we sent.
    pub async fn cancel_offer(
        &self,
        tradeofferid: TradeOfferId,
    ) -> Result<TradeOfferId> {
        self.act_on_offer(tradeofferid, "cancel").await
    }

    async fn act_on_offer(
        &self,
        tradeofferid: TradeOfferId,
        action: &str,
    ) -> Result<TradeOfferId> {
        let sessionid = self.sessionid()?;
        let request = self.http.post(&community_url(&format!("/tradeoffer/{tradeofferid}/{action}")))
            .form(&SessionForm {
                sessionid: &sessionid,
            });
        let body: TradeOfferIdResponse = self.http.send(request).await?.into_json()?;

        Ok(body.tradeofferid)
    }

    /// Gets the number of unread notifications of each known kind.
    pub async fn get_notification_counts(&self) -> Result<NotificationCounts> {
        #[derive(Deserialize, Debug)]
        struct Response {
            #[serde(default)]
            notifications: HashMap<String, u32>,
        }

        let request = self.http.get(&community_url("/actions/GetNotificationCounts"));
        let body: Response = self.http.send(request).await?.into_json()?;
        let counts = body.notifications
            .into_iter()
            .filter_map(|(code, count)| {
                let kind = code.parse::<u8>().ok()
                    .and_then(|code| NotificationKind::try_from(code).ok())?;

                Some((kind, count))
            })
            .collect();

        Ok(counts)
    }
}
