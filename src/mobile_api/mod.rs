//! Mobile confirmations. Every request is signed with a key derived from the identity secret, so
//! none of these work without one.

mod operation;

use operation::Operation;

use crate::error::{ConfirmationError, Error, Result};
use crate::guard::{generate_confirmation_key, get_device_id, Tag};
use crate::helpers::community_url;
use crate::http::HttpClient;
use crate::login::Credentials;
use crate::response::Confirmation;
use crate::session::Session;
use crate::types::TradeOfferId;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};
use secrecy::ExposeSecret;
use serde::Deserialize;
use steamid_ng::SteamID;

const REQUESTED_WITH: &str = "com.valvesoftware.android.steam.community";

/// The API for mobile confirmations.
#[derive(Debug, Clone)]
pub struct MobileAPI {
    http: HttpClient,
    credentials: Arc<Credentials>,
    session: Arc<RwLock<Option<Session>>>,
    /// How many seconds your computer is behind Steam's servers.
    pub time_offset: i64,
}

/// A pending confirmation for a trade offer. Consumed by confirming or denying it.
#[derive(Debug)]
pub struct TradeConfirmation<'a> {
    api: &'a MobileAPI,
    confirmation: Confirmation,
}

impl TradeConfirmation<'_> {
    /// Accepts the confirmation.
    pub async fn confirm(self) -> Result<Confirmation> {
        self.api.send_confirmation_ajax(&self.confirmation, Operation::Allow).await?;
        Ok(self.confirmation)
    }

    /// Denies the confirmation.
    pub async fn deny(self) -> Result<Confirmation> {
        self.api.send_confirmation_ajax(&self.confirmation, Operation::Cancel).await?;
        Ok(self.confirmation)
    }
}

impl Deref for TradeConfirmation<'_> {
    type Target = Confirmation;

    fn deref(&self) -> &Self::Target {
        &self.confirmation
    }
}

impl MobileAPI {
    pub fn new(
        http: HttpClient,
        credentials: Arc<Credentials>,
        session: Arc<RwLock<Option<Session>>>,
        time_offset: i64,
    ) -> Self {
        Self {
            http,
            credentials,
            session,
            time_offset,
        }
    }

    /// Whether an identity secret is configured.
    pub fn has_identity_secret(&self) -> bool {
        self.credentials.identity_secret.is_some()
    }

    /// Gets the trade confirmations.
    pub async fn get_trade_confirmations(
        &self,
    ) -> Result<Vec<Confirmation>> {
        #[derive(Deserialize)]
        struct GetTradeConfirmationsResponse {
            #[serde(default)]
            success: bool,
            #[serde(default)]
            needauth: bool,
            #[serde(default)]
            message: Option<String>,
            #[serde(default)]
            conf: Vec<Confirmation>,
        }

        let query = self.get_confirmation_query_params(Tag::Conf)?;
        let request = self.http.get(&community_url("/mobileconf/getlist"))
            .header("X-Requested-With", REQUESTED_WITH)
            .query(&query);
        let body: GetTradeConfirmationsResponse = self.http.send(request).await?.into_json()?;

        if body.needauth {
            return Err(Error::NotLoggedIn);
        }

        if !body.success {
            return Err(Error::Response(body.message.unwrap_or_else(|| "Failed to get confirmations".into())));
        }

        Ok(body.conf)
    }

    /// Finds the confirmation for a trade offer.
    pub async fn get_trade_confirmation(
        &self,
        tradeofferid: TradeOfferId,
    ) -> Result<TradeConfirmation<'_>> {
        let confirmation = self.get_trade_confirmations().await?
            .into_iter()
            .find(|confirmation| confirmation.is_for_offer(tradeofferid))
            .ok_or(ConfirmationError::NotFound(tradeofferid))?;

        Ok(TradeConfirmation {
            api: self,
            confirmation,
        })
    }

    fn get_steamid(&self) -> Result<SteamID> {
        self.session.read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.steamid)
            .ok_or(Error::NotLoggedIn)
    }

    fn get_confirmation_query_params(
        &self,
        tag: Tag,
    ) -> Result<Vec<(&'static str, String)>> {
        let identity_secret = self.credentials.identity_secret.as_ref()
            .ok_or(ConfirmationError::MissingIdentitySecret)?;
        let steamid = self.get_steamid()?;
        let (key, time) = generate_confirmation_key(identity_secret.expose_secret(), tag, self.time_offset)?;

        Ok(vec![
            ("p", get_device_id(steamid)),
            ("a", u64::from(steamid).to_string()),
            ("k", key),
            ("t", time.to_string()),
            ("m", "react".into()),
            ("tag", tag.to_string()),
        ])
    }

    async fn send_confirmation_ajax(
        &self,
        confirmation: &Confirmation,
        operation: Operation,
    ) -> Result<()> {
        #[derive(Deserialize)]
        struct SendConfirmationResponse {
            #[serde(default)]
            success: bool,
            #[serde(default)]
            message: Option<String>,
        }

        let mut query = self.get_confirmation_query_params(operation.tag())?;

        query.push(("op", operation.to_string()));
        query.push(("cid", confirmation.id.to_string()));
        query.push(("ck", confirmation.nonce.to_string()));

        let request = self.http.get(&community_url("/mobileconf/ajaxop"))
            .header("X-Requested-With", REQUESTED_WITH)
            .query(&query);
        let body: SendConfirmationResponse = self.http.send(request).await?.into_json()?;

        if !body.success {
            return Err(ConfirmationError::Unsuccessful(body.message).into());
        }

        log::debug!("Confirmation {} for offer {}: {operation}", confirmation.id, confirmation.creator_id);

        Ok(())
    }
}
