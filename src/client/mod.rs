//! The client. Logs in, keeps the session and polls trade offers in the background.

mod builder;
pub mod polling;

pub use builder::SteamClientBuilder;

use polling::{PollOptions, Poller, Polling};
use crate::api::TradeOfferAPI;
use crate::error::{ConfirmationError, Result};
use crate::event::Event;
use crate::helpers::community_url;
use crate::http::HttpClient;
use crate::login::{CodePrompt, Credentials, LoginState, Negotiator};
use crate::mobile_api::{MobileAPI, TradeConfirmation};
use crate::response::{AcceptedOffer, Confirmation, TradeOffer};
use crate::session::Session;
use crate::types::TradeOfferId;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use reqwest::cookie::Jar;
use reqwest_middleware::ClientWithMiddleware;
use steamid_ng::SteamID;
use tokio::sync::mpsc;

/// Time to wait before looking for a confirmation, and between attempts to confirm.
const CONFIRMATION_DELAY: Duration = Duration::from_secs(2);
/// Most attempts made to confirm an accepted offer.
const CONFIRMATION_ATTEMPTS: u32 = 3;

/// Clears the stored session, logs in and stores the new session.
pub(crate) async fn log_in(
    negotiator: &Negotiator,
    session: &RwLock<Option<Session>>,
) -> Result<SteamID> {
    *session.write().unwrap_or_else(PoisonError::into_inner) = None;

    let new_session = negotiator.negotiate().await?;
    let steamid = new_session.steamid;

    *session.write().unwrap_or_else(PoisonError::into_inner) = Some(new_session);

    Ok(steamid)
}

/// A client for a Steam account.
#[derive(Debug, Clone)]
pub struct SteamClient {
    /// The underlying API for trade offers.
    pub api: TradeOfferAPI,
    /// The underlying API for mobile confirmations.
    pub mobile_api: MobileAPI,
    http: HttpClient,
    negotiator: Negotiator,
    session: Arc<RwLock<Option<Session>>>,
    events: mpsc::Sender<Event>,
    poll_options: PollOptions,
    polling: Arc<Mutex<Option<Polling>>>,
}

impl SteamClient {
    /// Builder for constructing a [`SteamClient`].
    pub fn builder(username: String, password: String) -> SteamClientBuilder {
        SteamClientBuilder::new(username, password)
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        client: ClientWithMiddleware,
        cookies: Arc<Jar>,
        credentials: Arc<Credentials>,
        prompt: Arc<dyn CodePrompt>,
        user_agent: &'static str,
        time_offset: i64,
        poll_options: PollOptions,
        events: mpsc::Sender<Event>,
    ) -> Self {
        let http = HttpClient::new(client, cookies);
        let session = Arc::new(RwLock::new(None));

        Self {
            api: TradeOfferAPI::new(http.clone(), Arc::clone(&credentials), Arc::clone(&session)),
            mobile_api: MobileAPI::new(http.clone(), Arc::clone(&credentials), Arc::clone(&session), time_offset),
            negotiator: Negotiator::new(http.clone(), credentials, prompt, user_agent, time_offset),
            http,
            session,
            events,
            poll_options,
            polling: Arc::new(Mutex::new(None)),
        }
    }

    /// Logs in and starts polling. Any previous session is discarded first.
    ///
    /// The [`Event::Login`] notification is dropped if the event channel is full, so this is
    /// safe to call from the loop which receives events.
    pub async fn login(&self) -> Result<()> {
        let steamid = log_in(&self.negotiator, &self.session).await?;

        log::debug!("Logged in as {}", u64::from(steamid));
        self.notify(Event::Login);
        self.start_polling();

        Ok(())
    }

    /// Logs out. Polling is stopped, the session is cleared and the session cookies are expired
    /// even if the request fails. Other cookies in the jar are kept.
    pub async fn logout(&self) -> Result<()> {
        log::debug!("Logging out of session");

        let result = self.http.send(self.http.get(&community_url("/login/logout/"))).await;

        self.stop_polling();
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.http.expire_session_cookies();
        self.notify(Event::Logout);

        result.map(|_| ())
    }

    fn notify(&self, event: Event) {
        if let Err(error) = self.events.try_send(event) {
            log::warn!("Could not send event: {error}");
        }
    }

    /// Starts polling trade offers, replacing the current poller if there is one.
    pub fn start_polling(&self) {
        let poller = Poller::new(
            self.api.clone(),
            self.negotiator.clone(),
            Arc::clone(&self.session),
            self.events.clone(),
            self.poll_options,
        );

        // The previous poller is aborted when replaced.
        *self.polling.lock().unwrap_or_else(PoisonError::into_inner) = Some(Polling::spawn(poller));
    }

    /// Stops polling trade offers.
    pub fn stop_polling(&self) {
        self.polling.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Whether the poller is running.
    pub fn is_polling(&self) -> bool {
        self.polling.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Polling::is_running)
            .unwrap_or(false)
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Whether a session is established.
    pub fn is_logged_in(&self) -> bool {
        self.session.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// The SteamID of the logged in user.
    pub fn steamid(&self) -> Option<SteamID> {
        self.session.read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.steamid)
    }

    /// The state the last login reached.
    pub fn login_state(&self) -> LoginState {
        self.negotiator.state()
    }

    /// Gets a trade offer.
    pub async fn get_trade_offer(&self, tradeofferid: TradeOfferId) -> Result<TradeOffer> {
        self.api.get_trade_offer(tradeofferid).await
    }

    /// Accepts a trade offer. When the offer needs mobile confirmation it is confirmed as well,
    /// which requires an identity secret.
    pub async fn accept_trade(
        &self,
        tradeofferid: TradeOfferId,
        partner: SteamID,
    ) -> Result<AcceptedOffer> {
        let accepted_offer = self.api.accept_offer(tradeofferid, partner).await?;

        if !accepted_offer.needs_mobile_confirmation {
            return Ok(accepted_offer);
        }

        if !self.mobile_api.has_identity_secret() {
            return Err(ConfirmationError::Unavailable(tradeofferid).into());
        }

        // The confirmation does not show up right away.
        tokio::time::sleep(CONFIRMATION_DELAY).await;

        let mut reason = String::new();

        for attempt in 1..=CONFIRMATION_ATTEMPTS {
            match self.confirm_trade(tradeofferid).await {
                Ok(_) => return Ok(accepted_offer),
                Err(error) => {
                    log::debug!("Failed to confirm offer {tradeofferid} (attempt {attempt} of {CONFIRMATION_ATTEMPTS}): {error}");
                    reason = error.to_string();
                },
            }

            if attempt < CONFIRMATION_ATTEMPTS {
                tokio::time::sleep(CONFIRMATION_DELAY).await;
            }
        }

        Err(ConfirmationError::Failed {
            tradeofferid,
            attempts: CONFIRMATION_ATTEMPTS,
            reason,
        }.into())
    }

    /// Declines a trade offer we received.
    pub async fn decline_trade(&self, tradeofferid: TradeOfferId) -> Result<TradeOfferId> {
        self.api.decline_offer(tradeofferid).await
    }

    /// Cancels a trade offer we sent.
    pub async fn cancel_trade(&self, tradeofferid: TradeOfferId) -> Result<TradeOfferId> {
        self.api.cancel_offer(tradeofferid).await
    }

    /// Gets pending mobile confirmations.
    pub async fn get_trade_confirmations(&self) -> Result<Vec<Confirmation>> {
        self.mobile_api.get_trade_confirmations().await
    }

    /// Finds the pending mobile confirmation for a trade offer.
    pub async fn get_trade_confirmation(
        &self,
        tradeofferid: TradeOfferId,
    ) -> Result<TradeConfirmation<'_>> {
        self.mobile_api.get_trade_confirmation(tradeofferid).await
    }

    /// Finds and accepts the mobile confirmation for a trade offer.
    pub async fn confirm_trade(&self, tradeofferid: TradeOfferId) -> Result<Confirmation> {
        self.mobile_api.get_trade_confirmation(tradeofferid).await?
            .confirm()
            .await
    }

    /// Finds and denies the mobile confirmation for a trade offer.
    pub async fn deny_trade(&self, tradeofferid: TradeOfferId) -> Result<Confirmation> {
        self.mobile_api.get_trade_confirmation(tradeofferid).await?
            .deny()
            .await
    }
}
