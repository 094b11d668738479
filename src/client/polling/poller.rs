use super::{PollOptions, TradeOfferSnapshot};
use crate::api::{NotificationCounts, TradeOfferAPI};
use crate::client::log_in;
use crate::enums::NotificationKind;
use crate::error::Error;
use crate::event::{Event, Notification};
use crate::login::Negotiator;
use crate::session::Session;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Most times a poll is retried right away after the connection drops.
const MAX_DISCONNECT_RETRIES: u32 = 3;

/// Why a poll produced no snapshot.
enum PollError {
    /// The iteration is skipped.
    Recoverable(Error),
    /// Logging back in failed. Polling cannot continue.
    Login(Error),
}

/// Polls trade offers and sends an event for each one that changes.
pub(crate) struct Poller {
    pub api: TradeOfferAPI,
    pub negotiator: Negotiator,
    pub session: Arc<RwLock<Option<Session>>>,
    pub events: mpsc::Sender<Event>,
    pub options: PollOptions,
    pub snapshot: TradeOfferSnapshot,
    pub notification_counts: NotificationCounts,
}

impl Poller {
    pub fn new(
        api: TradeOfferAPI,
        negotiator: Negotiator,
        session: Arc<RwLock<Option<Session>>>,
        events: mpsc::Sender<Event>,
        options: PollOptions,
    ) -> Self {
        Self {
            api,
            negotiator,
            session,
            events,
            options,
            snapshot: TradeOfferSnapshot::default(),
            notification_counts: NotificationCounts::new(),
        }
    }

    /// Polls until the event receiver is dropped or logging back in fails.
    pub async fn run(mut self) {
        match self.poll_offers().await {
            Ok(snapshot) => self.snapshot = snapshot,
            Err(PollError::Recoverable(error)) => log::warn!("Failed to get initial trade offers: {error}"),
            Err(PollError::Login(error)) => return self.fail(error).await,
        }

        if self.options.poll_notifications {
            match self.api.get_notification_counts().await {
                Ok(counts) => self.notification_counts = counts,
                Err(error) => log::warn!("Failed to get initial notification counts: {error}"),
            }
        }

        loop {
            tokio::time::sleep(self.options.poll_interval).await;

            match self.poll_offers().await {
                Ok(snapshot) => if !self.dispatch_changes(snapshot).await {
                    // They closed the connection.
                    break;
                },
                Err(PollError::Recoverable(error)) => log::warn!("Failed to poll trade offers: {error}"),
                Err(PollError::Login(error)) => return self.fail(error).await,
            }

            if self.options.poll_notifications && !self.poll_notifications().await {
                break;
            }
        }

        log::debug!("Polling stopped");
    }

    async fn fail(self, error: Error) {
        log::error!("Polling stopped, could not log back in: {error}");
        let _ = self.events.send(Event::PollingFailed(error)).await;
    }

    async fn poll_offers(&self) -> Result<TradeOfferSnapshot, PollError> {
        let mut disconnects = 0;
        let mut logged_in_again = false;

        loop {
            match self.api.get_trade_offers().await {
                Ok(offers) => return Ok(offers.into_iter().collect()),
                Err(error) if error.is_disconnect() && disconnects < MAX_DISCONNECT_RETRIES => {
                    disconnects += 1;
                    log::debug!("Disconnected while polling, retrying ({disconnects} of {MAX_DISCONNECT_RETRIES}): {error}");
                },
                Err(error) if error.is_session_expired() && !logged_in_again => {
                    log::debug!("Session expired while polling, logging back in");
                    log_in(&self.negotiator, &self.session).await
                        .map_err(PollError::Login)?;
                    logged_in_again = true;
                    let _ = self.events.send(Event::Login).await;
                },
                Err(error) => return Err(PollError::Recoverable(error)),
            }
        }
    }

    /// Replaces the snapshot and sends an event for each changed offer. Returns `false` if the
    /// receiver was dropped.
    async fn dispatch_changes(&mut self, snapshot: TradeOfferSnapshot) -> bool {
        let changed = snapshot.changed_since(&self.snapshot)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();

        self.snapshot = snapshot;

        for offer in changed {
            log::debug!("Trade offer {} changed to {}", offer.tradeofferid, offer.trade_offer_state);

            if self.events.send(Event::TradeReceive(offer)).await.is_err() {
                return false;
            }
        }

        true
    }

    /// Sends an event for each kind of notification whose count went up. Returns `false` if the
    /// receiver was dropped.
    async fn poll_notifications(&mut self) -> bool {
        let counts = match self.api.get_notification_counts().await {
            Ok(counts) => counts,
            Err(error) => {
                log::warn!("Failed to poll notifications: {error}");
                return true;
            },
        };
        let notifications = NotificationKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let count = counts.get(&kind).copied().unwrap_or(0);
                let previous = self.notification_counts.get(&kind).copied().unwrap_or(0);

                (count > previous).then(|| Notification::new(kind, count - previous))
            })
            .collect::<Vec<_>>();

        self.notification_counts = counts;

        for notification in notifications {
            if self.events.send(Event::Notification(notification)).await.is_err() {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{offer_json, trade_offers, GET_TRADE_OFFERS};
    use crate::enums::TradeOfferState;
    use crate::helpers::USER_AGENT_STRING;
    use crate::http::HttpClient;
    use crate::login::tests::respond_login;
    use crate::login::{Credentials, StdinPrompt};
    use crate::testing::{MockResponse, MockSteam};
    use serde_json::json;
    use std::time::Duration;
    use steamid_ng::SteamID;
    use tokio::time::timeout;

    const SIGN_IN_PAGE: &str = "<html><h1>Sign In</h1><script>g_steamID = false;</script></html>";

    fn poller(mock: &Arc<MockSteam>, options: PollOptions) -> (Poller, mpsc::Receiver<Event>) {
        let (client, cookies) = mock.client();
        let http = HttpClient::new(client, cookies);
        let mut credentials = Credentials::new("user".into(), "hunter2".into());

        credentials.api_key = Some("KEY".into());

        let credentials = Arc::new(credentials);
        let session = Arc::new(RwLock::new(Some(Session {
            sessionid: "sessionid".into(),
            steamid: SteamID::from(76561198000000000),
        })));
        let api = TradeOfferAPI::new(http.clone(), Arc::clone(&credentials), Arc::clone(&session));
        let negotiator = Negotiator::new(http, credentials, Arc::new(StdinPrompt), USER_AGENT_STRING, 0);
        let (tx, rx) = mpsc::channel(10);

        (Poller::new(api, negotiator, session, tx, options), rx)
    }

    fn offers(offers: &[(u64, u8)]) -> MockResponse {
        trade_offers(offers.iter().map(|(id, state)| offer_json(*id, *state)).collect())
    }

    async fn next_event(rx: &mut mpsc::Receiver<Event>) -> Option<Event> {
        timeout(Duration::from_secs(60), rx.recv()).await.ok().flatten()
    }

    #[tokio::test(start_paused = true)]
    async fn dispatches_changed_offer_once() {
        let mock = MockSteam::new();
        let (poller, mut rx) = poller(&mock, PollOptions::default());

        mock.respond(GET_TRADE_OFFERS, offers(&[(123, 2), (124, 2)]));
        mock.respond_always(GET_TRADE_OFFERS, offers(&[(123, 3), (124, 2), (125, 2)]));

        let handle = tokio::spawn(poller.run());

        match next_event(&mut rx).await {
            Some(Event::TradeReceive(offer)) => {
                assert_eq!(offer.tradeofferid, 123);
                assert_eq!(offer.trade_offer_state, TradeOfferState::Accepted);
            },
            event => panic!("Unexpected event: {event:?}"),
        }

        assert!(next_event(&mut rx).await.is_none());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn polls_at_interval() {
        let mock = MockSteam::new();
        let (poller, _rx) = poller(&mock, PollOptions::default());

        mock.respond_always(GET_TRADE_OFFERS, offers(&[(123, 2)]));

        let started = tokio::time::Instant::now();
        let handle = tokio::spawn(poller.run());

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        handle.abort();

        let offsets = mock.requests()
            .iter()
            .map(|request| (request.at - started).as_secs())
            .collect::<Vec<_>>();

        assert_eq!(offsets, vec![0, 5, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn skips_failed_iterations() {
        let mock = MockSteam::new();
        let (poller, mut rx) = poller(&mock, PollOptions::default());

        mock.respond(GET_TRADE_OFFERS, offers(&[(123, 2)]));
        mock.respond(GET_TRADE_OFFERS, MockResponse::html("Forbidden").status(403));
        mock.respond_always(GET_TRADE_OFFERS, offers(&[(123, 7)]));

        let handle = tokio::spawn(poller.run());

        assert!(matches!(next_event(&mut rx).await, Some(Event::TradeReceive(offer)) if offer.tradeofferid == 123));
        assert_eq!(mock.requests_to(GET_TRADE_OFFERS).len(), 3);
        handle.abort();
    }

    fn short_interval() -> PollOptions {
        PollOptions {
            poll_interval: Duration::from_secs(1),
            ..PollOptions::default()
        }
    }

    #[tokio::test]
    async fn refetches_after_disconnect() {
        let mock = MockSteam::new();
        let (poller, mut rx) = poller(&mock, short_interval());

        mock.respond(GET_TRADE_OFFERS, offers(&[(123, 2)]));
        mock.respond(GET_TRADE_OFFERS, MockResponse::refused());
        mock.respond_always(GET_TRADE_OFFERS, offers(&[(123, 3)]));

        let handle = tokio::spawn(poller.run());

        assert!(matches!(next_event(&mut rx).await, Some(Event::TradeReceive(offer)) if offer.tradeofferid == 123));
        handle.abort();

        let requests = mock.requests_to(GET_TRADE_OFFERS);

        assert_eq!(requests.len(), 3);
        // the retry does not wait for the next interval
        assert!(requests[2].at - requests[1].at < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn skips_iteration_after_repeated_disconnects() {
        let mock = MockSteam::new();
        let (poller, mut rx) = poller(&mock, short_interval());

        mock.respond(GET_TRADE_OFFERS, offers(&[(123, 2)]));

        for _ in 0..=MAX_DISCONNECT_RETRIES {
            mock.respond(GET_TRADE_OFFERS, MockResponse::refused());
        }

        mock.respond_always(GET_TRADE_OFFERS, offers(&[(123, 3)]));

        let handle = tokio::spawn(poller.run());

        assert!(matches!(next_event(&mut rx).await, Some(Event::TradeReceive(offer)) if offer.tradeofferid == 123));
        handle.abort();

        let requests = mock.requests_to(GET_TRADE_OFFERS);

        assert_eq!(requests.len(), 6);
        assert!(requests[5].at - requests[4].at >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn logs_back_in_when_session_expires() {
        let mock = MockSteam::new();
        let (poller, mut rx) = poller(&mock, PollOptions::default());

        respond_login(&mock);
        mock.respond(GET_TRADE_OFFERS, offers(&[(123, 2)]));
        mock.respond(GET_TRADE_OFFERS, MockResponse::html(SIGN_IN_PAGE));
        mock.respond_always(GET_TRADE_OFFERS, offers(&[(123, 3)]));

        let handle = tokio::spawn(poller.run());

        assert!(matches!(next_event(&mut rx).await, Some(Event::Login)));
        assert!(matches!(next_event(&mut rx).await, Some(Event::TradeReceive(offer)) if offer.tradeofferid == 123));
        assert_eq!(mock.requests_to("/login/dologin/").len(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_logging_back_in_fails() {
        let mock = MockSteam::new();
        let (poller, mut rx) = poller(&mock, PollOptions::default());

        respond_login(&mock);
        mock.respond("/login/dologin/", MockResponse::json(json!({
            "success": false,
            "message": "The account name or password that you have entered is incorrect.",
        })));
        mock.respond(GET_TRADE_OFFERS, offers(&[(123, 2)]));
        mock.respond_always(GET_TRADE_OFFERS, MockResponse::html("").status(401));

        let handle = tokio::spawn(poller.run());

        assert!(matches!(next_event(&mut rx).await, Some(Event::PollingFailed(Error::Login(_)))));
        assert!(rx.recv().await.is_none());
        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_receiver_is_dropped() {
        let mock = MockSteam::new();
        let (poller, rx) = poller(&mock, PollOptions::default());

        mock.respond(GET_TRADE_OFFERS, offers(&[(123, 2)]));
        mock.respond_always(GET_TRADE_OFFERS, offers(&[(123, 3)]));
        drop(rx);

        let handle = tokio::spawn(poller.run());

        assert!(timeout(Duration::from_secs(60), handle).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn dispatches_increased_notifications() {
        let mock = MockSteam::new();
        let options = PollOptions {
            poll_notifications: true,
            ..PollOptions::default()
        };
        let (poller, mut rx) = poller(&mock, options);

        mock.respond_always(GET_TRADE_OFFERS, offers(&[]));
        mock.respond("/actions/GetNotificationCounts", MockResponse::json(json!({
            "notifications": { "4": 1, "5": 3, "6": 0, "8": 0 },
        })));
        mock.respond_always("/actions/GetNotificationCounts", MockResponse::json(json!({
            "notifications": { "4": 1, "5": 5, "6": 0, "8": 0 },
        })));

        let handle = tokio::spawn(poller.run());

        assert_eq!(
            next_event(&mut rx).await.and_then(|event| match event {
                Event::Notification(notification) => Some(notification),
                _ => None,
            }),
            Some(Notification::ItemsReceived { count: 2 }),
        );
        assert!(next_event(&mut rx).await.is_none());
        handle.abort();
    }
}
