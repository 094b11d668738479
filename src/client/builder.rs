use super::SteamClient;
use super::polling::PollOptions;
use crate::error::Result;
use crate::event::Event;
use crate::helpers::{get_default_client, USER_AGENT_STRING};
use crate::login::{CodePrompt, Credentials, StdinPrompt};
use std::sync::Arc;
use reqwest::cookie::Jar;
use reqwest_middleware::ClientWithMiddleware;
use secrecy::SecretString;
use tokio::sync::mpsc;

/// Builder for constructing a [`SteamClient`].
#[derive(Debug)]
pub struct SteamClientBuilder {
    /// The account credentials.
    pub(crate) credentials: Credentials,
    /// Client to use for requests along with the cookies it stores. Remember to include the
    /// cookies connected to this client.
    pub(crate) client: Option<(ClientWithMiddleware, Arc<Jar>)>,
    /// User agent for requests. Also sent as the login's friendly name.
    pub(crate) user_agent: &'static str,
    /// How many seconds your computer is behind Steam's servers. Used for Steam Guard codes and
    /// mobile confirmations.
    pub(crate) time_offset: i64,
    /// Options for polling.
    pub(crate) poll_options: PollOptions,
    /// Where Steam Guard codes come from when there is no shared secret.
    pub(crate) prompt: Arc<dyn CodePrompt>,
    /// Capacity of the event channel.
    pub(crate) channel_capacity: usize,
}

impl SteamClientBuilder {
    /// Creates a new [`SteamClientBuilder`].
    pub fn new(username: String, password: String) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            client: None,
            user_agent: USER_AGENT_STRING,
            time_offset: 0,
            poll_options: PollOptions::default(),
            prompt: Arc::new(StdinPrompt),
            channel_capacity: 10,
        }
    }

    /// Steam Web API key. Required for fetching trade offers.
    pub fn api_key(mut self, api_key: String) -> Self {
        self.credentials.api_key = Some(api_key);
        self
    }

    /// The shared secret for generating Steam Guard codes.
    pub fn shared_secret(mut self, shared_secret: String) -> Self {
        self.credentials.shared_secret = Some(SecretString::from(shared_secret));
        self
    }

    /// The identity secret. Required for mobile confirmations.
    pub fn identity_secret(mut self, identity_secret: String) -> Self {
        self.credentials.identity_secret = Some(SecretString::from(identity_secret));
        self
    }

    /// Client to use for requests. It is also required to include the associated cookies with
    /// this client.
    pub fn client(mut self, client: ClientWithMiddleware, cookies: Arc<Jar>) -> Self {
        self.client = Some((client, cookies));
        self
    }

    /// The user agent for requests.
    pub fn user_agent(mut self, user_agent: &'static str) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// How many seconds your computer is behind Steam's servers.
    pub fn time_offset(mut self, time_offset: i64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// Options for polling.
    pub fn poll_options(mut self, poll_options: PollOptions) -> Self {
        self.poll_options = poll_options;
        self
    }

    /// Where Steam Guard codes come from when there is no shared secret. Codes are read from
    /// standard input by default.
    pub fn prompt<P>(mut self, prompt: P) -> Self
    where
        P: CodePrompt + 'static,
    {
        self.prompt = Arc::new(prompt);
        self
    }

    /// Capacity of the event channel. Default is 10.
    pub fn channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }

    /// Builds the [`SteamClient`] along with the receiver for its events.
    pub fn build(self) -> Result<(SteamClient, mpsc::Receiver<Event>)> {
        let (client, cookies) = match self.client {
            Some(client) => client,
            None => {
                let cookies = Arc::new(Jar::default());
                let client = get_default_client(Arc::clone(&cookies), self.user_agent)?;

                (client, cookies)
            },
        };
        let (tx, rx) = mpsc::channel(self.channel_capacity.max(1));
        let client = SteamClient::new(
            client,
            cookies,
            Arc::new(self.credentials),
            self.prompt,
            self.user_agent,
            self.time_offset,
            self.poll_options,
            tx,
        );

        Ok((client, rx))
    }
}
