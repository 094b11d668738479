//! Negotiates a web session from a username and password.
//!
//! Logging in takes several round trips. A fresh RSA key is fetched and used to encrypt the
//! password, the encrypted password is submitted, and Steam may then ask for a Steam Guard code,
//! in which case the cycle starts over with the code included. Once accepted, the transfer
//! parameters are posted to each transfer URL so that every Steam domain has cookies, and the
//! session ID is read from the community home page.

mod credentials;
mod prompt;
mod response;
mod rsa_key;

pub use credentials::Credentials;
pub use prompt::{CodePrompt, GuardCodeKind, StdinPrompt};
pub use response::LoginResponse;
pub use rsa_key::{fetch_key, RsaKey, MAX_KEY_FETCH_ATTEMPTS};

use crate::error::{LoginError, Result};
use crate::guard::generate_auth_code;
use crate::helpers::community_url;
use crate::http::HttpClient;
use crate::session::Session;
use crate::time::{get_system_time_millis, server_time};
use std::sync::{Arc, PoisonError, RwLock};
use lazy_regex::regex_captures;
use secrecy::ExposeSecret;
use steamid_ng::SteamID;
use strum_macros::Display;

/// Most Steam Guard codes submitted in one login.
pub const MAX_CODE_SUBMISSIONS: u32 = 3;

/// How far a login has progressed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginState {
    /// Nothing has been sent.
    #[default]
    AwaitingCredentials,
    /// An RSA key has been fetched for this attempt.
    KeyFetched,
    /// The encrypted credentials were submitted.
    LoginSubmitted,
    /// Steam asked for a Steam Guard code.
    TwoFactorRequired,
    /// Credentials were accepted and cookies are being transferred to each Steam domain.
    RedirectsPending,
    /// A session is established.
    SessionEstablished,
    /// The last login failed.
    LoginFailed,
}

/// A step of the login along with what the next step needs.
enum Step {
    AwaitingCredentials,
    KeyFetched(RsaKey),
    LoginSubmitted(LoginResponse),
    CodeRequired(GuardCodeKind),
    RedirectsPending(LoginResponse),
}

impl Step {
    fn state(&self) -> LoginState {
        match self {
            Self::AwaitingCredentials => LoginState::AwaitingCredentials,
            Self::KeyFetched(_) => LoginState::KeyFetched,
            Self::LoginSubmitted(_) => LoginState::LoginSubmitted,
            Self::CodeRequired(_) => LoginState::TwoFactorRequired,
            Self::RedirectsPending(_) => LoginState::RedirectsPending,
        }
    }
}

/// Codes sent along with the credentials.
#[derive(Debug, Default)]
struct GuardCodes {
    twofactorcode: String,
    emailauth: String,
    emailsteamid: String,
    submitted: u32,
}

impl GuardCodes {
    fn insert(&mut self, kind: GuardCodeKind, code: String) {
        match kind {
            GuardCodeKind::TwoFactor => self.twofactorcode = code,
            GuardCodeKind::Email => self.emailauth = code,
        }

        self.submitted += 1;
    }
}

/// Drives a login from credentials to an established [`Session`].
#[derive(Debug, Clone)]
pub struct Negotiator {
    http: HttpClient,
    credentials: Arc<Credentials>,
    prompt: Arc<dyn CodePrompt>,
    user_agent: &'static str,
    time_offset: i64,
    state: Arc<RwLock<LoginState>>,
}

impl Negotiator {
    pub fn new(
        http: HttpClient,
        credentials: Arc<Credentials>,
        prompt: Arc<dyn CodePrompt>,
        user_agent: &'static str,
        time_offset: i64,
    ) -> Self {
        Self {
            http,
            credentials,
            prompt,
            user_agent,
            time_offset,
            state: Arc::new(RwLock::new(LoginState::default())),
        }
    }

    /// The state the last login reached.
    pub fn state(&self) -> LoginState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Logs in.
    pub async fn negotiate(&self) -> Result<Session> {
        let result = self.run().await;

        if let Err(error) = &result {
            log::debug!("Login failed: {error}");
            self.set_state(LoginState::LoginFailed);
        }

        result
    }

    async fn run(&self) -> Result<Session> {
        let mut codes = GuardCodes::default();
        let mut step = Step::AwaitingCredentials;

        loop {
            self.set_state(step.state());

            step = match step {
                Step::AwaitingCredentials => {
                    Step::KeyFetched(fetch_key(&self.http, &self.credentials.username).await?)
                },
                Step::KeyFetched(key) => {
                    Step::LoginSubmitted(self.submit(&key, &codes).await?)
                },
                Step::LoginSubmitted(response) => next_step(response, &mut codes)?,
                Step::CodeRequired(kind) => {
                    if codes.submitted >= MAX_CODE_SUBMISSIONS {
                        return Err(LoginError::TwoFactorRejected {
                            attempts: codes.submitted,
                        }.into());
                    }

                    let code = self.obtain_code(kind)?;

                    codes.insert(kind, code);
                    // keys are single-use, start over with a new one
                    Step::AwaitingCredentials
                },
                Step::RedirectsPending(response) => {
                    let steamid = self.perform_redirects(&response).await?;
                    let sessionid = self.fetch_sessionid().await?;

                    self.set_state(LoginState::SessionEstablished);

                    return Ok(Session {
                        sessionid,
                        steamid: SteamID::from(steamid),
                    });
                },
            };
        }
    }

    fn set_state(&self, state: LoginState) {
        log::debug!("Login state: {state}");
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    async fn submit(&self, key: &RsaKey, codes: &GuardCodes) -> Result<LoginResponse> {
        let password = key.encrypt(self.credentials.password.expose_secret())?;
        let donotcache = get_system_time_millis().to_string();
        let request = self.http.post(&community_url("/login/dologin/"))
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", password.as_str()),
                ("emailauth", codes.emailauth.as_str()),
                ("emailsteamid", codes.emailsteamid.as_str()),
                ("twofactorcode", codes.twofactorcode.as_str()),
                ("captchagid", "-1"),
                ("captcha_text", ""),
                ("loginfriendlyname", self.user_agent),
                ("rsatimestamp", key.timestamp.as_str()),
                ("remember_login", "true"),
                ("donotcache", donotcache.as_str()),
            ]);

        self.http.send(request).await?.into_json()
    }

    fn obtain_code(&self, kind: GuardCodeKind) -> Result<String> {
        if kind == GuardCodeKind::TwoFactor {
            if let Some(shared_secret) = &self.credentials.shared_secret {
                let time = server_time(self.time_offset).max(0) as u64;

                return generate_auth_code(shared_secret.expose_secret(), Some(time));
            }
        }

        let code = self.prompt.prompt(kind)
            .map_err(LoginError::Prompt)?;

        Ok(code)
    }

    /// Posts the transfer parameters to each transfer URL. Returns the 64-bit SteamID from the
    /// parameters.
    async fn perform_redirects(&self, response: &LoginResponse) -> Result<u64> {
        let form = response.transfer_form()
            .ok_or(LoginError::Redirect("no transfer parameters were returned, Steam is likely down"))?;
        let steamid = response.steamid()
            .ok_or(LoginError::Redirect("transfer parameters do not contain a steamid"))?;

        for url in &response.transfer_urls {
            self.http.send(self.http.post(url).form(&form)).await?;
        }

        Ok(steamid)
    }

    async fn fetch_sessionid(&self) -> Result<String> {
        let html = self.http.send(self.http.get(&community_url("/my/home/"))).await?
            .into_text();
        let sessionid = regex_captures!(r#"g_sessionID = "(.*?)";"#, &html)
            .map(|(_, sessionid)| sessionid)
            .filter(|sessionid| !sessionid.is_empty())
            .ok_or(LoginError::MissingSessionId)?;

        Ok(sessionid.to_string())
    }
}

/// Decides what to do with the response to a submitted login.
fn next_step(response: LoginResponse, codes: &mut GuardCodes) -> Result<Step> {
    if response.captcha_needed {
        return Err(LoginError::CaptchaRequired.into());
    }

    if response.requires_twofactor {
        return Ok(Step::CodeRequired(GuardCodeKind::TwoFactor));
    }

    if response.emailauth_needed {
        codes.emailsteamid = response.emailsteamid.unwrap_or_default();
        return Ok(Step::CodeRequired(GuardCodeKind::Email));
    }

    if !response.success {
        let message = response.message
            .unwrap_or_else(|| "Login was not successful".into());

        return Err(LoginError::InvalidCredentials(message).into());
    }

    Ok(Step::RedirectsPending(response))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use super::prompt::FixedPrompt;
    use super::rsa_key::tests::key_response;
    use crate::error::Error;
    use crate::helpers::USER_AGENT_STRING;
    use crate::testing::{MockResponse, MockSteam};
    use secrecy::SecretString;
    use serde_json::json;

    pub const STEAMID: u64 = 76561198000000000;
    pub const SESSIONID: &str = "0123456789abcdef01234567";

    pub fn login_success() -> MockResponse {
        MockResponse::json(json!({
            "success": true,
            "requires_twofactor": false,
            "login_complete": true,
            "transfer_urls": [
                "https://store.steampowered.com/login/transfer",
                "https://help.steampowered.com/login/transfer",
            ],
            "transfer_parameters": {
                "steamid": STEAMID.to_string(),
                "token_secure": "secure",
                "auth": "auth",
                "remember_login": true,
                "webcookie": "webcookie",
            },
        }))
    }

    pub fn home_page() -> MockResponse {
        MockResponse::html(&format!(
            r#"<html><script>g_steamID = "{STEAMID}"; g_sessionID = "{SESSIONID}";</script></html>"#,
        ))
    }

    /// Serves a successful login without Steam Guard.
    pub fn respond_login(mock: &MockSteam) {
        mock.respond_always("/login/getrsakey/", key_response());
        mock.respond_always("/login/dologin/", login_success());
        mock.respond_always("/login/transfer", MockResponse::json(json!({ "result": 1 })));
        mock.respond_always("/my/home/", home_page());
    }

    fn negotiator(mock: &Arc<MockSteam>, credentials: Credentials) -> Negotiator {
        let (client, cookies) = mock.client();

        Negotiator::new(
            HttpClient::new(client, cookies),
            Arc::new(credentials),
            Arc::new(FixedPrompt("EMAIL")),
            USER_AGENT_STRING,
            0,
        )
    }

    fn credentials() -> Credentials {
        Credentials::new("user".into(), "hunter2".into())
    }

    fn with_shared_secret() -> Credentials {
        let mut credentials = credentials();

        credentials.shared_secret = Some(SecretString::from("MDEyMzQ1Njc4OWFiY2RlZmdoaWo=".to_string()));
        credentials
    }

    #[tokio::test]
    async fn establishes_session() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);

        let session = negotiator.negotiate().await.unwrap();
        let paths = mock.requests()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect::<Vec<_>>();

        assert_eq!(session.sessionid, SESSIONID);
        assert_eq!(u64::from(session.steamid), STEAMID);
        assert_eq!(negotiator.state(), LoginState::SessionEstablished);
        assert_eq!(paths, vec![
            "/login/getrsakey/",
            "/login/dologin/",
            "/login/transfer",
            "/login/transfer",
            "/my/home/",
        ]);
    }

    #[tokio::test]
    async fn submits_login_form() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);
        negotiator.negotiate().await.unwrap();

        let form = mock.requests_to("/login/dologin/")[0].form();

        assert_eq!(form["username"], "user");
        assert_ne!(form["password"], "hunter2");
        assert_eq!(form["twofactorcode"], "");
        assert_eq!(form["captchagid"], "-1");
        assert_eq!(form["rsatimestamp"], "1631830050000");
        assert_eq!(form["remember_login"], "true");
        assert_eq!(form["loginfriendlyname"], USER_AGENT_STRING);
    }

    #[tokio::test]
    async fn posts_transfer_parameters() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);
        negotiator.negotiate().await.unwrap();

        let transfers = mock.requests_to("/login/transfer");

        assert_eq!(transfers[0].url.host_str(), Some("store.steampowered.com"));
        assert_eq!(transfers[1].url.host_str(), Some("help.steampowered.com"));
        assert_eq!(transfers[0].form()["steamid"], STEAMID.to_string());
        assert_eq!(transfers[0].form()["remember_login"], "true");
    }

    #[tokio::test]
    async fn captcha_fails_without_resubmitting() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);
        mock.respond("/login/dologin/", MockResponse::json(json!({
            "success": false,
            "captcha_needed": true,
            "captcha_gid": "1234",
            "message": "Please verify your humanity.",
        })));

        let error = negotiator.negotiate().await.unwrap_err();

        assert!(matches!(error, Error::Login(LoginError::CaptchaRequired)));
        assert_eq!(mock.requests_to("/login/dologin/").len(), 1);
        assert_eq!(negotiator.state(), LoginState::LoginFailed);
    }

    #[tokio::test]
    async fn retries_with_fresh_key_and_code() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, with_shared_secret());

        respond_login(&mock);
        mock.respond("/login/dologin/", MockResponse::json(json!({
            "success": false,
            "requires_twofactor": true,
        })));

        negotiator.negotiate().await.unwrap();

        let submissions = mock.requests_to("/login/dologin/");

        assert_eq!(mock.requests_to("/login/getrsakey/").len(), 2);
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].form()["twofactorcode"], "");
        assert_eq!(submissions[1].form()["twofactorcode"].len(), 5);
    }

    #[tokio::test]
    async fn prompts_for_code_without_shared_secret() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);
        mock.respond("/login/dologin/", MockResponse::json(json!({
            "success": false,
            "requires_twofactor": true,
        })));

        negotiator.negotiate().await.unwrap();

        let submissions = mock.requests_to("/login/dologin/");

        assert_eq!(submissions[1].form()["twofactorcode"], "EMAIL");
    }

    #[tokio::test]
    async fn rejects_after_three_codes() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, with_shared_secret());

        respond_login(&mock);
        mock.respond_always("/login/dologin/", MockResponse::json(json!({
            "success": false,
            "requires_twofactor": true,
        })));

        let error = negotiator.negotiate().await.unwrap_err();

        assert!(matches!(error, Error::Login(LoginError::TwoFactorRejected { attempts: 3 })));
        assert_eq!(mock.requests_to("/login/dologin/").len(), 4);
    }

    #[tokio::test]
    async fn sends_email_code() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, with_shared_secret());

        respond_login(&mock);
        mock.respond("/login/dologin/", MockResponse::json(json!({
            "success": false,
            "emailauth_needed": true,
            "emailsteamid": STEAMID.to_string(),
        })));

        negotiator.negotiate().await.unwrap();

        let form = mock.requests_to("/login/dologin/")[1].form();

        assert_eq!(form["emailauth"], "EMAIL");
        assert_eq!(form["emailsteamid"], STEAMID.to_string());
        assert_eq!(form["twofactorcode"], "");
    }

    #[tokio::test]
    async fn reports_invalid_credentials() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);
        mock.respond("/login/dologin/", MockResponse::json(json!({
            "success": false,
            "message": "The account name or password that you have entered is incorrect.",
        })));

        let error = negotiator.negotiate().await.unwrap_err();

        assert!(matches!(
            error,
            Error::Login(LoginError::InvalidCredentials(message)) if message.contains("incorrect")
        ));
    }

    #[tokio::test]
    async fn fails_without_transfer_parameters() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);
        mock.respond("/login/dologin/", MockResponse::json(json!({ "success": true })));

        let error = negotiator.negotiate().await.unwrap_err();

        assert!(matches!(error, Error::Login(LoginError::Redirect(_))));
        assert!(mock.requests_to("/my/home/").is_empty());
    }

    #[tokio::test]
    async fn fails_without_session_id() {
        let mock = MockSteam::new();
        let negotiator = negotiator(&mock, credentials());

        respond_login(&mock);
        mock.respond("/my/home/", MockResponse::html("<html></html>"));

        let error = negotiator.negotiate().await.unwrap_err();

        assert!(matches!(error, Error::Login(LoginError::MissingSessionId)));
    }
}
