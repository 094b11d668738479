//! The transport shared by every component. All requests go through [`HttpClient::send`], which
//! retries server errors and maps failing statuses to errors.

mod payload;

pub use payload::Payload;

use crate::error::{Error, LoginError, ParameterError, Result};
use crate::helpers::{COMMUNITY_HOSTNAME, HELP_HOSTNAME, STORE_HOSTNAME};
use std::sync::Arc;
use std::time::Duration;
use reqwest::{StatusCode, Url};
use reqwest::cookie::Jar;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};

/// Cookies which carry a logged in session.
const SESSION_COOKIES: &[&str] = &["sessionid", "steamLoginSecure", "steamRememberLogin"];
/// Hosts a login leaves session cookies on.
const SESSION_HOSTNAMES: &[&str] = &[COMMUNITY_HOSTNAME, STORE_HOSTNAME, HELP_HOSTNAME];

/// Most attempts made for a single request.
pub const MAX_ATTEMPTS: u32 = 5;

/// How long to wait after a server error on the given attempt (counting from 0).
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 + 2 * attempt as u64)
}

/// A client along with the cookies it stores its session in.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ClientWithMiddleware,
    cookies: Arc<Jar>,
}

impl HttpClient {
    pub fn new(client: ClientWithMiddleware, cookies: Arc<Jar>) -> Self {
        Self {
            client,
            cookies,
        }
    }

    /// Starts a GET request.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Starts a POST request.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Expires the session cookies on every Steam host. Other cookies are kept.
    pub fn expire_session_cookies(&self) {
        for hostname in SESSION_HOSTNAMES {
            let Ok(url) = Url::parse(&format!("https://{hostname}/")) else {
                continue;
            };

            for name in SESSION_COOKIES {
                self.cookies.add_cookie_str(
                    &format!("{name}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/"),
                    &url,
                );
            }
        }
    }

    /// Sends a request.
    ///
    /// A 2xx response returns its payload. 500 and 502 responses are retried after
    /// [`backoff_delay`], up to [`MAX_ATTEMPTS`] attempts. Any other status fails immediately.
    pub async fn send(&self, request: RequestBuilder) -> Result<Payload> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        let mut last_failure = None;

        for attempt in 0..MAX_ATTEMPTS {
            let request = request.try_clone()
                .ok_or(ParameterError::UncloneableRequest)?;
            let response = self.client.execute(request).await?;
            let status = response.status();

            log::debug!("{method} {} has returned {status}", url.path());

            let payload = Payload::from_response(response).await?;

            if payload.is_invalid_api_key() {
                return Err(LoginError::InvalidCredentials("Invalid API key".into()).into());
            }

            if status.is_success() {
                return Ok(payload);
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => return Err(Error::TooManyRequests),
                StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY => {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                    last_failure = Some((status, payload));
                },
                StatusCode::FORBIDDEN => return Err(Error::Forbidden(payload.into_text())),
                StatusCode::NOT_FOUND => return Err(Error::NotFound(payload.into_text())),
                status => return Err(Error::Http {
                    status,
                    message: payload.into_text(),
                }),
            }
        }

        let (status, payload) = last_failure
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, Payload::Text(String::new())));

        log::debug!("{method} {} failed after {MAX_ATTEMPTS} attempts", url.path());

        Err(Error::Http {
            status,
            message: payload.into_text(),
        })
    }
}
