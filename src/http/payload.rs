use crate::error::{Error, Result};
use std::fmt;
use lazy_regex::{regex_captures, regex_is_match};
use reqwest::header;
use serde::de::DeserializeOwned;

/// Body Steam answers with when a Web API key is rejected.
const INVALID_API_KEY_BODY: &str = "Access is denied. Retrying will not help. Please verify your <pre>key=</pre> parameter";

/// A response body, parsed according to its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    /// Reads the body of `response`. JSON is only parsed when the response says it is JSON.
    pub async fn from_response(response: reqwest::Response) -> Result<Self> {
        let is_json = response.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|content_type| content_type.starts_with("application/json"))
            .unwrap_or(false);
        let text = response.text().await?;

        if is_json {
            if let Ok(value) = serde_json::from_str(&text) {
                return Ok(Self::Json(value));
            }
        }

        Ok(Self::Text(text))
    }

    /// Deserializes the payload.
    ///
    /// Steam sometimes serves JSON as `text/html`, so text is also tried as JSON. Text which is
    /// not JSON is checked for one of Steam's error or sign-in pages.
    pub fn into_json<D>(self) -> Result<D>
    where
        D: DeserializeOwned,
    {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Text(text) => match serde_json::from_str::<D>(&text) {
                Ok(body) => Ok(body),
                Err(parse_error) => Err(page_error(&text).unwrap_or(Error::Parse(parse_error))),
            },
        }
    }

    /// Consumes the payload into its text. JSON is serialized back into a string.
    pub fn into_text(self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text,
        }
    }

    pub(crate) fn is_invalid_api_key(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim() == INVALID_API_KEY_BODY)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Checks an unexpected HTML page for a known Steam error.
fn page_error(html: &str) -> Option<Error> {
    if regex_is_match!(r#"<h1>Sorry!</h1>"#, html) {
        if let Some((_, message)) = regex_captures!("<h3>(.+)</h3>", html) {
            Some(Error::Response(message.into()))
        } else {
            Some(Error::Response("Unexpected error".into()))
        }
    } else if regex_is_match!(r#"<h1>Sign In</h1>"#, html) && regex_is_match!(r#"g_steamID = false;"#, html) {
        Some(Error::NotLoggedIn)
    } else if let Some((_, message)) = regex_captures!(r#"<div id="error_msg">\s*([^<]+)\s*</div>"#, html) {
        Some(Error::Response(message.trim().into()))
    } else {
        None
    }
}
