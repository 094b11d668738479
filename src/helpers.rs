use std::sync::Arc;
use reqwest::header;
use reqwest::cookie::CookieStore;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

pub const COMMUNITY_HOSTNAME: &str = "steamcommunity.com";
pub const WEB_API_HOSTNAME: &str = "api.steampowered.com";
pub const STORE_HOSTNAME: &str = "store.steampowered.com";
pub const HELP_HOSTNAME: &str = "help.steampowered.com";
pub const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";

/// Creates a client which stores its cookies in `cookie_store`.
pub fn get_default_client<T>(
    cookie_store: Arc<T>,
    user_agent_string: &'static str,
) -> Result<ClientWithMiddleware, reqwest::Error>
where
    T: CookieStore + 'static,
{
    let mut headers = header::HeaderMap::new();

    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(user_agent_string));

    let client = reqwest::ClientBuilder::new()
        .cookie_provider(cookie_store)
        .default_headers(headers)
        .build()?;

    Ok(ClientBuilder::new(client).build())
}

/// URL for a page on the Steam community.
pub fn community_url(pathname: &str) -> String {
    format!("https://{COMMUNITY_HOSTNAME}{pathname}")
}

/// URL for a Steam Web API method.
pub fn api_url(interface: &str, method: &str, version: usize) -> String {
    format!("https://{WEB_API_HOSTNAME}/{interface}/{method}/v{version}")
}
