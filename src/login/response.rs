use std::collections::HashMap;
use serde::Deserialize;
use serde_json::Value;

/// Response from `/login/dologin/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub requires_twofactor: bool,
    #[serde(default)]
    pub captcha_needed: bool,
    #[serde(default)]
    pub emailauth_needed: bool,
    #[serde(default)]
    pub emailsteamid: Option<String>,
    #[serde(default)]
    pub login_complete: bool,
    /// URLs the transfer parameters are posted to in order to set cookies on each domain.
    #[serde(default)]
    pub transfer_urls: Vec<String>,
    #[serde(default)]
    pub transfer_parameters: Option<HashMap<String, Value>>,
}

impl LoginResponse {
    /// The transfer parameters with every value as a string, ready to be posted as a form.
    pub fn transfer_form(&self) -> Option<Vec<(String, String)>> {
        let parameters = self.transfer_parameters.as_ref()?;
        let form = parameters
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    value => value.to_string(),
                };

                (key.clone(), value)
            })
            .collect();

        Some(form)
    }

    /// The SteamID of the account that logged in.
    pub fn steamid(&self) -> Option<u64> {
        match self.transfer_parameters.as_ref()?.get("steamid")? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }
}
