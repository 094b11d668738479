use secrecy::SecretString;

/// Everything needed to log in. The password and secrets are redacted from `Debug` output.
#[derive(Debug)]
pub struct Credentials {
    /// The account name.
    pub username: String,
    /// The account password.
    pub password: SecretString,
    /// The shared secret for generating Steam Guard codes. When absent, codes are prompted for.
    pub shared_secret: Option<SecretString>,
    /// The identity secret. Required for mobile confirmations.
    pub identity_secret: Option<SecretString>,
    /// Steam Web API key. Required for fetching trade offers.
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password: SecretString::from(password),
            shared_secret: None,
            identity_secret: None,
            api_key: None,
        }
    }
}
