use steamid_ng::SteamID;

/// An established web session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The session ID. Sent along with state-changing requests.
    pub sessionid: String,
    /// The Steam ID of the user.
    pub steamid: SteamID,
}
