//! Logs into Steam, polls received trade offers and confirms them with the mobile
//! confirmation API.
//!
//! ```no_run
//! use steam_trade_session::{SteamClient, Event};
//!
//! # async fn run() -> Result<(), steam_trade_session::Error> {
//! let (client, mut events) = SteamClient::builder("username".into(), "password".into())
//!     .api_key("KEY".into())
//!     .shared_secret("SHARED_SECRET".into())
//!     .identity_secret("IDENTITY_SECRET".into())
//!     .build()?;
//!
//! client.login().await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let Event::TradeReceive(offer) = event {
//!         println!("Offer {} is now {}", offer.tradeofferid, offer.trade_offer_state);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod helpers;
mod serialize;
mod session;
mod client;
mod event;
pub mod api;
pub mod enums;
pub mod error;
pub mod guard;
pub mod http;
pub mod login;
pub mod mobile_api;
pub mod response;
pub mod time;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{SteamClient, SteamClientBuilder};
pub use client::polling::{PollOptions, TradeOfferSnapshot};
pub use event::{Event, Notification};
pub use session::Session;
pub use error::{Error, Result};
pub use enums::{ConfirmationMethod, ConfirmationType, NotificationKind, TradeOfferState};
pub use response::{AcceptedOffer, Confirmation, TradeOffer};
pub use steamid_ng::SteamID;
