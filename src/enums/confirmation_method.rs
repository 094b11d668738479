use num_enum::{TryFromPrimitive, IntoPrimitive};
use serde_repr::{Serialize_repr, Deserialize_repr};
use strum_macros::Display;

/// The method of confirmation.
#[derive(Serialize_repr, Deserialize_repr, Display, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Default)]
#[repr(u8)]
pub enum ConfirmationMethod {
    #[default]
    None = 0,
    Email = 1,
    MobileApp = 2,
}
