use crate::guard::Tag;
use std::fmt;

/// Operation to act on confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Allow confirmation.
    Allow,
    /// Decline or cancel confirmation.
    Cancel,
}

impl Operation {
    /// The tag the confirmation key for this operation is signed with.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Allow => Tag::Allow,
            Self::Cancel => Tag::Cancel,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}
