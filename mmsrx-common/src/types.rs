use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifier of the SIM subscription a message arrived on
///
/// Carrier settings, relay credentials and the device line number are all
/// looked up per subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub i32);

impl SubscriptionId {
    /// The value used when neither the event nor the configuration names one
    pub const DEFAULT: Self = Self(1);

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for SubscriptionId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
