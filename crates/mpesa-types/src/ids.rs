//! Opaque entity identifiers
//!
//! Every aggregate is addressed by an opaque id rather than a bidirectional
//! reference, so parent/child relationships (Statement -> TransactionMatch,
//! Landlord -> Tenant) stay one-directional.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(LandlordId);
opaque_id!(TenantId);
opaque_id!(PropertyId);
opaque_id!(IntentId);
opaque_id!(CallbackLogId);
opaque_id!(PaymentHistoryId);
opaque_id!(StatementId);
opaque_id!(MatchId);

/// Daraja's `CheckoutRequestID` correlation key. Not a UUID — Daraja mints
/// this string, so it is stored and compared as an opaque string newtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutRequestId(pub String);

impl fmt::Display for CheckoutRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CheckoutRequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CheckoutRequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
