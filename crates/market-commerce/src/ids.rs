//! Newtype IDs for type-safe identifiers.
//!
//! The host platform hands out opaque string identifiers. Wrapping them keeps a
//! `ChannelId` from being passed where a `ShippingMethodId` is expected.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(generate_id())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Compare two IDs using [`natural_cmp`].
            pub fn natural_cmp(&self, other: &Self) -> Ordering {
                natural_cmp(&self.0, &other.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Seller scoping
define_id!(ChannelId);
define_id!(SellerId);

// Orders
define_id!(OrderId);
define_id!(OrderLineId);
define_id!(ShippingLineId);
define_id!(SurchargeId);
define_id!(PaymentId);

// Catalog
define_id!(ProductId);
define_id!(VariantId);
define_id!(ShippingMethodId);
define_id!(StockLocationId);
define_id!(PaymentMethodId);
define_id!(ZoneId);
define_id!(TaxCategoryId);
define_id!(TaxRateId);

// Access
define_id!(UserId);
define_id!(RoleId);
define_id!(AdministratorId);
define_id!(CustomerId);

/// Natural ordering for host identifiers.
///
/// Numeric identifiers compare by value (`"2" < "10"`); anything else falls
/// back to plain string ordering. A numeric identifier sorts before a
/// non-numeric one.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u128>(), b.parse::<u128>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Generate a unique ID using timestamp and a process-wide counter.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    format!("{:x}{:04x}", timestamp, counter & 0xffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ChannelId::new("chan-123");
        assert_eq!(id.as_str(), "chan-123");
    }

    #[test]
    fn test_id_generation() {
        let id1 = OrderId::generate();
        let id2 = OrderId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = ShippingMethodId::new("7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_natural_cmp_numeric() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "10"), Ordering::Equal);
        assert_eq!(natural_cmp("11", "3"), Ordering::Greater);
    }

    #[test]
    fn test_natural_cmp_mixed() {
        assert_eq!(natural_cmp("9", "abc"), Ordering::Less);
        assert_eq!(natural_cmp("b", "a"), Ordering::Greater);
        assert_eq!(
            ChannelId::new("seller-2").natural_cmp(&ChannelId::new("seller-10")),
            Ordering::Greater
        );
    }
}
