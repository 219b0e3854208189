//! Newtype IDs for type-safe entity references.
//!
//! Every table in the shop uses a `SERIAL` primary key. Wrapping those keys in
//! distinct types keeps a `CartItemId` from being passed where a `ProductId`
//! is expected, which matters in handlers that take several ids at once.

use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;

/// Define a type-safe `i32` ID wrapper.
///
/// The generated type is `Copy`, serializes as a bare number, parses from a
/// path segment via `FromStr`, and (with the `postgres` feature) binds and
/// decodes as `INTEGER`.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database id.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw database id.
            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// A registered shop account.
    UserId
);
entity_id!(
    /// A catalog category.
    CategoryId
);
entity_id!(
    /// A catalog product.
    ProductId
);
entity_id!(
    /// A line in a user's cart.
    CartItemId
);
entity_id!(
    /// A placed order.
    OrderId
);
entity_id!(
    /// A frozen line of a placed order.
    OrderItemId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_path_segment() {
        let id: ProductId = "42".parse().unwrap();
        assert_eq!(id, ProductId::new(42));
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&OrderId::new(7)).unwrap();
        assert_eq!(json, "7");

        let parsed: CartItemId = serde_json::from_str("13").unwrap();
        assert_eq!(parsed.as_i32(), 13);
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId::new(5).to_string(), "5");
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        let mut ids = vec![ProductId::new(3), ProductId::new(1), ProductId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2), ProductId::new(3)]);
    }
}
