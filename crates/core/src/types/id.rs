//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing a string ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty or only whitespace.
    #[error("id cannot be empty")]
    Empty,
    /// The input contains a path separator.
    #[error("id cannot contain '/'")]
    ContainsSlash,
}

/// Macro to define a type-safe string ID wrapper.
///
/// Catalog identifiers are opaque strings (often long digit runs that do not
/// fit comfortably in an integer), so IDs wrap a `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()` validation (non-empty, no `/`) and `as_str()`
/// - `Display` and `From<&str>`/`From<String>` conversions
///
/// # Example
///
/// ```rust
/// # use pocket_mall_core::define_id;
/// define_id!(SkuId);
/// define_id!(MallId);
///
/// let sku = SkuId::parse("12345").unwrap();
/// assert_eq!(sku.as_str(), "12345");
///
/// // These are different types, so this won't compile:
/// // let _: MallId = sku;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID from user or API input.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty or contains `/`.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::IdError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdError::Empty);
                }
                if trimmed.contains('/') {
                    return Err($crate::IdError::ContainsSlash);
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);

/// Identifies one browser session's shopper context.
///
/// Generated server-side and stored in the session cookie; also used to
/// namespace durable cart storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopperId(Uuid);

impl ShopperId {
    /// Generate a fresh random shopper ID.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ShopperId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ShopperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hyphenated form doubles as a safe directory name.
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_parse_trims() {
        let id = ProductId::parse("  85067212996 ").unwrap();
        assert_eq!(id.as_str(), "85067212996");
    }

    #[test]
    fn test_product_id_parse_rejects_empty() {
        assert_eq!(ProductId::parse("   "), Err(IdError::Empty));
    }

    #[test]
    fn test_product_id_parse_rejects_slash() {
        assert_eq!(ProductId::parse("a/b"), Err(IdError::ContainsSlash));
    }

    #[test]
    fn test_product_id_serde_transparent() {
        let id = ProductId::from("P1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P1\"");
        let back: ProductId = serde_json::from_str("\"P1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_shopper_id_display_is_hyphenated() {
        let id = ShopperId::from(Uuid::nil());
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }
}
