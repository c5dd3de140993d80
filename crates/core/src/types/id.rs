//! Newtype IDs for type-safe entity references.
//!
//! The backend stores documents keyed by 24-character hexadecimal object ids.
//! Use the `define_id!` macro to create wrappers that validate that shape up
//! front and prevent accidentally mixing IDs from different entity types.

use thiserror::Error;

/// Length of a document id in hexadecimal characters.
pub const ID_LENGTH: usize = 24;

/// Errors that can occur when parsing an ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The input has the wrong number of characters.
    #[error("id must be {expected} characters (got {actual})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Length of the rejected input.
        actual: usize,
    },
    /// The input contains a non-hexadecimal character.
    #[error("id contains non-hex character {0:?}")]
    NotHex(char),
}

/// Validate that `s` looks like a document id.
///
/// # Errors
///
/// Returns an [`IdError`] describing the first problem found.
pub fn validate_id(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }

    let actual = s.chars().count();
    if actual != ID_LENGTH {
        return Err(IdError::WrongLength {
            expected: ID_LENGTH,
            actual,
        });
    }

    match s.chars().find(|c| !c.is_ascii_hexdigit()) {
        Some(c) => Err(IdError::NotHex(c)),
        None => Ok(()),
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`, `Deserialize` that validates
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()`, `as_str()`, `Display` and `FromStr`
///
/// IDs are normalized to lowercase so that equality matches the backend.
///
/// # Example
///
/// ```rust
/// # use giftshop_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::parse("65f1c0ffee0000000000abcd").unwrap();
/// assert!(OrderId::parse("not-an-id").is_err());
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = user_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, rejecting anything that is not a 24-character hex string.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is not a valid document id.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                $crate::validate_id(s)?;
                Ok(Self(s.to_ascii_lowercase()))
            }

            /// Get the underlying string.
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

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&raw).map_err(::serde::de::Error::custom)
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
