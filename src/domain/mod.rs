//! Domain id types for the catalog.
//!
//! Film and user ids travel together through the like and friendship
//! relations, so both get the Newtype treatment to prevent mixing them up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a film.
///
/// Ids are issued by the storage backend's allocator, starting at 1.
/// A non-positive value is never a valid reference; the service layer
/// rejects it before storage is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FilmId(i64);

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i64);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying i64 value.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns true if this id can reference an entity at all.
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i64(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i64::deserialize(deserializer)?;
                Ok(Self::new(id))
            }
        }
    };
}

id_impls!(FilmId);
id_impls!(UserId);
