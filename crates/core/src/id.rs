// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource identifiers and ID generation.

use parking_lot::Mutex;
use std::sync::Arc;

/// Define a newtype ID wrapper around `SmolStr` bound to a resource URI prefix.
///
/// Generates `new()`, `as_str()`, `uri()`, `from_uri()`, `Display`,
/// `From<String>`, `From<&str>` and `AsRef<str>`.
///
/// The id itself is the `mu:uuid` value of the resource; the resource URI is
/// `{prefix}{id}`.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId("http://redpencil.data.gift/id/job/");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            pub const URI_PREFIX: &'static str = $prefix;

            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Resource URI for this id.
            pub fn uri(&self) -> String {
                format!("{}{}", Self::URI_PREFIX, self.0)
            }

            /// Recover the id from a resource URI minted with this prefix.
            pub fn from_uri(uri: &str) -> Option<Self> {
                uri.strip_prefix(Self::URI_PREFIX).filter(|s| !s.is_empty()).map(Self::new)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Source of fresh `mu:uuid` values.
pub trait IdGen: Send + Sync + 'static {
    fn next(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic ids (`{prefix}-1`, `{prefix}-2`, ...) for tests and replays.
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<Mutex<u64>>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), counter: Arc::new(Mutex::new(0)) }
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let mut counter = self.counter.lock();
        *counter += 1;
        format!("{}-{}", self.prefix, *counter)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
