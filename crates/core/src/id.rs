//! Strongly-typed identifiers and business codes used across the domain.
//!
//! Two families live here:
//!
//! - **Aggregate identifiers**: opaque UUIDs that identify a stream of state
//!   changes (a quotation draft, a quote request).
//! - **Business codes**: the human-facing keys everything is referenced by
//!   externally ("PRD001", "CUST001", "Q2025-001"). Codes are validated on
//!   construction so a non-empty, well-formed code is guaranteed by the type.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an aggregate root.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for AggregateId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<AggregateId> for Uuid {
    fn from(value: AggregateId) -> Self {
        value.0
    }
}

impl FromStr for AggregateId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("AggregateId: {e}")))?;
        Ok(Self(uuid))
    }
}

macro_rules! impl_code_newtype {
    ($t:ident, $name:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            /// Validate and wrap a business code.
            ///
            /// Codes are trimmed and must be non-empty, consisting of ASCII
            /// letters, digits, hyphens and underscores.
            pub fn new(code: impl AsRef<str>) -> Result<Self, DomainError> {
                let code = code.as_ref().trim();
                if code.is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, ": empty code")));
                }
                if !code
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    return Err(DomainError::invalid_id(format!(
                        "{}: invalid character in {code:?}",
                        $name
                    )));
                }
                Ok(Self(code.to_owned()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_code_newtype!(ProductCode, "ProductCode");
impl_code_newtype!(CounterpartyCode, "CounterpartyCode");
impl_code_newtype!(QuoteNumber, "QuoteNumber");
