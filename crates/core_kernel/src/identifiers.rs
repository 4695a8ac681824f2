//! Strongly-typed identifiers for persisted entities
//!
//! Every row in the system of record carries a numeric key. Wrapping those keys
//! in newtypes keeps an application id from being passed where a status id is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw persisted key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw persisted key
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns a human readable label for log and error messages
            pub fn label() -> &'static str {
                $label
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
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(ApplicationId, "application");
define_id!(LoanTypeId, "loan type");
define_id!(StatusId, "status");
define_id!(ApplicantProfileId, "applicant");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_number() {
        assert_eq!(ApplicationId::new(42).to_string(), "42");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: StatusId = " 7 ".parse().unwrap();
        assert_eq!(id, StatusId::new(7));
        assert!("seven".parse::<StatusId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&LoanTypeId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: LoanTypeId = serde_json::from_str("3").unwrap();
        assert_eq!(back.value(), 3);
    }
}
