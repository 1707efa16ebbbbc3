//! Numeric identifiers used across the action layer.
//!
//! Patients and personnel share a single medical identification number (MID) space, so both
//! are represented by [`Mid`]. Records, office visits and appointment requests each get their
//! own newtype so they cannot be swapped by accident at a call site.

use crate::{ClinicError, ClinicResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            /// Parses an identifier supplied as free text (CLI arguments, form fields).
            pub fn parse(input: &str) -> ClinicResult<Self> {
                input.trim().parse::<u64>().map(Self).map_err(|_| {
                    ClinicError::InvalidInput(format!("{} is not a valid {}", input.trim(), $label))
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ClinicError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Medical identification number of a patient or a member of personnel.
    Mid,
    "MID"
);
numeric_id!(
    /// Identifier of a persisted health record. Assigned by the record store.
    RecordId,
    "record ID"
);
numeric_id!(OfficeVisitId, "office visit ID");
numeric_id!(RequestId, "appointment request ID");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(Mid::parse(" 42 ").unwrap(), Mid::new(42));
    }

    #[test]
    fn parse_rejects_non_numeric_input() {
        let err = Mid::parse("abc").expect_err("expected parse failure");
        assert!(matches!(err, ClinicError::InvalidInput(msg) if msg == "abc is not a valid MID"));
    }

    #[test]
    fn parse_rejects_negative_numbers() {
        assert!(RequestId::parse("-7").is_err());
    }
}
