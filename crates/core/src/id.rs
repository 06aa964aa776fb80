//! Strongly-typed identifiers used across the domain.
//!
//! Ids are caller-supplied integers. The system never generates them and does
//! not enforce uniqueness.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an employee.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(i64);

/// Identifier of a department.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $kind:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id($kind, s, e))?;
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(EmployeeId, "employee");
impl_int_newtype!(DepartmentId, "department");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_integers() {
        assert_eq!("42".parse::<EmployeeId>().unwrap(), EmployeeId::new(42));
        assert_eq!("-7".parse::<DepartmentId>().unwrap().get(), -7);
    }

    #[test]
    fn rejects_non_numeric_segments() {
        let err = "abc".parse::<EmployeeId>().unwrap_err();
        match &err {
            DomainError::InvalidId { kind, raw, .. } => {
                assert_eq!(*kind, "employee");
                assert_eq!(raw, "abc");
            }
        }
        assert!(err.to_string().starts_with("invalid employee id \"abc\""));

        assert!("1.5".parse::<DepartmentId>().is_err());
        assert!("".parse::<DepartmentId>().is_err());
        assert!("99999999999999999999".parse::<EmployeeId>().is_err());
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&EmployeeId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: DepartmentId = serde_json::from_str("12").unwrap();
        assert_eq!(back, DepartmentId::new(12));
    }
}
