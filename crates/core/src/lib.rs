//! `roster-core`: employee and department records.
//!
//! This crate contains **pure domain** types (no storage or HTTP concerns).

pub mod department;
pub mod employee;
pub mod entity;
pub mod error;
pub mod id;

pub use department::Department;
pub use employee::Employee;
pub use entity::Entity;
pub use error::DomainError;
pub use id::{DepartmentId, EmployeeId};
