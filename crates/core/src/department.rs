use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{DepartmentId, EmployeeId};

/// A department record as stored in the `departments` collection.
///
/// `employees` is an ordered membership list. Duplicates are allowed and ids
/// are never checked against the employees collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub employees: Vec<EmployeeId>,
}

impl Department {
    pub fn new(id: DepartmentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            employees: Vec::new(),
        }
    }

    pub fn with_employees(mut self, employees: impl IntoIterator<Item = EmployeeId>) -> Self {
        self.employees.extend(employees);
        self
    }
}

impl Entity for Department {
    type Id = DepartmentId;
    const KIND: &'static str = "department";

    fn id(&self) -> DepartmentId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employees_default_to_empty() {
        let d: Department = serde_json::from_str(r#"{"id": 4, "name": "R&D"}"#).unwrap();
        assert_eq!(d, Department::new(DepartmentId::new(4), "R&D"));
        assert!(d.employees.is_empty());
    }

    #[test]
    fn membership_keeps_order_and_duplicates() {
        let d = Department::new(DepartmentId::new(1), "Ops").with_employees([
            EmployeeId::new(3),
            EmployeeId::new(1),
            EmployeeId::new(3),
        ]);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["employees"], serde_json::json!([3, 1, 3]));
    }
}
