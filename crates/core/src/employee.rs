use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::EmployeeId;

/// An employee record as stored in the `employees` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub position: String,
}

impl Employee {
    pub fn new(id: EmployeeId, name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: position.into(),
        }
    }
}

impl Entity for Employee {
    type Id = EmployeeId;
    const KIND: &'static str = "employee";

    fn id(&self) -> EmployeeId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn json_shape_matches_wire_format() {
        let e = Employee::new(EmployeeId::new(1), "A", "eng");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v, serde_json::json!({"id": 1, "name": "A", "position": "eng"}));
    }

    #[test]
    fn missing_fields_are_rejected() {
        let res: Result<Employee, _> = serde_json::from_str(r#"{"id": 1, "name": "A"}"#);
        assert!(res.is_err());
        let res: Result<Employee, _> =
            serde_json::from_str(r#"{"id": "1", "name": "A", "position": "eng"}"#);
        assert!(res.is_err());
    }

    proptest! {
        #[test]
        fn json_round_trip_preserves_record(id in any::<i64>(), name in ".*", position in ".*") {
            let e = Employee::new(EmployeeId::new(id), name, position);
            let back: Employee = serde_json::from_value(serde_json::to_value(&e).unwrap()).unwrap();
            prop_assert_eq!(back, e);
        }
    }
}
