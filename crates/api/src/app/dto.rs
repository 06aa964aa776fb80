use serde::{Deserialize, Serialize};

use roster_core::{Department, DepartmentId, Employee, EmployeeId};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /employee` and `PUT /employee/:id`. Every field is required.
#[derive(Debug, Deserialize)]
pub struct EmployeeRequest {
    pub id: i64,
    pub name: String,
    pub position: String,
}

impl From<EmployeeRequest> for Employee {
    fn from(body: EmployeeRequest) -> Self {
        Employee::new(EmployeeId::new(body.id), body.name, body.position)
    }
}

/// Body of `POST /department`. `employees` may be omitted.
#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub employees: Vec<i64>,
}

impl From<DepartmentRequest> for Department {
    fn from(body: DepartmentRequest) -> Self {
        Department::new(DepartmentId::new(body.id), body.name)
            .with_employees(body.employees.into_iter().map(EmployeeId::new))
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
