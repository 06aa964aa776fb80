use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use roster_core::{Employee, EmployeeId};
use roster_infra::Storage;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/employee", post(create_employee).get(list_employees))
        .route(
            "/employee/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

pub async fn create_employee(
    Extension(storage): Extension<Storage>,
    body: Result<Json<dto::EmployeeRequest>, JsonRejection>,
) -> axum::response::Response {
    let employee: Employee = match body {
        Ok(Json(b)) => b.into(),
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match storage.insert_employee(&employee).await {
        Ok(id) => (StatusCode::CREATED, Json(dto::CreatedResponse { id: id.get() })).into_response(),
        Err(e) => errors::storage_error_to_response(e),
    }
}

pub async fn get_employee(
    Extension(storage): Extension<Storage>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => return errors::invalid_path(rejection),
    };
    let id: EmployeeId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match storage.get_employee(id).await {
        Ok(employee) => (StatusCode::OK, Json(employee)).into_response(),
        Err(e) => errors::storage_error_to_response(e),
    }
}

pub async fn list_employees(Extension(storage): Extension<Storage>) -> axum::response::Response {
    match storage.list_employees().await {
        Ok(employees) => (StatusCode::OK, Json(employees)).into_response(),
        Err(e) => errors::storage_error_to_response(e),
    }
}

/// Full replace. An unknown id still answers 200: the store reports zero
/// matches and nothing is written.
pub async fn update_employee(
    Extension(storage): Extension<Storage>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<dto::EmployeeRequest>, JsonRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => return errors::invalid_path(rejection),
    };
    let id: EmployeeId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };
    let employee: Employee = match body {
        Ok(Json(b)) => b.into(),
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match storage.update_employee(id, &employee).await {
        Ok(matched) => {
            if matched == 0 {
                tracing::warn!(employee_id = %id, "update matched no employee");
            }
            (StatusCode::OK, Json(dto::MessageResponse::new("employee updated successfully"))).into_response()
        }
        Err(e) => errors::storage_error_to_response(e),
    }
}

pub async fn delete_employee(
    Extension(storage): Extension<Storage>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => return errors::invalid_path(rejection),
    };
    let id: EmployeeId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match storage.delete_employee(id).await {
        Ok(()) => (StatusCode::OK, Json(dto::MessageResponse::new("employee deleted successfully"))).into_response(),
        Err(e) => errors::storage_error_to_response(e),
    }
}
