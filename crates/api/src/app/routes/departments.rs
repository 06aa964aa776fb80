use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use roster_core::{Department, DepartmentId, EmployeeId};
use roster_infra::Storage;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/department", post(create_department))
        .route("/department/:id", get(get_department).delete(delete_department))
        .route(
            "/department/:department_id/employee/:employee_id",
            put(add_employee_to_department),
        )
}

pub async fn create_department(
    Extension(storage): Extension<Storage>,
    body: Result<Json<dto::DepartmentRequest>, JsonRejection>,
) -> axum::response::Response {
    let department: Department = match body {
        Ok(Json(b)) => b.into(),
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match storage.insert_department(&department).await {
        Ok(id) => (StatusCode::CREATED, Json(dto::CreatedResponse { id: id.get() })).into_response(),
        Err(e) => errors::storage_error_to_response(e),
    }
}

pub async fn get_department(
    Extension(storage): Extension<Storage>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => return errors::invalid_path(rejection),
    };
    let id: DepartmentId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match storage.get_department(id).await {
        Ok(department) => (StatusCode::OK, Json(department)).into_response(),
        Err(e) => errors::storage_error_to_response(e),
    }
}

pub async fn delete_department(
    Extension(storage): Extension<Storage>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => return errors::invalid_path(rejection),
    };
    let id: DepartmentId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match storage.delete_department(id).await {
        Ok(()) => (StatusCode::OK, Json(dto::MessageResponse::new("department deleted successfully"))).into_response(),
        Err(e) => errors::storage_error_to_response(e),
    }
}

/// Neither id is checked for existence; an unknown department answers 200
/// and nothing is written.
pub async fn add_employee_to_department(
    Extension(storage): Extension<Storage>,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> axum::response::Response {
    let Path((department_id, employee_id)) = match ids {
        Ok(p) => p,
        Err(rejection) => return errors::invalid_path(rejection),
    };
    let department_id: DepartmentId = match department_id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };
    let employee_id: EmployeeId = match employee_id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match storage.add_employee_to_department(department_id, employee_id).await {
        Ok(matched) => {
            if matched == 0 {
                tracing::warn!(%department_id, %employee_id, "append matched no department");
            }
            (
                StatusCode::OK,
                Json(dto::MessageResponse::new("employee added to department successfully")),
            )
                .into_response()
        }
        Err(e) => errors::storage_error_to_response(e),
    }
}
