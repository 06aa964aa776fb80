use axum::Router;

pub mod departments;
pub mod employees;
pub mod system;

/// Router for the collection endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(employees::router())
        .merge(departments::router())
}
