//! Axum route handlers for employees and scheduling rules.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::roster::models::{Employee, SchedulingRules};
use crate::state::AppState;

/// GET /api/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.roster.employees().await?))
}

#[derive(Debug, Serialize)]
pub struct CreateEmployeeResponse {
    pub message: String,
    pub user: Employee,
}

/// POST /api/employees
///
/// Any `id` in the body is ignored; the server assigns one. The stored record is
/// returned under `user`.
pub async fn handle_create_employee(
    State(state): State<AppState>,
    employee: Result<Json<Employee>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateEmployeeResponse>), AppError> {
    let Json(employee) = employee?;
    validate_employee(&employee)?;
    let user = state.roster.create_employee(employee).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateEmployeeResponse {
            message: "User added successfully".to_string(),
            user,
        }),
    ))
}

/// PATCH /api/employees
///
/// Replaces the stored record whose `id` matches the body.
pub async fn handle_update_employee(
    State(state): State<AppState>,
    employee: Result<Json<Employee>, JsonRejection>,
) -> Result<Json<Employee>, AppError> {
    let Json(employee) = employee?;
    if employee.id.trim().is_empty() {
        return Err(AppError::Validation("id is required".to_string()));
    }
    validate_employee(&employee)?;

    let id = employee.id.clone();
    state
        .roster
        .update_employee(employee)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))
}

/// DELETE /api/employees/:id
pub async fn handle_remove_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.roster.remove_employee(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Employee {id} not found")))
    }
}

/// GET /api/rules
pub async fn handle_get_rules(
    State(state): State<AppState>,
) -> Result<Json<SchedulingRules>, AppError> {
    Ok(Json(state.roster.rules().await?))
}

/// POST /api/rules
pub async fn handle_replace_rules(
    State(state): State<AppState>,
    rules: Result<Json<SchedulingRules>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(rules) = rules?;
    state.roster.replace_rules(rules).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_employee(employee: &Employee) -> Result<(), AppError> {
    if employee.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if employee.shift.start >= employee.shift.end {
        return Err(AppError::Validation(
            "shift must start before it ends".to_string(),
        ));
    }
    Ok(())
}
