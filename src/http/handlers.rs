//! Route handlers.
//!
//! Each request walks the same pipeline: the rate limiter has already
//! admitted it; mutating routes verify the CSRF token, then validate
//! input, then touch the store. HTML routes answer failures with a flash
//! and a redirect; API routes answer with JSON error bodies.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::http::flash::{self, Flash};
use crate::http::render;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::validate;
use crate::store::{Task, TaskFilter};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    pub description: Option<String>,
    pub csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    pub csrf_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub completed: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
    pub total: usize,
}

/// GET `/`: the task listing page.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let filter = TaskFilter::from_query(params.filter.as_deref());
    let tasks = state.store.list(filter);
    let counts = state.store.counts();
    let token = state.csrf.issue();

    let (jar, pending_flash) = flash::take(jar);
    let page = render::index_page(&tasks, filter, &counts, &token, pending_flash.as_ref());
    (jar, Html(page))
}

/// POST `/add_task`: create a task from the page form.
///
/// Always redirects back to the listing; outcomes travel as flashes.
pub async fn add_task(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AddTaskForm>,
) -> (CookieJar, Redirect) {
    let redirect = Redirect::to("/");

    let token = form.csrf_token.as_deref().unwrap_or("");
    if token.is_empty() {
        return (flash::set(jar, Flash::error("CSRF token missing.")), redirect);
    }
    if !state.csrf.verify(token) {
        tracing::warn!("Add rejected: invalid CSRF token");
        return (flash::set(jar, Flash::error("Invalid CSRF token.")), redirect);
    }

    let description = form.description.unwrap_or_default();
    if !validate::validate_description(&description) {
        tracing::warn!("Add rejected: invalid description");
        return (
            flash::set(
                jar,
                Flash::error("Invalid task description. Please use only safe characters."),
            ),
            redirect,
        );
    }

    let task = state.store.add(validate::sanitize_description(&description));
    metrics::record_task_op("add");
    tracing::info!(task_id = task.id, "Task added");

    (flash::set(jar, Flash::success("Task added successfully!")), redirect)
}

/// POST `/toggle_task/{id}`: flip completion state.
pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Json<ToggleResponse>, AppError> {
    verify_csrf(&state, form.csrf_token.as_deref())?;
    let id = checked_task_id(id)?;

    let completed = state.store.toggle(id).ok_or(AppError::NotFound)?;
    metrics::record_task_op("toggle");

    let status = if completed { "completed" } else { "active" };
    tracing::info!(task_id = id, status = status, "Task toggled");

    Ok(Json(ToggleResponse {
        success: true,
        completed,
        message: format!("Task marked as {}", status),
    }))
}

/// POST `/delete_task/{id}`: remove a task.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Json<DeleteResponse>, AppError> {
    verify_csrf(&state, form.csrf_token.as_deref())?;
    let id = checked_task_id(id)?;

    if !state.store.delete(id) {
        return Err(AppError::NotFound);
    }
    metrics::record_task_op("delete");
    tracing::info!(task_id = id, "Task deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
    }))
}

/// GET `/get_tasks`: JSON listing.
pub async fn get_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<TasksResponse> {
    let filter = TaskFilter::from_query(params.filter.as_deref());
    let tasks = state.store.list(filter);
    let total = tasks.len();

    Json(TasksResponse {
        success: true,
        tasks,
        total,
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(render::error_page(404, "Page not found")),
    )
}

fn verify_csrf(state: &AppState, token: Option<&str>) -> Result<(), AppError> {
    let token = token.unwrap_or("");
    if token.is_empty() {
        return Err(AppError::Security("CSRF token missing"));
    }
    if !state.csrf.verify(token) {
        tracing::warn!("Rejected request with invalid CSRF token");
        return Err(AppError::Security("Invalid CSRF token"));
    }
    Ok(())
}

fn checked_task_id(id: i64) -> Result<u64, AppError> {
    if !validate::validate_task_id(id) {
        return Err(AppError::Validation("Invalid Task ID".to_string()));
    }
    Ok(id as u64)
}
