//! One handler per route-table operation.
//!
//! Handlers look up their own `Route` in the contract's table and validate
//! path parameters and bodies with the schemas declared there. Path
//! parameters are checked first: a malformed id is a 400 even on routes
//! whose table only declares a 404.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use todo_core::{
    Contract, CreatePayload, Operation, PathParams, Route, TodoItem, UpdatePayload,
    ValidationError,
};
use uuid::Uuid;

use crate::error::ServerError;
use crate::Db;

/// Resolve the `:id` segment. A segment axum cannot decode is reported
/// like any other malformed id.
fn parse_id(
    route: &Route,
    path: Result<Path<String>, PathRejection>,
) -> Result<Uuid, ServerError> {
    let Path(raw) = path.map_err(|rejection| {
        tracing::debug!(%rejection, "undecodable path parameter");
        ServerError::InvalidInput(ValidationError::single("id", "Invalid uuid"))
    })?;
    let raw = raw.as_str();
    route
        .validate_path(&PathParams::new().with("id", raw))
        .map_err(ServerError::InvalidInput)?;
    Uuid::parse_str(raw)
        .map_err(|e| ServerError::InvalidInput(ValidationError::single("id", e.to_string())))
}

fn parse_body<P: DeserializeOwned>(route: &Route, body: &Bytes) -> Result<P, ServerError> {
    let value: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).map_err(|e| {
            ServerError::InvalidInput(ValidationError::single(
                "body",
                format!("Malformed JSON: {e}"),
            ))
        })?
    };
    let schema = route
        .body()
        .map(|param| param.schema)
        .ok_or_else(|| ServerError::InvalidInput(ValidationError::single("body", "Unexpected body")))?;
    schema.parse(&value).map_err(ServerError::InvalidInput)
}

pub async fn get_all_todos(State(db): State<Db>) -> Json<Vec<TodoItem>> {
    let items = db.read().await.list();
    tracing::debug!(count = items.len(), "listed todos");
    Json(items)
}

pub async fn create_todo<C: Contract>(
    State(db): State<Db>,
    body: Bytes,
) -> Result<Json<TodoItem>, ServerError> {
    let route = C::routes().route(Operation::CreateTodo)?;
    let payload: C::Create = parse_body(route, &body)?;
    let item = payload.into_item();
    db.write().await.insert(item.clone())?;
    tracing::info!(id = %item.id, completed = item.completed, "created todo");
    Ok(Json(item))
}

pub async fn get_todo_by_id<C: Contract>(
    State(db): State<Db>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TodoItem>, ServerError> {
    let route = C::routes().route(Operation::GetTodoById)?;
    let id = parse_id(route, path)?;
    let item = db.read().await.get(id).ok_or(ServerError::NotFound(id))?;
    tracing::debug!(%id, "fetched todo");
    Ok(Json(item))
}

pub async fn update_todo_by_id<C: Contract>(
    State(db): State<Db>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<TodoItem>, ServerError> {
    let route = C::routes().route(Operation::UpdateTodoById)?;
    let id = parse_id(route, path)?;
    let payload: C::Update = parse_body(route, &body)?;
    let item = db
        .write()
        .await
        .update(id, Box::new(move |item: &mut TodoItem| payload.apply(item)))
        .ok_or(ServerError::NotFound(id))?;
    tracing::info!(%id, completed = item.completed, "updated todo");
    Ok(Json(item))
}

pub async fn delete_todo_by_id<C: Contract>(
    State(db): State<Db>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let route = C::routes().route(Operation::DeleteTodoById)?;
    let id = parse_id(route, path)?;
    db.write()
        .await
        .remove(id)
        .ok_or(ServerError::NotFound(id))?;
    tracing::info!(%id, "deleted todo");
    Ok(StatusCode::OK)
}
