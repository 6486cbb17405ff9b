//! Generic resource endpoints shared by every collection.
//!
//! `resource_routes::<T>()` mounts list/fetch/create/replace/delete for an
//! entity under `/<T::PATH>` and gates methods according to `T::ACCESS`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{Map, Value};

use super::{json_body, ApiResponse, ApiResult};
use crate::auth;
use crate::db::not_found;
use crate::models::{Access, Entity, Record};
use crate::push;
use crate::AppState;

/// Build the five CRUD routes for an entity.
pub fn resource_routes<T: Entity>(state: &AppState) -> Router<AppState> {
    let gate = middleware::from_fn_with_state(state.clone(), auth::require_admin);
    let collection_path = format!("/{}", T::PATH);
    let member_path = format!("/{}/{{id}}", T::PATH);

    let (collection, member) = match T::ACCESS {
        Access::PublicRead => (
            get(list::<T>).merge(post(create::<T>).route_layer(gate.clone())),
            get(fetch::<T>).merge(
                put(replace::<T>)
                    .delete(remove::<T>)
                    .route_layer(gate),
            ),
        ),
        Access::Inbox => (
            post(create::<T>).merge(get(list::<T>).route_layer(gate.clone())),
            get(fetch::<T>)
                .put(replace::<T>)
                .delete(remove::<T>)
                .route_layer(gate),
        ),
    };

    Router::new()
        .route(&collection_path, collection)
        .route(&member_path, member)
}

/// GET /api/<resource> - List all records.
///
/// Collections with a default record get it created on the first read.
#[tracing::instrument(name = "list", skip_all, fields(entity = T::LABEL))]
pub async fn list<T: Entity>(State(state): State<AppState>) -> ApiResult<Vec<Record<T>>> {
    if state.repo.ensure_default::<T>().await? {
        tracing::info!("Created default {} record", T::LABEL);
    }

    let records = state.repo.list::<T>().await?;
    Ok(ApiResponse::ok(records))
}

/// GET /api/<resource>/:id - Get a single record.
#[tracing::instrument(name = "fetch", skip_all, fields(entity = T::LABEL, id = %id))]
pub async fn fetch<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Record<T>> {
    match state.repo.get::<T>(&id).await? {
        Some(record) => Ok(ApiResponse::ok(record)),
        None => Err(not_found::<T>(&id)),
    }
}

/// POST /api/<resource> - Create a new record.
#[tracing::instrument(name = "create", skip_all, fields(entity = T::LABEL))]
pub async fn create<T: Entity>(
    State(state): State<AppState>,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult<Record<T>> {
    let mut fields = json_body(payload)?;
    fields.prepare_new();
    let record = state.repo.create(fields).await?;
    tracing::info!(id = %record.id, "Created {}", T::LABEL);

    // Optional side effect; never fails the request
    if let Some(notification) = record.fields.notification() {
        push::notify_admins(&state.repo, &state.push, &notification).await;
    }

    Ok(ApiResponse::created(record))
}

/// PUT /api/<resource>/:id - Replace a record's fields.
#[tracing::instrument(name = "replace", skip_all, fields(entity = T::LABEL, id = %id))]
pub async fn replace<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Record<T>> {
    let changes = json_body(payload)?;
    let record = state.repo.replace::<T>(&id, changes).await?;
    tracing::info!("Updated {}", T::LABEL);
    Ok(ApiResponse::ok(record))
}

/// DELETE /api/<resource>/:id - Delete a record.
#[tracing::instrument(name = "remove", skip_all, fields(entity = T::LABEL, id = %id))]
pub async fn remove<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete::<T>(&id).await?;
    tracing::info!("Deleted {}", T::LABEL);
    Ok(ApiResponse::message(format!("{} deleted", T::LABEL)))
}
