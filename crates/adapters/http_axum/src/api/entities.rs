//! JSON REST handlers for entities.

use std::str::FromStr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use relayhub_app::ports::Integration;
use relayhub_domain::entity::Entity;
use relayhub_domain::error::ValidationError;
use relayhub_domain::id::EntityId;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Entity>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and service endpoints.
pub enum GetResponse {
    Ok(Json<Entity>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<EntityId, ApiError> {
    EntityId::from_str(id).map_err(|_| ApiError::from(ValidationError::InvalidId(id.to_string())))
}

/// An empty body means "no service data".
fn parse_data(body: &Bytes) -> Result<serde_json::Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(ApiError::InvalidBody)
}

/// `GET /api/entities`
pub async fn list<I>(State(state): State<AppState<I>>) -> ListResponse
where
    I: Integration + Send + Sync + 'static,
{
    let entities = state.service.entities().list_entities().await;
    ListResponse::Ok(Json(entities))
}

/// `GET /api/entities/{id}`
pub async fn get<I>(
    State(state): State<AppState<I>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    I: Integration + Send + Sync + 'static,
{
    let entity_id = parse_id(&id)?;
    let entity = state.service.entities().get_entity(entity_id).await?;
    Ok(GetResponse::Ok(Json(entity)))
}

/// `POST /api/entities/{id}/services/{service}`
///
/// The optional JSON body is forwarded to the integration as service data.
pub async fn call_service<I>(
    State(state): State<AppState<I>>,
    Path((id, service)): Path<(String, String)>,
    body: Bytes,
) -> Result<GetResponse, ApiError>
where
    I: Integration + Send + Sync + 'static,
{
    let entity_id = parse_id(&id)?;
    let data = parse_data(&body)?;
    let entity = state.service.call_service(entity_id, &service, data).await?;
    Ok(GetResponse::Ok(Json(entity)))
}
