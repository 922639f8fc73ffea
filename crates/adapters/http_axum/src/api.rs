//! JSON REST API.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET`  | `/api/entities` | [`entities::list`] |
//! | `GET`  | `/api/entities/{id}` | [`entities::get`] |
//! | `POST` | `/api/entities/{id}/services/{service}` | [`entities::call_service`] |
//! | `GET`  | `/api/devices` | [`devices::list`] |

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod entities;

use axum::Router;
use axum::routing::{get, post};

use relayhub_app::ports::Integration;

use crate::state::AppState;

/// Routes mounted under `/api`.
pub fn routes<I>() -> Router<AppState<I>>
where
    I: Integration + Send + Sync + 'static,
{
    Router::new()
        .route("/entities", get(entities::list::<I>))
        .route("/entities/{id}", get(entities::get::<I>))
        .route(
            "/entities/{id}/services/{service}",
            post(entities::call_service::<I>),
        )
        .route("/devices", get(devices::list::<I>))
}
