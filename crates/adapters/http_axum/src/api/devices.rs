//! JSON REST handlers for devices.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use relayhub_app::ports::Integration;
use relayhub_domain::device::Device;

use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<I>(State(state): State<AppState<I>>) -> ListResponse
where
    I: Integration + Send + Sync + 'static,
{
    let devices = state.service.entities().list_devices().await;
    ListResponse::Ok(Json(devices))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::router::build;
    use crate::testing::test_state;

    #[tokio::test]
    async fn should_list_registered_devices() {
        let (state, _) = test_state().await;
        let app = build(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/devices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let devices: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(devices.as_array().unwrap().len(), 1);
        assert_eq!(devices[0]["name"], "Stub board");
        assert_eq!(devices[0]["integration"], "stub");
    }
}
