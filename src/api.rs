//! JSON endpoint running the same query as the page

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;

use crate::TempGraphError;
use crate::chart::LineChart;
use crate::web::{AppState, BUSY_MESSAGE, SearchParams};

#[derive(Serialize)]
pub struct ApiSuccess<'a> {
    pub state: &'static str,
    pub chart: &'a LineChart,
}

#[derive(Serialize)]
pub struct ApiError {
    pub state: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            state: "error",
            message: message.into(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/forecast", get(get_forecast))
}

fn status_for(err: &TempGraphError) -> StatusCode {
    match err {
        TempGraphError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TempGraphError::NotFound { .. } => StatusCode::NOT_FOUND,
        TempGraphError::Network { .. } | TempGraphError::MalformedResponse { .. } => {
            StatusCode::BAD_GATEWAY
        }
        TempGraphError::Render { .. }
        | TempGraphError::Template { .. }
        | TempGraphError::Config { .. }
        | TempGraphError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(mut session) = state.try_session() else {
        return (StatusCode::CONFLICT, Json(ApiError::new(BUSY_MESSAGE))).into_response();
    };

    let city = params.city.unwrap_or_default();
    let outcome = session.search(&city).await.map(|_| ());

    match outcome {
        Ok(()) => match session.chart() {
            Some(resource) => Json(ApiSuccess {
                state: "success",
                chart: resource.chart(),
            })
            .into_response(),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("No se pudo dibujar la gráfica.")),
            )
                .into_response(),
        },
        Err(err) => (status_for(&err), Json(ApiError::new(err.user_message()))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TempGraphError::validation("x"), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(TempGraphError::not_found("x"), StatusCode::NOT_FOUND)]
    #[case(TempGraphError::network("x"), StatusCode::BAD_GATEWAY)]
    #[case(TempGraphError::malformed("x"), StatusCode::BAD_GATEWAY)]
    #[case(TempGraphError::render("x"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(TempGraphError::template("x"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_for(#[case] err: TempGraphError, #[case] expected: StatusCode) {
        assert_eq!(status_for(&err), expected);
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ApiError::new("boom")).unwrap();
        assert_eq!(body, serde_json::json!({"state": "error", "message": "boom"}));
    }
}
