use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde_json::json,
    thiserror::Error,
    tracing::error,
};

use {websteer_agents::AgentRunError, websteer_session::SessionError, websteer_storage::StorageError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("session provisioning failed: {0}")]
    Provisioning(#[from] SessionError),

    #[error("agent run failed: {0}")]
    AgentRun(#[from] AgentRunError),

    #[error("artifact publishing failed: {0}")]
    Storage(#[from] StorageError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Provisioning(_) | Self::AgentRun(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_unprocessable_entity() {
        let error = GatewayError::Validation("input must not be empty".into());
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let error = GatewayError::Provisioning(SessionError::Rejected {
            status: 503,
            body: "at capacity".into(),
        });
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);

        let error = GatewayError::AgentRun(AgentRunError::EngineFault("crash".into()));
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn storage_failures_are_internal() {
        let error = GatewayError::Storage(StorageError::Request("bucket gone".into()));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
