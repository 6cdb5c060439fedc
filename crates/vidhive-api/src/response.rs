use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

/// Success envelope: `{ status, statusCode, data, message }`.
pub struct ApiResponse<T: Serialize> {
    code: StatusCode,
    data: T,
    message: &'static str,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(code: StatusCode, data: T, message: &'static str) -> Self {
        Self { code, data, message }
    }

    pub fn ok(data: T, message: &'static str) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: &'static str) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "success",
            "statusCode": self.code.as_u16(),
            "data": self.data,
            "message": self.message,
        });
        (self.code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn envelope_shape() {
        let response = ApiResponse::created(json!({"id": 1}), "Created").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["message"], "Created");
    }
}
