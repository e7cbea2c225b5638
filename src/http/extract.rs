//! Extractors whose rejections are reported through [`Error`].

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::Error;

/// JSON body extractor and response.
///
/// Malformed or incomplete bodies become [`Error::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameter extractor. Unparseable segments become [`Error::Validation`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        quantity: i32,
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"quantity":"many"}"#))
            .expect("Failed to build request");

        let result = Json::<Payload>::from_request(request, &()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_a_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"quantity":1}"#))
            .expect("Failed to build request");

        let result = Json::<Payload>::from_request(request, &()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
