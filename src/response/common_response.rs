use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use bytes::{BufMut, BytesMut};
use log::error;
use crate::error::errors::{Error, ErrorCode};
use crate::models::portrait_model::ExtractionResult;
use crate::pipeline::model_config::config::PortraitFormat;

pub type GeneralResponseResult<T> = Result<GeneralResponse<T>, Error>;

pub const PORTRAIT_SUCCESS_MESSAGE: &str = "Portrait extracted successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Body of `POST /extract-portrait`, for both outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct PortraitResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portrait_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portrait_format: Option<PortraitFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl PortraitResponse {
    pub fn failure(message: impl Into<String>, code: ErrorCode) -> Self {
        PortraitResponse {
            success: false,
            message: message.into(),
            portrait_base64: None,
            portrait_format: None,
            dimensions: None,
            error_code: Some(code),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.error_code {
            Some(code) => code.status_code(),
            None => StatusCode::OK,
        }
    }
}

impl From<ExtractionResult> for PortraitResponse {
    fn from(result: ExtractionResult) -> Self {
        match result {
            ExtractionResult::Success(output) => PortraitResponse {
                success: true,
                message: PORTRAIT_SUCCESS_MESSAGE.to_string(),
                portrait_base64: Some(output.portrait_base64),
                portrait_format: Some(output.portrait_format),
                dimensions: Some(Dimensions {
                    width: output.width,
                    height: output.height,
                }),
                error_code: None,
            },
            ExtractionResult::Failure { message, code } => PortraitResponse::failure(message, code),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub version: String,
}

#[derive(Debug)]
pub struct GeneralResponse<T: Serialize> {
    pub data: Option<T>,
    pub status_code: StatusCode,
}

pub struct GeneralResponseBuilder<T: Serialize> {
    pub data: Option<T>,
    pub status_code: StatusCode,
}

impl<T> Default for GeneralResponseBuilder<T>
    where
        T: Serialize,
{
    fn default() -> Self {
        Self {
            data: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T> GeneralResponseBuilder<T>
    where
        T: Serialize,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: T) -> Self {
        self.data = Some(body);
        self
    }

    pub fn status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn build(self) -> GeneralResponse<T> {
        GeneralResponse {
            data: self.data,
            status_code: self.status_code,
        }
    }
}

impl<T> IntoResponse for GeneralResponse<T>
    where
        T: Serialize,
{
    fn into_response(self) -> Response {

        let data = match self.data {
            Some(data) => {data},
            None => return (self.status_code).into_response(),
        };

        let mut bytes = BytesMut::new().writer();
        if let Err(err) = serde_json::to_writer(&mut bytes, &data) {
            error!("Error serializing response body as JSON: {:?}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR).into_response();
        }

        let bytes = bytes.into_inner().freeze();
        let headers = [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()),
        )];

        (self.status_code, headers, bytes).into_response()
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::models::portrait_model::PortraitExtractionOutput;
    use super::*;

    #[test]
    fn test_success_body() {
        let response = PortraitResponse::from(ExtractionResult::Success(PortraitExtractionOutput {
            portrait_base64: "aGVsbG8=".to_string(),
            portrait_format: PortraitFormat::Jpeg,
            width: 300,
            height: 400,
        }));

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "message": "Portrait extracted successfully",
                "portrait_base64": "aGVsbG8=",
                "portrait_format": "JPEG",
                "dimensions": {"width": 300, "height": 400},
            })
        );
    }

    #[test]
    fn test_failure_body_omits_portrait_fields() {
        let response = PortraitResponse::failure("No face detected in the image", ErrorCode::NoFaceDetected);

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "message": "No face detected in the image",
                "error_code": "NO_FACE_DETECTED",
            })
        );
    }

    #[test]
    fn test_failure_status() {
        let response = PortraitResponse::failure("Internal processing error", ErrorCode::InternalError);
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = PortraitResponse::failure("Invalid file or unsupported image type", ErrorCode::InvalidImage);
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
