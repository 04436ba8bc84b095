use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;

/// Machine-readable failure codes returned in the `error_code` field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidFileType,
    MissingFile,
    EmptyFile,
    FileTooLarge,
    InvalidImage,
    NoFaceDetected,
    InternalError,
    NotFound,
    RequestTimeout,
}

impl ErrorCode {
    /// A missing face is a valid outcome of a well-formed request, so it stays 200.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::NoFaceDetected => StatusCode::OK,
            ErrorCode::InvalidFileType
            | ErrorCode::MissingFile
            | ErrorCode::EmptyFile
            | ErrorCode::InvalidImage => StatusCode::BAD_REQUEST,
            ErrorCode::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures raised by the extraction pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("no face detected in the image")]
    NoFaceDetected,

    #[error("crop region is empty: {0}")]
    Crop(String),

    #[error("failed to encode portrait: {0}")]
    Encode(String),
}

impl ExtractionError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ExtractionError::Decode(_) => ErrorCode::InvalidImage,
            ExtractionError::NoFaceDetected => ErrorCode::NoFaceDetected,
            ExtractionError::Crop(_) | ExtractionError::Encode(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to hand back to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            ExtractionError::Decode(_) => "Invalid file or unsupported image type",
            ExtractionError::NoFaceDetected => "No face detected in the image",
            ExtractionError::Crop(_) | ExtractionError::Encode(_) => "Internal processing error",
        }
    }
}

/// Failures raised while loading a cascade classifier file.
#[derive(thiserror::Error, Debug)]
pub enum CascadeError {
    #[error("failed to read cascade file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse cascade xml: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("missing cascade element <{0}>")]
    MissingElement(String),

    #[error("invalid value in <{element}>: {value}")]
    InvalidValue { element: String, value: String },

    #[error("unsupported cascade: {0}")]
    Unsupported(String),

    #[error("inconsistent cascade: {0}")]
    Inconsistent(String),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    BadRequest(#[from] BadRequestError),

    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("{0}")]
    PayloadTooLarge(#[from] PayloadTooLargeError),

    #[error("{0}")]
    Timeout(#[from] TimeoutError),

    #[error("{0}")]
    Server(#[from] ServerError),
}

impl Error {
    fn get_codes(&self) -> (StatusCode, ErrorCode) {
        match self {
            // 4XX Errors
            Error::BadRequest(e) => (StatusCode::BAD_REQUEST, e.code),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            Error::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::FileTooLarge),
            Error::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, ErrorCode::RequestTimeout),

            // 5XX Errors
            Error::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError),
        }
    }

    pub fn bad_request(code: ErrorCode, message: impl Into<String>) -> Self {
        Error::BadRequest(BadRequestError {
            code,
            message: message.into(),
        })
    }

    pub fn not_found() -> Self {
        Error::NotFound(NotFoundError {})
    }

    pub fn payload_too_large() -> Self {
        Error::PayloadTooLarge(PayloadTooLargeError {})
    }

    pub fn timeout() -> Self {
        Error::Timeout(TimeoutError {})
    }

    pub fn server() -> Self {
        Error::Server(ServerError {})
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, code) = self.get_codes();
        let message = self.to_string();
        let body = Json(json!({ "success": false, "message": message, "error_code": code }));

        (status_code, body).into_response()
    }
}

#[derive(thiserror::Error, Debug, Serialize)]
#[error("{message}")]
pub struct BadRequestError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(thiserror::Error, Debug, Serialize)]
#[error("Not found")]
pub struct NotFoundError {}

#[derive(thiserror::Error, Debug, Serialize)]
#[error("Uploaded file is too large")]
pub struct PayloadTooLargeError {}

#[derive(thiserror::Error, Debug, Serialize)]
#[error("Request timed out")]
pub struct TimeoutError {}

#[derive(thiserror::Error, Debug, Serialize)]
#[error("Internal processing error")]
pub struct ServerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serialization() {
        let code = serde_json::to_string(&ErrorCode::NoFaceDetected).unwrap();
        assert_eq!(code, "\"NO_FACE_DETECTED\"");

        let code = serde_json::to_string(&ErrorCode::InvalidImage).unwrap();
        assert_eq!(code, "\"INVALID_IMAGE\"");
    }

    #[test]
    fn test_extraction_error_mapping() {
        let no_face = ExtractionError::NoFaceDetected;
        assert_eq!(no_face.error_code(), ErrorCode::NoFaceDetected);
        assert_eq!(no_face.error_code().status_code(), StatusCode::OK);

        let decode = ExtractionError::Decode("bad magic".to_string());
        assert_eq!(decode.error_code().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(decode.public_message(), "Invalid file or unsupported image type");

        let encode = ExtractionError::Encode("buffer full".to_string());
        assert_eq!(encode.error_code().status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!encode.public_message().contains("buffer"));
    }

    #[test]
    fn test_error_into_response() {
        let response = Error::bad_request(ErrorCode::MissingFile, "No file uploaded").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = Error::server().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = Error::payload_too_large().into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ErrorCode::FileTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = Error::timeout().into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
