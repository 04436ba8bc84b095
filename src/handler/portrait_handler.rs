use axum::debug_handler;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use log::{error, info, warn};
use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::trace::{Span, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use crate::error::errors::{Error, ErrorCode};
use crate::middleware::request_id_mw::REQUEST_ID_HEADER;
use crate::models::portrait_model::PortraitExtractionInput;
use crate::response::common_response::{GeneralResponse, GeneralResponseBuilder, GeneralResponseResult, PortraitResponse};
use crate::state::portrait_state::PortraitState;

const FILE_FIELD: &str = "file";
const TRACER_NAME: &str = env!("CARGO_PKG_NAME");

#[debug_handler(state=PortraitState)]
pub async fn extract_portrait(
    headers: HeaderMap,
    State(state): State<PortraitState>,
    payload: Result<Multipart, MultipartRejection>,
) -> GeneralResponseResult<PortraitResponse> {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let tracer = global::tracer(TRACER_NAME);
    let span = tracer
        .span_builder("portrait-extraction")
        .with_attributes(vec![KeyValue::new("request_id", request_id.clone())])
        .start(&tracer);
    let ctx = Context::new().with_span(span);

    info!("[{request_id}] received portrait extraction request");
    let result = handle_extraction(&state, payload, &request_id, &tracer, &ctx).await;

    let status = match &result {
        Ok(response) => response.status_code,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ctx.span().set_attribute(KeyValue::new("http.response.status_code", status.as_u16() as i64));
    ctx.span().end();
    result
}

async fn handle_extraction(
    state: &PortraitState,
    payload: Result<Multipart, MultipartRejection>,
    request_id: &str,
    tracer: &BoxedTracer,
    ctx: &Context,
) -> GeneralResponseResult<PortraitResponse> {
    let mut child = tracer.start_with_context("read-upload", ctx);
    let mut payload = payload.map_err(|e| {
        warn!("[{request_id}] rejected request body: {e}");
        Error::bad_request(ErrorCode::MissingFile, "No file uploaded")
    })?;

    let im_bytes = match read_file_field(&mut payload, request_id).await {
        Ok(im_bytes) => im_bytes,
        Err(response) => return Ok(response),
    };
    child.set_attribute(KeyValue::new("upload.bytes", im_bytes.len() as i64));
    child.end();

    let mut child = tracer.start_with_context("extract-portrait", ctx);
    let input = PortraitExtractionInput {
        im_bytes,
        request_id: request_id.to_string(),
    };
    let response = PortraitResponse::from(state.portrait_service.extract_portrait(input).await?);
    if let Some(code) = response.error_code {
        child.set_attribute(KeyValue::new("error_code", format!("{:?}", code)));
    }
    child.end();
    info!("[{request_id}] completed portrait extraction, success={}", response.success);

    Ok(GeneralResponseBuilder::new()
        .status_code(response.status_code())
        .body(response)
        .build())
}

/// Pull the upload out of the multipart body, or the ready-made failure response.
async fn read_file_field(payload: &mut Multipart, request_id: &str) -> Result<Bytes, GeneralResponse<PortraitResponse>> {
    loop {
        let field = match payload.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                warn!("[{request_id}] request has no {FILE_FIELD} field");
                return Err(failure(ErrorCode::MissingFile, "No file uploaded"));
            }
            Err(e) => return Err(multipart_failure(e, request_id)),
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|content_type| content_type.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            warn!("[{request_id}] rejected upload with content type {:?}", field.content_type());
            return Err(failure(ErrorCode::InvalidFileType, "Invalid file type. Please upload an image."));
        }

        return match field.bytes().await {
            Ok(data) if data.is_empty() => Err(failure(ErrorCode::EmptyFile, "Uploaded file is empty")),
            Ok(data) => Ok(data),
            Err(e) => Err(multipart_failure(e, request_id)),
        };
    }
}

fn multipart_failure(err: MultipartError, request_id: &str) -> GeneralResponse<PortraitResponse> {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("[{request_id}] upload exceeds the size limit: {err}");
        return failure(ErrorCode::FileTooLarge, "Uploaded file is too large");
    }

    error!("[{request_id}] failed to read multipart body: {err}");
    failure(ErrorCode::MissingFile, "No file uploaded")
}

fn failure(code: ErrorCode, message: &str) -> GeneralResponse<PortraitResponse> {
    let response = PortraitResponse::failure(message, code);
    GeneralResponseBuilder::new()
        .status_code(response.status_code())
        .body(response)
        .build()
}
