use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use http::header;
use uuid::Uuid;
use crate::error::errors::Error;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn generate_request_id_mw(mut req: Request, next: Next) -> Result<impl IntoResponse, Error> {
    let request_id = Uuid::new_v4().to_string();

    let header_value = header::HeaderValue::from_str(&request_id).map_err(|_| Error::server())?;
    req.headers_mut().insert(header::HeaderName::from_static(REQUEST_ID_HEADER), header_value);

    Ok(next.run(req).await)
}
