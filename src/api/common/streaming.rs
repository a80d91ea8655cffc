use axum::response::Response;

/// 200 response for a plain-text fragment stream.
///
/// No `Content-Length` is set, so hyper uses chunked transfer and flushes each
/// fragment as it is yielded.
#[inline]
pub(crate) fn text_stream_response(body: axum::body::Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = http::StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        http::header::CACHE_CONTROL,
        http::HeaderValue::from_static("no-cache"),
    );
    response
}
