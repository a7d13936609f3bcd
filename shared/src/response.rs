use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;

pub(crate) fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

#[cfg(test)]
pub(crate) fn body_json(resp: &Response<Body>) -> serde_json::Value {
    match resp.body() {
        Body::Text(text) => serde_json::from_str(text).unwrap(),
        Body::Binary(bytes) => serde_json::from_slice(bytes).unwrap(),
        Body::Empty => serde_json::Value::Null,
    }
}
