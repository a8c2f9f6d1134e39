//! Classification of backend responses.
//!
//! Every endpoint answers with JSON, usually `{status, message, data}` but some use
//! `{success, message, ...}` or return a bare array. A response is an error when the
//! HTTP status is >= 400, `status` is `"error"`, or `success` is `false`.

use crate::errors::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Turns a raw response into the payload of a successful call.
///
/// Returns `data` when present, otherwise the whole body.
pub fn classify(http_status: u16, body: &str) -> Result<Value> {
    let failed_status = http_status >= 400;
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) if failed_status => return Err(generic_failure(http_status)),
        Err(e) => {
            return Err(Error::InvalidResponse {
                message: e.to_string(),
            });
        }
    };

    let Value::Object(mut map) = json else {
        if failed_status {
            return Err(generic_failure(http_status));
        }
        return Ok(json);
    };

    let reported_error = map
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("error"))
        || map.get("success").and_then(Value::as_bool) == Some(false);

    if failed_status || reported_error {
        let message = ["message", "error"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map_or_else(|| generic_failure_message(http_status), ToString::to_string);
        return Err(Error::Server {
            status: http_status,
            message,
        });
    }

    Ok(map.remove("data").unwrap_or(Value::Object(map)))
}

/// Decodes a classified payload into `T`.
pub fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| Error::InvalidResponse {
        message: e.to_string(),
    })
}

/// Like [`decode`] but an absent payload becomes `T::default()`.
pub fn decode_or_default<T: DeserializeOwned + Default>(payload: Value) -> Result<T> {
    if payload.is_null() {
        return Ok(T::default());
    }
    decode(payload)
}

fn generic_failure(http_status: u16) -> Error {
    Error::Server {
        status: http_status,
        message: generic_failure_message(http_status),
    }
}

fn generic_failure_message(http_status: u16) -> String {
    format!("Request failed with status {http_status}")
}
