use super::JimakuProvider;
use crate::error::{Error, Result};
use crate::ratelimit::{Attempt, RESET_AFTER_HEADER, reset_delay, with_backoff};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error};

impl JimakuProvider {
    /// GET `{api_url}/{path}` and return the parsed body, `None` for no result
    ///
    /// Results (including "no result") are memoized per path. Errors are not.
    pub(crate) async fn fetch(&self, path: &str) -> Result<Option<Value>> {
        if let Some(cached) = self.responses.lock().await.get(path) {
            debug!(path, "serving catalog response from memo");
            return Ok(cached.clone());
        }

        let session = self.session()?;
        let config = &self.config.rate_limit;
        let url = format!("{}/{}", self.config.api_base(), path);
        let url = url.as_str();

        let data = with_backoff(config, || async move {
            let response = session.get(url).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let header = response
                    .headers()
                    .get(RESET_AFTER_HEADER)
                    .and_then(|value| value.to_str().ok());
                return Ok(Attempt::RateLimited(reset_delay(header, config)));
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(Error::Authentication(
                    "unauthorized, api key possibly invalid".to_string(),
                ));
            }
            if !status.is_success() {
                return Err(Error::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = response.bytes().await?;
            Ok::<_, Error>(Attempt::Done(interpret_body(path, &body)?))
        })
        .await?;

        self.responses
            .lock()
            .await
            .insert(path.to_string(), data.clone());
        Ok(data)
    }
}

/// Map a successful response body to a result
///
/// Empty bodies, empty collections and payloads with an `error` field all mean
/// "no result".
pub(crate) fn interpret_body(path: &str, body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        error!(path, "catalog returned an empty body");
        return Ok(None);
    }

    let data: Value = serde_json::from_slice(body)?;
    let empty = match &data {
        Value::Object(map) if map.contains_key("error") => {
            let message = map.get("error").unwrap_or(&Value::Null);
            let code = map.get("code").unwrap_or(&Value::Null);
            error!(
                path,
                error_message = %message,
                error_code = %code,
                "catalog returned an error for our query"
            );
            return Ok(None);
        }
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Null => true,
        _ => false,
    };

    if empty {
        error!(path, "catalog returned no items for our query");
        return Ok(None);
    }

    debug!(path, items = ?data.as_array().map(Vec::len), "catalog response");
    Ok(Some(data))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_no_result() {
        assert_eq!(interpret_body("p", b"").unwrap(), None);
        assert_eq!(interpret_body("p", b" \n").unwrap(), None);
        assert_eq!(interpret_body("p", b"[]").unwrap(), None);
        assert_eq!(interpret_body("p", b"{}").unwrap(), None);
        assert_eq!(interpret_body("p", b"null").unwrap(), None);
    }

    #[test]
    fn error_payload_is_no_result() {
        let body = br#"{"error": "Entry not found", "code": 404}"#;
        assert_eq!(interpret_body("entries/1/files", body).unwrap(), None);
    }

    #[test]
    fn data_is_returned() {
        let body = br#"[{"id": 1, "name": "x"}]"#;
        assert_eq!(
            interpret_body("p", body).unwrap(),
            Some(json!([{"id": 1, "name": "x"}]))
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = interpret_body("p", b"<html>").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
