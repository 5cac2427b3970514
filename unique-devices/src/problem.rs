//! Problem documents returned for every non-2xx outcome.

use crate::errors::DevicesError;
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::{Method, StatusCode, Uri};
use serde::{Deserialize, Serialize};

pub const PROBLEM_TYPE: &str = "about:blank";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub method: String,
    pub uri: String,
}

impl Problem {
    pub fn new(status: StatusCode, detail: impl Into<String>, method: &Method, uri: &Uri) -> Self {
        Problem {
            problem_type: PROBLEM_TYPE.to_string(),
            title: status.canonical_reason().unwrap_or("Unknown").to_string(),
            status: status.as_u16(),
            detail: detail.into(),
            method: method.to_string(),
            uri: request_uri(uri),
        }
    }

    pub fn from_error(err: &DevicesError, method: &Method, uri: &Uri) -> Self {
        Problem::new(err.status(), err.to_string(), method, uri)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Path and query of the request as the client sent it.
pub fn request_uri(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_fields() {
        let uri: Uri = "/metrics/unique-devices/en.wikipedia/all-sites/weekly/20210101/20210201?x=1"
            .parse()
            .unwrap();
        let problem = Problem::from_error(&DevicesError::InvalidGranularity, &Method::GET, &uri);

        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "about:blank",
                "title": "Bad Request",
                "status": 400,
                "detail": "Invalid granularity",
                "method": "GET",
                "uri": "/metrics/unique-devices/en.wikipedia/all-sites/weekly/20210101/20210201?x=1"
            })
        );
    }

    #[test]
    fn test_status_line_matches_body() {
        let problem = Problem::new(StatusCode::NOT_FOUND, "Invalid route", &Method::GET, &Uri::from_static("/nope"));
        let response = problem.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
