//! Typed request parameters.
//!
//! Each extractor parses its slice of the request (path segments or query
//! string) into a structured value before the handler runs, rejecting with
//! 400 and a plain-text body naming the offending field. Handlers receive
//! parsed values directly; there is no request-scoped grab bag to fish
//! values back out of.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway_protocol::{DeploymentId, LeaseId};
use serde::Deserialize;

/// Request rejected before reaching a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRejection(pub String);

impl IntoResponse for ParamRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.0).into_response()
    }
}

#[derive(Deserialize)]
struct LeaseRawPath {
    owner: String,
    dseq: String,
    gseq: String,
    oseq: String,
    provider: String,
}

impl LeaseRawPath {
    fn parse(&self) -> Result<LeaseId, ParamRejection> {
        LeaseId::from_path(&[&self.owner, &self.dseq, &self.gseq, &self.oseq, &self.provider])
            .map_err(|e| ParamRejection(e.to_string()))
    }
}

/// Lease identifier parsed from the request path.
#[derive(Debug, Clone)]
pub struct LeasePath(pub LeaseId);

impl<S: Send + Sync> FromRequestParts<S> for LeasePath {
    type Rejection = ParamRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<LeaseRawPath> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ParamRejection(e.to_string()))?;
        Ok(Self(raw.parse()?))
    }
}

#[derive(Deserialize)]
struct ServiceRawPath {
    owner: String,
    dseq: String,
    gseq: String,
    oseq: String,
    provider: String,
    #[serde(rename = "serviceName")]
    service_name: String,
}

impl ServiceRawPath {
    fn parse_lease(&self) -> Result<LeaseId, ParamRejection> {
        LeaseId::from_path(&[&self.owner, &self.dseq, &self.gseq, &self.oseq, &self.provider])
            .map_err(|e| ParamRejection(e.to_string()))
    }
}

/// Lease identifier plus a validated (non-empty) service name.
#[derive(Debug, Clone)]
pub struct ServiceTarget {
    pub lease: LeaseId,
    pub service: String,
}

impl<S: Send + Sync> FromRequestParts<S> for ServiceTarget {
    type Rejection = ParamRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<ServiceRawPath> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ParamRejection(e.to_string()))?;
        if raw.service_name.is_empty() {
            return Err(ParamRejection("empty service name".into()));
        }
        Ok(Self {
            lease: raw.parse_lease()?,
            service: raw.service_name,
        })
    }
}

#[derive(Deserialize)]
struct DeploymentRawPath {
    owner: String,
    dseq: String,
}

/// Deployment identifier parsed from the request path.
#[derive(Debug, Clone)]
pub struct DeploymentPath(pub DeploymentId);

impl<S: Send + Sync> FromRequestParts<S> for DeploymentPath {
    type Rejection = ParamRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<DeploymentRawPath> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ParamRejection(e.to_string()))?;
        let id = DeploymentId::from_path(&[&raw.owner, &raw.dseq])
            .map_err(|e| ParamRejection(e.to_string()))?;
        Ok(Self(id))
    }
}

/// Query parameters of the log streaming endpoint.
///
/// `follow` defaults to true when the key is absent or has an empty
/// value; callers that want a bounded stream must say `follow=false`
/// explicitly. `tail` absent means no tail limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub follow: bool,
    pub tail: Option<u32>,
}

impl<S: Send + Sync> FromRequestParts<S> for LogQuery {
    type Rejection = ParamRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_log_query(parts.uri.query())
    }
}

/// Parse the raw query string of a logs request.
///
/// Kept separate from the extractor so it can be exercised without HTTP
/// machinery.
pub fn parse_log_query(query: Option<&str>) -> Result<LogQuery, ParamRejection> {
    let mut follow = true;
    let mut tail = None;

    for pair in query.unwrap_or_default().split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "follow" if value.is_empty() => follow = true,
            "follow" => {
                follow = value
                    .parse()
                    .map_err(|_| ParamRejection(format!("invalid follow value: {value}")))?;
            }
            "tail" => {
                tail = Some(
                    value
                        .parse()
                        .map_err(|_| ParamRejection(format!("invalid tail value: {value}")))?,
                );
            }
            _ => {}
        }
    }

    Ok(LogQuery { follow, tail })
}
