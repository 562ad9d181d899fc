//! Request-scoped base URI for building absolute links.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts, uri::Authority},
};
use std::convert::Infallible;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// `scheme://host` of the current request, as the client addressed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUri {
    scheme: String,
    authority: Authority,
}

impl BaseUri {
    /// `scheme` must be `http` or `https`.
    pub fn new(scheme: &str, authority: &str) -> Option<Self> {
        let scheme = scheme.trim().to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return None;
        }

        let authority = authority.trim().parse::<Authority>().ok()?;
        Some(Self { scheme, authority })
    }

    /// Host from the `Host` header (or the request target's authority),
    /// scheme from the first `X-Forwarded-Proto` value, defaulting to `http`.
    pub fn from_parts(headers: &HeaderMap, uri_authority: Option<&Authority>) -> Option<Self> {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| uri_authority.map(|a| a.to_string()))?;

        let scheme = headers
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("http");

        Self::new(scheme, &host)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        self.authority.as_str()
    }

    /// `scheme://host[:port]` without a trailing slash
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }
}

/// Optional [`BaseUri`] extractor; never rejects.
///
/// `None` when the request carries no usable host, so callers can degrade
/// URL fields instead of failing.
#[derive(Debug, Clone)]
pub struct RequestBase(pub Option<BaseUri>);

impl<S> FromRequestParts<S> for RequestBase
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestBase(BaseUri::from_parts(
            &parts.headers,
            parts.uri.authority(),
        )))
    }
}
