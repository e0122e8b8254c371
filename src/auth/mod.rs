//! Trusted-proxy authentication.
//!
//! The service runs behind an authenticating proxy that resolves the caller
//! and forwards their user ID in a configurable request header. The extractor
//! trusts that header; requests without it (or with a malformed UUID) are
//! rejected as unauthenticated before any handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::types::UserId;
use crate::AppState;

/// The authenticated caller, resolved from the trusted proxy header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let header_name = &state.config.auth.header_name;

        let raw = parts
            .headers
            .get(header_name)
            .ok_or_else(|| Error::Unauthenticated {
                message: Some(format!("Missing {header_name} header")),
            })?
            .to_str()
            .map_err(|_| Error::Unauthenticated {
                message: Some(format!("Invalid {header_name} header encoding")),
            })?;

        let id = Uuid::parse_str(raw).map_err(|_| Error::Unauthenticated {
            message: Some(format!("Invalid user ID in {header_name} header")),
        })?;

        trace!(user_id = %id, "authenticated via proxy header");
        Ok(CurrentUser { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CurrentUser> {
        let state = crate::test_state();
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-offerlens-user", value);
        }
        let request = builder.body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        CurrentUser::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn test_valid_header_resolves_user() {
        let id = Uuid::new_v4();
        let user = extract(Some(&id.to_string())).await.expect("extraction should succeed");
        assert_eq!(user.id, id);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthenticated() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_malformed_uuid_is_unauthenticated() {
        let err = extract(Some("not-a-uuid")).await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));
    }
}
