//! Resolves the calling user from request headers.
//!
//! Authentication happens upstream; the gateway forwards the verified
//! identity as plain headers:
//!
//! ```text
//! X-User-Id:    user id issued by the identity provider (required)
//! X-User-Name:  display name used in history and activities (optional)
//! X-User-Roles: comma separated roles, e.g. "market,manager" (optional)
//! X-Company-Id: company the user acts for (required)
//! ```

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::domain::foundation::{Caller, CommandMetadata, CompanyId, Role, UserId};

use super::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLES_HEADER: &str = "x-user-roles";
pub const COMPANY_ID_HEADER: &str = "x-company-id";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extractor yielding the resolved [`Caller`] and a request-scoped
/// [`CommandMetadata`].
#[derive(Debug, Clone)]
pub struct CurrentCaller(pub Caller, pub Option<String>);

impl CurrentCaller {
    pub fn metadata(&self) -> CommandMetadata {
        let metadata = CommandMetadata::new(self.0.clone());
        match &self.1 {
            Some(request_id) => metadata.with_correlation_id(request_id.clone()),
            None => metadata,
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_roles(raw: &str) -> Result<Vec<Role>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            r.parse::<Role>()
                .map_err(|_| ApiError::bad_request(format!("unknown role: {}", r)))
        })
        .collect()
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("missing X-User-Id header".to_string()))?;
        let user_id = UserId::new(user_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

        let company = header(parts, COMPANY_ID_HEADER)
            .ok_or_else(|| ApiError::bad_request("missing X-Company-Id header"))?;
        let company = CompanyId::new(company).map_err(|e| ApiError::bad_request(e.to_string()))?;

        let roles = match header(parts, USER_ROLES_HEADER) {
            Some(raw) => parse_roles(raw)?,
            None => Vec::new(),
        };

        let mut caller = Caller::new(user_id, roles, company);
        if let Some(name) = header(parts, USER_NAME_HEADER) {
            caller = caller.with_display_name(name);
        }

        let request_id = header(parts, REQUEST_ID_HEADER).map(str::to_string);
        Ok(CurrentCaller(caller, request_id))
    }
}
