use crate::errors::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

/// Header the upstream identity provider sets once a user is signed in.
pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers)
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized("Sign in to continue."))
    }
}

pub fn user_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn blank_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_from_headers(&headers), None);

        headers.insert(USER_HEADER, HeaderValue::from_static("   "));
        assert_eq!(user_from_headers(&headers), None);

        headers.insert(USER_HEADER, HeaderValue::from_static(" user-1 "));
        assert_eq!(user_from_headers(&headers).as_deref(), Some("user-1"));
    }
}
