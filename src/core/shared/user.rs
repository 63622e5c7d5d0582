//! Signed-in user as forwarded by the upstream auth proxy.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let id = header(USER_ID_HEADER).ok_or(StatusCode::UNAUTHORIZED)?;
        let email = header(USER_EMAIL_HEADER).unwrap_or_default();
        Ok(Self { id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<CurrentUser, StatusCode> {
        let (mut parts, _) = req.into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_user_from_headers() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "user-1")
            .header(USER_EMAIL_HEADER, "agent@x.com")
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user, CurrentUser::new("user-1", "agent@x.com"));
    }

    #[tokio::test]
    async fn test_missing_user_is_rejected() {
        let req = Request::builder().body(()).unwrap();
        assert_eq!(extract(req).await, Err(StatusCode::UNAUTHORIZED));

        let blank = Request::builder().header(USER_ID_HEADER, "  ").body(()).unwrap();
        assert_eq!(extract(blank).await, Err(StatusCode::UNAUTHORIZED));
    }
}
