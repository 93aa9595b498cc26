//! HTTP Basic authentication for the trigger routes.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use sha2::{Digest, Sha256};

use super::AppState;

/// Reject requests whose Basic credentials do not match the configured
/// username and password.
///
/// When no username is configured the check is disabled; startup logs a
/// warning for that case.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected_user = &state.config.server.username;
    let expected_pass = &state.config.server.password;

    if expected_user.is_empty() {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic)
        .map(|(user, pass)| {
            constant_time_eq(&user, expected_user) & constant_time_eq(&pass, expected_pass)
        })
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"feedstash\"")],
            "unauthorized",
        )
            .into_response()
    }
}

/// Decode the username and password out of a Basic authorization header.
fn parse_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Compare fixed-length digests instead of the raw strings so timing
/// does not leak where the inputs diverge.
fn constant_time_eq(given: &str, expected: &str) -> bool {
    Sha256::digest(given.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_basic_header() {
        // "user:pass"
        let parsed = parse_basic("Basic dXNlcjpwYXNz");
        assert_eq!(parsed, Some(("user".to_string(), "pass".to_string())));
    }

    #[test]
    fn password_may_contain_colons() {
        // "user:pa:ss"
        let parsed = parse_basic("Basic dXNlcjpwYTpzcw==");
        assert_eq!(parsed, Some(("user".to_string(), "pa:ss".to_string())));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert_eq!(parse_basic("Bearer abc"), None);
        assert_eq!(parse_basic("Basic !!!not-base64!!!"), None);
        assert_eq!(parse_basic("Basic dXNlcg=="), None); // no colon
    }

    #[test]
    fn digest_comparison_matches_string_equality() {
        assert!(constant_time_eq("secret", "secret"));
        assert!(!constant_time_eq("secret", "secres"));
        assert!(!constant_time_eq("secret", "secret "));
        assert!(constant_time_eq("", ""));
    }
}
