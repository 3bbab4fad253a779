//! HTTP route handlers.

pub mod carts;
pub mod events;
pub mod health;
pub mod metrics;
pub mod products;

use axum::http::HeaderMap;
use common::Actor;

/// Builds the acting-user context from request headers.
///
/// `x-user-id` / `x-user-name` identify the user, `x-forwarded-for` the
/// origin, `user-agent` the client. Requests without a user id record the
/// anonymous actor, with origin and agent still attached.
pub fn actor_from_headers(headers: &HeaderMap) -> Actor {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    let origin = header("x-forwarded-for");
    let user_agent = header("user-agent");
    let user_id = header("x-user-id");

    if user_id.is_empty() {
        let mut actor = Actor::anonymous();
        actor.origin = origin;
        actor.user_agent = user_agent;
        return actor;
    }

    let user_name = match header("x-user-name") {
        name if name.is_empty() => user_id.clone(),
        name => name,
    };

    Actor::new(user_id, user_name, origin, user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn headers_populate_actor() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("u-42"));
        headers.insert("x-user-name", HeaderValue::from_static("Ada"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let actor = actor_from_headers(&headers);
        assert_eq!(actor.user_id, "u-42");
        assert_eq!(actor.user_name, "Ada");
        assert_eq!(actor.origin, "203.0.113.9");
        assert_eq!(actor.user_agent, "curl/8.0");
    }

    #[test]
    fn missing_user_falls_back_to_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let actor = actor_from_headers(&headers);
        assert!(actor.is_anonymous());
        assert_eq!(actor.user_agent, "curl/8.0");
    }

    #[test]
    fn user_name_defaults_to_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("u-42"));

        let actor = actor_from_headers(&headers);
        assert_eq!(actor.user_name, "u-42");
    }
}
