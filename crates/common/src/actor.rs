use serde::{Deserialize, Serialize};

/// The acting user captured on every domain event.
///
/// Populated from the request context when available. Requests without an
/// authenticated user are recorded as [`Actor::anonymous`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the acting user.
    pub user_id: String,

    /// Display name of the acting user.
    pub user_name: String,

    /// Origin address the request came from.
    pub origin: String,

    /// Client agent string of the request.
    pub user_agent: String,
}

impl Actor {
    /// Creates an actor with all context fields supplied.
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        origin: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            origin: origin.into(),
            user_agent: user_agent.into(),
        }
    }

    /// The actor recorded when no request context is available.
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            user_name: "anonymous".to_string(),
            origin: String::new(),
            user_agent: String::new(),
        }
    }

    /// Returns true if this actor is the anonymous placeholder.
    pub fn is_anonymous(&self) -> bool {
        self.user_id == "anonymous"
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_defaults() {
        let actor = Actor::anonymous();
        assert!(actor.is_anonymous());
        assert_eq!(actor.user_id, "anonymous");
        assert!(actor.origin.is_empty());
        assert!(actor.user_agent.is_empty());
    }

    #[test]
    fn named_actor_is_not_anonymous() {
        let actor = Actor::new("u-42", "Ada", "203.0.113.9", "curl/8.0");
        assert!(!actor.is_anonymous());
        assert_eq!(actor.user_name, "Ada");
    }

    #[test]
    fn actor_serialization_roundtrip() {
        let actor = Actor::new("u-42", "Ada", "203.0.113.9", "curl/8.0");
        let json = serde_json::to_string(&actor).unwrap();
        let deserialized: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(actor, deserialized);
    }
}
