//! Shared domain value types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to an uploaded image, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for MediaRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The identity performing a request, as reported by the identity subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(Uuid),
}

impl Viewer {
    pub fn author_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Global,
    Group,
    Profile,
    Subscription,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Global => "global",
            FeedKind::Group => "group",
            FeedKind::Profile => "profile",
            FeedKind::Subscription => "subscription",
        }
    }
}

impl TryFrom<&str> for FeedKind {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "global" | "index" => Ok(FeedKind::Global),
            "group" => Ok(FeedKind::Group),
            "profile" => Ok(FeedKind::Profile),
            "subscription" | "follow" => Ok(FeedKind::Subscription),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewer_has_no_author() {
        assert_eq!(Viewer::default(), Viewer::Anonymous);
        assert!(Viewer::Anonymous.author_id().is_none());

        let id = Uuid::new_v4();
        let viewer = Viewer::Authenticated(id);
        assert!(viewer.is_authenticated());
        assert_eq!(viewer.author_id(), Some(id));
    }

    #[test]
    fn feed_kind_parses_aliases() {
        assert_eq!(FeedKind::try_from("follow"), Ok(FeedKind::Subscription));
        assert_eq!(FeedKind::try_from("index"), Ok(FeedKind::Global));
        assert!(FeedKind::try_from("search").is_err());
    }

    #[test]
    fn media_ref_serializes_as_plain_string() {
        let media = MediaRef::new("posts/small.gif");
        let json = serde_json::to_string(&media).expect("serialize");
        assert_eq!(json, "\"posts/small.gif\"");
    }
}
