use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a string-backed identifier authored alongside course content.
///
/// Content ids come from the authoring system verbatim, so they are kept as
/// opaque strings and compared byte-for-byte.
macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:?})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

content_id!(
    /// Identifier of a course, used to key persisted progress.
    CourseId
);
content_id!(
    /// Identifier of a lesson, unique within its course.
    LessonId
);
content_id!(
    /// Identifier of a quick-check, unique within its lesson.
    QuickCheckId
);
content_id!(
    /// Identifier of an answer option, unique within its quick-check.
    OptionId
);
content_id!(
    /// Identifier of a scenario, unique within its course.
    ScenarioId
);
content_id!(
    /// Identifier of a scenario action, unique within its scenario.
    ActionId
);

/// One run of a learner through a course. Retaking the course mints a new one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Mints a fresh random attempt id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing an `AttemptId` from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse AttemptId from {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for AttemptId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(AttemptId)
            .map_err(|_| ParseIdError { raw: s.to_owned() })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn content_id_display_is_raw_value() {
        assert_eq!(LessonId::new("intro").to_string(), "intro");
        assert_eq!(format!("{:?}", OptionId::new("a")), "OptionId(\"a\")");
    }

    #[test]
    fn content_id_map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(QuickCheckId::new("q1"), 1);
        assert_eq!(map.get("q1"), Some(&1));
        assert_eq!(map.get("q2"), None);
    }

    #[test]
    fn content_id_serializes_transparently() {
        let json = serde_json::to_string(&ScenarioId::new("s-1")).unwrap();
        assert_eq!(json, "\"s-1\"");
        let back: ScenarioId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ScenarioId::new("s-1"));
    }

    #[test]
    fn attempt_id_parses_its_display() {
        let id = AttemptId::generate();
        let parsed: AttemptId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn attempt_id_rejects_garbage() {
        let err = "not-a-uuid".parse::<AttemptId>().unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
    }
}
