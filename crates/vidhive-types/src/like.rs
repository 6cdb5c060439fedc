use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// A like points at exactly one entity. The tagged variant makes that an
/// enforced invariant instead of three optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "targetKind", content = "targetId", rename_all = "lowercase")]
pub enum LikeTarget {
    Video(ObjectId),
    Comment(ObjectId),
    Tweet(ObjectId),
}

impl LikeTarget {
    /// Stable discriminant used as the `target_kind` column value.
    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Tweet(_) => "tweet",
        }
    }

    pub fn id(&self) -> &ObjectId {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_id_accessors() {
        let id = ObjectId::new();
        let target = LikeTarget::Comment(id.clone());
        assert_eq!(target.kind(), "comment");
        assert_eq!(target.id(), &id);
    }

    #[test]
    fn serializes_as_kind_plus_id() {
        let id: ObjectId = "aabbccddeeff001122334455".parse().unwrap();
        let json = serde_json::to_value(LikeTarget::Video(id)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "targetKind": "video",
                "targetId": "aabbccddeeff001122334455",
            })
        );
    }
}
