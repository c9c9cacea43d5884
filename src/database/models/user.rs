use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::store::Document;

pub const COLLECTION: &str = "users";

/// Stored account. Users own records but are not owner-scoped themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        Ok(Document {
            id: self.id,
            owner_id: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
            body: serde_json::to_value(self)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_omits_password_hash() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Demo User".into(),
            email: "demo@example.com".into(),
            password_hash: "$argon2id$...".into(),
            created_at: now,
            updated_at: now,
        };
        let stored = user.to_document().unwrap();
        assert!(stored.body.get("passwordHash").is_some());
        assert!(stored.owner_id.is_none());

        let public = serde_json::to_value(user.profile()).unwrap();
        assert!(public.get("passwordHash").is_none());
        assert_eq!(public["email"], "demo@example.com");
    }
}
