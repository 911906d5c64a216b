//! User entity - the profile fields this core reads

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::{Identity, Role};

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }

    /// Name if set, otherwise the email
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}
