//! User entity <-> model mapper

use bazaar_core::entities::User;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            email: model.email,
            name: model.name,
            phone: model.phone,
            role: model.role.parse().unwrap_or_default(),
            created_at: model.created_at,
        }
    }
}
