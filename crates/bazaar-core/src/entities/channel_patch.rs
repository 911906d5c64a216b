//! Channel settings updates

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::room::Room;
use super::room_config::{AvatarSettings, RoomConfig, Visibility};
use crate::error::DomainError;

/// Partial update of a channel's title and settings
///
/// Absent fields are left unchanged. An empty description or avatar URL clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub admin_only: Option<bool>,
    pub avatar_url: Option<String>,
    pub avatar_focus_x: Option<f64>,
    pub avatar_focus_y: Option<f64>,
    pub avatar_zoom: Option<f64>,
}

impl ChannelPatch {
    fn touches_access(&self) -> bool {
        self.visibility.is_some() || self.admin_only.is_some()
    }
}

impl Room {
    /// Apply `patch` to a channel
    ///
    /// The main channel keeps its fixed flags whatever the patch says. The
    /// reserved-orders and bug-report rooms refuse visibility and admin-only
    /// changes. Generic channels lose the worker-post and post-target flags.
    pub fn apply_patch(&mut self, patch: &ChannelPatch) -> Result<(), DomainError> {
        if !self.is_channel() {
            return Err(DomainError::ValidationError("only channels can be updated".into()));
        }

        match &mut self.config {
            RoomConfig::ReservedOrders(_) | RoomConfig::BugReports(_) if patch.touches_access() => {
                return Err(DomainError::SystemRoomProtected);
            }
            RoomConfig::Generic(c) => {
                if let Some(visibility) = patch.visibility {
                    c.visibility = visibility;
                }
                if let Some(admin_only) = patch.admin_only {
                    c.admin_only = admin_only;
                }
                c.worker_can_post = false;
                c.is_post_channel = false;
            }
            _ => {}
        }

        if let Some(title) = &patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(DomainError::ValidationError("title must not be empty".into()));
            }
            self.title = Some(title.to_string());
        }

        let shared = self.config.shared_mut();
        if let Some(description) = &patch.description {
            let description = description.trim();
            shared.description = (!description.is_empty()).then(|| description.to_string());
        }

        let current = shared.avatar.clone();
        shared.avatar = AvatarSettings {
            url: match &patch.avatar_url {
                Some(url) => Some(url.trim().to_string()),
                None => current.url,
            },
            focus_x: patch.avatar_focus_x.unwrap_or(current.focus_x),
            focus_y: patch.avatar_focus_y.unwrap_or(current.focus_y),
            zoom: patch.avatar_zoom.unwrap_or(current.zoom),
        }
        .clamped();

        self.updated_at = Utc::now();
        Ok(())
    }

    /// System rooms cannot be deleted
    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if self.is_system() {
            return Err(DomainError::SystemRoomProtected);
        }
        Ok(())
    }

    /// Only ordinary channels carry an editable blacklist
    pub fn ensure_blacklist_editable(&self) -> Result<(), DomainError> {
        if !self.is_channel() {
            return Err(DomainError::ValidationError("blacklists apply to channels only".into()));
        }
        if self.is_system() || self.is_admin_only() {
            return Err(DomainError::SystemRoomProtected);
        }
        Ok(())
    }
}
