//! Message entity - user and system messages in a room

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::{Identity, Role};

/// Maximum length of a chat message
pub const MESSAGE_TEXT_MAX: usize = 4000;

/// Maximum length of a bug report
pub const BUG_REPORT_TEXT_MAX: usize = 5000;

/// Tags of system-generated messages that carry special rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    CatalogProduct,
    ReservedOrderItem,
    BugReport,
}

impl MetaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CatalogProduct => "catalog_product",
            Self::ReservedOrderItem => "reserved_order_item",
            Self::BugReport => "bug_report",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "catalog_product" => Some(Self::CatalogProduct),
            "reserved_order_item" => Some(Self::ReservedOrderItem),
            "bug_report" => Some(Self::BugReport),
            _ => None,
        }
    }
}

/// Scope of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeleteScope {
    /// Hide for the caller only
    Me,
    /// Remove for everyone
    #[default]
    All,
}

/// Message entity
///
/// `meta` is kept as raw JSON: system payloads, the hidden-for list, and the
/// edit stamp all live there, and older rows may carry keys this version does
/// not know about.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub text: String,
    pub meta: Value,
    pub client_msg_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Raw `meta.kind`, trimmed; empty kinds count as absent
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.meta
            .get("kind")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    #[must_use]
    pub fn meta_kind(&self) -> Option<MetaKind> {
        self.kind().and_then(MetaKind::parse)
    }

    /// Any tagged message is system-generated
    #[inline]
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.kind().is_some()
    }

    #[must_use]
    pub fn is_hidden_for(&self, user_id: Uuid) -> bool {
        let needle = user_id.to_string();
        self.meta
            .get("hidden_for")
            .and_then(Value::as_array)
            .is_some_and(|ids| ids.iter().any(|v| v.as_str() == Some(needle.as_str())))
    }

    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.meta.get("edited").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Only the sender may edit, and only user messages
    pub fn ensure_editable_by(&self, caller: &Identity) -> Result<(), DomainError> {
        if self.is_system() {
            return Err(DomainError::SystemMessageImmutable);
        }
        if self.sender_id != Some(caller.user_id) {
            return Err(DomainError::NotMessageSender);
        }
        Ok(())
    }

    /// Gate for a delete with scope `all`
    ///
    /// Catalog posts need admin/creator. Other system messages can only be
    /// force-deleted by a creator. User messages go to their sender or staff.
    pub fn ensure_deletable_by(&self, caller: &Identity) -> Result<(), DomainError> {
        if self.is_system() {
            return match self.meta_kind() {
                Some(MetaKind::CatalogProduct) if caller.role.is_staff() => Ok(()),
                Some(MetaKind::CatalogProduct) => Err(DomainError::Forbidden(
                    "only admin or creator may delete catalog posts".into(),
                )),
                _ if caller.role == Role::Creator => Ok(()),
                _ => Err(DomainError::SystemMessageImmutable),
            };
        }

        if self.sender_id == Some(caller.user_id) || caller.role.is_staff() {
            Ok(())
        } else {
            Err(DomainError::NotMessageSender)
        }
    }
}

/// Return `meta` with the edit stamp applied
#[must_use]
pub fn meta_with_edit(meta: &Value, at: DateTime<Utc>) -> Value {
    let mut map = meta.as_object().cloned().unwrap_or_default();
    map.insert("edited".into(), Value::Bool(true));
    map.insert("edited_at".into(), Value::from(at.to_rfc3339()));
    Value::Object(map)
}

/// Return `meta` with `user_id` appended to `hidden_for`, or `None` if already hidden
#[must_use]
pub fn meta_with_hidden(meta: &Value, user_id: Uuid) -> Option<Value> {
    let mut map = meta.as_object().cloned().unwrap_or_default();
    let needle = user_id.to_string();
    let mut hidden: Vec<Value> = map
        .get("hidden_for")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if hidden.iter().any(|v| v.as_str() == Some(needle.as_str())) {
        return None;
    }
    hidden.push(Value::from(needle));
    map.insert("hidden_for".into(), Value::Array(hidden));
    Some(Value::Object(map))
}

// =============================================================================
// System payloads
// =============================================================================

/// A published catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProductMeta {
    pub product_id: Uuid,
    pub product_code: Option<i32>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

/// One dispatched reservation in the operational room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedOrderMeta {
    pub reservation_id: Uuid,
    pub cart_item_id: Option<Uuid>,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub product_code: Option<i32>,
    pub product_title: String,
    pub product_description: Option<String>,
    pub product_price: f64,
    pub quantity: i32,
    pub client_name: String,
    pub client_phone: String,
    pub shelf_number: Option<i32>,
    pub placed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by_name: Option<String>,
}

/// A staff bug report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugReportMeta {
    pub reporter_id: Uuid,
    pub reporter_email: Option<String>,
    pub reporter_role: Role,
    pub reporter_name: Option<String>,
    pub source: String,
}

/// Structured payload of a system-generated message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SystemMeta {
    CatalogProduct(CatalogProductMeta),
    ReservedOrderItem(ReservedOrderMeta),
    BugReport(BugReportMeta),
}

impl SystemMeta {
    /// Serialize into a `meta` object
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Parse a `meta` object; unknown or malformed payloads yield `None`
    #[must_use]
    pub fn parse(meta: &Value) -> Option<Self> {
        serde_json::from_value(meta.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(sender: Option<Uuid>, meta: Value) -> Message {
        Message {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            sender_id: sender,
            text: "hello".into(),
            meta,
            client_msg_id: None,
            created_at: Utc::now(),
        }
    }

    fn who(role: Role) -> Identity {
        Identity::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_system_detection() {
        assert!(!message(None, json!({})).is_system());
        assert!(!message(None, json!({ "kind": "  " })).is_system());
        assert!(message(None, json!({ "kind": "anything" })).is_system());
        assert_eq!(
            message(None, json!({ "kind": "catalog_product" })).meta_kind(),
            Some(MetaKind::CatalogProduct)
        );
    }

    #[test]
    fn test_edit_rules() {
        let author = who(Role::Client);
        let own = message(Some(author.user_id), json!({}));
        assert!(own.ensure_editable_by(&author).is_ok());
        assert!(matches!(
            own.ensure_editable_by(&who(Role::Creator)),
            Err(DomainError::NotMessageSender)
        ));

        let system = message(Some(author.user_id), json!({ "kind": "bug_report" }));
        assert!(matches!(
            system.ensure_editable_by(&author),
            Err(DomainError::SystemMessageImmutable)
        ));
    }

    #[test]
    fn test_delete_user_message() {
        let author = who(Role::Client);
        let msg = message(Some(author.user_id), json!({}));

        assert!(msg.ensure_deletable_by(&author).is_ok());
        assert!(msg.ensure_deletable_by(&who(Role::Admin)).is_ok());
        assert!(msg.ensure_deletable_by(&who(Role::Worker)).is_err());
        assert!(msg.ensure_deletable_by(&who(Role::Client)).is_err());
    }

    #[test]
    fn test_delete_catalog_post() {
        let msg = message(None, json!({ "kind": "catalog_product" }));
        assert!(msg.ensure_deletable_by(&who(Role::Admin)).is_ok());
        assert!(msg.ensure_deletable_by(&who(Role::Creator)).is_ok());
        assert!(msg.ensure_deletable_by(&who(Role::Worker)).is_err());
    }

    #[test]
    fn test_delete_other_system_message() {
        let msg = message(None, json!({ "kind": "reserved_order_item" }));
        assert!(msg.ensure_deletable_by(&who(Role::Creator)).is_ok());
        assert!(matches!(
            msg.ensure_deletable_by(&who(Role::Admin)),
            Err(DomainError::SystemMessageImmutable)
        ));
    }

    #[test]
    fn test_hide_is_idempotent() {
        let user = Uuid::new_v4();
        let msg = message(None, json!({ "kind": "catalog_product" }));

        let hidden = meta_with_hidden(&msg.meta, user).unwrap();
        assert_eq!(hidden["kind"], json!("catalog_product"));
        assert!(meta_with_hidden(&hidden, user).is_none());

        let msg = Message { meta: hidden, ..msg };
        assert!(msg.is_hidden_for(user));
        assert!(!msg.is_hidden_for(Uuid::new_v4()));
    }

    #[test]
    fn test_edit_stamp() {
        let meta = meta_with_edit(&json!({ "hidden_for": [] }), Utc::now());
        assert_eq!(meta["edited"], json!(true));
        assert!(meta["edited_at"].is_string());
        assert!(meta["hidden_for"].is_array());
    }

    #[test]
    fn test_system_meta_tagging() {
        let meta = SystemMeta::CatalogProduct(CatalogProductMeta {
            product_id: Uuid::new_v4(),
            product_code: Some(7),
            price: 120.0,
            quantity: 3,
            image_url: None,
        })
        .to_value();

        assert_eq!(meta["kind"], json!("catalog_product"));
        assert_eq!(meta["product_code"], json!(7));

        let mut with_extra = meta.clone();
        with_extra["hidden_for"] = json!(["x"]);
        assert!(matches!(SystemMeta::parse(&with_extra), Some(SystemMeta::CatalogProduct(_))));
    }
}
