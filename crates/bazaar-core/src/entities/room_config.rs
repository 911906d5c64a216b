//! Typed room configuration
//!
//! Rooms persist their configuration as a flat JSON object. This module turns
//! that object into a tagged [`RoomConfig`] with one variant per kind of room,
//! a handful of shared fields, and an `extra` map that carries every key the
//! application does not recognize so that round-tripping never drops data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Canonical title of the main posting channel
pub const MAIN_CHANNEL_TITLE: &str = "Основной канал";
/// Canonical title of the reserved-orders channel
pub const RESERVED_ORDERS_TITLE: &str = "Забронированный товар";
/// Canonical title of the bug-report channel
pub const BUG_REPORTS_TITLE: &str = "Баг-репорты";

const MAIN_CHANNEL_DESCRIPTION: &str = "Основной канал для публикации товаров";

/// Maximum length of a blacklist reason
pub const BLACKLIST_REASON_MAX: usize = 240;

/// Keys owned by the typed configuration; everything else lands in `extra`
const RECOGNIZED_KEYS: &[&str] = &[
    "kind",
    "system_key",
    "visibility",
    "admin_only",
    "worker_can_post",
    "is_post_channel",
    "description",
    "blacklisted_user_ids",
    "blacklist_entries",
    "avatar_url",
    "avatar_focus_x",
    "avatar_focus_y",
    "avatar_zoom",
];

/// Stable identity of a reconciler-owned room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemKey {
    MainChannel,
    ReservedOrders,
    BugReports,
}

impl SystemKey {
    pub const ALL: [SystemKey; 3] = [Self::MainChannel, Self::ReservedOrders, Self::BugReports];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MainChannel => "main_channel",
            Self::ReservedOrders => "reserved_orders",
            Self::BugReports => "bug_reports",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "main_channel" => Some(Self::MainChannel),
            "reserved_orders" => Some(Self::ReservedOrders),
            "bug_reports" => Some(Self::BugReports),
            _ => None,
        }
    }

    /// Title given to the room when the reconciler creates it
    #[must_use]
    pub fn default_title(self) -> &'static str {
        match self {
            Self::MainChannel => MAIN_CHANNEL_TITLE,
            Self::ReservedOrders => RESERVED_ORDERS_TITLE,
            Self::BugReports => BUG_REPORTS_TITLE,
        }
    }

    /// Value written to the `kind` settings key
    #[must_use]
    pub fn settings_kind(self) -> &'static str {
        match self {
            Self::MainChannel => "channel",
            Self::ReservedOrders => "reserved_orders",
            Self::BugReports => "bug_reports",
        }
    }

    /// Whether workers are reconciled into the room's membership
    #[must_use]
    pub fn includes_workers(self) -> bool {
        matches!(self, Self::ReservedOrders)
    }

    /// Whether the reconciler manages membership for this room at all
    #[must_use]
    pub fn has_staff_membership(self) -> bool {
        !matches!(self, Self::MainChannel)
    }
}

/// Channel visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Anything that is not explicitly private is public
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("private") {
            Self::Private
        } else {
            Self::Public
        }
    }
}

/// Avatar image and its framing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarSettings {
    pub url: Option<String>,
    pub focus_x: f64,
    pub focus_y: f64,
    pub zoom: f64,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            url: None,
            focus_x: 0.0,
            focus_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl AvatarSettings {
    /// Clamp focus to [-1, 1] and zoom to [1, 4]; non-finite values fall back to defaults
    #[must_use]
    pub fn clamped(self) -> Self {
        fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        }

        Self {
            url: self.url.filter(|u| !u.trim().is_empty()),
            focus_x: clamp_or(self.focus_x, -1.0, 1.0, 0.0),
            focus_y: clamp_or(self.focus_y, -1.0, 1.0, 0.0),
            zoom: clamp_or(self.zoom, 1.0, 4.0, 1.0),
        }
    }
}

/// One denied user on a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub user_id: Uuid,
    pub added_at: DateTime<Utc>,
    pub added_by: Option<Uuid>,
    pub reason: Option<String>,
}

impl BlacklistEntry {
    /// Build an entry, trimming the reason and capping it at [`BLACKLIST_REASON_MAX`] characters
    #[must_use]
    pub fn new(user_id: Uuid, added_by: Option<Uuid>, reason: Option<&str>) -> Self {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| r.chars().take(BLACKLIST_REASON_MAX).collect());
        Self {
            user_id,
            added_at: Utc::now(),
            added_by,
            reason,
        }
    }
}

/// Fields every room kind carries
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SharedConfig {
    pub description: Option<String>,
    pub avatar: AvatarSettings,
    pub blacklist: Vec<BlacklistEntry>,
    /// Keys not understood by this version, preserved verbatim
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MainChannelConfig {
    pub shared: SharedConfig,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReservedOrdersConfig {
    pub shared: SharedConfig,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BugReportsConfig {
    pub shared: SharedConfig,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericChannelConfig {
    pub shared: SharedConfig,
    pub visibility: Visibility,
    pub admin_only: bool,
    pub worker_can_post: bool,
    pub is_post_channel: bool,
}

/// Room configuration, tagged by the kind of room it belongs to
///
/// System rooms have fixed flags; only generic rooms store them.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomConfig {
    MainChannel(MainChannelConfig),
    ReservedOrders(ReservedOrdersConfig),
    BugReports(BugReportsConfig),
    Generic(GenericChannelConfig),
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self::Generic(GenericChannelConfig::default())
    }
}

impl RoomConfig {
    /// Canonical configuration for a system room, keeping the given shared fields
    #[must_use]
    pub fn canonical(key: SystemKey, mut shared: SharedConfig) -> Self {
        match key {
            SystemKey::MainChannel => {
                if shared.description.is_none() {
                    shared.description = Some(MAIN_CHANNEL_DESCRIPTION.to_string());
                }
                Self::MainChannel(MainChannelConfig { shared })
            }
            SystemKey::ReservedOrders => Self::ReservedOrders(ReservedOrdersConfig { shared }),
            SystemKey::BugReports => Self::BugReports(BugReportsConfig { shared }),
        }
    }

    /// Generic channel with default settings
    #[must_use]
    pub fn generic(visibility: Visibility, description: Option<String>) -> Self {
        Self::Generic(GenericChannelConfig {
            shared: SharedConfig {
                description,
                ..SharedConfig::default()
            },
            visibility,
            ..GenericChannelConfig::default()
        })
    }

    /// Merge the canonical configuration for `key` over this one
    ///
    /// Shared fields (description, avatar, blacklist, unknown keys) survive;
    /// the flags owned by the system key are replaced.
    #[must_use]
    pub fn reconciled(self, key: SystemKey) -> Self {
        Self::canonical(key, self.into_shared())
    }

    #[must_use]
    pub fn system_key(&self) -> Option<SystemKey> {
        match self {
            Self::MainChannel(_) => Some(SystemKey::MainChannel),
            Self::ReservedOrders(_) => Some(SystemKey::ReservedOrders),
            Self::BugReports(_) => Some(SystemKey::BugReports),
            Self::Generic(_) => None,
        }
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        match self {
            Self::MainChannel(_) => Visibility::Public,
            Self::ReservedOrders(_) | Self::BugReports(_) => Visibility::Private,
            Self::Generic(c) => c.visibility,
        }
    }

    #[must_use]
    pub fn admin_only(&self) -> bool {
        match self {
            Self::BugReports(_) => true,
            Self::MainChannel(_) | Self::ReservedOrders(_) => false,
            Self::Generic(c) => c.admin_only,
        }
    }

    #[must_use]
    pub fn worker_can_post(&self) -> bool {
        match self {
            Self::MainChannel(_) => true,
            Self::ReservedOrders(_) | Self::BugReports(_) => false,
            Self::Generic(c) => c.worker_can_post,
        }
    }

    #[must_use]
    pub fn is_post_channel(&self) -> bool {
        match self {
            Self::MainChannel(_) => true,
            Self::ReservedOrders(_) | Self::BugReports(_) => false,
            Self::Generic(c) => c.is_post_channel,
        }
    }

    #[must_use]
    pub fn shared(&self) -> &SharedConfig {
        match self {
            Self::MainChannel(c) => &c.shared,
            Self::ReservedOrders(c) => &c.shared,
            Self::BugReports(c) => &c.shared,
            Self::Generic(c) => &c.shared,
        }
    }

    pub fn shared_mut(&mut self) -> &mut SharedConfig {
        match self {
            Self::MainChannel(c) => &mut c.shared,
            Self::ReservedOrders(c) => &mut c.shared,
            Self::BugReports(c) => &mut c.shared,
            Self::Generic(c) => &mut c.shared,
        }
    }

    #[must_use]
    pub fn into_shared(self) -> SharedConfig {
        match self {
            Self::MainChannel(c) => c.shared,
            Self::ReservedOrders(c) => c.shared,
            Self::BugReports(c) => c.shared,
            Self::Generic(c) => c.shared,
        }
    }

    // =========================================================================
    // Blacklist
    // =========================================================================

    #[must_use]
    pub fn is_blacklisted(&self, user_id: Uuid) -> bool {
        self.shared().blacklist.iter().any(|e| e.user_id == user_id)
    }

    /// Insert or replace the entry for `entry.user_id`
    pub fn blacklist_add(&mut self, entry: BlacklistEntry) {
        let list = &mut self.shared_mut().blacklist;
        list.retain(|e| e.user_id != entry.user_id);
        list.push(entry);
    }

    /// Returns true when an entry was removed
    pub fn blacklist_remove(&mut self, user_id: Uuid) -> bool {
        let list = &mut self.shared_mut().blacklist;
        let before = list.len();
        list.retain(|e| e.user_id != user_id);
        list.len() != before
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Parse the persisted settings object
    ///
    /// Parsing is lenient: malformed values fall back to defaults rather than
    /// failing, since settings may have been written by older versions.
    #[must_use]
    pub fn from_settings(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let shared = SharedConfig {
            description: str_at(map, "description").map(ToString::to_string),
            avatar: AvatarSettings {
                url: str_at(map, "avatar_url").map(ToString::to_string),
                focus_x: f64_at(map, "avatar_focus_x").unwrap_or(0.0),
                focus_y: f64_at(map, "avatar_focus_y").unwrap_or(0.0),
                zoom: f64_at(map, "avatar_zoom").unwrap_or(1.0),
            }
            .clamped(),
            blacklist: parse_blacklist(map),
            extra: map
                .iter()
                .filter(|(k, _)| !RECOGNIZED_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        match str_at(map, "system_key").and_then(SystemKey::parse) {
            Some(SystemKey::MainChannel) => Self::MainChannel(MainChannelConfig { shared }),
            Some(SystemKey::ReservedOrders) => Self::ReservedOrders(ReservedOrdersConfig { shared }),
            Some(SystemKey::BugReports) => Self::BugReports(BugReportsConfig { shared }),
            None => Self::Generic(GenericChannelConfig {
                shared,
                visibility: str_at(map, "visibility")
                    .map(Visibility::parse_lenient)
                    .unwrap_or_default(),
                admin_only: bool_at(map, "admin_only")
                    || str_at(map, "kind").is_some_and(|k| k.eq_ignore_ascii_case("bug_reports")),
                worker_can_post: bool_at(map, "worker_can_post"),
                is_post_channel: bool_at(map, "is_post_channel"),
            }),
        }
    }

    /// Serialize back into the flat settings object
    #[must_use]
    pub fn to_settings(&self) -> Value {
        let shared = self.shared();
        let mut map = shared.extra.clone();

        let kind = self.system_key().map_or("channel", SystemKey::settings_kind);
        map.insert("kind".into(), Value::from(kind));
        map.insert(
            "system_key".into(),
            self.system_key().map_or(Value::Null, |k| Value::from(k.as_str())),
        );
        map.insert("visibility".into(), Value::from(self.visibility().as_str()));
        map.insert("admin_only".into(), Value::from(self.admin_only()));
        map.insert("worker_can_post".into(), Value::from(self.worker_can_post()));
        map.insert("is_post_channel".into(), Value::from(self.is_post_channel()));
        map.insert(
            "description".into(),
            shared.description.clone().map_or(Value::Null, Value::from),
        );
        map.insert(
            "avatar_url".into(),
            shared.avatar.url.clone().map_or(Value::Null, Value::from),
        );
        map.insert("avatar_focus_x".into(), Value::from(shared.avatar.focus_x));
        map.insert("avatar_focus_y".into(), Value::from(shared.avatar.focus_y));
        map.insert("avatar_zoom".into(), Value::from(shared.avatar.zoom));
        map.insert(
            "blacklisted_user_ids".into(),
            Value::Array(
                shared
                    .blacklist
                    .iter()
                    .map(|e| Value::from(e.user_id.to_string()))
                    .collect(),
            ),
        );
        map.insert(
            "blacklist_entries".into(),
            serde_json::to_value(&shared.blacklist).unwrap_or_else(|_| Value::Array(Vec::new())),
        );

        Value::Object(map)
    }
}

fn str_at<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn bool_at(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn f64_at(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Entries win over the bare id list; ids without an entry get an epoch timestamp
fn parse_blacklist(map: &Map<String, Value>) -> Vec<BlacklistEntry> {
    let mut entries: Vec<BlacklistEntry> = map
        .get("blacklist_entries")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<BlacklistEntry>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    if let Some(ids) = map.get("blacklisted_user_ids").and_then(Value::as_array) {
        for id in ids.iter().filter_map(Value::as_str) {
            let Ok(user_id) = id.trim().parse::<Uuid>() else {
                continue;
            };
            if !entries.iter().any(|e| e.user_id == user_id) {
                entries.push(BlacklistEntry {
                    user_id,
                    added_at: DateTime::UNIX_EPOCH,
                    added_by: None,
                    reason: None,
                });
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    entries.retain(|e| seen.insert(e.user_id));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_key_parse() {
        assert_eq!(SystemKey::parse("MAIN_CHANNEL"), Some(SystemKey::MainChannel));
        assert_eq!(SystemKey::parse("reserved_orders"), Some(SystemKey::ReservedOrders));
        assert_eq!(SystemKey::parse("none"), None);
    }

    #[test]
    fn test_generic_from_settings() {
        let config = RoomConfig::from_settings(&json!({
            "visibility": "private",
            "admin_only": true,
            "theme": "dark"
        }));

        assert_eq!(config.system_key(), None);
        assert_eq!(config.visibility(), Visibility::Private);
        assert!(config.admin_only());
        assert_eq!(config.shared().extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_legacy_bug_report_kind_is_admin_only() {
        let config = RoomConfig::from_settings(&json!({ "kind": "bug_reports" }));
        assert!(config.admin_only());
    }

    #[test]
    fn test_non_object_settings_default() {
        assert_eq!(RoomConfig::from_settings(&json!(null)), RoomConfig::default());
        assert_eq!(RoomConfig::from_settings(&json!([1, 2])), RoomConfig::default());
    }

    #[test]
    fn test_system_room_flags_are_fixed() {
        let config = RoomConfig::from_settings(&json!({
            "system_key": "main_channel",
            "visibility": "private",
            "admin_only": true,
            "worker_can_post": false
        }));

        assert_eq!(config.system_key(), Some(SystemKey::MainChannel));
        assert_eq!(config.visibility(), Visibility::Public);
        assert!(!config.admin_only());
        assert!(config.worker_can_post());
        assert!(config.is_post_channel());
    }

    #[test]
    fn test_reconciled_keeps_custom_fields() {
        let user = Uuid::new_v4();
        let mut existing = RoomConfig::from_settings(&json!({
            "visibility": "public",
            "is_post_channel": true,
            "pinned": "hello",
            "description": "custom"
        }));
        existing.blacklist_add(BlacklistEntry::new(user, None, Some("spam")));

        let merged = existing.reconciled(SystemKey::ReservedOrders);

        assert_eq!(merged.system_key(), Some(SystemKey::ReservedOrders));
        assert_eq!(merged.visibility(), Visibility::Private);
        assert!(!merged.is_post_channel());
        assert!(merged.is_blacklisted(user));
        assert_eq!(merged.shared().description.as_deref(), Some("custom"));
        assert_eq!(merged.shared().extra.get("pinned"), Some(&json!("hello")));
    }

    #[test]
    fn test_reconciled_is_idempotent() {
        let once = RoomConfig::default().reconciled(SystemKey::MainChannel);
        let twice = once.clone().reconciled(SystemKey::MainChannel);
        assert_eq!(once, twice);
        assert_eq!(
            once.shared().description.as_deref(),
            Some(MAIN_CHANNEL_DESCRIPTION)
        );
    }

    #[test]
    fn test_settings_roundtrip_preserves_extra() {
        let original = json!({
            "system_key": "bug_reports",
            "avatar_zoom": 2.5,
            "custom_flag": [1, 2, 3]
        });
        let config = RoomConfig::from_settings(&original);
        let reparsed = RoomConfig::from_settings(&config.to_settings());

        assert_eq!(config, reparsed);
        assert_eq!(config.to_settings()["kind"], json!("bug_reports"));
        assert_eq!(config.to_settings()["custom_flag"], json!([1, 2, 3]));
    }

    #[test]
    fn test_avatar_clamping() {
        let avatar = AvatarSettings {
            url: Some("  ".into()),
            focus_x: -3.0,
            focus_y: 0.4,
            zoom: 9.0,
        }
        .clamped();

        assert_eq!(avatar.url, None);
        assert!((avatar.focus_x + 1.0).abs() < f64::EPSILON);
        assert!((avatar.focus_y - 0.4).abs() < f64::EPSILON);
        assert!((avatar.zoom - 4.0).abs() < f64::EPSILON);

        let nan = AvatarSettings {
            zoom: f64::NAN,
            ..AvatarSettings::default()
        }
        .clamped();
        assert!((nan.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blacklist_add_replaces_and_remove() {
        let user = Uuid::new_v4();
        let mut config = RoomConfig::default();

        config.blacklist_add(BlacklistEntry::new(user, None, Some("first")));
        config.blacklist_add(BlacklistEntry::new(user, None, Some("second")));
        assert_eq!(config.shared().blacklist.len(), 1);
        assert_eq!(config.shared().blacklist[0].reason.as_deref(), Some("second"));

        assert!(config.blacklist_remove(user));
        assert!(!config.blacklist_remove(user));
        assert!(!config.is_blacklisted(user));
    }

    #[test]
    fn test_blacklist_reason_trimmed_and_capped() {
        let long = format!("  {}  ", "x".repeat(500));
        let entry = BlacklistEntry::new(Uuid::new_v4(), None, Some(&long));
        assert_eq!(entry.reason.map(|r| r.chars().count()), Some(BLACKLIST_REASON_MAX));

        let blank = BlacklistEntry::new(Uuid::new_v4(), None, Some("   "));
        assert_eq!(blank.reason, None);
    }

    #[test]
    fn test_legacy_blacklisted_ids() {
        let user = Uuid::new_v4();
        let config = RoomConfig::from_settings(&json!({
            "blacklisted_user_ids": [user.to_string(), "not-a-uuid", user.to_string()]
        }));
        assert!(config.is_blacklisted(user));
        assert_eq!(config.shared().blacklist.len(), 1);
    }
}
