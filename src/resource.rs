use crate::errors::{ClientError, Result};
use crate::models::ResourceItem;
use std::fmt;
use std::str::FromStr;

/// Backend-managed entity types reachable under `/api/{path}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Habit,
    Goal,
    Achievement,
    Notification,
    User,
}

/// Which field addresses an item on update and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScheme {
    /// Server-assigned numeric id.
    #[default]
    ServerId,
    /// Natural key (name, title, message). Updates carry the old key as `oldName` etc.
    NaturalKey,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Habit,
        ResourceKind::Goal,
        ResourceKind::Achievement,
        ResourceKind::Notification,
        ResourceKind::User,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Habit => "habits",
            Self::Goal => "goals",
            Self::Achievement => "achievements",
            Self::Notification => "notifications",
            Self::User => "users",
        }
    }

    pub fn id_field(self, scheme: IdScheme) -> &'static str {
        match (scheme, self) {
            (IdScheme::ServerId, Self::User) => "user_id",
            (IdScheme::ServerId, _) => "id",
            (IdScheme::NaturalKey, Self::Habit | Self::Goal | Self::User) => "name",
            (IdScheme::NaturalKey, Self::Achievement) => "title",
            (IdScheme::NaturalKey, Self::Notification) => "message",
        }
    }

    /// Key that addresses an item in a request. Users are listed with
    /// `user_id` but updated and deleted by `id`.
    pub fn request_id_field(self, scheme: IdScheme) -> &'static str {
        match (scheme, self) {
            (IdScheme::ServerId, Self::User) => "id",
            _ => self.id_field(scheme),
        }
    }

    /// Body field that carries the identifier of the item being replaced on PUT.
    pub fn update_id_field(self, scheme: IdScheme) -> &'static str {
        match (scheme, self) {
            (IdScheme::ServerId, _) => self.request_id_field(scheme),
            (IdScheme::NaturalKey, Self::Habit | Self::Goal | Self::User) => "oldName",
            (IdScheme::NaturalKey, Self::Achievement) => "oldTitle",
            (IdScheme::NaturalKey, Self::Notification) => "oldMessage",
        }
    }

    /// Field shown as the card heading.
    pub fn title_field(self) -> &'static str {
        match self {
            Self::Habit | Self::Goal | Self::User => "name",
            Self::Achievement => "title",
            Self::Notification => "message",
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Habit | Self::Goal => &["name"],
            Self::Achievement => &["title"],
            Self::Notification => &["message", "scheduled_at"],
            Self::User => &["name", "email", "password"],
        }
    }

    pub fn sort_keys(self) -> &'static [&'static str] {
        match self {
            Self::Habit => &["name", "created_at", "updated_at"],
            Self::Goal => &["name", "deadline", "created_at", "updated_at"],
            Self::Achievement => &["title", "date"],
            Self::Notification => &["scheduled_at", "message"],
            Self::User => &["name", "email", "created_at"],
        }
    }

    /// Only goals expose `DELETE /api/{path}/deleteAll`.
    pub fn supports_delete_all(self) -> bool {
        matches!(self, Self::Goal)
    }

    /// Admin endpoints need a bearer token.
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::User)
    }

    /// Rejects items missing a required field or carrying it blank.
    pub fn validate(self, item: &ResourceItem) -> Result<()> {
        let missing: Vec<&str> = self
            .required_fields()
            .iter()
            .copied()
            .filter(|field| {
                item.text(field)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ClientError::validation(format!(
                "{} requires {}",
                self,
                missing.join(", ")
            )))
        }
    }

    pub fn validate_sort(self, key: &str) -> Result<()> {
        if key.is_empty() || self.sort_keys().contains(&key.to_ascii_lowercase().as_str()) {
            return Ok(());
        }
        Err(ClientError::validation(format!(
            "cannot sort {} by '{key}' (expected one of {})",
            self.path(),
            self.sort_keys().join(", ")
        )))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Habit => "habit",
            Self::Goal => "goal",
            Self::Achievement => "achievement",
            Self::Notification => "notification",
            Self::User => "user",
        };
        f.write_str(name)
    }
}

impl FromStr for ResourceKind {
    type Err = ClientError;

    fn from_str(raw: &str) -> Result<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.path() == needle || kind.to_string() == needle)
            .ok_or_else(|| ClientError::config(format!("unknown resource '{raw}'")))
    }
}

impl FromStr for IdScheme {
    type Err = ClientError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "id" | "server" => Ok(Self::ServerId),
            "natural" | "key" => Ok(Self::NaturalKey),
            other => Err(ClientError::config(format!(
                "unknown id scheme '{other}' (expected 'id' or 'natural')"
            ))),
        }
    }
}
