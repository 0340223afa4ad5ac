//! Domain entities: the flat records supplied by the entity store

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::DomainError;

/// Reserved parent value marking a top-level record.
pub const ROOT_SENTINEL: &str = "#";

/// Unique identifier of an entity record.
///
/// The store emits ids either as JSON strings or as integers; both are
/// normalized to their string form so `1` and `"1"` name the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// Parent reference of a record: either the root sentinel or another id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Root,
    Entity(EntityId),
}

impl ParentRef {
    pub fn is_root(&self) -> bool {
        matches!(self, ParentRef::Root)
    }
}

impl From<EntityId> for ParentRef {
    fn from(id: EntityId) -> Self {
        if id.as_str() == ROOT_SENTINEL {
            ParentRef::Root
        } else {
            ParentRef::Entity(id)
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => f.write_str(ROOT_SENTINEL),
            ParentRef::Entity(id) => id.fmt(f),
        }
    }
}

impl Serialize for ParentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParentRef::Root => serializer.serialize_str(ROOT_SENTINEL),
            ParentRef::Entity(id) => id.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ParentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        EntityId::deserialize(deserializer).map(ParentRef::from)
    }
}

/// The three entity kinds the picker can present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[serde(alias = "Vehicle")]
    Vehicle,
    #[serde(alias = "Driver")]
    Driver,
    #[default]
    #[serde(alias = "Group")]
    Group,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Vehicle, EntityKind::Driver, EntityKind::Group];

    /// Only groups form a hierarchy; vehicles and drivers are flat lists.
    pub fn is_hierarchical(self) -> bool {
        self == EntityKind::Group
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Vehicle => "vehicle",
            EntityKind::Driver => "driver",
            EntityKind::Group => "group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vehicle" | "vehicles" => Ok(EntityKind::Vehicle),
            "driver" | "drivers" => Ok(EntityKind::Driver),
            "group" | "groups" => Ok(EntityKind::Group),
            other => Err(DomainError::UnknownKind(other.to_string())),
        }
    }
}

/// Flat, read-only input record.
///
/// `id` and `parent_id` are optional so that malformed records survive
/// deserialization and can be skipped individually by the builder.
/// Kind-specific fields (plate numbers, licence data, ...) are kept
/// verbatim in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ParentRef>,
    #[serde(default)]
    pub text: String,
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orderby: Option<f64>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl EntityRecord {
    pub fn new(kind: EntityKind, id: impl Into<EntityId>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            parent_id: None,
            text: text.into(),
            kind,
            orderby: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn group(id: impl Into<EntityId>, parent: ParentRef, text: impl Into<String>) -> Self {
        Self::new(EntityKind::Group, id, text).with_parent(parent)
    }

    pub fn vehicle(id: impl Into<EntityId>, text: impl Into<String>) -> Self {
        Self::new(EntityKind::Vehicle, id, text)
    }

    pub fn driver(id: impl Into<EntityId>, text: impl Into<String>) -> Self {
        Self::new(EntityKind::Driver, id, text)
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_orderby(mut self, orderby: f64) -> Self {
        self.orderby = Some(orderby);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Id of the record, or the reason it cannot be identified.
    pub fn identity(&self) -> Result<&EntityId, DomainError> {
        self.id.as_ref().ok_or_else(|| DomainError::MissingId {
            text: self.text.clone(),
        })
    }

    /// Id and parent reference, both required to place a record in a tree.
    pub fn placement(&self) -> Result<(&EntityId, &ParentRef), DomainError> {
        let id = self.identity()?;
        let parent = self
            .parent_id
            .as_ref()
            .ok_or_else(|| DomainError::MissingParent { id: id.clone() })?;
        Ok((id, parent))
    }

    /// Case-insensitive substring match; `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
    }

    /// Sibling ordering: `(orderby ?? 0, text case-insensitive)` ascending.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.orderby
            .unwrap_or(0.0)
            .total_cmp(&other.orderby.unwrap_or(0.0))
            .then_with(|| self.text.to_lowercase().cmp(&other.text.to_lowercase()))
    }
}
