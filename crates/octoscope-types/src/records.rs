//! Raw document store records consumed by the graph synthesizer.
//!
//! Every record keeps the handful of fields the synthesizer reads as typed
//! struct fields and carries the rest of the document in an open
//! [`Attributes`] map, so the full record can be re-emitted unchanged in
//! the `info` payload of a rendered element.
//!
//! Field names follow the store's wire format (`xt/id`, `object_type`,
//! `source`, `result`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open-ended key/value payload of a store document.
pub type Attributes = BTreeMap<String, Value>;

/// A uniquely identified, typed entity in the store.
///
/// Identity is the `id`. The payload is opaque to the synthesizer except
/// for `object_type`, which becomes the node label and color key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectOfInterest {
    /// Unique store identifier.
    #[serde(rename = "xt/id")]
    pub id: String,
    /// Type name of the object (e.g. `Hostname`, `IPAddressV4`).
    pub object_type: String,
    /// Every other key of the document.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl ObjectOfInterest {
    /// Rebuild the full store document, typed fields included.
    pub fn document(&self) -> Value {
        let mut document = serde_json::Map::new();
        document.extend(self.attributes.clone());
        document.insert("xt/id".to_owned(), Value::String(self.id.clone()));
        document.insert(
            "object_type".to_owned(),
            Value::String(self.object_type.clone()),
        );
        Value::Object(document)
    }
}

/// A derivation record: `source_id` produced each id in `results` via a
/// derivation of kind `origin_type`.
///
/// One origin with N results yields N edges sharing source and kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    /// Unique store identifier of the origin record.
    #[serde(rename = "xt/id")]
    pub id: String,
    /// Identifier of the source object.
    #[serde(rename = "source")]
    pub source_id: String,
    /// Derivation kind, used as the edge label.
    pub origin_type: String,
    /// Result object ids. May be empty and may contain duplicates.
    #[serde(rename = "result", default)]
    pub results: Vec<String>,
    /// Every other key of the document.
    #[serde(flatten)]
    pub attributes: Attributes,
}

/// Extra structured data attached to the edges of one [`Origin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginParameter {
    /// Unique store identifier of the parameter record.
    #[serde(rename = "xt/id")]
    pub id: String,
    /// Identifier of the origin this parameter belongs to.
    pub origin_id: String,
    /// Every other key of the document.
    #[serde(flatten)]
    pub attributes: Attributes,
}

/// Classification record controlling the visual emphasis of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProfile {
    /// Unique store identifier of the profile record.
    #[serde(rename = "xt/id")]
    pub id: String,
    /// Identifier of the object this profile applies to.
    pub reference: String,
    /// Scan level (determines border width).
    pub level: u32,
    /// Profile kind (determines border style).
    pub scan_profile_type: ScanProfileType,
    /// Every other key of the document.
    #[serde(flatten)]
    pub attributes: Attributes,
}

/// Kind of a [`ScanProfile`].
///
/// The set is closed on the store side, but unknown values are preserved
/// rather than rejected so a newer store never breaks synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScanProfileType {
    /// Level set explicitly by a user.
    Declared,
    /// Level inherited from a neighbouring object.
    Inherited,
    /// No level set.
    Empty,
    /// A value this build does not know about.
    Unrecognized(String),
}

impl ScanProfileType {
    /// Return the wire name of this profile type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Declared => "declared",
            Self::Inherited => "inherited",
            Self::Empty => "empty",
            Self::Unrecognized(other) => other,
        }
    }
}

impl From<String> for ScanProfileType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "declared" => Self::Declared,
            "inherited" => Self::Inherited,
            "empty" => Self::Empty,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<ScanProfileType> for String {
    fn from(value: ScanProfileType) -> Self {
        match value {
            ScanProfileType::Unrecognized(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ScanProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
