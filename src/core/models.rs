// src/core/models.rs

use serde::{Serialize, Deserialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::core::knowledge_base::Entry;

// --- Raw scanner report ---
// ZAP writes a loosely-typed nested JSON tree. Every "key may be absent"
// case in that tree becomes an explicit default here, so a report reduced
// to `{}` still deserializes cleanly into "no findings".

/// Top-level JSON report produced by the external scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default)]
    pub site: Vec<Site>,
}

/// One scanned site: the target identity plus its ordered alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@host", default)]
    pub host: String,
    #[serde(rename = "@port", default)]
    pub port: String,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// One vulnerability class reported for a site.
///
/// `riskcode` and `confidence` arrive as decimal strings; `desc`,
/// `solution` and `otherinfo` are markup-bearing free text; `reference`
/// is a `<p>`-delimited blob of URLs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub otherinfo: String,
    #[serde(default)]
    pub riskcode: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub cweid: String,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// One concrete occurrence of an alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub param: String,
    #[serde(default)]
    pub attack: String,
    #[serde(default)]
    pub evidence: String,
}

// --- Canonical output model ---

/// Canonical severity of a normalized finding. Derived from the scanner's
/// risk/confidence pair, never stored raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RiskRating {
    Info,
    Low,
    Medium,
    High,
    Potentially,
}

/// Scanner confidence, fixed ordinal mapping from the report's 0-4 codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceLevel {
    FalsePositive,
    Low,
    Medium,
    High,
    Confirmed,
}

impl ConfidenceLevel {
    /// Maps a raw confidence code onto the ordinal scale. Codes outside
    /// 0-4 violate the scanner contract and degrade to `Low`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ConfidenceLevel::FalsePositive,
            1 => ConfidenceLevel::Low,
            2 => ConfidenceLevel::Medium,
            3 => ConfidenceLevel::High,
            4 => ConfidenceLevel::Confirmed,
            other => {
                warn!(code = other, "confidence code out of range, assuming LOW");
                ConfidenceLevel::Low
            }
        }
    }
}

/// Typed metadata attached to a vulnerability location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum MetadataKind {
    Url,
    Port,
}

/// A single location metadata entry, e.g. (URL, "https://host/login").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMetadata {
    #[serde(rename = "type")]
    pub kind: MetadataKind,
    pub value: String,
}

/// The asset a finding is anchored to. Currently always a domain name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAsset {
    pub name: String,
}

/// Where a finding lives: an asset plus ordered metadata entries.
///
/// Metadata order is construction order and feeds straight into the DNA
/// serialization, so it must stay deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityLocation {
    #[serde(rename = "domain_name")]
    pub asset: DomainAsset,
    pub metadata: Vec<LocationMetadata>,
}

impl VulnerabilityLocation {
    /// Dict form of the location, the shape embedded in the DNA.
    pub fn to_value(&self) -> Value {
        json!({
            "domain_name": { "name": self.asset.name },
            "metadata": self
                .metadata
                .iter()
                .map(|m| json!({ "type": m.kind.to_string(), "value": m.value }))
                .collect::<Vec<Value>>(),
        })
    }
}

/// One normalized finding, ready for the reporting sink.
///
/// An alert with N instances produces N of these, sharing the entry but
/// each with its own technical detail, location and DNA.
#[derive(Debug, Clone, Serialize)]
pub struct Vulnerability {
    pub entry: Entry,
    pub technical_detail: String,
    pub risk_rating: RiskRating,
    pub vulnerability_location: VulnerabilityLocation,
    pub dna: Option<String>,
}
