//! PII categories and the redaction mode each one maps to.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::RedactError;

/// Category of PII a span belongs to.
///
/// Variant order is the tie-break order for identical candidate ranges, so the
/// profile kinds sit ahead of the generic `Url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PiiKind {
    Email,
    Phone,
    Linkedin,
    Github,
    Url,
    Address,
    Id,
    Name,
    Org,
    Loc,
}

impl PiiKind {
    pub const ALL: [PiiKind; 10] = [
        PiiKind::Email,
        PiiKind::Phone,
        PiiKind::Linkedin,
        PiiKind::Github,
        PiiKind::Url,
        PiiKind::Address,
        PiiKind::Id,
        PiiKind::Name,
        PiiKind::Org,
        PiiKind::Loc,
    ];

    /// Lowercase name, as used in reports and config strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiKind::Email => "email",
            PiiKind::Phone => "phone",
            PiiKind::Linkedin => "linkedin",
            PiiKind::Github => "github",
            PiiKind::Url => "url",
            PiiKind::Address => "address",
            PiiKind::Id => "id",
            PiiKind::Name => "name",
            PiiKind::Org => "org",
            PiiKind::Loc => "loc",
        }
    }

    /// Upper-case label used inside hash tags: `[[EMAIL:1a2b3c4d]]`.
    pub fn tag(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    pub fn default_mode(&self) -> RedactionMode {
        match self {
            PiiKind::Email
            | PiiKind::Phone
            | PiiKind::Url
            | PiiKind::Linkedin
            | PiiKind::Github => RedactionMode::Hash,
            PiiKind::Address | PiiKind::Name | PiiKind::Org | PiiKind::Loc => RedactionMode::Mask,
            PiiKind::Id => RedactionMode::Drop,
        }
    }

    /// Map an external flagger label onto a kind.
    ///
    /// Accepts the kind names themselves plus the usual NER entity labels.
    pub fn from_label(label: &str) -> Option<PiiKind> {
        match label.trim().to_ascii_lowercase().as_str() {
            "person" | "per" | "person_name" => Some(PiiKind::Name),
            "organization" | "organisation" | "organization_name" => Some(PiiKind::Org),
            "location" | "gpe" => Some(PiiKind::Loc),
            "email_address" => Some(PiiKind::Email),
            "phone_number" => Some(PiiKind::Phone),
            "street_address" => Some(PiiKind::Address),
            other => other.parse().ok(),
        }
    }
}

impl fmt::Display for PiiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiKind {
    type Err = RedactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PiiKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| RedactError::Config(format!("unknown PII kind: {s}")))
    }
}

/// How a span's text is replaced in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionMode {
    /// Replace with `[[KIND:xxxxxxxx]]`, derived from the matched value
    Hash,
    /// Replace with mask characters, one per original character
    Mask,
    /// Remove the span entirely
    Drop,
}

impl fmt::Display for RedactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RedactionMode::Hash => "hash",
            RedactionMode::Mask => "mask",
            RedactionMode::Drop => "drop",
        })
    }
}

impl FromStr for RedactionMode {
    type Err = RedactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(RedactionMode::Hash),
            "mask" => Ok(RedactionMode::Mask),
            "drop" => Ok(RedactionMode::Drop),
            _ => Err(RedactError::Config(format!("unknown redaction mode: {s}"))),
        }
    }
}

/// Effective kind → mode mapping for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeTable(BTreeMap<PiiKind, RedactionMode>);

impl Default for ModeTable {
    fn default() -> Self {
        Self(
            PiiKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_mode()))
                .collect(),
        )
    }
}

impl ModeTable {
    /// Defaults with the caller's overrides laid on top.
    pub fn with_overrides(overrides: &HashMap<PiiKind, RedactionMode>) -> Self {
        let mut table = Self::default();
        table.0.extend(overrides.iter().map(|(k, v)| (*k, *v)));
        table
    }

    pub fn mode_for(&self, kind: PiiKind) -> RedactionMode {
        self.0.get(&kind).copied().unwrap_or_else(|| kind.default_mode())
    }
}

/// Parse a `kind=mode[,kind=mode...]` override list.
///
/// Blank input yields an empty map.
pub fn parse_mode_overrides(list: &str) -> Result<HashMap<PiiKind, RedactionMode>, RedactError> {
    let mut overrides = HashMap::new();
    for pair in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (kind, mode) = pair
            .split_once('=')
            .ok_or_else(|| RedactError::Config(format!("expected kind=mode, got: {pair}")))?;
        overrides.insert(kind.parse()?, mode.parse()?);
    }
    Ok(overrides)
}
