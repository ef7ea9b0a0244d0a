//! IP record model as projected from the registry contract.

use chrono::{DateTime, Local, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to an encrypted value held by the registry contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(pub String);

impl CiphertextHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw field set returned by the contract for a single record.
///
/// Numeric fields arrive as strings because the contract encodes them as
/// big integers; [`IpRecord::from_chain`] coerces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordData {
    pub name: String,
    pub public_value1: String,
    pub public_value2: String,
    pub description: String,
    pub creator: String,
    pub timestamp: String,
    pub is_verified: bool,
    pub decrypted_value: String,
}

/// One registered intellectual-property claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRecord {
    pub id: String,
    pub name: String,
    pub encrypted_value: CiphertextHandle,
    pub public_value1: u64,
    pub public_value2: u64,
    pub description: String,
    pub creator: String,
    pub timestamp: u64,
    pub is_verified: bool,
    /// Meaningful only when `is_verified` is true.
    pub decrypted_value: u64,
}

impl IpRecord {
    /// Build the dashboard view of a record from raw contract fields.
    ///
    /// Unparseable numeric fields collapse to 0. The record id doubles as the
    /// handle key for its encrypted value.
    pub fn from_chain(id: &str, data: RecordData) -> Self {
        Self {
            id: id.to_string(),
            name: data.name,
            encrypted_value: CiphertextHandle(id.to_string()),
            public_value1: coerce_u64(&data.public_value1),
            public_value2: coerce_u64(&data.public_value2),
            description: data.description,
            creator: data.creator,
            timestamp: coerce_u64(&data.timestamp),
            is_verified: data.is_verified,
            decrypted_value: coerce_u64(&data.decrypted_value),
        }
    }

    /// Decrypted value if the contract has verified it.
    pub fn verified_value(&self) -> Option<u64> {
        self.is_verified.then_some(self.decrypted_value)
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        let secs = i64::try_from(self.timestamp).ok()?;
        Utc.timestamp_opt(secs, 0)
            .single()
            .map(|utc| utc.with_timezone(&Local))
    }

    pub fn category(&self) -> Option<Category> {
        Category::from_code(self.public_value2)
    }
}

fn coerce_u64(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return value;
    }
    // Some encoders hand back floats ("42.0"); keep the integral part.
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value.trunc() as u64)
        .unwrap_or(0)
}

/// IP classification offered by the create form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Legal,
    Technology,
    Creative,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Legal, Category::Technology, Category::Creative];

    pub fn label(self) -> &'static str {
        match self {
            Category::Legal => "Legal",
            Category::Technology => "Technology",
            Category::Creative => "Creative",
        }
    }

    /// Category code stored in `public_value2` on chain.
    pub fn code(self) -> u64 {
        match self {
            Category::Legal => 0,
            Category::Technology => 1,
            Category::Creative => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Category::ALL.into_iter().find(|category| category.code() == code)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category selector for the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub const ALL: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Legal),
        CategoryFilter::Only(Category::Technology),
        CategoryFilter::Only(Category::Creative),
    ];
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All categories"),
            CategoryFilter::Only(category) => f.write_str(category.label()),
        }
    }
}

/// Abbreviate an address as `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Case-insensitive address comparison.
pub fn same_address(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}
