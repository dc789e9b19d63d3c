use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One entry of the logical/actual header-name translation table.
///
/// `logical` is the operator-facing name ("user-id"), `actual` is the wire
/// header the gateway matches on ("x-nexus-user-id").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMapping {
    pub logical: String,
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HeaderMapping {
    pub fn new(logical: &str, actual: &str, description: &str) -> Self {
        Self {
            logical: logical.to_string(),
            actual: actual.to_string(),
            description: Some(description.to_string()),
        }
    }
}

static SHIPPED_TABLE: Lazy<HeaderTable> = Lazy::new(|| {
    HeaderTable::new(vec![
        HeaderMapping::new("user-id", "x-nexus-user-id", "User identifier for routing"),
        HeaderMapping::new("group", "x-nexus-group", "User group for routing"),
        HeaderMapping::new("host", "host", "Host header for routing"),
        HeaderMapping::new(
            "device-type",
            "x-nexus-device-type",
            "Device type for routing",
        ),
    ])
});

/// Bidirectional header-name translation table.
///
/// Loaded once at startup and immutable afterwards. Lookups that miss the
/// table return the input unchanged, so rules can match on headers that were
/// never registered here (at the cost of the friendly name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTable {
    mappings: Vec<HeaderMapping>,
}

impl HeaderTable {
    /// Builds a table from `mappings`, keeping only the first entry for each
    /// logical name.
    pub fn new(mappings: Vec<HeaderMapping>) -> Self {
        let mut deduped: Vec<HeaderMapping> = Vec::with_capacity(mappings.len());

        for mapping in mappings {
            if !deduped.iter().any(|m| m.logical == mapping.logical) {
                deduped.push(mapping);
            }
        }

        Self { mappings: deduped }
    }

    /// The built-in table for the nexus gateway headers.
    pub fn shipped() -> &'static Self {
        &SHIPPED_TABLE
    }

    /// Shipped table extended with `extra` entries (shipped entries win on
    /// logical-name collisions).
    pub fn shipped_with(extra: Vec<HeaderMapping>) -> Self {
        let mut mappings = SHIPPED_TABLE.mappings.clone();
        mappings.extend(extra);
        Self::new(mappings)
    }

    pub fn to_actual<'a>(&'a self, logical: &'a str) -> &'a str {
        self.mappings
            .iter()
            .find(|m| m.logical == logical)
            .map_or(logical, |m| m.actual.as_str())
    }

    pub fn to_logical<'a>(&'a self, actual: &'a str) -> &'a str {
        self.mappings
            .iter()
            .find(|m| m.actual == actual)
            .map_or(actual, |m| m.logical.as_str())
    }

    pub fn mappings(&self) -> &[HeaderMapping] {
        &self.mappings
    }
}
