use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The HTTPRoute-shaped document owned by the remote store.
///
/// Only `spec.rules` is ever rewritten locally; everything else, including
/// fields this tool knows nothing about, must survive a read/write cycle
/// verbatim, hence the flattened extras maps on every container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRoute {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub spec: HttpRouteSpec,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Carried through untouched; the write path does not assert against it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteSpec {
    /// Preserved as raw JSON; this tool never edits parent refs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_refs: Option<Value>,

    #[serde(default)]
    pub rules: Vec<RouteRule>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<RouteMatch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backend_refs: Vec<BackendRef>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteRule {
    /// A match-less rule: matches everything the earlier rules did not.
    pub fn is_catch_all(&self) -> bool {
        self.matches.is_empty() && !self.backend_refs.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatchValue>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An exact-value header condition, keyed by the actual wire header name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderMatchValue {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendRef {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub port: u16,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Merge-patch fragment for the `spec` sub-document. Sent as
/// `{"spec": {"rules": [...]}}` so sibling spec fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSpecPatch {
    pub rules: Vec<RouteRule>,
}
