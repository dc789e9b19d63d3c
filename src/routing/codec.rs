use serde::{Deserialize, Serialize};

use crate::gateway::resource::{
    BackendRef, HeaderMatchValue, HttpRoute, RouteMatch, RouteRule, RouteSpecPatch,
};
use crate::routing::headers::HeaderTable;
use crate::routing::model::{Pool, RoutingConfig, RoutingRule};

/// Port every backend ref is written with. The gateway services for the
/// blue/green pools all listen on it.
pub const ROUTING_PORT: u16 = 80;

/// How the default pool is represented on the wire.
///
/// The gateway can fall back to an implicitly configured backend when no
/// rule matches, or the encoder can spell the default out as a trailing
/// match-less rule. `ImplicitGateway` reproduces the original tool's
/// behavior and keeps patches minimal; `ExplicitCatchAll` makes the default
/// pool survive a round trip exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultPoolPolicy {
    #[default]
    ImplicitGateway,
    ExplicitCatchAll,
}

/// Sole translator between [`RoutingConfig`] and the wire document.
///
/// Encoding is a spec-level merge: only `spec.rules` is rewritten, every
/// other field of the prior resource is carried through untouched.
#[derive(Debug, Clone)]
pub struct Codec {
    table: HeaderTable,
    policy: DefaultPoolPolicy,
}

impl Codec {
    pub fn new(table: HeaderTable, policy: DefaultPoolPolicy) -> Self {
        Self { table, policy }
    }

    pub fn shipped() -> Self {
        Self::new(HeaderTable::shipped().clone(), DefaultPoolPolicy::default())
    }

    pub fn policy(&self) -> DefaultPoolPolicy {
        self.policy
    }

    /// Produces a copy of `prior` whose `spec.rules` encodes `config`.
    pub fn encode(&self, config: &RoutingConfig, prior: &HttpRoute) -> HttpRoute {
        let mut resource = prior.clone();
        resource.spec.rules = self.encode_rules(config);
        resource
    }

    /// The merge-patch fragment for a rules-only update.
    pub fn encode_patch(&self, config: &RoutingConfig) -> RouteSpecPatch {
        RouteSpecPatch {
            rules: self.encode_rules(config),
        }
    }

    /// One remote rule per local rule: a single match with a single header
    /// condition (logical name translated to the wire name) and a single
    /// backend ref on the fixed routing port.
    pub fn encode_rules(&self, config: &RoutingConfig) -> Vec<RouteRule> {
        let mut rules: Vec<RouteRule> = config
            .rules
            .iter()
            .map(|rule| self.encode_rule(rule))
            .collect();

        if self.policy == DefaultPoolPolicy::ExplicitCatchAll {
            rules.push(RouteRule {
                backend_refs: vec![backend_ref(&config.default_pool)],
                ..Default::default()
            });
        }

        rules
    }

    fn encode_rule(&self, rule: &RoutingRule) -> RouteRule {
        // A rule with no header condition at all decodes to empty strings;
        // writing it back as a match-less rule keeps a remote catch-all
        // intact across a decode/encode cycle. `add_rule` rejects empty
        // fields, so user-created rules never take this shape.
        let matches = if rule.header.is_empty() && rule.value.is_empty() {
            Vec::new()
        } else {
            vec![RouteMatch {
                headers: vec![HeaderMatchValue {
                    name: self.table.to_actual(&rule.header).to_string(),
                    value: rule.value.clone(),
                }],
                ..Default::default()
            }]
        };

        RouteRule {
            matches,
            backend_refs: vec![backend_ref(&rule.target)],
            ..Default::default()
        }
    }

    /// Rebuilds the local intent from a remote document.
    ///
    /// Under `ExplicitCatchAll`, a trailing match-less rule is recognized as
    /// the encoded default pool and stripped. Under `ImplicitGateway` the
    /// encoder never writes one, so a catch-all found on the wire belongs to
    /// someone else and is kept as an ordinary rule; dropping it here would
    /// delete it from the store on the next write. The default is inferred
    /// from the first rule's first backend ref when not stripped, or left at
    /// `fallback`. Each remaining rule decodes from its first match's first
    /// header condition and first backend ref; missing pieces become empty
    /// strings, never an error.
    pub fn decode(&self, resource: &HttpRoute, fallback: Pool) -> RoutingConfig {
        let mut remote_rules: &[RouteRule] = &resource.spec.rules;

        let mut default_pool = match remote_rules.last() {
            Some(last) if self.policy == DefaultPoolPolicy::ExplicitCatchAll && last.is_catch_all() => {
                let pool = backend_pool(last);
                remote_rules = &remote_rules[..remote_rules.len() - 1];
                pool
            }
            _ => None,
        };

        if default_pool.is_none() {
            default_pool = remote_rules.first().and_then(backend_pool);
        }

        let rules = remote_rules
            .iter()
            .enumerate()
            .map(|(i, rule)| self.decode_rule(i as u64 + 1, rule))
            .collect();

        RoutingConfig::from_parts(default_pool.unwrap_or(fallback), rules)
    }

    fn decode_rule(&self, id: u64, rule: &RouteRule) -> RoutingRule {
        let condition = rule.matches.first().and_then(|m| m.headers.first());

        let header = condition
            .map(|c| self.table.to_logical(&c.name).to_string())
            .unwrap_or_default();

        let value = condition.map(|c| c.value.clone()).unwrap_or_default();

        let target = rule
            .backend_refs
            .first()
            .map(|b| Pool::parse(&b.name))
            .unwrap_or(Pool::Named(String::new()));

        RoutingRule {
            id,
            header,
            value,
            target,
        }
    }
}

fn backend_ref(pool: &Pool) -> BackendRef {
    BackendRef {
        name: pool.to_string(),
        port: ROUTING_PORT,
        ..Default::default()
    }
}

fn backend_pool(rule: &RouteRule) -> Option<Pool> {
    rule.backend_refs.first().map(|b| Pool::parse(&b.name))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn implicit() -> Codec {
        Codec::new(HeaderTable::shipped().clone(), DefaultPoolPolicy::ImplicitGateway)
    }

    fn catch_all() -> Codec {
        Codec::new(HeaderTable::shipped().clone(), DefaultPoolPolicy::ExplicitCatchAll)
    }

    fn prior_resource() -> HttpRoute {
        serde_json::from_str(indoc! {r#"
            {
              "apiVersion": "gateway.networking.k8s.io/v1",
              "kind": "HTTPRoute",
              "metadata": {
                "name": "sample-route",
                "namespace": "default",
                "resourceVersion": "42",
                "uid": "28a8cecd-8bbb-476f-8e34-eb86a8a8255f"
              },
              "spec": {
                "parentRefs": [ { "name": "nexus-gateway", "sectionName": "http" } ],
                "hostnames": [ "nexus.example.com" ],
                "rules": [
                  {
                    "matches": [ { "headers": [ { "name": "x-nexus-group", "value": "beta" } ] } ],
                    "backendRefs": [ { "name": "green", "port": 80 } ]
                  }
                ]
              }
            }
        "#})
        .unwrap()
    }

    fn sample_config() -> RoutingConfig {
        let mut config = RoutingConfig::new(Pool::Blue);
        config.add_rule("user-id", "123", Pool::Blue).unwrap();
        config.add_rule("host", "example.com", Pool::Green).unwrap();
        config
    }

    #[test]
    fn encode_translates_headers_and_fixes_the_port() {
        let rules = implicit().encode_rules(&sample_config());

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].matches[0].headers[0].name, "x-nexus-user-id");
        assert_eq!(rules[0].matches[0].headers[0].value, "123");
        assert_eq!(rules[0].backend_refs[0].name, "blue");
        assert_eq!(rules[1].matches[0].headers[0].name, "host");
        assert_eq!(rules[1].backend_refs[0].name, "green");
        assert!(rules.iter().all(|r| r.backend_refs[0].port == ROUTING_PORT));
    }

    #[test]
    fn implicit_policy_emits_no_catch_all() {
        let rules = implicit().encode_rules(&sample_config());

        assert!(rules.iter().all(|r| !r.is_catch_all()));
    }

    #[test]
    fn explicit_policy_appends_the_default_as_a_trailing_catch_all() {
        let mut config = sample_config();
        config.set_default_pool(Pool::Green);

        let rules = catch_all().encode_rules(&config);

        assert_eq!(rules.len(), 3);
        assert!(rules[2].is_catch_all());
        assert_eq!(rules[2].backend_refs[0].name, "green");
    }

    #[test]
    fn encode_preserves_metadata_and_parent_refs_verbatim() {
        let prior = prior_resource();

        let encoded = implicit().encode(&sample_config(), &prior);

        assert_eq!(encoded.metadata, prior.metadata);
        assert_eq!(encoded.spec.parent_refs, prior.spec.parent_refs);
        assert_eq!(encoded.spec.extra, prior.spec.extra);
        assert_eq!(encoded.api_version, prior.api_version);
        assert_eq!(encoded.kind, prior.kind);
    }

    #[test]
    fn round_trip_with_explicit_policy_is_exact() {
        let codec = catch_all();

        let mut config = sample_config();
        config.set_default_pool(Pool::Green);

        let encoded = codec.encode(&config, &prior_resource());
        let decoded = codec.decode(&encoded, Pool::Blue);

        assert_eq!(decoded, config);
    }

    #[test]
    fn round_trip_with_implicit_policy_keeps_the_rules() {
        let codec = implicit();
        let config = sample_config();

        let encoded = codec.encode(&config, &prior_resource());
        let decoded = codec.decode(&encoded, Pool::Blue);

        // The default pool is inferred from the first rule (blue here), so
        // the whole config happens to round-trip; only the rules are
        // guaranteed to under this policy.
        assert_eq!(decoded.rules, config.rules);
        assert_eq!(decoded.default_pool, Pool::Blue);
    }

    #[test]
    fn decode_infers_the_default_from_the_first_backend() {
        let resource: HttpRoute = serde_json::from_str(indoc! {r#"
            {
              "spec": {
                "rules": [
                  {
                    "matches": [ { "headers": [ { "name": "x-nexus-user-id", "value": "123" } ] } ],
                    "backendRefs": [ { "name": "blue", "port": 80 } ]
                  }
                ]
              }
            }
        "#})
        .unwrap();

        let config = implicit().decode(&resource, Pool::Green);

        assert_eq!(config.default_pool, Pool::Blue);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].header, "user-id");
        assert_eq!(config.rules[0].value, "123");
        assert_eq!(config.rules[0].target, Pool::Blue);
    }

    #[test]
    fn decode_falls_back_when_there_are_no_rules() {
        let resource: HttpRoute = serde_json::from_str(r#"{"spec":{}}"#).unwrap();

        let config = implicit().decode(&resource, Pool::Blue);

        assert_eq!(config.default_pool, Pool::Blue);
        assert_eq!(config.rules, vec![]);
    }

    fn resource_with_catch_all() -> HttpRoute {
        serde_json::from_str(indoc! {r#"
            {
              "spec": {
                "rules": [
                  {
                    "matches": [ { "headers": [ { "name": "host", "value": "example.com" } ] } ],
                    "backendRefs": [ { "name": "blue", "port": 80 } ]
                  },
                  { "backendRefs": [ { "name": "green", "port": 80 } ] }
                ]
              }
            }
        "#})
        .unwrap()
    }

    #[test]
    fn explicit_policy_strips_a_trailing_catch_all_into_the_default() {
        let config = catch_all().decode(&resource_with_catch_all(), Pool::Blue);

        assert_eq!(config.default_pool, Pool::Green);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].header, "host");
    }

    #[test]
    fn implicit_policy_carries_a_remote_catch_all_through_a_cycle() {
        let codec = implicit();

        let config = codec.decode(&resource_with_catch_all(), Pool::Blue);

        assert_eq!(config.default_pool, Pool::Blue);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[1].header, "");
        assert_eq!(config.rules[1].target, Pool::Green);

        let rules = codec.encode_rules(&config);

        assert_eq!(rules.len(), 2);
        assert!(rules[1].is_catch_all());
        assert_eq!(rules[1].backend_refs[0].name, "green");
    }

    #[test]
    fn decode_fills_missing_rule_pieces_with_empty_strings() {
        let resource: HttpRoute = serde_json::from_str(indoc! {r#"
            {
              "spec": {
                "rules": [
                  { "matches": [ {} ] }
                ]
              }
            }
        "#})
        .unwrap();

        let config = implicit().decode(&resource, Pool::Blue);

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].header, "");
        assert_eq!(config.rules[0].value, "");
        assert_eq!(config.rules[0].target, Pool::Named(String::new()));
    }

    #[test]
    fn decode_keeps_unregistered_wire_headers_as_is() {
        let resource: HttpRoute = serde_json::from_str(indoc! {r#"
            {
              "spec": {
                "rules": [
                  {
                    "matches": [ { "headers": [ { "name": "x-experiment", "value": "on" } ] } ],
                    "backendRefs": [ { "name": "green", "port": 80 } ]
                  }
                ]
              }
            }
        "#})
        .unwrap();

        let config = implicit().decode(&resource, Pool::Blue);

        assert_eq!(config.rules[0].header, "x-experiment");
    }
}
