use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::ValidationError;

/// A backend deployment traffic can be routed to.
///
/// Blue and green are the shipped pair; `Named` keeps the model open to
/// arbitrary pool names coming back from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    Blue,
    Green,
    #[strum(default)]
    #[serde(untagged)]
    Named(String),
}

impl Pool {
    /// Parses a wire pool name. Unknown names become `Named`, so this never
    /// fails.
    pub fn parse(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|_| Self::Named(s.to_string()))
    }
}

/// One header-match condition paired with a target pool.
///
/// `header` holds the logical name; translation to the wire name happens in
/// the codec. Ordering among rules is significant (first match wins at the
/// gateway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub id: u64,
    pub header: String,
    pub value: String,
    pub target: Pool,
}

/// Field-wise patch for [`RoutingConfig::update_rule`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulePatch {
    pub header: Option<String>,
    pub value: Option<String>,
    pub target: Option<Pool>,
}

/// The full local routing intent: an ordered rule list plus the pool that
/// takes traffic when nothing matches. An empty rule list is valid and means
/// "all traffic to `default_pool`".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub default_pool: Pool,
    pub rules: Vec<RoutingRule>,
    #[serde(skip)]
    next_id: u64,
}

impl PartialEq for RoutingConfig {
    fn eq(&self, other: &Self) -> bool {
        self.default_pool == other.default_pool && self.rules == other.rules
    }
}

impl RoutingConfig {
    pub fn new(default_pool: Pool) -> Self {
        Self {
            default_pool,
            rules: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuilds a config from already-identified rules (decode path).
    pub fn from_parts(default_pool: Pool, rules: Vec<RoutingRule>) -> Self {
        let next_id = rules.iter().map(|r| r.id).max().unwrap_or(0) + 1;

        Self {
            default_pool,
            rules,
            next_id,
        }
    }

    // Ids are never reused within a session, even after removals.
    fn fresh_id(&mut self) -> u64 {
        let floor = self.rules.iter().map(|r| r.id).max().unwrap_or(0);

        self.next_id = self.next_id.max(floor + 1);

        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Appends a rule. Header and value must be non-empty; a failed
    /// validation leaves the rule list untouched.
    pub fn add_rule(
        &mut self,
        header: &str,
        value: &str,
        target: Pool,
    ) -> Result<&RoutingRule, ValidationError> {
        if header.is_empty() {
            return Err(ValidationError::EmptyHeader);
        }

        if value.is_empty() {
            return Err(ValidationError::EmptyValue);
        }

        let id = self.fresh_id();

        self.rules.push(RoutingRule {
            id,
            header: header.to_string(),
            value: value.to_string(),
            target,
        });

        Ok(self.rules.last().expect("rule was just pushed"))
    }

    /// Applies `patch` to the rule with `id`. Returns false (no-op) when the
    /// id is unknown.
    pub fn update_rule(&mut self, id: u64, patch: RulePatch) -> bool {
        let Some(rule) = self.rules.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        if let Some(header) = patch.header {
            rule.header = header;
        }

        if let Some(value) = patch.value {
            rule.value = value;
        }

        if let Some(target) = patch.target {
            rule.target = target;
        }

        true
    }

    /// Removes the rule with `id`. Returns false (no-op) when absent.
    pub fn remove_rule(&mut self, id: u64) -> bool {
        let before = self.rules.len();

        self.rules.retain(|r| r.id != id);

        self.rules.len() != before
    }

    pub fn set_default_pool(&mut self, pool: Pool) {
        self.default_pool = pool;
    }

    /// Sends 100% of traffic to `pool`: clears every rule and moves the
    /// default in one step, so callers never observe old rules with the new
    /// default or the other way around.
    pub fn switch_all_to_pool(&mut self, pool: Pool) {
        self.rules.clear();
        self.default_pool = pool;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn sample_config() -> RoutingConfig {
        let mut config = RoutingConfig::new(Pool::Blue);
        config.add_rule("user-id", "123", Pool::Blue).unwrap();
        config.add_rule("host", "example.com", Pool::Green).unwrap();
        config
    }

    #[rstest]
    #[case("blue", Pool::Blue)]
    #[case("green", Pool::Green)]
    #[case("canary", Pool::Named("canary".to_string()))]
    fn pool_parses_any_name(#[case] input: &str, #[case] expected: Pool) {
        assert_eq!(Pool::parse(input), expected);
        assert_eq!(Pool::parse(input).to_string(), input);
    }

    #[test]
    fn pool_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&Pool::Green).unwrap(), r#""green""#);
        assert_eq!(
            serde_json::to_string(&Pool::Named("canary".to_string())).unwrap(),
            r#""canary""#
        );
        assert_eq!(serde_json::from_str::<Pool>(r#""blue""#).unwrap(), Pool::Blue);
        assert_eq!(
            serde_json::from_str::<Pool>(r#""staging""#).unwrap(),
            Pool::Named("staging".to_string())
        );
    }

    #[test]
    fn add_rule_appends_in_order_with_fresh_ids() {
        let config = sample_config();

        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].id, 1);
        assert_eq!(config.rules[0].header, "user-id");
        assert_eq!(config.rules[1].id, 2);
        assert_eq!(config.rules[1].target, Pool::Green);
    }

    #[rstest]
    #[case("", "v", ValidationError::EmptyHeader)]
    #[case("h", "", ValidationError::EmptyValue)]
    fn add_rule_rejects_empty_fields(
        #[case] header: &str,
        #[case] value: &str,
        #[case] expected: ValidationError,
    ) {
        let mut config = sample_config();
        let before = config.rules.clone();

        let err = config.add_rule(header, value, Pool::Blue).unwrap_err();

        assert_eq!(err, expected);
        assert_eq!(config.rules, before);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut config = sample_config();

        assert!(config.remove_rule(2));

        let rule = config.add_rule("group", "beta", Pool::Green).unwrap();

        assert_eq!(rule.id, 3);
    }

    #[test]
    fn update_rule_patches_single_fields() {
        let mut config = sample_config();

        assert!(config.update_rule(
            1,
            RulePatch {
                value: Some("456".to_string()),
                ..Default::default()
            }
        ));

        assert_eq!(config.rules[0].header, "user-id");
        assert_eq!(config.rules[0].value, "456");
        assert_eq!(config.rules[0].target, Pool::Blue);
    }

    #[test]
    fn update_and_remove_are_noops_for_unknown_ids() {
        let mut config = sample_config();
        let before = config.clone();

        assert!(!config.update_rule(
            99,
            RulePatch {
                header: Some("group".to_string()),
                ..Default::default()
            }
        ));
        assert!(!config.remove_rule(99));

        assert_eq!(config, before);
    }

    #[test]
    fn switch_all_clears_rules_and_moves_default_together() {
        let mut config = sample_config();

        config.switch_all_to_pool(Pool::Green);

        assert_eq!(config.default_pool, Pool::Green);
        assert_eq!(config.rules, vec![]);
    }
}
