//! EventBridge rule adapter

use crate::arn::Arn;
use crate::context::AwsContext;
use crate::error::{classify, AwsError};
use async_trait::async_trait;
use aws_sdk_eventbridge::Client;
use janitor_domain::pagination::drain_pages;
use janitor_domain::{
    sweep, Candidate, Clock, DeleteOutcome, Page, ResourceError, ResourceIdentity, ResourceType,
    Scope, Set, SweepReport, SystemClock,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Adapter name
pub const NAME: &str = "eventbridge-rules";

/// Largest page `ListRules` and `ListTargetsByRule` accept
const PAGE_SIZE: i32 = 100;

/// Sweeps rules on the default event bus
///
/// Rules carry no creation time, so they are aged from when the janitor
/// first observed them. Rules managed by another AWS service are left alone.
pub struct EventBridgeRules {
    ctx: AwsContext,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone)]
struct Rule {
    name: String,
    arn: Option<String>,
    managed_by: Option<String>,
}

impl Rule {
    fn key_arn(&self, scope: &Scope) -> Arn {
        Arn::in_scope("events", scope, format!("rule/{}", self.name))
    }
}

impl EventBridgeRules {
    /// Create the adapter
    pub fn new(ctx: AwsContext) -> Self {
        Self {
            ctx,
            clock: Arc::new(SystemClock),
        }
    }

    async fn list_rules(&self, client: &Client, scope: &Scope) -> Result<Vec<Rule>, ResourceError> {
        drain_pages(|token| {
            let client = client.clone();
            async move {
                let out = client
                    .list_rules()
                    .set_next_token(token)
                    .limit(PAGE_SIZE)
                    .send()
                    .await
                    .map_err(|e| ResourceError::enumeration(NAME, scope, classify(&e)))?;
                let items = out
                    .rules()
                    .iter()
                    .filter_map(|r| {
                        Some(Rule {
                            name: r.name()?.to_string(),
                            arn: r.arn().map(str::to_string),
                            managed_by: r.managed_by().map(str::to_string),
                        })
                    })
                    .collect();
                Ok::<_, ResourceError>(Page {
                    items,
                    next_token: out.next_token().map(str::to_string),
                })
            }
        })
        .await
    }

    async fn rule_tags(
        &self,
        client: &Client,
        scope: &Scope,
        rule: &Rule,
    ) -> Result<HashMap<String, String>, ResourceError> {
        let arn = rule
            .arn
            .clone()
            .unwrap_or_else(|| rule.key_arn(scope).to_string());
        match client.list_tags_for_resource().resource_arn(arn).send().await {
            Ok(out) => Ok(out
                .tags()
                .iter()
                .map(|t| (t.key().to_string(), t.value().to_string()))
                .collect()),
            Err(e) => {
                let err = classify(&e);
                if err.is_not_found() {
                    debug!(scope = %scope, rule = %rule.name, "Rule vanished while listing");
                    Ok(HashMap::new())
                } else {
                    Err(ResourceError::enumeration(NAME, scope, err))
                }
            }
        }
    }
}

/// Split rules into sweep candidates and a count of exempt ones
///
/// Service-managed rules and rules the tag filter excludes are never marked.
fn candidates(
    scope: &Scope,
    rules: Vec<(Rule, HashMap<String, String>)>,
) -> (Vec<Candidate<String>>, usize) {
    let mut exempt = 0;
    let mut candidates = Vec::with_capacity(rules.len());
    for (rule, tags) in rules {
        if let Some(manager) = &rule.managed_by {
            debug!(scope = %scope, rule = %rule.name, managed_by = %manager, "Skipping service-managed rule");
            exempt += 1;
            continue;
        }
        if !scope.tags.is_managed(&tags) {
            debug!(scope = %scope, rule = %rule.name, "Skipping tag-exempt rule");
            exempt += 1;
            continue;
        }
        let identity = ResourceIdentity::new(rule.key_arn(scope).key()).with_label(rule.name.clone());
        candidates.push(Candidate::new(identity, rule.name));
    }
    (candidates, exempt)
}

/// Remove every target from `rule`, then delete it
///
/// EventBridge refuses to delete a rule that still has targets.
async fn delete_rule(client: &Client, rule: &str) -> Result<DeleteOutcome, AwsError> {
    let targets = drain_pages(|token| {
        let client = client.clone();
        async move {
            let out = client
                .list_targets_by_rule()
                .rule(rule)
                .set_next_token(token)
                .limit(PAGE_SIZE)
                .send()
                .await
                .map_err(|e| classify(&e))?;
            Ok::<_, AwsError>(Page {
                items: out.targets().iter().map(|t| t.id().to_string()).collect(),
                next_token: out.next_token().map(str::to_string),
            })
        }
    })
    .await;

    let targets = match targets {
        Ok(targets) => targets,
        Err(e) if e.is_not_found() => return Ok(DeleteOutcome::AlreadyGone),
        Err(e) => return Err(e),
    };

    // RemoveTargets accepts at most 10 ids per call
    for ids in targets.chunks(10) {
        if let Err(e) = client
            .remove_targets()
            .rule(rule)
            .set_ids(Some(ids.to_vec()))
            .send()
            .await
        {
            let err = classify(&e);
            if err.is_not_found() {
                return Ok(DeleteOutcome::AlreadyGone);
            }
            return Err(err);
        }
    }

    match client.delete_rule().name(rule).send().await {
        Ok(_) => Ok(DeleteOutcome::Deleted),
        Err(e) => {
            let err = classify(&e);
            if err.is_not_found() {
                Ok(DeleteOutcome::AlreadyGone)
            } else {
                Err(err)
            }
        }
    }
}

#[async_trait]
impl ResourceType for EventBridgeRules {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn list_all(&self, scope: &Scope) -> Result<Set, ResourceError> {
        let client = self.ctx.eventbridge_client(&scope.region);
        let rules = self.list_rules(&client, scope).await?;
        let keys = rules.iter().map(|rule| rule.key_arn(scope).key());
        Ok(Set::inventory(keys, self.clock.clone()))
    }

    async fn mark_and_sweep(&self, scope: &Scope, set: &Set) -> Result<SweepReport, ResourceError> {
        let client = self.ctx.eventbridge_client(&scope.region);
        let rules = self.list_rules(&client, scope).await?;

        // Fetch tags for every rule before marking so a failure leaves the ledger untouched
        let mut described = Vec::with_capacity(rules.len());
        for rule in rules {
            let tags = if rule.managed_by.is_none() && !scope.tags.is_empty() {
                self.rule_tags(&client, scope, &rule).await?
            } else {
                HashMap::new()
            };
            described.push((rule, tags));
        }

        let (candidates, exempt) = candidates(scope, described);
        let mut report = sweep(NAME, scope, set, candidates, |name| {
            let client = client.clone();
            async move { delete_rule(&client, &name).await }
        })
        .await;
        report.exempt = exempt;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use janitor_domain::TagFilter;

    #[test]
    fn test_rule_key_uses_rule_prefix() {
        let scope = Scope::new("111111111111", "us-west-2", Duration::hours(1));
        let rule = Rule {
            name: "nightly-build".to_string(),
            arn: None,
            managed_by: None,
        };
        assert_eq!(
            rule.key_arn(&scope).to_string(),
            "arn:aws:events:us-west-2:111111111111:rule/nightly-build"
        );
    }

    fn rule(name: &str, managed_by: Option<&str>) -> Rule {
        Rule {
            name: name.to_string(),
            arn: None,
            managed_by: managed_by.map(str::to_string),
        }
    }

    fn tagged(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn scope_with(include: &[&str], exclude: &[&str]) -> Scope {
        let tags = TagFilter {
            include: include.iter().map(|m| m.parse().unwrap()).collect(),
            exclude: exclude.iter().map(|m| m.parse().unwrap()).collect(),
        };
        Scope::new("111111111111", "us-west-2", Duration::hours(1)).with_tags(tags)
    }

    #[test]
    fn test_service_managed_rules_are_exempt() {
        let scope = scope_with(&[], &[]);
        let rules = vec![
            (rule("nightly-build", None), HashMap::new()),
            (rule("AutoScalingManagedRule", Some("autoscaling.amazonaws.com")), HashMap::new()),
        ];

        let (candidates, exempt) = candidates(&scope, rules);

        assert_eq!(exempt, 1);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].resource, "nightly-build");
        assert_eq!(
            candidates[0].identity.key.as_str(),
            "arn:aws:events:us-west-2:111111111111:rule/nightly-build"
        );
    }

    #[test]
    fn test_tag_filter_paths() {
        let rules = || {
            vec![
                (rule("ci", None), tagged(&[("team", "ci")])),
                (rule("pinned", None), tagged(&[("team", "ci"), ("keep", "true")])),
                (rule("bare", None), HashMap::new()),
            ]
        };

        let (included, exempt) = candidates(&scope_with(&["team=ci"], &[]), rules());
        assert_eq!(exempt, 1);
        let names: Vec<_> = included.iter().map(|c| c.resource.as_str()).collect();
        assert_eq!(names, vec!["ci", "pinned"]);

        let (kept, exempt) = candidates(&scope_with(&["team"], &["keep"]), rules());
        assert_eq!(exempt, 2);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].resource, "ci");
    }

    #[tokio::test]
    async fn test_exempt_rules_are_never_marked() {
        let scope = scope_with(&[], &[]);
        let set = Set::new(Duration::zero());
        let rules = vec![
            (rule("nightly-build", None), HashMap::new()),
            (rule("managed", Some("events.amazonaws.com")), HashMap::new()),
        ];
        let (candidates, _) = candidates(&scope, rules);

        let report = sweep(NAME, &scope, &set, candidates, |_name: String| async {
            Ok::<_, AwsError>(DeleteOutcome::Deleted)
        })
        .await;

        assert_eq!(report.marked, 1);
        assert_eq!(set.len(), 1);
        assert!(!set.contains(&rule("managed", None).key_arn(&scope).key()));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_list_all_in_live_account() {
        let ctx = AwsContext::load(None, "us-east-1").await;
        let account = crate::account::current_account_id(&ctx).await.unwrap();
        let scope = Scope::new(account, "us-east-1", Duration::hours(24));
        let set = EventBridgeRules::new(ctx).list_all(&scope).await.unwrap();
        assert_eq!(set.ttl(), Duration::zero());
    }
}
