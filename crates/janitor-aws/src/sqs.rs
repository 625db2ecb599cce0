//! SQS queue adapter

use crate::arn::Arn;
use crate::context::AwsContext;
use crate::error::{classify, AwsError};
use async_trait::async_trait;
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client;
use chrono::{DateTime, TimeZone, Utc};
use janitor_domain::pagination::drain_pages;
use janitor_domain::{
    sweep, Candidate, Clock, DeleteOutcome, Page, ResourceError, ResourceIdentity, ResourceType,
    Scope, Set, SweepReport, SystemClock,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Adapter name
pub const NAME: &str = "sqs-queues";

/// SQS returns at most this many URLs per `ListQueues` page
const PAGE_SIZE: i32 = 1000;

/// Sweeps SQS queues
///
/// Queues report a `CreatedTimestamp`, so a queue that was created long
/// before the janitor first saw it is aged from its real creation time.
pub struct SqsQueues {
    ctx: AwsContext,
    clock: Arc<dyn Clock>,
}

#[derive(Debug)]
struct Queue {
    url: String,
    name: String,
    created: Option<DateTime<Utc>>,
    tags: HashMap<String, String>,
}

impl SqsQueues {
    /// Create the adapter
    pub fn new(ctx: AwsContext) -> Self {
        Self {
            ctx,
            clock: Arc::new(SystemClock),
        }
    }

    async fn list_urls(&self, client: &Client, scope: &Scope) -> Result<Vec<String>, ResourceError> {
        drain_pages(|token| {
            let client = client.clone();
            async move {
                let out = client
                    .list_queues()
                    .set_next_token(token)
                    .max_results(PAGE_SIZE)
                    .send()
                    .await
                    .map_err(|e| ResourceError::enumeration(NAME, scope, classify(&e)))?;
                Ok::<_, ResourceError>(Page {
                    items: out.queue_urls().to_vec(),
                    next_token: out.next_token().map(str::to_string),
                })
            }
        })
        .await
    }

    /// Fetch creation time (and tags when filtering) for one queue
    ///
    /// Returns `None` when the queue disappeared after it was listed.
    async fn describe(
        &self,
        client: &Client,
        scope: &Scope,
        url: String,
    ) -> Result<Option<Queue>, ResourceError> {
        let Some(name) = queue_name(&url) else {
            warn!(scope = %scope, url = %url, "Skipping queue URL without a name");
            return Ok(None);
        };
        let name = name.to_string();

        let attrs = match client
            .get_queue_attributes()
            .queue_url(&url)
            .attribute_names(QueueAttributeName::CreatedTimestamp)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) => return skip_if_gone(scope, &url, classify(&e)),
        };
        let created = attrs
            .attributes()
            .and_then(|a| a.get(&QueueAttributeName::CreatedTimestamp))
            .and_then(|v| parse_created(v));

        let mut tags = HashMap::new();
        if !scope.tags.is_empty() {
            match client.list_queue_tags().queue_url(&url).send().await {
                Ok(out) => {
                    if let Some(found) = out.tags() {
                        tags = found.clone();
                    }
                }
                Err(e) => return skip_if_gone(scope, &url, classify(&e)),
            }
        }

        Ok(Some(Queue {
            url,
            name,
            created,
            tags,
        }))
    }
}

/// Split described queues into sweep candidates and a count of tag-exempt ones
///
/// Exempt queues are never marked, so they drop out of the ledger.
fn candidates(scope: &Scope, queues: Vec<Queue>) -> (Vec<Candidate<String>>, usize) {
    let mut exempt = 0;
    let mut candidates = Vec::with_capacity(queues.len());
    for queue in queues {
        if !scope.tags.is_managed(&queue.tags) {
            debug!(scope = %scope, url = %queue.url, "Skipping tag-exempt queue");
            exempt += 1;
            continue;
        }
        let identity = ResourceIdentity::new(Arn::in_scope("sqs", scope, &queue.name).key())
            .with_label(queue.url.clone());
        candidates.push(Candidate::new(identity, queue.url).created_at(queue.created));
    }
    (candidates, exempt)
}

fn skip_if_gone(scope: &Scope, url: &str, err: AwsError) -> Result<Option<Queue>, ResourceError> {
    if err.is_not_found() {
        debug!(scope = %scope, url = %url, "Queue vanished while listing");
        Ok(None)
    } else {
        Err(ResourceError::enumeration(NAME, scope, err))
    }
}

/// Queue name: the last path segment of its URL
fn queue_name(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
}

/// `CreatedTimestamp` is epoch seconds as a decimal string
fn parse_created(value: &str) -> Option<DateTime<Utc>> {
    let secs = value.trim().parse::<i64>().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

async fn delete_queue(client: &Client, url: &str) -> Result<DeleteOutcome, AwsError> {
    match client.delete_queue().queue_url(url).send().await {
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
impl ResourceType for SqsQueues {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn list_all(&self, scope: &Scope) -> Result<Set, ResourceError> {
        let client = self.ctx.sqs_client(&scope.region);
        let urls = self.list_urls(&client, scope).await?;
        let keys = urls
            .iter()
            .filter_map(|url| queue_name(url))
            .map(|name| Arn::in_scope("sqs", scope, name).key());
        Ok(Set::inventory(keys, self.clock.clone()))
    }

    async fn mark_and_sweep(&self, scope: &Scope, set: &Set) -> Result<SweepReport, ResourceError> {
        let client = self.ctx.sqs_client(&scope.region);
        let urls = self.list_urls(&client, scope).await?;

        // Describe everything before marking so a failure leaves the ledger untouched
        let mut queues = Vec::with_capacity(urls.len());
        for url in urls {
            if let Some(queue) = self.describe(&client, scope, url).await? {
                queues.push(queue);
            }
        }

        let (candidates, exempt) = candidates(scope, queues);
        let mut report = sweep(NAME, scope, set, candidates, |url| {
            let client = client.clone();
            async move { delete_queue(&client, &url).await }
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
    fn test_queue_name_from_url() {
        assert_eq!(
            queue_name("https://sqs.us-east-1.amazonaws.com/111111111111/jobs"),
            Some("jobs")
        );
        assert_eq!(
            queue_name("https://sqs.us-east-1.amazonaws.com/111111111111/jobs.fifo/"),
            Some("jobs.fifo")
        );
        assert_eq!(queue_name(""), None);
    }

    #[test]
    fn test_parse_created_timestamp() {
        assert_eq!(
            parse_created("1714521600"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_created("yesterday"), None);
    }

    fn queue(name: &str, tags: &[(&str, &str)]) -> Queue {
        Queue {
            url: format!("https://sqs.us-east-1.amazonaws.com/111111111111/{}", name),
            name: name.to_string(),
            created: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn scope_with(include: &[&str], exclude: &[&str]) -> Scope {
        let tags = TagFilter {
            include: include.iter().map(|m| m.parse().unwrap()).collect(),
            exclude: exclude.iter().map(|m| m.parse().unwrap()).collect(),
        };
        Scope::new("111111111111", "us-east-1", Duration::hours(24)).with_tags(tags)
    }

    #[test]
    fn test_candidates_without_filter() {
        let scope = scope_with(&[], &[]);
        let (candidates, exempt) = candidates(&scope, vec![queue("jobs", &[])]);

        assert_eq!(exempt, 0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].identity.key.as_str(),
            "arn:aws:sqs:us-east-1:111111111111:jobs"
        );
        assert!(candidates[0].resource.ends_with("/jobs"));
        assert_eq!(candidates[0].created, Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_include_tags_exempt_untagged_queues() {
        let scope = scope_with(&["team=ci"], &[]);
        let queues = vec![
            queue("ci-jobs", &[("team", "ci")]),
            queue("prod-jobs", &[("team", "prod")]),
            queue("untagged", &[]),
        ];

        let (candidates, exempt) = candidates(&scope, queues);

        assert_eq!(exempt, 2);
        let names: Vec<_> = candidates.iter().map(|c| c.resource.as_str()).collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with("/ci-jobs"));
    }

    #[test]
    fn test_exclude_tags_exempt_kept_queues() {
        let scope = scope_with(&[], &["keep"]);
        let queues = vec![queue("scratch", &[]), queue("pinned", &[("keep", "yes")])];

        let (candidates, exempt) = candidates(&scope, queues);

        assert_eq!(exempt, 1);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].resource.ends_with("/scratch"));
    }

    #[tokio::test]
    async fn test_exempt_queues_are_never_marked() {
        let scope = scope_with(&[], &["keep"]);
        let set = Set::new(Duration::zero());
        let (candidates, _) = candidates(&scope, vec![queue("scratch", &[]), queue("pinned", &[("keep", "yes")])]);

        let report = sweep(NAME, &scope, &set, candidates, |_url: String| async {
            Ok::<_, AwsError>(DeleteOutcome::Deleted)
        })
        .await;

        assert_eq!(report.marked, 1);
        assert!(set.contains(&Arn::in_scope("sqs", &scope, "scratch").key()));
        assert!(!set.contains(&Arn::in_scope("sqs", &scope, "pinned").key()));
    }

    #[test]
    fn test_vanished_queue_is_skipped() {
        let scope = scope_with(&[], &[]);
        let gone = AwsError::NotFound {
            code: "AWS.SimpleQueueService.NonExistentQueue".into(),
            message: "The specified queue does not exist.".into(),
        };
        assert!(matches!(skip_if_gone(&scope, "url", gone), Ok(None)));

        let denied = AwsError::Sdk {
            code: Some("AccessDenied".into()),
            message: "denied".into(),
        };
        assert!(matches!(
            skip_if_gone(&scope, "url", denied),
            Err(ResourceError::Enumeration { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_list_all_in_live_account() {
        let ctx = AwsContext::load(None, "us-east-1").await;
        let account = crate::account::current_account_id(&ctx).await.unwrap();
        let scope = Scope::new(account, "us-east-1", Duration::hours(24));
        let set = SqsQueues::new(ctx).list_all(&scope).await.unwrap();
        assert_eq!(set.ttl(), Duration::zero());
    }
}
