//! Registered resource types

use crate::context::AwsContext;
use crate::eventbridge::{self, EventBridgeRules};
use crate::sqs::{self, SqsQueues};
use janitor_domain::ResourceType;
use std::sync::Arc;

/// Names of every regional resource type, in sweep order
pub const TYPE_NAMES: &[&str] = &[sqs::NAME, eventbridge::NAME];

/// Every regional resource type, in sweep order
pub fn regional_types(ctx: &AwsContext) -> Vec<Arc<dyn ResourceType>> {
    vec![
        Arc::new(SqsQueues::new(ctx.clone())),
        Arc::new(EventBridgeRules::new(ctx.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_are_unique() {
        assert_eq!(TYPE_NAMES, &["sqs-queues", "eventbridge-rules"]);
        let mut names = TYPE_NAMES.to_vec();
        names.dedup();
        assert_eq!(names.len(), TYPE_NAMES.len());
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_registry_order_matches_names() {
        let ctx = AwsContext::load(None, "us-east-1").await;
        let names: Vec<_> = regional_types(&ctx).iter().map(|t| t.name()).collect();
        assert_eq!(names, TYPE_NAMES);
    }
}
