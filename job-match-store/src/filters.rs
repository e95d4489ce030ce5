//! Equality filters for similarity queries.

use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, condition::ConditionOneOf, r#match::MatchValue,
};
use tracing::debug;

/// Must-filter restricting hits to job points, optionally narrowed to one
/// ingestion batch.
pub fn job_filter(batch_id: Option<&str>) -> Filter {
    debug!(batch = batch_id.unwrap_or("<any>"), "building job filter");

    let mut must = vec![keyword_eq("doc_type", "job")];
    if let Some(batch) = batch_id {
        must.push(keyword_eq("batch_id", batch));
    }

    Filter {
        must,
        ..Default::default()
    }
}

fn keyword_eq(field: &str, value: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: field.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(value.to_string())),
            }),
            ..Default::default()
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_without_batch_has_one_condition() {
        let f = job_filter(None);
        assert_eq!(f.must.len(), 1);
        assert!(f.should.is_empty());
    }

    #[test]
    fn filter_with_batch_has_two_conditions() {
        let f = job_filter(Some("batch-7"));
        assert_eq!(f.must.len(), 2);
    }
}
