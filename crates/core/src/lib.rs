use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// API surface being counted. Stored integer-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Flags,
    Identities,
    Traits,
    Environment,
    EnvironmentDocument,
}

impl Resource {
    pub fn as_i64(self) -> i64 {
        match self {
            Resource::Flags => 1,
            Resource::Identities => 2,
            Resource::Traits => 3,
            Resource::Environment => 4,
            Resource::EnvironmentDocument => 5,
        }
    }

    pub fn from_i64(value: i64) -> Option<Resource> {
        match value {
            1 => Some(Resource::Flags),
            2 => Some(Resource::Identities),
            3 => Some(Resource::Traits),
            4 => Some(Resource::Environment),
            5 => Some(Resource::EnvironmentDocument),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Flags => "flags",
            Resource::Identities => "identities",
            Resource::Traits => "traits",
            Resource::Environment => "environment",
            Resource::EnvironmentDocument => "environment_document",
        }
    }
}

/// Opaque grouping key attached to tracked events. `BTreeMap` keeps the
/// canonical JSON encoding sorted, so equal label sets always encode the
/// same way.
pub type Labels = BTreeMap<String, String>;

/// Absent and empty label sets are the same grouping key.
pub fn normalize_labels(labels: Option<Labels>) -> Labels {
    labels.unwrap_or_default()
}

pub fn labels_to_json(labels: &Labels) -> String {
    serde_json::to_string(labels).unwrap_or_else(|_| "{}".to_string())
}

pub fn labels_from_json(raw: &str) -> Labels {
    serde_json::from_str(raw).unwrap_or_default()
}

/// One tracked API call, written once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUsageRaw {
    pub environment_id: i64,
    pub resource: Resource,
    pub host: String,
    pub count: u64,
    pub labels: Labels,
    pub created_at: String,
}

/// One tracked feature-flag evaluation batch entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEvaluationRaw {
    pub environment_id: i64,
    pub feature_name: String,
    pub evaluation_count: u64,
    pub identity_identifier: Option<String>,
    pub enabled_when_evaluated: Option<bool>,
    pub labels: Labels,
    pub created_at: String,
}

/// Pre-aggregated API usage for one (environment, resource, window, labels)
/// combination at a fixed granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUsageBucket {
    pub environment_id: i64,
    pub resource: Resource,
    pub bucket_size: u32,
    pub bucket_start: String,
    pub labels: Labels,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEvaluationBucket {
    pub environment_id: i64,
    pub feature_name: String,
    pub bucket_size: u32,
    pub bucket_start: String,
    pub labels: Labels,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: i64,
    pub api_key: String,
    pub name: String,
}

/// Payload accepted by the bulk feature-evaluation tracking entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEvaluation {
    pub feature_name: String,
    pub count: u64,
    pub identity_identifier: Option<String>,
    pub enabled_when_evaluated: Option<bool>,
    #[serde(default)]
    pub labels: Option<Labels>,
}

/// Entitlement metadata attached to a billing plan or addon. Unknown remote
/// fields are dropped during deserialization; absent fields stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    #[serde(default)]
    pub seats: Option<u64>,
    #[serde(default)]
    pub api_calls: Option<u64>,
    #[serde(default)]
    pub projects: Option<u64>,
}

impl PlanMetadata {
    /// Validating constructor for metadata fetched from the billing
    /// provider. Non-object values produce empty metadata.
    pub fn from_value(value: serde_json::Value) -> PlanMetadata {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Scale entitlements by a purchase quantity. Fields the addon does not
    /// grant stay ungranted.
    pub fn scaled(self, quantity: u64) -> PlanMetadata {
        PlanMetadata {
            seats: self.seats.map(|v| v.saturating_mul(quantity)),
            api_calls: self.api_calls.map(|v| v.saturating_mul(quantity)),
            projects: self.projects.map(|v| v.saturating_mul(quantity)),
        }
    }

    /// Field-wise additive composition. A field granted by either side is
    /// granted by the result; `None + None` stays `None`.
    pub fn combined(self, other: PlanMetadata) -> PlanMetadata {
        PlanMetadata {
            seats: add_field(self.seats, other.seats),
            api_calls: add_field(self.api_calls, other.api_calls),
            projects: add_field(self.projects, other.projects),
        }
    }

    pub fn max_seats(&self) -> u64 {
        self.seats.unwrap_or(1)
    }

    pub fn max_api_calls(&self) -> u64 {
        self.api_calls.unwrap_or(50_000)
    }
}

fn add_field(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_roundtrips_through_integer_code() {
        for resource in [
            Resource::Flags,
            Resource::Identities,
            Resource::Traits,
            Resource::Environment,
            Resource::EnvironmentDocument,
        ] {
            assert_eq!(Resource::from_i64(resource.as_i64()), Some(resource));
        }
        assert_eq!(Resource::from_i64(0), None);
        assert_eq!(Resource::from_i64(99), None);
    }

    #[test]
    fn labels_encode_sorted_and_ignore_key_order() {
        let mut a = Labels::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = Labels::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());
        assert_eq!(labels_to_json(&a), labels_to_json(&b));
        assert_eq!(labels_to_json(&a), r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn absent_labels_normalize_to_empty() {
        assert_eq!(normalize_labels(None), Labels::new());
        assert_eq!(labels_to_json(&normalize_labels(None)), "{}");
        assert_eq!(labels_from_json("{}"), Labels::new());
    }

    #[test]
    fn plan_metadata_drops_unknown_fields() {
        let metadata = PlanMetadata::from_value(serde_json::json!({
            "seats": 10,
            "api_calls": 100,
            "projects": 10,
            "some_unknown_key": 1,
        }));
        assert_eq!(
            metadata,
            PlanMetadata {
                seats: Some(10),
                api_calls: Some(100),
                projects: Some(10),
            }
        );
    }

    #[test]
    fn plan_metadata_defaults_when_absent() {
        let metadata = PlanMetadata::from_value(serde_json::json!({}));
        assert_eq!(metadata.seats, None);
        assert_eq!(metadata.max_seats(), 1);
        assert_eq!(metadata.max_api_calls(), 50_000);
    }

    #[test]
    fn plan_plus_scaled_addon_adds_field_wise() {
        let plan = PlanMetadata {
            seats: Some(1),
            api_calls: Some(50_000),
            projects: Some(1),
        };
        let addon = PlanMetadata {
            seats: Some(1),
            api_calls: None,
            projects: None,
        };
        let combined = plan.combined(addon.scaled(3));
        assert_eq!(combined.seats, Some(4));
        assert_eq!(combined.api_calls, Some(50_000));
        assert_eq!(combined.projects, Some(1));
    }

    #[test]
    fn combined_keeps_none_when_neither_side_grants() {
        let a = PlanMetadata {
            seats: Some(2),
            api_calls: None,
            projects: None,
        };
        let b = PlanMetadata {
            seats: None,
            api_calls: None,
            projects: Some(1),
        };
        let combined = a.combined(b);
        assert_eq!(combined.seats, Some(2));
        assert_eq!(combined.api_calls, None);
        assert_eq!(combined.projects, Some(1));
    }
}
