use analytics_core::{Labels, Resource};

/// One group from a windowed source query: (environment, resource, labels)
/// with the summed count.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiUsageGroup {
    pub environment_id: i64,
    pub resource: Resource,
    pub labels: Labels,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEvaluationGroup {
    pub environment_id: i64,
    pub feature_name: String,
    pub labels: Labels,
    pub count: u64,
}

/// Bucketed usage summed per resource over a reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTotal {
    pub resource: Resource,
    pub total_count: u64,
}
