use std::collections::HashMap;

use analytics_core::PlanMetadata;

use crate::error::Result;
use crate::provider::{BillingProvider, ItemKind, ItemPages};

#[derive(Default)]
struct CachedItems {
    plans: HashMap<String, PlanMetadata>,
    addons: HashMap<String, PlanMetadata>,
}

/// Plan-id and addon-id metadata maps, fetched from the provider catalog
/// and refreshed lazily on first access.
#[derive(Default)]
pub struct MetadataCache {
    items: Option<CachedItems>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repopulate both maps from the provider. Pagination follows
    /// `next_offset` until the catalog is exhausted.
    pub fn refresh(&mut self, provider: &dyn BillingProvider) -> Result<()> {
        let plans = fetch_items(provider, ItemKind::Plan)?;
        let addons = fetch_items(provider, ItemKind::Addon)?;
        self.items = Some(CachedItems { plans, addons });
        Ok(())
    }

    pub fn plan(
        &mut self,
        provider: &dyn BillingProvider,
        plan_id: &str,
    ) -> Result<Option<PlanMetadata>> {
        Ok(self.get_items(provider)?.plans.get(plan_id).copied())
    }

    pub fn addon(
        &mut self,
        provider: &dyn BillingProvider,
        addon_id: &str,
    ) -> Result<Option<PlanMetadata>> {
        Ok(self.get_items(provider)?.addons.get(addon_id).copied())
    }

    pub fn plan_count(&self) -> usize {
        self.items.as_ref().map_or(0, |items| items.plans.len())
    }

    pub fn addon_count(&self) -> usize {
        self.items.as_ref().map_or(0, |items| items.addons.len())
    }

    fn get_items(&mut self, provider: &dyn BillingProvider) -> Result<&CachedItems> {
        if self.items.is_none() {
            self.refresh(provider)?;
        }
        Ok(self.items.get_or_insert_with(CachedItems::default))
    }
}

fn fetch_items(
    provider: &dyn BillingProvider,
    kind: ItemKind,
) -> Result<HashMap<String, PlanMetadata>> {
    let mut items = HashMap::new();
    for page in ItemPages::new(provider, kind) {
        for item in page?.items {
            items.insert(item.id, PlanMetadata::from_value(item.metadata));
        }
    }
    Ok(items)
}
