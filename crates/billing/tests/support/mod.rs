#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use billing::{
    BillingProvider, ItemKind, ItemPage, ProviderError, RemoteItem, RemoteSubscription,
    SubscriptionAddon, SubscriptionUpdate,
};

/// Scriptable in-memory provider. Catalog pages are pre-built; offsets are
/// page indexes rendered as strings.
#[derive(Default)]
pub struct MockProvider {
    pub plan_pages: Vec<ItemPage>,
    pub addon_pages: Vec<ItemPage>,
    pub subscriptions: HashMap<String, RemoteSubscription>,
    pub update_error: Option<ProviderError>,
    pub cancel_error: Option<ProviderError>,
    pub list_calls: RefCell<Vec<(ItemKind, u32, Option<String>)>>,
    pub updates: RefCell<Vec<(String, SubscriptionUpdate)>>,
    pub cancels: RefCell<Vec<String>>,
}

impl BillingProvider for MockProvider {
    fn list_items(
        &self,
        kind: ItemKind,
        limit: u32,
        offset: Option<&str>,
    ) -> Result<ItemPage, ProviderError> {
        self.list_calls
            .borrow_mut()
            .push((kind, limit, offset.map(str::to_string)));
        let pages = match kind {
            ItemKind::Plan => &self.plan_pages,
            ItemKind::Addon => &self.addon_pages,
        };
        let index = offset.and_then(|o| o.parse::<usize>().ok()).unwrap_or(0);
        Ok(pages.get(index).cloned().unwrap_or(ItemPage {
            items: Vec::new(),
            next_offset: None,
        }))
    }

    fn subscription(&self, id: &str) -> Result<RemoteSubscription, ProviderError> {
        self.subscriptions
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::new("resource_not_found", format!("no subscription {id}")))
    }

    fn update_subscription(
        &self,
        id: &str,
        update: SubscriptionUpdate,
    ) -> Result<(), ProviderError> {
        if let Some(err) = &self.update_error {
            return Err(err.clone());
        }
        self.updates.borrow_mut().push((id.to_string(), update));
        Ok(())
    }

    fn cancel_subscription(&self, id: &str) -> Result<(), ProviderError> {
        if let Some(err) = &self.cancel_error {
            return Err(err.clone());
        }
        self.cancels.borrow_mut().push(id.to_string());
        Ok(())
    }
}

pub fn item(id: &str, metadata: serde_json::Value) -> RemoteItem {
    RemoteItem {
        id: id.to_string(),
        metadata,
    }
}

pub fn single_page(items: Vec<RemoteItem>) -> Vec<ItemPage> {
    vec![ItemPage {
        items,
        next_offset: None,
    }]
}

pub fn subscription(
    id: &str,
    plan_id: &str,
    addons: Vec<(&str, Option<u64>)>,
) -> RemoteSubscription {
    RemoteSubscription {
        id: id.to_string(),
        plan_id: plan_id.to_string(),
        addons: addons
            .into_iter()
            .map(|(addon_id, quantity)| SubscriptionAddon {
                id: addon_id.to_string(),
                quantity,
            })
            .collect(),
        customer_email: Some("customer@example.com".to_string()),
    }
}
