use serde::{Deserialize, Serialize};

/// Listing page size used when walking the provider catalog.
pub const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Plan,
    Addon,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Plan => "plan",
            ItemKind::Addon => "addon",
        }
    }
}

/// One catalog entry as returned by the provider; `metadata` is the raw
/// remote object, validated later into `PlanMetadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPage {
    pub items: Vec<RemoteItem>,
    pub next_offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionAddon {
    pub id: String,
    pub quantity: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSubscription {
    pub id: String,
    pub plan_id: String,
    pub addons: Vec<SubscriptionAddon>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonUpdate {
    pub id: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    pub addons: Vec<AddonUpdate>,
    pub prorate: bool,
    pub invoice_immediately: bool,
}

/// Machine-readable failure from the remote billing service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("billing provider error ({code}): {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Contract this system expects from the billing service. Cancellation is
/// end-of-term.
pub trait BillingProvider {
    fn list_items(
        &self,
        kind: ItemKind,
        limit: u32,
        offset: Option<&str>,
    ) -> std::result::Result<ItemPage, ProviderError>;

    fn subscription(&self, id: &str) -> std::result::Result<RemoteSubscription, ProviderError>;

    fn update_subscription(
        &self,
        id: &str,
        update: SubscriptionUpdate,
    ) -> std::result::Result<(), ProviderError>;

    fn cancel_subscription(&self, id: &str) -> std::result::Result<(), ProviderError>;
}

/// Finite lazy walk over the provider catalog: each call fetches one page
/// and follows `next_offset` until the provider stops returning one.
pub struct ItemPages<'a> {
    provider: &'a dyn BillingProvider,
    kind: ItemKind,
    offset: Option<String>,
    done: bool,
}

impl<'a> ItemPages<'a> {
    pub fn new(provider: &'a dyn BillingProvider, kind: ItemKind) -> Self {
        Self {
            provider,
            kind,
            offset: None,
            done: false,
        }
    }
}

impl Iterator for ItemPages<'_> {
    type Item = std::result::Result<ItemPage, ProviderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = match self
            .provider
            .list_items(self.kind, PAGE_LIMIT, self.offset.as_deref())
        {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        match &page.next_offset {
            Some(next) => self.offset = Some(next.clone()),
            None => self.done = true,
        }
        Some(Ok(page))
    }
}
