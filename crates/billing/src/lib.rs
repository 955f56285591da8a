mod cache;
mod error;
mod provider;
mod subscriptions;

pub use cache::MetadataCache;
pub use error::{BillingError, PAYMENT_ERROR_CODES, Result};
pub use provider::{
    AddonUpdate, BillingProvider, ItemKind, ItemPage, ItemPages, PAGE_LIMIT, ProviderError,
    RemoteItem, RemoteSubscription, SubscriptionAddon, SubscriptionUpdate,
};
pub use subscriptions::{
    ADDITIONAL_API_SCALE_UP_ADDON_ID, ADDITIONAL_API_START_UP_ADDON_ID, ADDITIONAL_SEAT_ADDON_ID,
    add_api_calls, add_api_calls_scale_up, add_api_calls_start_up, add_seats, cancel_subscription,
    subscription_metadata,
};
