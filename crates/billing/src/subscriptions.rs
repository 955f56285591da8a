use tracing::{error, warn};

use analytics_core::PlanMetadata;

use crate::cache::MetadataCache;
use crate::error::{BillingError, Result, is_payment_error};
use crate::provider::{AddonUpdate, BillingProvider, ItemKind, SubscriptionUpdate};

pub const ADDITIONAL_SEAT_ADDON_ID: &str = "additional-seat";
pub const ADDITIONAL_API_START_UP_ADDON_ID: &str = "additional-api-start-up";
pub const ADDITIONAL_API_SCALE_UP_ADDON_ID: &str = "additional-api-scale-up";

/// Effective entitlements of a subscription: the plan's base metadata plus
/// each addon's metadata scaled by its purchase quantity, combined
/// additively. A blank subscription id and provider lookup failures both
/// resolve to `None`.
pub fn subscription_metadata(
    provider: &dyn BillingProvider,
    cache: &mut MetadataCache,
    subscription_id: &str,
) -> Result<Option<PlanMetadata>> {
    if subscription_id.trim().is_empty() {
        warn!("subscription id is empty");
        return Ok(None);
    }
    let subscription = match provider.subscription(subscription_id) {
        Ok(subscription) => subscription,
        Err(err) => {
            warn!(subscription_id, %err, "failed to retrieve subscription");
            return Ok(None);
        }
    };

    let mut metadata = cache
        .plan(provider, &subscription.plan_id)?
        .ok_or_else(|| BillingError::UnknownItem {
            kind: ItemKind::Plan,
            id: subscription.plan_id.clone(),
        })?;
    for addon in &subscription.addons {
        let addon_metadata =
            cache
                .addon(provider, &addon.id)?
                .ok_or_else(|| BillingError::UnknownItem {
                    kind: ItemKind::Addon,
                    id: addon.id.clone(),
                })?;
        let quantity = addon.quantity.filter(|q| *q != 0).unwrap_or(1);
        metadata = metadata.combined(addon_metadata.scaled(quantity));
    }
    Ok(Some(metadata))
}

/// Add `count` seats to the subscription's seat addon, prorated and
/// invoiced with the next billing cycle.
pub fn add_seats(
    provider: &dyn BillingProvider,
    subscription_id: &str,
    count: u64,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let subscription = provider
        .subscription(subscription_id)
        .map_err(|err| upgrade_error(subscription_id, err))?;
    let current_seats = subscription
        .addons
        .iter()
        .find(|addon| addon.id == ADDITIONAL_SEAT_ADDON_ID)
        .and_then(|addon| addon.quantity)
        .unwrap_or(0);

    provider
        .update_subscription(
            subscription_id,
            SubscriptionUpdate {
                addons: vec![AddonUpdate {
                    id: ADDITIONAL_SEAT_ADDON_ID.to_string(),
                    quantity: current_seats + count,
                }],
                prorate: true,
                invoice_immediately: false,
            },
        )
        .map_err(|err| upgrade_error(subscription_id, err))
}

pub fn add_api_calls_start_up(
    provider: &dyn BillingProvider,
    subscription_id: &str,
    count: u64,
    invoice_immediately: bool,
) -> Result<()> {
    add_api_calls(
        provider,
        ADDITIONAL_API_START_UP_ADDON_ID,
        subscription_id,
        count,
        invoice_immediately,
    )
}

pub fn add_api_calls_scale_up(
    provider: &dyn BillingProvider,
    subscription_id: &str,
    count: u64,
    invoice_immediately: bool,
) -> Result<()> {
    add_api_calls(
        provider,
        ADDITIONAL_API_SCALE_UP_ADDON_ID,
        subscription_id,
        count,
        invoice_immediately,
    )
}

/// Set the API-call addon quantity on a subscription. Zero is a no-op;
/// API-call top-ups are never prorated.
pub fn add_api_calls(
    provider: &dyn BillingProvider,
    addon_id: &str,
    subscription_id: &str,
    count: u64,
    invoice_immediately: bool,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    provider
        .update_subscription(
            subscription_id,
            SubscriptionUpdate {
                addons: vec![AddonUpdate {
                    id: addon_id.to_string(),
                    quantity: count,
                }],
                prorate: false,
                invoice_immediately,
            },
        )
        .map_err(|err| upgrade_error(subscription_id, err))
}

/// End-of-term cancellation.
pub fn cancel_subscription(provider: &dyn BillingProvider, subscription_id: &str) -> Result<()> {
    provider.cancel_subscription(subscription_id).map_err(|err| {
        error!(subscription_id, %err, "cannot cancel subscription");
        BillingError::CannotCancel {
            subscription_id: subscription_id.to_string(),
            source: err,
        }
    })
}

fn upgrade_error(subscription_id: &str, err: crate::provider::ProviderError) -> BillingError {
    if is_payment_error(&err.code) {
        warn!(
            subscription_id,
            code = %err.code,
            "payment declined during subscription upgrade"
        );
        return BillingError::PaymentDeclined {
            subscription_id: subscription_id.to_string(),
            code: err.code.clone(),
            source: err,
        };
    }
    error!(subscription_id, %err, "failed to upgrade subscription");
    BillingError::UpgradeFailed {
        subscription_id: subscription_id.to_string(),
        source: err,
    }
}
