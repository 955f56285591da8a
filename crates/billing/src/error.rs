use crate::provider::{ItemKind, ProviderError};

/// Provider error codes that mean the customer's payment was declined.
/// These surface as a distinct, user-actionable error kind.
pub const PAYMENT_ERROR_CODES: &[&str] = &[
    "payment_processing_failed",
    "payment_method_verification_failed",
    "payment_method_not_present",
    "payment_gateway_currency_incompatible",
    "payment_intent_invalid",
    "payment_intent_invalid_amount",
];

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("payment declined ({code}) for subscription {subscription_id}")]
    PaymentDeclined {
        subscription_id: String,
        code: String,
        #[source]
        source: ProviderError,
    },
    #[error("failed to upgrade subscription {subscription_id}")]
    UpgradeFailed {
        subscription_id: String,
        #[source]
        source: ProviderError,
    },
    #[error("cannot cancel subscription {subscription_id}")]
    CannotCancel {
        subscription_id: String,
        #[source]
        source: ProviderError,
    },
    #[error("unknown {} id in provider catalog: {id}", .kind.as_str())]
    UnknownItem { kind: ItemKind, id: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, BillingError>;

pub(crate) fn is_payment_error(code: &str) -> bool {
    PAYMENT_ERROR_CODES.contains(&code)
}
