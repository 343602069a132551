//! Subscription records read from the input CSV.

/// One row of the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    /// Display name as shown in the Azure portal.
    pub subscription_name: String,
    /// Resource group to scope the inventory to, empty for the whole subscription.
    pub resource_group: String,
}

impl SubscriptionRecord {
    pub fn new(subscription_name: impl Into<String>, resource_group: impl Into<String>) -> Self {
        SubscriptionRecord {
            subscription_name: subscription_name.into(),
            resource_group: resource_group.into(),
        }
    }
}

/// A record whose display name resolved to a well-formed subscription id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubscription {
    pub subscription_id: String,
    pub resource_group: String,
}

impl ResolvedSubscription {
    /// The resource group filter, or None when the record covers the whole subscription.
    pub fn resource_group_filter(&self) -> Option<&str> {
        let rg = self.resource_group.trim();
        (!rg.is_empty()).then_some(rg)
    }
}
