//! Outcome of resolving subscription display names.

use super::{is_valid_guid, ResolvedSubscription, SubscriptionRecord};

/// Outcome for a single record. Every record maps to exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedSubscription),
    /// The directory has no subscription with that display name.
    NotFound,
    /// The directory returned an id that is not GUID shaped.
    Invalid { returned_id: String },
    /// The lookup call itself failed.
    LookupError { message: String },
}

impl Resolution {
    /// Classify a record from the result of its directory lookup.
    pub fn classify<E: std::fmt::Display>(
        record: &SubscriptionRecord,
        lookup: Result<Option<String>, E>,
    ) -> Self {
        match lookup {
            Err(e) => Resolution::LookupError {
                message: e.to_string(),
            },
            Ok(None) => Resolution::NotFound,
            Ok(Some(id)) if is_valid_guid(&id) => Resolution::Resolved(ResolvedSubscription {
                subscription_id: id,
                resource_group: record.resource_group.clone(),
            }),
            Ok(Some(id)) => Resolution::Invalid { returned_id: id },
        }
    }
}

/// A subscription name whose lookup call failed, with the failure text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub subscription_name: String,
    pub message: String,
}

/// Partition of one batch by [`Resolution`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResolution {
    pub resolved: Vec<ResolvedSubscription>,
    pub not_found: Vec<String>,
    pub invalid: Vec<String>,
    pub lookup_errors: Vec<LookupFailure>,
}

impl BatchResolution {
    pub fn push(&mut self, record: &SubscriptionRecord, resolution: Resolution) {
        let name = record.subscription_name.clone();
        match resolution {
            Resolution::Resolved(r) => self.resolved.push(r),
            Resolution::NotFound => self.not_found.push(name),
            Resolution::Invalid { .. } => self.invalid.push(name),
            Resolution::LookupError { message } => self.lookup_errors.push(LookupFailure {
                subscription_name: name,
                message,
            }),
        }
    }

    /// Number of records classified, across all buckets.
    pub fn total(&self) -> usize {
        self.resolved.len() + self.not_found.len() + self.invalid.len() + self.lookup_errors.len()
    }
}
