// src/services/identity.rs
//! Customer identity resolution.
//!
//! The voice platform has no customer entity, so one is synthesized per call
//! from an ordered list of key strategies. Two calls resolving to the same key
//! are the same customer. A caller using several numbers without metadata
//! shows up as several customers.

use crate::models::{CallRecord, CustomerIdentity, CustomerMetadata};

const LABEL_FRAGMENT_LEN: usize = 8;

/// One way of deriving a customer key from a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    MetadataCustomerId,
    CallerPhoneNumber,
    AssistantId,
}

/// Strongest identifier first.
pub const DEFAULT_KEY_STRATEGIES: [KeyStrategy; 3] = [
    KeyStrategy::MetadataCustomerId,
    KeyStrategy::CallerPhoneNumber,
    KeyStrategy::AssistantId,
];

impl KeyStrategy {
    pub fn try_key(&self, call: &CallRecord, metadata: &CustomerMetadata) -> Option<String> {
        match self {
            KeyStrategy::MetadataCustomerId => metadata.customer_id.clone(),
            KeyStrategy::CallerPhoneNumber => call.caller_number().map(str::to_string),
            KeyStrategy::AssistantId => call.assistant().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdentityResolver {
    strategies: Vec<KeyStrategy>,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_STRATEGIES.to_vec())
    }
}

impl IdentityResolver {
    pub fn new(strategies: Vec<KeyStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[KeyStrategy] {
        &self.strategies
    }

    /// Resolves a call, reading metadata leniently (malformed metadata is
    /// treated as absent). `None` means the call cannot be attributed.
    pub fn resolve(&self, call: &CallRecord) -> Option<CustomerIdentity> {
        let metadata = call.customer_metadata().unwrap_or_default();
        self.resolve_with(call, &metadata)
    }

    /// Resolves a call against metadata the caller has already extracted.
    pub fn resolve_with(
        &self,
        call: &CallRecord,
        metadata: &CustomerMetadata,
    ) -> Option<CustomerIdentity> {
        let key = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.try_key(call, metadata))?;

        let phone_number = call.caller_number().map(str::to_string);

        let label_source = (&metadata.customer_name, &phone_number, call.assistant());
        let (display_name, explicit_name) = match label_source {
            (Some(name), _, _) => (name.clone(), true),
            (None, Some(number), _) => (format!("Caller {}", number), false),
            (None, None, Some(assistant)) => (format!("Lead {}", fragment(assistant)), false),
            (None, None, None) => (format!("Customer {}", fragment(&key)), false),
        };

        Some(CustomerIdentity {
            key,
            display_name,
            email: metadata.customer_email.clone().unwrap_or_default(),
            phone_number,
            explicit_name,
        })
    }
}

fn fragment(value: &str) -> String {
    value.chars().take(LABEL_FRAGMENT_LEN).collect()
}
