//! Switch policies
//!
//! After every provider in a pass the engine asks the configured policy
//! `should_switch(provider, addresses)`. `false` accepts the result and ends
//! the pass; `true` moves on to the next provider.

use crate::{Address, AddressField};

/// Decides whether to fall through to the next provider
pub trait SwitchPolicy: Send + Sync {
    /// `true` to continue with the next provider, `false` to accept
    /// `addresses` as the final result
    fn should_switch(&self, provider: &str, addresses: &[Address]) -> bool;
}

/// Always accept the first provider's answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverSwitch;

/// Default policy
pub const NEVER_SWITCH: NeverSwitch = NeverSwitch;

impl SwitchPolicy for NeverSwitch {
    fn should_switch(&self, _provider: &str, _addresses: &[Address]) -> bool {
        false
    }
}

/// Fall through while the result list is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchOnEmpty;

impl SwitchPolicy for SwitchOnEmpty {
    fn should_switch(&self, _provider: &str, addresses: &[Address]) -> bool {
        addresses.is_empty()
    }
}

/// Fall through unless some address carries every required field
///
/// An empty list always switches. With no required fields this behaves like
/// [`SwitchOnEmpty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchOnMissing(pub Vec<AddressField>);

impl SwitchOnMissing {
    /// Require every field in `fields`
    pub fn new(fields: impl IntoIterator<Item = AddressField>) -> Self {
        Self(fields.into_iter().collect())
    }
}

impl SwitchPolicy for SwitchOnMissing {
    fn should_switch(&self, _provider: &str, addresses: &[Address]) -> bool {
        !addresses
            .iter()
            .any(|address| self.0.iter().all(|field| address.has_field(*field)))
    }
}

impl<F> SwitchPolicy for F
where
    F: Fn(&str, &[Address]) -> bool + Send + Sync,
{
    fn should_switch(&self, provider: &str, addresses: &[Address]) -> bool {
        self(provider, addresses)
    }
}
