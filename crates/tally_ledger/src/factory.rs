//! Resource construction scoped to the current request.

use core::fmt;
use std::sync::Arc;

use tally_core::{Clock, LedgerConfig};
use tally_store::PropertyStore;

use crate::owner::{Owner, OwnerKind};
use crate::resource::Resource;

/// Name used when a resource is requested with an empty name.
pub const DEFAULT_RESOURCE_NAME: &str = "default";

/// Ambient identity of the request being served: who sent it and where.
///
/// Passed to [`ResourceFactory::scoped`] once per request. Either id may be
/// unknown, in which case the configured sentinel owner is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user_id: Option<String>,
    chat_id: Option<String>,
}

impl RequestContext {
    /// Creates a context with no known user or chat.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current user id.
    #[must_use]
    pub fn with_user(mut self, id: impl fmt::Display) -> Self {
        self.user_id = Some(id.to_string());
        self
    }

    /// Sets the current chat id.
    #[must_use]
    pub fn with_chat(mut self, id: impl fmt::Display) -> Self {
        self.chat_id = Some(id.to_string());
        self
    }

    /// Returns the current user id, if known.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the current chat id, if known.
    #[must_use]
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }
}

/// Builds [`Resource`] handles bound to one store, clock and configuration.
///
/// The factory is cheap to clone. Call [`scoped`](Self::scoped) per request
/// to bind the ambient user and chat; `user()`/`chat()` then resolve against
/// that context.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tally_ledger::{RequestContext, ResourceFactory};
/// use tally_store::MemoryStore;
///
/// let ledger = ResourceFactory::new(Arc::new(MemoryStore::new()));
/// let request = ledger.scoped(RequestContext::new().with_user(42));
///
/// let coins = request.user("coins");
/// coins.add(10).unwrap();
/// assert_eq!(request.another_user("coins", 42).value().unwrap(), 10.0);
/// ```
#[derive(Clone)]
pub struct ResourceFactory {
    store: Arc<dyn PropertyStore>,
    clock: Clock,
    config: Arc<LedgerConfig>,
    context: RequestContext,
}

impl ResourceFactory {
    /// Creates a factory over `store` with the system clock, default
    /// configuration and an empty request context.
    pub fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self {
            store,
            clock: Clock::system(),
            config: Arc::new(LedgerConfig::default()),
            context: RequestContext::default(),
        }
    }

    /// Replaces the clock driving growth.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the ledger configuration.
    #[must_use]
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Returns a factory bound to `context`, sharing everything else.
    #[must_use]
    pub fn scoped(&self, context: RequestContext) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Returns the bound request context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Returns the ledger configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Resource `name` of the current user.
    #[must_use]
    pub fn user(&self, name: &str) -> Resource {
        self.build(OwnerKind::User, self.context.user_id(), name)
    }

    /// Resource `name` of the current chat.
    #[must_use]
    pub fn chat(&self, name: &str) -> Resource {
        self.build(OwnerKind::Chat, self.context.chat_id(), name)
    }

    /// Bot-wide resource `name`.
    #[must_use]
    pub fn global(&self, name: &str) -> Resource {
        self.build(OwnerKind::Global, Some(self.config.global_owner.as_str()), name)
    }

    /// Resource `name` of user `id`.
    #[must_use]
    pub fn another_user(&self, name: &str, id: impl fmt::Display) -> Resource {
        self.build(OwnerKind::User, Some(id.to_string().as_str()), name)
    }

    /// Resource `name` of chat `id`.
    #[must_use]
    pub fn another_chat(&self, name: &str, id: impl fmt::Display) -> Resource {
        self.build(OwnerKind::Chat, Some(id.to_string().as_str()), name)
    }

    /// Resource `name` of an arbitrary owner.
    #[must_use]
    pub fn for_owner(&self, kind: OwnerKind, id: impl fmt::Display, name: &str) -> Resource {
        self.build(kind, Some(id.to_string().as_str()), name)
    }

    fn build(&self, kind: OwnerKind, id: Option<&str>, name: &str) -> Resource {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => self.config.unknown_owner.as_str(),
        };
        let name = if name.is_empty() {
            DEFAULT_RESOURCE_NAME
        } else {
            name
        };
        Resource::new(
            Owner::new(kind, id),
            name,
            Arc::clone(&self.store),
            self.clock.clone(),
            &self.config,
        )
    }
}

impl fmt::Debug for ResourceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceFactory")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::MemoryStore;

    fn factory() -> ResourceFactory {
        ResourceFactory::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn context_resolves_current_owner() {
        let request = factory().scoped(RequestContext::new().with_user(5).with_chat(-100));
        assert_eq!(request.user("coins").key().as_str(), "ResourcesLib_user_5_coins");
        assert_eq!(
            request.chat("coins").key().as_str(),
            "ResourcesLib_chat_-100_coins"
        );
    }

    #[test]
    fn missing_ids_use_sentinel() {
        let ledger = factory();
        assert_eq!(ledger.user("coins").owner().id(), "unknown");
        assert_eq!(ledger.another_chat("coins", "").owner().id(), "unknown");
    }

    #[test]
    fn global_and_custom_owners() {
        let ledger = factory();
        assert_eq!(
            ledger.global("jackpot").key().as_str(),
            "ResourcesLib_global_global_jackpot"
        );

        let clan = ledger.for_owner(OwnerKind::Other("clan".into()), "red", "gold");
        assert_eq!(clan.key().as_str(), "ResourcesLib_clan_red_gold");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(factory().another_user("", 1).name(), DEFAULT_RESOURCE_NAME);
    }

    #[test]
    fn config_prefix_is_applied() {
        let ledger = factory().with_config(LedgerConfig {
            key_prefix: "t_".into(),
            ..LedgerConfig::default()
        });
        assert_eq!(ledger.another_user("xp", 3).key().as_str(), "t_user_3_xp");
    }

    #[test]
    fn scoped_factories_share_the_store() {
        let ledger = factory();
        let alice = ledger.scoped(RequestContext::new().with_user("alice"));
        alice.user("coins").set(3).unwrap();

        assert_eq!(ledger.another_user("coins", "alice").value().unwrap(), 3.0);
    }
}
