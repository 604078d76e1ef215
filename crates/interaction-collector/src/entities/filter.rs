use super::{Actor, ComponentInteraction, IdentityKey, Snowflake};
use std::sync::Arc;

/// Type alias for filter predicates
pub type FilterFn<T> = Arc<dyn Fn(&T, Option<&Actor>) -> bool + Send + Sync>;

/// Type alias for identity-key functions
pub type KeyFn<T> = Arc<dyn Fn(&T, Option<&Actor>) -> IdentityKey + Send + Sync>;

/// Caller-supplied predicate deciding which events a collector accepts,
/// with an optional function overriding the collector's identity key.
pub struct CollectorFilter<T> {
    predicate: FilterFn<T>,
    key: Option<KeyFn<T>>,
}

impl<T> CollectorFilter<T> {
    /// Create a filter from a predicate
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, Option<&Actor>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            key: None,
        }
    }

    /// A filter accepting every event
    pub fn all() -> Self {
        Self::new(|_, _| true)
    }

    /// Store accepted events under the key produced by `key`
    pub fn with_key<K>(mut self, key: K) -> Self
    where
        K: Fn(&T, Option<&Actor>) -> IdentityKey + Send + Sync + 'static,
    {
        self.key = Some(Arc::new(key));
        self
    }

    pub fn matches(&self, item: &T, actor: Option<&Actor>) -> bool {
        (self.predicate)(item, actor)
    }

    /// The caller's identity key for `item`, if a key function was supplied
    pub fn key(&self, item: &T, actor: Option<&Actor>) -> Option<IdentityKey> {
        self.key.as_ref().map(|key| key(item, actor))
    }
}

impl CollectorFilter<ComponentInteraction> {
    /// Accept only interactions produced by the given user
    pub fn from_actor(actor_id: Snowflake) -> Self {
        Self::new(move |_, actor| actor.map(|a| a.id) == Some(actor_id))
    }

    /// Keep one entry per actor: a later press by the same user replaces the earlier one
    pub fn one_per_actor(self) -> Self {
        self.with_key(|item, actor| match actor {
            Some(actor) => IdentityKey::Pair(item.channel_id, actor.id),
            None => IdentityKey::Id(item.id),
        })
    }
}

impl<T> Clone for CollectorFilter<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            key: self.key.clone(),
        }
    }
}

impl<T> Default for CollectorFilter<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> std::fmt::Debug for CollectorFilter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorFilter")
            .field("predicate", &"<fn>")
            .field("key", &self.key.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
