use std::sync::Arc;

use super::{CollectorEndReason, IdentityKey};
use crate::error::{CollectorEnded, HookError};

/// Immutable snapshot of a collector's entries, in acceptance order
#[derive(Debug)]
pub struct Collected<T> {
    entries: Arc<[(IdentityKey, T)]>,
}

impl<T> Collected<T> {
    pub(crate) fn from_entries(entries: Vec<(IdentityKey, T)>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &T)> {
        self.entries.iter().map(|(key, item)| (key, item))
    }

    pub fn keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, item)| item)
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&T> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, item)| item)
    }

    pub fn contains_key(&self, key: &IdentityKey) -> bool {
        self.get(key).is_some()
    }

    /// The earliest accepted entry
    pub fn first(&self) -> Option<&T> {
        self.entries.first().map(|(_, item)| item)
    }
}

impl<T: Clone> Collected<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.values().cloned().collect()
    }
}

impl<T> Clone for Collected<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self::from_entries(Vec::new())
    }
}

/// Final outcome of a collector, published exactly once
#[derive(Debug)]
pub struct Settled<T> {
    pub reason: CollectorEndReason,
    pub collected: Collected<T>,
    /// Result of the terminal hook
    pub hook: Result<(), HookError>,
}

impl<T> Settled<T> {
    /// Resolve against the caller's success reasons
    pub fn outcome(&self, success: &[CollectorEndReason]) -> Result<Collected<T>, CollectorEnded<T>> {
        if success.contains(&self.reason) {
            Ok(self.collected.clone())
        } else {
            Err(CollectorEnded {
                reason: self.reason,
                collected: self.collected.clone(),
            })
        }
    }
}

impl<T> Clone for Settled<T> {
    fn clone(&self) -> Self {
        Self {
            reason: self.reason,
            collected: self.collected.clone(),
            hook: self.hook.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Collected<&'static str> {
        Collected::from_entries(vec![
            (IdentityKey::Id(3), "first"),
            (IdentityKey::Id(1), "second"),
        ])
    }

    #[test]
    fn test_collected_keeps_acceptance_order() {
        let collected = snapshot();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected.first(), Some(&"first"));
        assert_eq!(collected.to_vec(), vec!["first", "second"]);
        assert_eq!(collected.get(&IdentityKey::Id(1)), Some(&"second"));
        assert!(!collected.contains_key(&IdentityKey::Id(2)));
    }

    #[test]
    fn test_settled_outcome() {
        let settled = Settled {
            reason: CollectorEndReason::Time,
            collected: snapshot(),
            hook: Ok(()),
        };
        assert!(settled.outcome(&[CollectorEndReason::Limit]).is_err());
        let ended = settled.outcome(&[CollectorEndReason::Limit]).unwrap_err();
        assert_eq!(ended.reason, CollectorEndReason::Time);
        assert_eq!(ended.collected.len(), 2);
        assert_eq!(
            settled.outcome(&CollectorEndReason::ALL).unwrap().len(),
            2
        );
    }
}
