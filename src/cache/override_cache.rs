use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;

use parking_lot::RwLock;
use tracing::debug;
use tracing::trace;

use super::subscribers::SubscriberSet;
use super::subscribers::SubscriptionId;
use crate::CacheError;
use crate::ComponentIdentity;
use crate::IdentifiesComponent;
use crate::OverrideSource;
use crate::Result;
use crate::MAX_FACILITY_ID;

/// A value an override cache can hold. `validate` range-checks the value
/// before it is admitted; lookups return it by copy.
pub trait OverrideValue: Copy + PartialEq + Debug + Send + Sync + 'static {
    fn validate(&self) -> std::result::Result<(), CacheError> {
        Ok(())
    }
}

/// Debug-mode flags carry no range constraint.
impl OverrideValue for bool {}

/// Facility ids must fit the 11-bit field of a status code.
impl OverrideValue for u16 {
    fn validate(&self) -> std::result::Result<(), CacheError> {
        if *self > MAX_FACILITY_ID {
            return Err(CacheError::FacilityOutOfRange { value: *self });
        }
        Ok(())
    }
}

/// One stored override: the identity pattern it was registered under and
/// the configured value. Owned by the cache once added.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRecord<V> {
    pub pattern: ComponentIdentity,
    pub value: V,
}

/// Facility-id overrides (0..=2047).
pub type FacilityOverrides = OverrideCache<u16>;

/// Per-component debug-mode flags.
pub type DebugModeOverrides = OverrideCache<bool>;

/// Thread-safe collection of override records for one value type.
///
/// Records are keyed by lowercased pattern name, so at most one pattern is
/// stored per distinct component name and later additions overwrite earlier
/// ones. A lookup resolves the queried concrete identity O(1) by name, then
/// validates it against the stored pattern's set fields.
///
/// Reads take the shared lock; mutations take the exclusive lock. Change
/// notifications are dispatched only after the lock is released. Disposal
/// is one-way: after `dispose`, every operation except `dispose` itself
/// fails with [`CacheError::Disposed`].
pub struct OverrideCache<V: OverrideValue> {
    inner: RwLock<InnerState<V>>,
    subscribers: SubscriberSet,
}

struct InnerState<V> {
    records: HashMap<String, OverrideRecord<V>>,
    /// Bumped on every content change; also the batch dirty check.
    version: u64,
    /// `begin_update` nesting depth.
    update_depth: u32,
    /// `version` observed at the outermost `begin_update`.
    batch_baseline: u64,
    disposed: bool,
}

impl<V: OverrideValue> OverrideCache<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(InnerState {
                records: HashMap::new(),
                version: 0,
                update_depth: 0,
                batch_baseline: 0,
                disposed: false,
            }),
            subscribers: SubscriberSet::new(),
        }
    }

    /// Inserts or overwrites the record keyed by the pattern's name.
    /// Re-adding an identical record leaves the cache unchanged and fires
    /// no notification.
    pub fn add(
        &self,
        pattern: ComponentIdentity,
        value: V,
    ) -> Result<()> {
        value.validate()?;
        self.mutate(|state| {
            insert_record(state, pattern, value);
            Ok(())
        })
    }

    /// Adds every record in order; later records overwrite earlier ones
    /// with the same name. Values are range-checked up front so a bad batch
    /// is rejected whole. Fires at most one notification.
    pub fn add_range<I>(
        &self,
        records: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (ComponentIdentity, V)>,
    {
        let records: Vec<(ComponentIdentity, V)> = records.into_iter().collect();
        for (_, value) in &records {
            value.validate()?;
        }
        self.mutate(|state| {
            for (pattern, value) in records {
                insert_record(state, pattern, value);
            }
            Ok(())
        })
    }

    /// Removes the record keyed by the pattern's name. An absent name is
    /// not an error; returns whether a record was removed.
    pub fn remove(
        &self,
        pattern: &ComponentIdentity,
    ) -> Result<bool> {
        self.mutate(|state| {
            let removed = state.records.remove(&pattern.key_name()).is_some();
            if removed {
                state.version += 1;
                debug!("override for `{}` removed", pattern.name());
            }
            Ok(removed)
        })
    }

    /// Removes all records.
    pub fn clear(&self) -> Result<()> {
        self.mutate(|state| {
            if !state.records.is_empty() {
                state.records.clear();
                state.version += 1;
                debug!("override cache cleared");
            }
            Ok(())
        })
    }

    /// Resolves a concrete runtime identity against the stored records.
    ///
    /// A miss is not an error: `None` tells the caller to fall back to its
    /// compiled-in default. A stored pattern whose set fields do not match
    /// the query is a miss too.
    pub fn try_get_override(
        &self,
        component: &ComponentIdentity,
    ) -> Result<Option<V>> {
        let state = self.inner.read();
        if state.disposed {
            return Err(CacheError::Disposed.into());
        }
        let found = state
            .records
            .get(&component.key_name())
            .filter(|record| record.pattern.matches(component))
            .map(|record| record.value);
        trace!("override lookup for `{}`: {:?}", component.name(), found);
        Ok(found)
    }

    /// Convenience overload: resolves the identity from the value that
    /// identifies the component, then looks it up.
    pub fn try_get_override_for<C>(
        &self,
        component: &C,
    ) -> Result<Option<V>>
    where
        C: IdentifiesComponent + ?Sized,
    {
        self.try_get_override(&component.component_identity())
    }

    /// Opens an update bracket. Brackets nest; notifications stay
    /// suppressed until the outermost `end_update`.
    pub fn begin_update(&self) -> Result<()> {
        let mut state = self.inner.write();
        if state.disposed {
            return Err(CacheError::Disposed.into());
        }
        if state.update_depth == 0 {
            state.batch_baseline = state.version;
        }
        state.update_depth += 1;
        Ok(())
    }

    /// Closes an update bracket. The outermost close fires a single
    /// notification iff content changed anywhere inside the bracket.
    pub fn end_update(&self) -> Result<()> {
        let notify = {
            let mut state = self.inner.write();
            if state.disposed {
                return Err(CacheError::Disposed.into());
            }
            if state.update_depth == 0 {
                return Err(CacheError::UnbalancedEndUpdate.into());
            }
            state.update_depth -= 1;
            state.update_depth == 0 && state.version != state.batch_baseline
        };
        if notify {
            self.subscribers.notify();
        }
        Ok(())
    }

    /// Registers a change listener. Listeners are invoked after the record
    /// lock is released, so they may query the cache freely.
    pub fn subscribe<F>(
        &self,
        listener: F,
    ) -> Result<SubscriptionId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.inner.read().disposed {
            return Err(CacheError::Disposed.into());
        }
        Ok(self.subscribers.insert(listener))
    }

    /// Returns whether a listener was registered under the id.
    pub fn unsubscribe(
        &self,
        id: SubscriptionId,
    ) -> Result<bool> {
        if self.inner.read().disposed {
            return Err(CacheError::Disposed.into());
        }
        Ok(self.subscribers.remove(id))
    }

    /// Replaces the whole content from a record source in one exclusive
    /// critical section, so concurrent readers observe either the old or
    /// the new generation, never an intermediate state. Fires at most one
    /// notification, and none when the new content is identical. The
    /// source does its I/O before the cache takes any lock, and the batch
    /// is range-checked before existing content is touched.
    pub fn reload_from<S>(
        &self,
        source: &S,
    ) -> Result<()>
    where
        S: OverrideSource<V> + ?Sized,
    {
        let records = source.load()?;
        for (_, value) in &records {
            value.validate()?;
        }
        self.mutate(|state| {
            let mut next: HashMap<String, OverrideRecord<V>> = HashMap::new();
            for (pattern, value) in records {
                next.insert(pattern.key_name(), OverrideRecord { pattern, value });
            }
            if state.records != next {
                state.records = next;
                state.version += 1;
                debug!("override cache content replaced");
            }
            Ok(())
        })
    }

    pub fn len(&self) -> Result<usize> {
        let state = self.inner.read();
        if state.disposed {
            return Err(CacheError::Disposed.into());
        }
        Ok(state.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Flips the cache into its terminal disposed state and drops content
    /// and subscribers. Idempotent; safe to race with concurrent readers
    /// and writers — whoever acquires the lock after the flag is set fails
    /// fast with [`CacheError::Disposed`].
    pub fn dispose(&self) {
        {
            let mut state = self.inner.write();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.records = HashMap::new();
            state.update_depth = 0;
        }
        self.subscribers.clear();
        debug!("override cache disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.read().disposed
    }

    /// Applies a mutation under the exclusive lock, then notifies once if
    /// content changed and no update bracket is open. The lock is released
    /// before any listener runs.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut InnerState<V>) -> Result<R>,
    ) -> Result<R> {
        let (result, notify) = {
            let mut state = self.inner.write();
            if state.disposed {
                return Err(CacheError::Disposed.into());
            }
            let before = state.version;
            let result = f(&mut state)?;
            let notify = state.update_depth == 0 && state.version != before;
            (result, notify)
        };
        if notify {
            self.subscribers.notify();
        }
        Ok(result)
    }
}

fn insert_record<V: OverrideValue>(
    state: &mut InnerState<V>,
    pattern: ComponentIdentity,
    value: V,
) {
    let key = pattern.key_name();
    match state.records.get(&key) {
        Some(existing) if existing.pattern == pattern && existing.value == value => {
            // identical record; content unchanged
        }
        _ => {
            debug!("override for `{}` set to {:?}", pattern.name(), value);
            state.records.insert(key, OverrideRecord { pattern, value });
            state.version += 1;
        }
    }
}

impl<V: OverrideValue> Default for OverrideCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: OverrideValue> Debug for OverrideCache<V> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.inner.try_read() {
            Some(state) => f
                .debug_struct("OverrideCache")
                .field("len", &state.records.len())
                .field("disposed", &state.disposed)
                .finish(),
            None => f.debug_struct("OverrideCache").finish_non_exhaustive(),
        }
    }
}
