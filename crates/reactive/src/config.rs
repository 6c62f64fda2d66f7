//! Runtime configuration.

/// What `mark_mutated` does with the runtime's sentinel object.
///
/// The sentinel stands for "something, somewhere, changed". Selectors built
/// with [`Selector::watching_all`](crate::Selector::watching_all) subscribe
/// to it so they re-evaluate even when the mutated object was never tracked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SentinelPolicy {
    /// Every `mark_mutated` call stamps the sentinel, observed or not. The
    /// sentinel joins the batch only when something subscribes to it.
    #[default]
    StampOnEveryMark,
    /// The sentinel is never stamped.
    Disabled,
}

/// Configuration of a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Sentinel behaviour of `mark_mutated`.
    pub sentinel: SentinelPolicy,
    /// Flushes between automatic sweeps for objects that were dropped while
    /// still subscribed. `0` disables automatic sweeps.
    pub prune_interval: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sentinel: SentinelPolicy::default(),
            prune_interval: 64,
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sentinel policy.
    pub fn with_sentinel(mut self, sentinel: SentinelPolicy) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Sets the automatic prune interval.
    pub fn with_prune_interval(mut self, flushes: u32) -> Self {
        self.prune_interval = flushes;
        self
    }

    /// Returns true if a sweep is due after `flushes` completed flushes.
    #[inline]
    pub(crate) fn prune_due(&self, flushes: u64) -> bool {
        self.prune_interval != 0 && flushes % u64::from(self.prune_interval) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sentinel, SentinelPolicy::StampOnEveryMark);
        assert_eq!(config.prune_interval, 64);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new()
            .with_sentinel(SentinelPolicy::Disabled)
            .with_prune_interval(2);
        assert_eq!(config.sentinel, SentinelPolicy::Disabled);
        assert!(config.prune_due(4));
        assert!(!config.prune_due(3));
    }

    #[test]
    fn test_prune_disabled() {
        let config = Config::new().with_prune_interval(0);
        assert!(!config.prune_due(0));
        assert!(!config.prune_due(64));
    }
}
