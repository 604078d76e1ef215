use std::time::Duration;

use crate::error::CollectorError;

/// Timing and removal behaviour shared by every collector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Total time budget, measured from construction
    pub time: Option<Duration>,
    /// Idle budget, restarted whenever an event is accepted
    pub idle: Option<Duration>,
    /// A second accepted event under an existing key removes the entry
    pub remove_on_rematch: bool,
}

impl CollectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = Some(idle);
        self
    }

    pub fn remove_on_rematch(mut self, remove: bool) -> Self {
        self.remove_on_rematch = remove;
        self
    }

    /// Whether a timer task is needed
    pub fn has_timer(&self) -> bool {
        self.time.is_some() || self.idle.is_some()
    }

    /// Reject contradictory settings
    pub fn validate(&self) -> Result<(), CollectorError> {
        if self.time == Some(Duration::ZERO) {
            return Err(CollectorError::ConfigurationError(
                "time budget must be greater than zero".to_string(),
            ));
        }
        if self.idle == Some(Duration::ZERO) {
            return Err(CollectorError::ConfigurationError(
                "idle budget must be greater than zero".to_string(),
            ));
        }
        if let (Some(time), Some(idle)) = (self.time, self.idle) {
            if idle > time {
                return Err(CollectorError::ConfigurationError(format!(
                    "idle budget {:?} exceeds time budget {:?}",
                    idle, time
                )));
            }
        }
        Ok(())
    }
}

/// Options for a collector bound to a message or channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionOptions {
    pub collector: CollectorOptions,
    /// Maximum number of accepted interactions
    pub max: Option<usize>,
    /// Maximum number of distinct collected entries
    pub max_components: Option<usize>,
    /// Maximum number of distinct users
    pub max_users: Option<usize>,
}

impl InteractionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time(mut self, time: Duration) -> Self {
        self.collector = self.collector.with_time(time);
        self
    }

    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.collector = self.collector.with_idle(idle);
        self
    }

    pub fn remove_on_rematch(mut self, remove: bool) -> Self {
        self.collector = self.collector.remove_on_rematch(remove);
        self
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_max_components(mut self, max: usize) -> Self {
        self.max_components = Some(max);
        self
    }

    pub fn with_max_users(mut self, max: usize) -> Self {
        self.max_users = Some(max);
        self
    }

    pub fn validate(&self) -> Result<(), CollectorError> {
        self.collector.validate()?;
        for (name, ceiling) in [
            ("max", self.max),
            ("max_components", self.max_components),
            ("max_users", self.max_users),
        ] {
            if ceiling == Some(0) {
                return Err(CollectorError::ConfigurationError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl From<CollectorOptions> for InteractionOptions {
    fn from(collector: CollectorOptions) -> Self {
        Self {
            collector,
            ..Self::default()
        }
    }
}
