use std::time::Duration;

/// Fixed artificial delay applied before each mock operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Latency {
            list: Duration::from_millis(500),
            get: Duration::from_millis(300),
            create: Duration::from_millis(500),
            update: Duration::from_millis(500),
            delete: Duration::from_millis(300),
        }
    }
}

impl Latency {
    /// No delay at all.
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    /// The same delay for every operation.
    pub fn uniform(delay: Duration) -> Self {
        Latency {
            list: delay,
            get: delay,
            create: delay,
            update: delay,
            delete: delay,
        }
    }
}
