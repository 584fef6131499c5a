//! Runtime configuration for units of work, relays and consumers.
//!
//! All durations are expressed in milliseconds when (de)serialized.
//!
//! ```
//! use transactional_outbox::Config;
//!
//! let config = Config::from_json(r#"{
//!     "relay": { "transport": "kafka", "batch_size": 50 },
//!     "unit_of_work": { "lock_ttl": 30000 }
//! }"#).unwrap();
//!
//! assert_eq!(config.relay.transport, "kafka");
//! assert_eq!(config.relay.batch_size, 50);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde adapter storing a `Duration` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

fn at_least_one<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    usize::deserialize(deserializer).map(|n| n.max(1))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub unit_of_work: UnitOfWorkConfig,
    pub relay: RelayConfig,
    pub consumer: ConsumerConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Lock behaviour of a lockable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitOfWorkConfig {
    /// How long an acquired lock stays valid without release. Must exceed the
    /// longest expected transaction.
    #[serde(with = "millis")]
    pub lock_ttl: Duration,
    /// How long to wait for each contended lock before giving up.
    #[serde(with = "millis")]
    pub lock_wait: Duration,
}

impl Default for UnitOfWorkConfig {
    fn default() -> Self {
        Self {
            lock_ttl: Duration::from_secs(60),
            lock_wait: Duration::from_secs(10),
        }
    }
}

impl UnitOfWorkConfig {
    pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }

    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    #[serde(with = "millis")]
    pub initial: Duration,
    #[serde(with = "millis")]
    pub max: Duration,
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl BackoffConfig {
    pub fn with_initial(mut self, initial: Duration) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Settings for one outbox relay. One relay runs per transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub transport: String,
    /// Records read per pass. Never below 1.
    #[serde(deserialize_with = "at_least_one")]
    pub batch_size: usize,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    pub backoff: BackoffConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            transport: "default".to_string(),
            batch_size: 100,
            poll_interval: Duration::from_millis(500),
            backoff: BackoffConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn new(transport: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            ..Self::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Settings for one consumer loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    pub queue: String,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            queue: "default".to_string(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl ConsumerConfig {
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
