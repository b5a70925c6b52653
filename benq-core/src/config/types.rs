//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 1_000;

/// Default minimum spacing between sent commands
pub const DEFAULT_SEND_INTERVAL_MS: u32 = 100;

/// Default window after a power-off during which "on" reports are ignored
pub const DEFAULT_POWER_OFF_SETTLE_MS: u32 = 120_000;

/// Protocol engine timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectorConfig {
    /// Interval between status poll rounds
    pub poll_interval_ms: u32,
    /// Minimum spacing between commands written to the link
    pub send_interval_ms: u32,
    /// Lamp cool-down window
    pub power_off_settle_ms: u32,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            send_interval_ms: DEFAULT_SEND_INTERVAL_MS,
            power_off_settle_ms: DEFAULT_POWER_OFF_SETTLE_MS,
        }
    }
}

/// Power policy dwell times, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerPolicy {
    /// Shortest time the projector stays on once switched on
    pub minimum_on_s: u32,
    /// Longest continuous on time before a forced off (0 disables)
    pub maximum_on_s: u32,
    /// Shortest time the projector stays off before it may come back on
    pub minimum_off_s: u32,
    /// How long a virtual off keeps the picture blanked before the real off
    pub virtual_off_grace_s: u32,
    /// On time after which an off request skips the virtual off
    pub skip_grace_after_s: u32,
}

impl Default for PowerPolicy {
    fn default() -> Self {
        Self {
            minimum_on_s: 300,
            maximum_on_s: 0,
            minimum_off_s: 120,
            virtual_off_grace_s: 60,
            skip_grace_after_s: 600,
        }
    }
}

impl PowerPolicy {
    pub fn minimum_on_ms(&self) -> u32 {
        secs_to_ms(self.minimum_on_s)
    }

    /// `None` when no limit is configured
    pub fn maximum_on_ms(&self) -> Option<u32> {
        (self.maximum_on_s > 0).then(|| secs_to_ms(self.maximum_on_s))
    }

    pub fn minimum_off_ms(&self) -> u32 {
        secs_to_ms(self.minimum_off_s)
    }

    pub fn virtual_off_grace_ms(&self) -> u32 {
        secs_to_ms(self.virtual_off_grace_s)
    }

    pub fn skip_grace_after_ms(&self) -> u32 {
        secs_to_ms(self.skip_grace_after_s)
    }
}

/// Seconds to milliseconds, capped below half the clock range
fn secs_to_ms(secs: u32) -> u32 {
    const MAX_MS: u32 = (1 << 31) - 1;
    secs.saturating_mul(1000).min(MAX_MS)
}

/// Complete bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    pub projector: ProjectorConfig,
    pub power: PowerPolicy,
}

/// Binary configuration errors
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Buffer too small for the encoded config
    Serialize,
    /// Stored bytes are not a valid config
    Deserialize,
}

#[cfg(feature = "serde")]
impl BridgeConfig {
    /// Encode into `buffer` as postcard, returning the used prefix
    pub fn to_slice<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }

    /// Decode a postcard-encoded config
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.projector.poll_interval_ms, 1_000);
        assert_eq!(config.projector.send_interval_ms, 100);
        assert_eq!(config.projector.power_off_settle_ms, 120_000);
        assert_eq!(config.power.minimum_on_ms(), 300_000);
        assert_eq!(config.power.maximum_on_ms(), None);
    }

    #[test]
    fn test_maximum_on_enabled() {
        let policy = PowerPolicy {
            maximum_on_s: 3_600,
            ..PowerPolicy::default()
        };
        assert_eq!(policy.maximum_on_ms(), Some(3_600_000));
    }

    #[test]
    fn test_huge_values_capped() {
        let policy = PowerPolicy {
            minimum_on_s: u32::MAX,
            ..PowerPolicy::default()
        };
        assert!(policy.minimum_on_ms() < 1 << 31);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let config = BridgeConfig {
            power: PowerPolicy {
                maximum_on_s: 7_200,
                ..PowerPolicy::default()
            },
            ..BridgeConfig::default()
        };
        let mut buffer = [0u8; 64];
        let used = config.to_slice(&mut buffer).unwrap().len();
        assert_eq!(BridgeConfig::from_bytes(&buffer[..used]), Ok(config));
        assert_eq!(
            BridgeConfig::from_bytes(&[0xff]),
            Err(ConfigError::Deserialize)
        );
    }
}
