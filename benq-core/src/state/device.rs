//! Device state record

use benq_protocol::Value;

use crate::time::Millis;

/// Source reported while the projector is off
pub const NO_SOURCE: &str = "none";

/// Lamp mode reported while the projector is off
pub const LAMP_OFF: &str = "off";

/// Power state as reconciled from `pow` reports
///
/// `PoweringOff` covers the lamp cool-down, during which some models report
/// an intermediate "on" before settling on "off".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerPhase {
    /// No power report received yet
    #[default]
    Unknown,
    On,
    /// First "off" seen, waiting for the second
    PoweringOff,
    Off,
}

impl PowerPhase {
    /// True if the projector is fully on
    pub fn is_on(&self) -> bool {
        matches!(self, PowerPhase::On)
    }

    /// True while cooling down
    pub fn is_transitioning(&self) -> bool {
        matches!(self, PowerPhase::PoweringOff)
    }

    /// Human-readable status
    pub const fn label(&self) -> &'static str {
        match self {
            PowerPhase::Unknown => "Unknown",
            PowerPhase::On => "On",
            PowerPhase::PoweringOff => "Powering off...",
            PowerPhase::Off => "Off",
        }
    }
}

/// Last known projector state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    pub(crate) power: PowerPhase,
    pub(crate) source: Value,
    pub(crate) muted: bool,
    pub(crate) volume: u8,
    pub(crate) target_volume: Option<u8>,
    pub(crate) lamp_mode: Value,
    pub(crate) lamp_hours: u32,
    pub(crate) image_blanked: bool,
    pub(crate) image_frozen: bool,
    pub(crate) model_name: Value,
    pub(crate) last_on: Option<Millis>,
    pub(crate) last_off: Option<Millis>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    /// State before any report has arrived
    pub fn new() -> Self {
        let mut state = Self {
            power: PowerPhase::Unknown,
            source: Value::new(),
            muted: false,
            volume: 0,
            target_volume: None,
            lamp_mode: Value::new(),
            lamp_hours: 0,
            image_blanked: false,
            image_frozen: false,
            model_name: Value::new(),
            last_on: None,
            last_off: None,
        };
        state.clear_derived();
        state
    }

    /// Reset the fields that only mean something while the projector is on
    pub(crate) fn clear_derived(&mut self) {
        copy_text(&mut self.source, NO_SOURCE);
        copy_text(&mut self.lamp_mode, LAMP_OFF);
        self.muted = false;
        self.image_blanked = false;
        self.image_frozen = false;
        self.volume = 0;
        self.target_volume = None;
    }

    pub fn power(&self) -> PowerPhase {
        self.power
    }

    /// True once the first power report has been taken
    pub fn is_initialized(&self) -> bool {
        self.power != PowerPhase::Unknown
    }

    pub fn is_on(&self) -> bool {
        self.power.is_on()
    }

    pub fn is_transitioning(&self) -> bool {
        self.power.is_transitioning()
    }

    pub fn status_label(&self) -> &'static str {
        self.power.label()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume as the user sees it: the pending target, else the last report
    pub fn volume(&self) -> u8 {
        self.target_volume.unwrap_or(self.volume)
    }

    /// Last volume the projector reported
    pub fn reported_volume(&self) -> u8 {
        self.volume
    }

    pub fn target_volume(&self) -> Option<u8> {
        self.target_volume
    }

    pub fn lamp_mode(&self) -> &str {
        &self.lamp_mode
    }

    /// Lamp hours, 0 until first reported
    pub fn lamp_hours(&self) -> u32 {
        self.lamp_hours
    }

    pub fn is_image_blanked(&self) -> bool {
        self.image_blanked
    }

    pub fn is_image_frozen(&self) -> bool {
        self.image_frozen
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// False while the model name is empty or the projector answered `?`
    pub fn model_name_known(&self) -> bool {
        !self.model_name.is_empty() && !self.model_name.starts_with('?')
    }

    /// Time the projector was last seen powering on
    pub fn last_on(&self) -> Option<Millis> {
        self.last_on
    }

    /// Time the projector was last seen powering off
    pub fn last_off(&self) -> Option<Millis> {
        self.last_off
    }
}

/// Replace `dest` with as much of `src` as fits
pub(crate) fn copy_text(dest: &mut Value, src: &str) {
    dest.clear();
    for c in src.chars() {
        if dest.push(c).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = DeviceState::new();
        assert!(!state.is_initialized());
        assert!(!state.is_on());
        assert_eq!(state.status_label(), "Unknown");
        assert_eq!(state.source(), NO_SOURCE);
        assert_eq!(state.lamp_mode(), LAMP_OFF);
        assert_eq!(state.lamp_hours(), 0);
        assert!(!state.model_name_known());
        assert_eq!(state.last_on(), None);
    }

    #[test]
    fn test_model_name_placeholder() {
        let mut state = DeviceState::new();
        copy_text(&mut state.model_name, "?");
        assert!(!state.model_name_known());
        copy_text(&mut state.model_name, "W1070");
        assert!(state.model_name_known());
    }

    #[test]
    fn test_copy_text_truncates() {
        let mut value = Value::new();
        copy_text(&mut value, &"a".repeat(100));
        assert_eq!(value.len(), benq_protocol::MAX_VALUE_LEN);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PowerPhase::PoweringOff.label(), "Powering off...");
        assert!(PowerPhase::PoweringOff.is_transitioning());
        assert!(!PowerPhase::PoweringOff.is_on());
    }
}
