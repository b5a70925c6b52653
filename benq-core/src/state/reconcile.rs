//! Applying reported values to the device state
//!
//! Power is the only key with history: a report is interpreted against the
//! current [`PowerPhase`]. Every other key overwrites its field.

use benq_protocol::keys;

use super::device::{copy_text, DeviceState, PowerPhase};
use crate::time::{elapsed, Millis};

/// A numeric key carried a value that is not a number in range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueError {
    NotANumber,
    OutOfRange,
}

/// What a `pow` report did to the power phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerTransition {
    /// First report after startup, projector on
    InitialOn,
    /// First report after startup, projector off
    InitialOff,
    /// Was on, now cooling down
    PoweringOff,
    /// Came on after the settle window
    PoweredOn,
    /// Second "off" after cool-down started
    PoweredOff,
    /// "on" inside the settle window, treated as cool-down noise
    CooldownIgnored,
    Unchanged,
}

/// Outcome of applying one key/value report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Applied {
    Power(PowerTransition),
    /// Volume report; convergence should be checked
    Volume,
    /// Another known field was updated
    Field,
    /// Key not tracked
    Ignored,
}

/// Single relative volume command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VolumeStep {
    Up,
    Down,
}

impl VolumeStep {
    /// Wire value for `vol=`
    pub const fn value(&self) -> &'static str {
        match self {
            VolumeStep::Up => keys::INCREMENT,
            VolumeStep::Down => keys::DECREMENT,
        }
    }
}

impl DeviceState {
    /// Apply a key/value report received at `now`
    ///
    /// An "on" arriving within `settle_ms` of the last power-off is ignored.
    /// A value that fails to parse leaves the state untouched.
    pub fn apply(
        &mut self,
        key: &str,
        value: &str,
        now: Millis,
        settle_ms: u32,
    ) -> Result<Applied, ValueError> {
        if keys::key_is(key, keys::POWER) {
            return Ok(Applied::Power(self.apply_power(
                keys::is_on(value),
                now,
                settle_ms,
            )));
        }

        if keys::key_is(key, keys::SOURCE) {
            copy_text(&mut self.source, value);
        } else if keys::key_is(key, keys::MUTE) {
            self.muted = keys::is_on(value);
        } else if keys::key_is(key, keys::VOLUME) {
            self.volume = parse_volume(value)?;
            return Ok(Applied::Volume);
        } else if keys::key_is(key, keys::LAMP_MODE) {
            copy_text(&mut self.lamp_mode, value);
        } else if keys::key_is(key, keys::BLANK) {
            self.image_blanked = keys::is_on(value);
        } else if keys::key_is(key, keys::FREEZE) {
            self.image_frozen = keys::is_on(value);
        } else if keys::key_is(key, keys::LAMP_HOURS) {
            self.lamp_hours = parse_number(value)?;
        } else if keys::key_is(key, keys::MODEL_NAME) {
            copy_text(&mut self.model_name, value);
        } else {
            return Ok(Applied::Ignored);
        }
        Ok(Applied::Field)
    }

    fn apply_power(&mut self, next_on: bool, now: Millis, settle_ms: u32) -> PowerTransition {
        match (self.power, next_on) {
            (PowerPhase::Unknown, true) => {
                self.power = PowerPhase::On;
                self.last_on = Some(now);
                PowerTransition::InitialOn
            }
            (PowerPhase::Unknown, false) => {
                self.power = PowerPhase::Off;
                self.last_off = Some(now);
                PowerTransition::InitialOff
            }
            (PowerPhase::On, false) => {
                self.clear_derived();
                self.power = PowerPhase::PoweringOff;
                self.last_off = Some(now);
                PowerTransition::PoweringOff
            }
            (PowerPhase::PoweringOff | PowerPhase::Off, true) => {
                let settled = self
                    .last_off
                    .map_or(true, |off| elapsed(now, off) > settle_ms);
                if settled {
                    self.power = PowerPhase::On;
                    self.last_on = Some(now);
                    PowerTransition::PoweredOn
                } else {
                    PowerTransition::CooldownIgnored
                }
            }
            (PowerPhase::PoweringOff, false) => {
                self.power = PowerPhase::Off;
                PowerTransition::PoweredOff
            }
            (PowerPhase::On, true) | (PowerPhase::Off, false) => PowerTransition::Unchanged,
        }
    }

    /// Request a volume; [`next_volume_step`](Self::next_volume_step) drives it
    pub fn set_target_volume(&mut self, target: u8) {
        self.target_volume = Some(target);
    }

    /// Compare the target against the last reported volume
    ///
    /// Returns the step to send, or clears the target once reached.
    pub fn next_volume_step(&mut self) -> Option<VolumeStep> {
        let target = self.target_volume?;
        if target > self.volume {
            Some(VolumeStep::Up)
        } else if target < self.volume {
            Some(VolumeStep::Down)
        } else {
            self.target_volume = None;
            None
        }
    }
}

fn parse_number(value: &str) -> Result<u32, ValueError> {
    value.trim().parse().map_err(|_| ValueError::NotANumber)
}

fn parse_volume(value: &str) -> Result<u8, ValueError> {
    u8::try_from(parse_number(value)?).map_err(|_| ValueError::OutOfRange)
}
