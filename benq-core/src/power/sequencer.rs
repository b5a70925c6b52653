//! Power sequencer
//!
//! The projector lamp does not like short power cycles. An off request made
//! soon after power-on therefore blanks the picture instead ("virtual off")
//! and schedules the real off for later; an on request during that window
//! just unblanks. A separate deadline enforces the maximum on time.
//!
//! Deadlines are cleared whenever the projector's real power state changes,
//! since an external change supersedes whatever the policy had planned.

use crate::config::PowerPolicy;
use crate::queue::QueueError;
use crate::time::{earliest, elapsed, reached, Millis};
use crate::traits::PowerControl;

/// Successful power-on request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOn {
    /// Projector was virtually off; picture unblanked
    Woken,
    /// Real power-on queued
    PoweringOn,
}

/// Outcome of a power-off request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOff {
    /// Projector already off or virtual off already pending
    Ignored,
    /// Real power-off queued
    PoweredOff,
    /// Picture blanked; real off at `real_off_at`
    Blanked { real_off_at: Millis },
}

/// Why a power-on request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerRefusal {
    /// Projector is on and not virtually off
    AlreadyOn,
    /// Projector has not been off for the minimum time yet
    OffDwell { allowed_at: Millis },
    /// Command could not be queued
    Queue(QueueError),
}

impl From<QueueError> for PowerRefusal {
    fn from(err: QueueError) -> Self {
        PowerRefusal::Queue(err)
    }
}

/// Deadline that caused a policy power-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OffReason {
    /// Virtual-off grace period ended
    VirtualOff,
    /// Maximum on time reached
    TimeLimit,
}

/// Policy view of the projector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerPhase {
    /// Physically off
    Off,
    /// On with nothing scheduled
    On,
    /// Picture blanked, real off at `at`
    PendingVirtualOff { at: Millis },
    /// Forced off at `at` by the maximum on time
    PendingLimitOff { at: Millis },
}

/// Projector state as seen on the previous tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracking {
    Uninitialized,
    Tracking { power: bool, blank: bool },
}

/// Power policy state machine
#[derive(Debug, Clone)]
pub struct PowerSequencer {
    policy: PowerPolicy,
    tracking: Tracking,
    virtual_off_at: Option<Millis>,
    limit_off_at: Option<Millis>,
}

impl PowerSequencer {
    pub fn new(policy: PowerPolicy) -> Self {
        Self {
            policy,
            tracking: Tracking::Uninitialized,
            virtual_off_at: None,
            limit_off_at: None,
        }
    }

    pub fn policy(&self) -> &PowerPolicy {
        &self.policy
    }

    /// True once the projector's first power report has been seen
    pub fn is_initialized(&self) -> bool {
        self.tracking != Tracking::Uninitialized
    }

    /// Advance the policy
    ///
    /// Returns the reason when a deadline fired and a real power-off was
    /// queued. If the off command cannot be queued the deadlines stay armed
    /// and the next tick retries.
    pub fn tick<D: PowerControl>(
        &mut self,
        device: &mut D,
        now: Millis,
    ) -> Result<Option<OffReason>, QueueError> {
        let power = device.is_on();
        let blank = device.is_image_blanked();

        let last = match self.tracking {
            Tracking::Tracking { power, blank } => (power, blank),
            Tracking::Uninitialized => {
                if !device.is_initialized() {
                    return Ok(None);
                }
                // True on-time is unknown; count the limit from now
                if power {
                    self.limit_off_at = self.limit_deadline(now);
                }
                (power, blank)
            }
        };
        self.tracking = Tracking::Tracking { power, blank };

        let (last_power, last_blank) = last;

        // Unblanked by someone else: the user is back
        if power && !blank && last_blank {
            self.virtual_off_at = None;
        }

        if power != last_power {
            self.virtual_off_at = None;
            self.limit_off_at = if power {
                self.limit_deadline(now)
            } else {
                None
            };
            return Ok(None);
        }

        let reason = if self.virtual_off_at.is_some_and(|at| reached(now, at)) {
            OffReason::VirtualOff
        } else if self.limit_off_at.is_some_and(|at| reached(now, at)) {
            OffReason::TimeLimit
        } else {
            return Ok(None);
        };

        device.turn_off()?;
        self.virtual_off_at = None;
        self.limit_off_at = None;
        Ok(Some(reason))
    }

    /// Handle a user request to turn the projector on
    pub fn request_power_on<D: PowerControl>(
        &mut self,
        device: &mut D,
        now: Millis,
    ) -> Result<PowerOn, PowerRefusal> {
        if device.is_on() {
            if self.virtual_off_at.is_none() {
                return Err(PowerRefusal::AlreadyOn);
            }
            device.set_image_blank(false)?;
            self.virtual_off_at = None;
            return Ok(PowerOn::Woken);
        }

        if let Some(allowed_at) = self.allowed_on_time(device, now) {
            return Err(PowerRefusal::OffDwell { allowed_at });
        }

        device.turn_on()?;
        Ok(PowerOn::PoweringOn)
    }

    /// Handle a user request to turn the projector off
    ///
    /// Powers off directly once the projector has been on past both the
    /// minimum on time and the skip threshold. Otherwise blanks the picture
    /// and schedules the real off after the grace period, or after the rest
    /// of the minimum on time if that is longer.
    ///
    /// Ignored while a virtual off is already pending, so a repeated request
    /// never pushes the scheduled off further out.
    pub fn request_power_off<D: PowerControl>(
        &mut self,
        device: &mut D,
        now: Millis,
    ) -> Result<PowerOff, QueueError> {
        if !device.is_on() || self.virtual_off_at.is_some() {
            return Ok(PowerOff::Ignored);
        }

        let on_time = device
            .last_on_time()
            .map_or(u32::MAX, |on| elapsed(now, on));
        let minimum_on = self.policy.minimum_on_ms();

        if on_time >= self.policy.skip_grace_after_ms() && on_time >= minimum_on {
            device.turn_off()?;
            return Ok(PowerOff::PoweredOff);
        }

        device.set_image_blank(true)?;

        let remaining_on = minimum_on.saturating_sub(on_time);
        let delay = remaining_on.max(self.policy.virtual_off_grace_ms());
        let real_off_at = now.wrapping_add(delay);
        self.virtual_off_at = Some(real_off_at);
        Ok(PowerOff::Blanked { real_off_at })
    }

    /// On from the user's point of view: powered and not virtually off
    pub fn virtual_power_state<D: PowerControl>(&self, device: &D) -> bool {
        device.is_on() && self.virtual_off_at.is_none()
    }

    /// Physical power state
    pub fn real_power_state<D: PowerControl>(&self, device: &D) -> bool {
        device.is_on()
    }

    /// Earliest scheduled real power-off
    pub fn pending_real_off_time(&self) -> Option<Millis> {
        match (self.virtual_off_at, self.limit_off_at) {
            (Some(virtual_off), Some(limit)) => Some(earliest(virtual_off, limit)),
            (virtual_off, limit) => virtual_off.or(limit),
        }
    }

    /// Scheduled virtual-off deadline
    pub fn virtual_off_time(&self) -> Option<Millis> {
        self.virtual_off_at
    }

    /// Scheduled maximum-on-time deadline
    pub fn limit_off_time(&self) -> Option<Millis> {
        self.limit_off_at
    }

    /// Skip the maximum-on-time off for the current session
    pub fn cancel_off_by_limit(&mut self) {
        self.limit_off_at = None;
    }

    /// Time a power-on becomes allowed, if currently held back
    pub fn allowed_on_time<D: PowerControl>(&self, device: &D, now: Millis) -> Option<Millis> {
        if device.is_on() {
            return None;
        }
        let allowed_at = device
            .last_off_time()?
            .wrapping_add(self.policy.minimum_off_ms());
        (!reached(now, allowed_at)).then_some(allowed_at)
    }

    /// Current policy phase
    ///
    /// A pending virtual off is reported even when the limit deadline is
    /// earlier; [`pending_real_off_time`](Self::pending_real_off_time) gives
    /// the time the projector will actually go off.
    pub fn phase<D: PowerControl>(&self, device: &D) -> SequencerPhase {
        if !device.is_on() {
            return SequencerPhase::Off;
        }
        match (self.virtual_off_at, self.limit_off_at) {
            (Some(at), _) => SequencerPhase::PendingVirtualOff { at },
            (None, Some(at)) => SequencerPhase::PendingLimitOff { at },
            (None, None) => SequencerPhase::On,
        }
    }

    fn limit_deadline(&self, now: Millis) -> Option<Millis> {
        self.policy
            .maximum_on_ms()
            .map(|limit| now.wrapping_add(limit))
    }
}
