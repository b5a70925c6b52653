//! Top-level driver
//!
//! [`Bridge`] ties the clock, the protocol engine and the power policy
//! together so a front end only needs to call [`Bridge::tick`] from its main
//! loop and route user requests through the power-policy methods. The clock
//! is sampled once per tick and the same timestamp drives both layers.

use benq_hal::{Clock, Serial};

use crate::config::BridgeConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::power::{PowerOff, PowerOn, PowerRefusal, PowerSequencer, SequencerPhase};
use crate::projector::{Projector, TickReport};
use crate::queue::QueueError;
use crate::time::Millis;

/// Projector engine plus power policy on a shared clock
pub struct Bridge<C, P, S> {
    clock: C,
    projector: Projector<P, S>,
    power: PowerSequencer,
}

impl<C: Clock, P: Serial, S: DiagnosticSink> Bridge<C, P, S> {
    pub fn new(config: BridgeConfig, clock: C, port: P, sink: S) -> Self {
        Self {
            clock,
            projector: Projector::new(config.projector, port, sink),
            power: PowerSequencer::new(config.power),
        }
    }

    /// Start the engine and queue the first poll
    pub fn begin(&mut self) {
        let now = self.clock.now_ms();
        self.projector.begin(now);
    }

    /// Run one iteration of both layers
    ///
    /// The power policy runs even when the engine returns a link error.
    pub fn tick(&mut self) -> Result<TickReport, P::Error> {
        let now = self.clock.now_ms();
        let report = self.projector.tick(now);

        // A failed enqueue is already reported by the engine and retried
        // on the next tick
        if let Ok(Some(reason)) = self.power.tick(&mut self.projector, now) {
            self.projector.report(Diagnostic::PolicyOff { reason });
        }

        report
    }

    /// Turn on, or wake from virtual off
    pub fn request_power_on(&mut self) -> Result<PowerOn, PowerRefusal> {
        let now = self.clock.now_ms();
        self.power.request_power_on(&mut self.projector, now)
    }

    /// Turn off, possibly as a virtual off first
    pub fn request_power_off(&mut self) -> Result<PowerOff, QueueError> {
        let now = self.clock.now_ms();
        self.power.request_power_off(&mut self.projector, now)
    }

    /// On from the user's point of view
    pub fn virtual_power_state(&self) -> bool {
        self.power.virtual_power_state(&self.projector)
    }

    /// Physically on
    pub fn real_power_state(&self) -> bool {
        self.power.real_power_state(&self.projector)
    }

    pub fn pending_real_off_time(&self) -> Option<Millis> {
        self.power.pending_real_off_time()
    }

    pub fn cancel_off_by_limit(&mut self) {
        self.power.cancel_off_by_limit();
    }

    /// Time a power-on becomes allowed, if currently held back
    pub fn allowed_on_time(&self) -> Option<Millis> {
        self.power.allowed_on_time(&self.projector, self.clock.now_ms())
    }

    pub fn power_phase(&self) -> SequencerPhase {
        self.power.phase(&self.projector)
    }
}

impl<C, P, S> Bridge<C, P, S> {
    pub fn projector(&self) -> &Projector<P, S> {
        &self.projector
    }

    /// Engine access for non-power commands
    pub fn projector_mut(&mut self) -> &mut Projector<P, S> {
        &mut self.projector
    }

    pub fn power(&self) -> &PowerSequencer {
        &self.power
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::config::PowerPolicy;
    use crate::testing::MockPort;

    #[derive(Default)]
    struct TestClock(Cell<Millis>);

    impl TestClock {
        fn set(&self, now: Millis) {
            self.0.set(now);
        }
    }

    impl Clock for TestClock {
        fn now_ms(&self) -> Millis {
            self.0.get()
        }
    }

    const S: u32 = 1_000;

    type TestBridge = Bridge<TestClock, MockPort, std::vec::Vec<Diagnostic>>;

    fn bridge(maximum_on_s: u32) -> TestBridge {
        let config = BridgeConfig {
            power: PowerPolicy {
                maximum_on_s,
                ..PowerPolicy::default()
            },
            ..BridgeConfig::default()
        };
        let mut bridge = Bridge::new(
            config,
            TestClock::default(),
            MockPort::new(),
            std::vec::Vec::new(),
        );
        bridge.begin();
        bridge
    }

    /// Tick until the queue drains and all replies are handled
    fn settle(bridge: &mut TestBridge, until: Millis) {
        let mut now = bridge.clock().now_ms();
        while now < until {
            now += 10;
            bridge.clock().set(now);
            bridge.tick().unwrap();
        }
    }

    #[test]
    fn test_limit_off_end_to_end() {
        let mut bridge = bridge(3_600);
        bridge.projector_mut().port_mut().reply("*POW=ON#");
        settle(&mut bridge, S);
        assert!(bridge.real_power_state());
        assert!(bridge.power().is_initialized());
        assert!(matches!(
            bridge.power_phase(),
            SequencerPhase::PendingLimitOff { .. }
        ));

        bridge.projector_mut().port_mut().clear_tx();
        bridge.clock().set(3_602 * S);
        bridge.tick().unwrap();

        assert!(bridge.projector().sink().contains(&Diagnostic::PolicyOff {
            reason: crate::power::OffReason::TimeLimit
        }));
        settle(&mut bridge, 3_605 * S);
        assert!(bridge
            .projector()
            .port()
            .sent_commands()
            .contains(&"pow=off".to_string()));
    }

    #[test]
    fn test_limit_off_with_failing_receive() {
        let mut bridge = bridge(10);
        bridge.projector_mut().port_mut().reply("*POW=ON#");
        settle(&mut bridge, S);
        assert!(bridge.real_power_state());

        bridge.projector_mut().port_mut().fail_reads = true;
        bridge.projector_mut().port_mut().clear_tx();
        settle(&mut bridge, 20 * S);

        let port = bridge.projector().port();
        assert!(port.sent_commands().contains(&"pow=off".to_string()));
        assert!(bridge.projector().sink().contains(&Diagnostic::PolicyOff {
            reason: crate::power::OffReason::TimeLimit
        }));
        assert!(bridge.projector().sink().contains(&Diagnostic::LinkError {
            op: crate::diagnostics::LinkOp::Read
        }));
        assert!(bridge.projector().queue_len() < crate::queue::SEND_QUEUE_CAPACITY);
    }

    #[test]
    fn test_policy_runs_when_write_fails() {
        let mut bridge = bridge(10);
        bridge.projector_mut().port_mut().reply("*POW=ON#");
        settle(&mut bridge, S);

        bridge.projector_mut().port_mut().fail_writes = true;
        bridge.clock().set(11 * S);
        assert!(bridge.tick().is_err());
        assert!(bridge.projector().sink().contains(&Diagnostic::PolicyOff {
            reason: crate::power::OffReason::TimeLimit
        }));
    }

    #[test]
    fn test_virtual_off_then_wake() {
        let mut bridge = bridge(0);
        bridge.projector_mut().port_mut().reply("*POW=ON#");
        settle(&mut bridge, S);

        bridge.clock().set(100 * S);
        let outcome = bridge.request_power_off().unwrap();
        assert_eq!(
            outcome,
            PowerOff::Blanked {
                real_off_at: 300 * S + 10
            }
        );
        assert!(!bridge.virtual_power_state());
        assert_eq!(bridge.request_power_on(), Ok(PowerOn::Woken));
        assert!(bridge.virtual_power_state());
        assert_eq!(bridge.pending_real_off_time(), None);
    }

    #[test]
    fn test_power_on_refused_during_min_off() {
        let mut bridge = bridge(0);
        bridge.projector_mut().port_mut().reply("*POW=OFF#");
        settle(&mut bridge, S);

        let off_at = bridge.projector().last_off_time().unwrap();
        assert_eq!(
            bridge.request_power_on(),
            Err(PowerRefusal::OffDwell {
                allowed_at: off_at + 120 * S
            })
        );
        assert_eq!(bridge.allowed_on_time(), Some(off_at + 120 * S));

        bridge.clock().set(off_at + 120 * S);
        assert_eq!(bridge.request_power_on(), Ok(PowerOn::PoweringOn));
    }
}
