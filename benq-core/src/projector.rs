//! Projector protocol engine
//!
//! [`Projector`] owns the serial link and everything needed to talk to the
//! projector: line framing, the outbound queue with its send pacing, status
//! polling, the reconciled [`DeviceState`], and throughput counters. It is
//! driven by calling [`Projector::tick`] from the control loop.
//!
//! Each tick does, in order:
//! 1. Enqueue a poll round if one is due and the queue is not backed up
//! 2. Read buffered input until one frame has been handled, input runs dry,
//!    or the link reports an error
//! 3. If no frame was handled, send the next queued command if its slot is open
//! 4. Roll the throughput windows
//!
//! Nothing blocks. Commands only enter the queue; the device state changes
//! when the projector reports back.

use benq_hal::Serial;
use benq_protocol::{
    classify, encode_command_to_vec, keys, printable, FrameError, LineReader, Message, RemoteKey,
    Value,
};

use crate::config::ProjectorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LinkOp};
use crate::queue::{CommandQueue, QueueError};
use crate::scheduler::{poll_queries, PollScheduler, SendScheduler};
use crate::state::{Applied, DeviceState, PowerTransition};
use crate::stats::{DirectionStats, Throughput};
use crate::time::Millis;
use crate::traits::PowerControl;

#[cfg(feature = "serde")]
use serde::Serialize;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// A complete frame was read and handled
    pub frame_processed: bool,
    /// A command was written to the link
    pub sent: bool,
    /// A poll round was enqueued
    pub polled: bool,
}

/// Status document published to front ends
///
/// The detail fields are only present while the projector is on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StatusSnapshot {
    pub power: bool,
    pub model: Value,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub source: Option<Value>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub volume: Option<u8>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub lamp_mode: Option<Value>,
}

/// Protocol engine for one projector on one serial link
pub struct Projector<P, S> {
    config: ProjectorConfig,
    port: P,
    sink: S,
    reader: LineReader,
    queue: CommandQueue,
    sender: SendScheduler,
    poller: PollScheduler,
    state: DeviceState,
    stats: Throughput,
}

impl<P: Serial, S: DiagnosticSink> Projector<P, S> {
    /// Create an engine; call [`begin`](Self::begin) before the first tick
    pub fn new(config: ProjectorConfig, port: P, sink: S) -> Self {
        Self {
            config,
            port,
            sink,
            reader: LineReader::new(),
            queue: CommandQueue::new(),
            sender: SendScheduler::new(config.send_interval_ms, 0),
            poller: PollScheduler::new(config.poll_interval_ms, config.send_interval_ms, 0),
            state: DeviceState::new(),
            stats: Throughput::new(0),
        }
    }

    /// Start the engine at `now` and queue the first poll round
    pub fn begin(&mut self, now: Millis) {
        self.reader.reset();
        self.stats.restart_windows(now);
        self.sender.reset(now);
        self.poller.force(now);
        self.run_poll(now);
    }

    /// Run one iteration of the engine
    ///
    /// Only write errors are returned, after the rest of the tick has run.
    /// A failed write leaves the command at the head of the queue. Read and
    /// flush errors are reported as [`Diagnostic::LinkError`].
    pub fn tick(&mut self, now: Millis) -> Result<TickReport, P::Error> {
        let polled = self.run_poll(now);
        let frame_processed = self.receive(now);
        let sent = if frame_processed {
            Ok(false)
        } else {
            self.send(now)
        };
        self.stats.tick(now);

        Ok(TickReport {
            frame_processed,
            sent: sent?,
            polled,
        })
    }

    fn run_poll(&mut self, now: Millis) -> bool {
        if !self.poller.due(now, self.queue.len()) {
            return false;
        }
        for key in poll_queries(&self.state) {
            // Failures are reported; the next round asks again
            let result = self.queue.enqueue_query(key);
            let _ = self.reported(result);
        }
        true
    }

    fn receive(&mut self, now: Millis) -> bool {
        loop {
            let byte = match self.port.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => return false,
                Err(_) => {
                    self.sink.emit(Diagnostic::LinkError { op: LinkOp::Read });
                    return false;
                }
            };
            match self.reader.feed(byte) {
                Ok(Some(frame)) => {
                    self.handle_frame(&frame, now);
                    return true;
                }
                Ok(None) => {}
                Err(FrameError::Overflow { prefix }) => {
                    self.sink.emit(Diagnostic::Overflow {
                        prefix: printable(&prefix),
                    });
                }
                Err(_) => {}
            }
        }
    }

    fn handle_frame(&mut self, frame: &[u8], now: Millis) {
        let message = classify(frame);

        if message.is_counted() {
            self.stats.record_received();
        }
        if !matches!(message, Message::Echo(_)) {
            self.sink.emit(Diagnostic::Received {
                frame: printable(frame),
            });
        }

        match message {
            Message::Echo(text) => self.sink.emit(Diagnostic::Echo { text }),
            Message::Malformed(reason) => self.sink.emit(Diagnostic::Malformed { reason }),
            Message::ErrorReply { kind, text } => {
                self.sink.emit(Diagnostic::DeviceRejected { kind, text })
            }
            Message::KeyValue { key, value } => {
                match self
                    .state
                    .apply(&key, &value, now, self.config.power_off_settle_ms)
                {
                    Ok(Applied::Power(PowerTransition::Unchanged)) => {}
                    Ok(Applied::Power(transition)) => {
                        self.sink.emit(Diagnostic::Power { transition })
                    }
                    Ok(Applied::Volume) => {
                        let _ = self.converge_volume();
                    }
                    Ok(Applied::Field | Applied::Ignored) => {}
                    Err(error) => self.sink.emit(Diagnostic::InvalidValue { key, value, error }),
                }
            }
        }
    }

    /// Queue one volume step towards the target, if any
    fn converge_volume(&mut self) -> Result<(), QueueError> {
        let Some(target) = self.state.target_volume() else {
            return Ok(());
        };
        let reported = self.state.reported_volume();
        let Some(step) = self.state.next_volume_step() else {
            return Ok(());
        };

        self.sink.emit(Diagnostic::VolumeStep {
            step,
            reported,
            target,
        });
        let result = self.queue.enqueue_key_value(keys::VOLUME, step.value());
        self.reported(result)
    }

    fn send(&mut self, now: Millis) -> Result<bool, P::Error> {
        if !self.sender.is_ready(now) {
            return Ok(false);
        }
        let Some(command) = self.queue.front() else {
            return Ok(false);
        };

        // Queued commands always fit the encode buffer
        let Ok(encoded) = encode_command_to_vec(command.as_str()) else {
            self.queue.pop();
            self.sink.emit(Diagnostic::QueueRejected {
                error: QueueError::TooLong,
            });
            return Ok(false);
        };

        self.port.write_all(&encoded)?;

        // Leaves the queue once written, even if the flush fails
        if let Some(command) = self.queue.pop() {
            self.sink.emit(Diagnostic::Sent {
                command: command.into_text(),
            });
        }
        self.sender.mark_sent(now);
        self.stats.record_sent();

        if self.port.flush().is_err() {
            self.sink.emit(Diagnostic::LinkError { op: LinkOp::Flush });
        }
        Ok(true)
    }

    fn reported(&mut self, result: Result<(), QueueError>) -> Result<(), QueueError> {
        if let Err(error) = result {
            self.sink.emit(Diagnostic::QueueRejected { error });
        }
        result
    }

    /// Queue a raw command, e.g. `menu`
    pub fn queue_raw(&mut self, text: &str) -> Result<(), QueueError> {
        let result = self.queue.enqueue_raw(text);
        self.reported(result)
    }

    /// Queue `key=value`
    pub fn queue_key_value(&mut self, key: &str, value: &str) -> Result<(), QueueError> {
        let result = self.queue.enqueue_key_value(key, value);
        self.reported(result)
    }

    /// Queue `key=?`
    pub fn queue_query(&mut self, key: &str) -> Result<(), QueueError> {
        let result = self.queue.enqueue_query(key);
        self.reported(result)
    }

    /// Queue a power-on
    ///
    /// No dwell times are enforced here; see [`crate::power::PowerSequencer`].
    pub fn turn_on(&mut self) -> Result<(), QueueError> {
        self.queue_key_value(keys::POWER, keys::ON)
    }

    /// Queue a power-off
    pub fn turn_off(&mut self) -> Result<(), QueueError> {
        self.queue_key_value(keys::POWER, keys::OFF)
    }

    pub fn set_source(&mut self, source: &str) -> Result<(), QueueError> {
        self.queue_key_value(keys::SOURCE, source)
    }

    pub fn set_mute(&mut self, mute: bool) -> Result<(), QueueError> {
        self.queue_key_value(keys::MUTE, keys::flag(mute))
    }

    /// Step the volume towards `target`
    ///
    /// One step is sent now and one more after each volume report until
    /// the report matches.
    pub fn set_volume(&mut self, target: u8) -> Result<(), QueueError> {
        self.state.set_target_volume(target);
        self.converge_volume()
    }

    pub fn set_lamp_mode(&mut self, mode: &str) -> Result<(), QueueError> {
        self.queue_key_value(keys::LAMP_MODE, mode)
    }

    pub fn set_image_blank(&mut self, blank: bool) -> Result<(), QueueError> {
        self.queue_key_value(keys::BLANK, keys::flag(blank))
    }

    pub fn set_image_freeze(&mut self, freeze: bool) -> Result<(), QueueError> {
        self.queue_key_value(keys::FREEZE, keys::flag(freeze))
    }

    /// Queue the command for a remote-control button
    pub fn press_remote(&mut self, key: RemoteKey) -> Result<(), QueueError> {
        match key.command() {
            (command, Some(value)) => self.queue_key_value(command, value),
            (command, None) => self.queue_raw(command),
        }
    }

    /// Report a diagnostic through the engine's sink
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.emit(diagnostic);
    }
}

impl<P, S> Projector<P, S> {
    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Reconciled device state
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning()
    }

    pub fn status_label(&self) -> &'static str {
        self.state.status_label()
    }

    pub fn source(&self) -> &str {
        self.state.source()
    }

    /// Pending target volume, else the last reported volume
    pub fn volume(&self) -> u8 {
        self.state.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.state.is_muted()
    }

    pub fn lamp_mode(&self) -> &str {
        self.state.lamp_mode()
    }

    pub fn lamp_hours(&self) -> u32 {
        self.state.lamp_hours()
    }

    pub fn is_image_blanked(&self) -> bool {
        self.state.is_image_blanked()
    }

    pub fn is_image_frozen(&self) -> bool {
        self.state.is_image_frozen()
    }

    pub fn model_name(&self) -> &str {
        self.state.model_name()
    }

    pub fn last_on_time(&self) -> Option<Millis> {
        self.state.last_on()
    }

    pub fn last_off_time(&self) -> Option<Millis> {
        self.state.last_off()
    }

    pub fn send_stats(&self) -> DirectionStats {
        self.stats.sent()
    }

    pub fn recv_stats(&self) -> DirectionStats {
        self.stats.received()
    }

    /// Number of commands waiting to be sent
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Status document for front ends
    pub fn status(&self) -> StatusSnapshot {
        let on = self.state.is_on();
        StatusSnapshot {
            power: on,
            model: self.state.model_name.clone(),
            source: on.then(|| self.state.source.clone()),
            volume: on.then(|| self.state.volume()),
            lamp_mode: on.then(|| self.state.lamp_mode.clone()),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<P: Serial, S: DiagnosticSink> PowerControl for Projector<P, S> {
    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn is_on(&self) -> bool {
        self.state.is_on()
    }

    fn is_image_blanked(&self) -> bool {
        self.state.is_image_blanked()
    }

    fn last_on_time(&self) -> Option<Millis> {
        self.state.last_on()
    }

    fn last_off_time(&self) -> Option<Millis> {
        self.state.last_off()
    }

    fn turn_on(&mut self) -> Result<(), QueueError> {
        Projector::turn_on(self)
    }

    fn turn_off(&mut self) -> Result<(), QueueError> {
        Projector::turn_off(self)
    }

    fn set_image_blank(&mut self, blank: bool) -> Result<(), QueueError> {
        Projector::set_image_blank(self, blank)
    }
}
