//! In-memory serial link for driving the engine in tests

use std::collections::VecDeque;

use benq_hal::{ErrorType, SerialRx, SerialTx};

/// Link error injected by tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDown;

/// Scripted serial port: tests push projector output, then inspect what the
/// engine wrote
#[derive(Debug, Default)]
pub struct MockPort {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub fail_flush: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `bytes` available to read
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Queue a response line terminated by `\r`
    pub fn reply(&mut self, line: &str) {
        self.push_rx(line.as_bytes());
        self.push_rx(b"\r");
    }

    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }

    /// Commands written so far, markers stripped
    pub fn sent_commands(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.tx)
            .split('\r')
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                chunk
                    .trim_start_matches('*')
                    .trim_end_matches('#')
                    .to_string()
            })
            .collect()
    }

    pub fn raw_tx(&self) -> &[u8] {
        &self.tx
    }

    pub fn clear_tx(&mut self) {
        self.tx.clear();
    }
}

impl ErrorType for MockPort {
    type Error = LinkDown;
}

impl SerialRx for MockPort {
    fn read_byte(&mut self) -> Result<Option<u8>, LinkDown> {
        if self.fail_reads {
            return Err(LinkDown);
        }
        Ok(self.rx.pop_front())
    }
}

impl SerialTx for MockPort {
    fn write_all(&mut self, data: &[u8]) -> Result<(), LinkDown> {
        if self.fail_writes {
            return Err(LinkDown);
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkDown> {
        if self.fail_flush {
            return Err(LinkDown);
        }
        Ok(())
    }
}
