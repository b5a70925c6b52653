//! Serial link abstractions
//!
//! The projector speaks a line-oriented ASCII protocol over RS-232. Reads are
//! non-blocking so the control loop can poll the link once per tick without
//! ever suspending.

/// Shared error type for both halves of a link
pub trait ErrorType {
    /// Error type for link operations
    type Error;
}

/// Serial receiver
///
/// Some boards receive from the projector on a different port than the one
/// they transmit on, so the two halves are separate traits.
pub trait SerialRx: ErrorType {
    /// Read one byte if one is already buffered
    ///
    /// Returns `Ok(None)` immediately when no data is pending.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Serial transmitter
pub trait SerialTx: ErrorType {
    /// Write all of `data` to the link
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Combined serial interface
///
/// For links that provide both TX and RX behind one handle.
pub trait Serial: SerialRx + SerialTx {}

// Blanket implementation
impl<T: SerialRx + SerialTx> Serial for T {}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

impl<T: SerialRx + ?Sized> SerialRx for &mut T {
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        T::read_byte(self)
    }
}

impl<T: SerialTx + ?Sized> SerialTx for &mut T {
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_all(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

/// A link assembled from separate receive and transmit halves
///
/// Some boards can only transmit on one UART and receive on another; this
/// presents the pair as a single [`Serial`].
#[derive(Debug)]
pub struct Duplex<R, T> {
    pub rx: R,
    pub tx: T,
}

impl<R, T> Duplex<R, T> {
    pub fn new(rx: R, tx: T) -> Self {
        Self { rx, tx }
    }

    /// Split back into the two halves
    pub fn into_parts(self) -> (R, T) {
        (self.rx, self.tx)
    }
}

impl<R: ErrorType, T: ErrorType<Error = R::Error>> ErrorType for Duplex<R, T> {
    type Error = R::Error;
}

impl<R: SerialRx, T: SerialTx<Error = R::Error>> SerialRx for Duplex<R, T> {
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        self.rx.read_byte()
    }
}

impl<R: SerialRx, T: SerialTx<Error = R::Error>> SerialTx for Duplex<R, T> {
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Input(&'static [u8]);

    impl ErrorType for Input {
        type Error = ();
    }

    impl SerialRx for Input {
        fn read_byte(&mut self) -> Result<Option<u8>, ()> {
            let (&first, rest) = match self.0.split_first() {
                Some(split) => split,
                None => return Ok(None),
            };
            self.0 = rest;
            Ok(Some(first))
        }
    }

    #[derive(Default)]
    struct Output(std::vec::Vec<u8>);

    impl ErrorType for Output {
        type Error = ();
    }

    impl SerialTx for Output {
        fn write_all(&mut self, data: &[u8]) -> Result<(), ()> {
            self.0.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    fn echo_one<S: Serial>(link: &mut S) {
        if let Ok(Some(byte)) = link.read_byte() {
            let _ = link.write_all(&[byte]);
        }
    }

    #[test]
    fn test_duplex_routes_halves() {
        let mut link = Duplex::new(Input(b"ab"), Output::default());
        echo_one(&mut link);
        echo_one(&mut &mut link);
        echo_one(&mut link);
        let (rx, tx) = link.into_parts();
        assert!(rx.0.is_empty());
        assert_eq!(tx.0, b"ab");
    }
}
