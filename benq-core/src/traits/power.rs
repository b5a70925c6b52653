//! Power control trait

use crate::queue::QueueError;
use crate::time::Millis;

/// A projector whose power and picture blanking can be observed and commanded
///
/// Commands only queue the request; the observed state changes once the
/// projector reports it.
pub trait PowerControl {
    /// True once the first power report has been taken
    fn is_initialized(&self) -> bool;

    /// Physical power state
    fn is_on(&self) -> bool;

    /// True while the picture is blanked
    fn is_image_blanked(&self) -> bool;

    /// Time the projector last came on, if known
    fn last_on_time(&self) -> Option<Millis>;

    /// Time the projector last went off, if known
    fn last_off_time(&self) -> Option<Millis>;

    /// Queue a real power-on
    fn turn_on(&mut self) -> Result<(), QueueError>;

    /// Queue a real power-off
    fn turn_off(&mut self) -> Result<(), QueueError>;

    /// Queue a picture blank or unblank
    fn set_image_blank(&mut self, blank: bool) -> Result<(), QueueError>;
}
