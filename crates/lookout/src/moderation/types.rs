use bon::Builder;
use smol_str::SmolStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Tuning for the moderation core.
///
/// - `lookahead`: how many upcoming items to prefetch verdicts for.
/// - `max_attempts`: resolver attempts per navigation signal (0 is read as 1).
/// - `retry_backoff`: delay between attempts.
/// - `debounce`: delay before a navigation scan starts, so the host can
///   finish rendering the new item.
/// - `notify_errors`: show `error_message` when all attempts fail.
/// - `skip_message`: shown when an item is skipped.
#[derive(Debug, Clone, Builder)]
#[builder(start_fn = new)]
pub struct ModerationOptions {
    /// Prefetch window
    #[builder(default = 5)]
    pub lookahead: usize,
    /// Attempts per navigation signal
    #[builder(default = 3)]
    pub max_attempts: u32,
    /// Delay between attempts
    #[builder(default = Duration::from_millis(500))]
    pub retry_backoff: Duration,
    /// Delay before a navigation scan starts
    #[builder(default = Duration::from_millis(500))]
    pub debounce: Duration,
    /// Notify the user when the current item could not be checked
    #[builder(default = false)]
    pub notify_errors: bool,
    /// Info notification for a skipped item
    #[builder(into, default = SmolStr::new_static("Skipped Post!"))]
    pub skip_message: SmolStr,
    /// Error notification for an item that could not be checked
    #[builder(into, default = SmolStr::new_static("Error contacting server"))]
    pub error_message: SmolStr,
}

impl Default for ModerationOptions {
    fn default() -> Self {
        Self::new().build()
    }
}

/// Attempt counter for one resolver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
}

impl RetryState {
    /// Start at attempt 1 of `max_attempts`.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Current attempt, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Upper bound on attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt is allowed after the current one.
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Move to the next attempt. Saturates at `max_attempts`.
    pub fn advance(&mut self) {
        self.attempt = (self.attempt + 1).min(self.max_attempts);
    }
}

/// Monotonic counter of navigation signals.
///
/// Each signal takes a new [`ScanTicket`]; work holding an older ticket has
/// been superseded and must not touch the presentation.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

/// Snapshot of the [`Generation`] taken when a scan started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanTicket(u64);

impl Generation {
    /// Start a new generation, superseding every earlier ticket.
    pub fn advance(&self) -> ScanTicket {
        ScanTicket(self.0.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Ticket for the latest generation without advancing.
    pub fn current(&self) -> ScanTicket {
        ScanTicket(self.0.load(Ordering::Acquire))
    }

    /// Whether `ticket` is still the latest generation.
    pub fn is_latest(&self, ticket: ScanTicket) -> bool {
        self.current() == ticket
    }
}

impl ScanTicket {
    /// The raw generation number.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// What a resolver invocation did with the current item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The item was unrecoverable; the host was asked to move past it.
    Skipped,
    /// The verdict was applied; `count` sub-elements were hidden or replaced.
    Marked {
        /// Number of sub-elements changed
        count: usize,
    },
    /// The verdict arrived after the user moved on and was discarded.
    Stale,
    /// Every attempt failed; the item was left unmoderated.
    Exhausted {
        /// Attempts made
        attempts: u32,
    },
}

/// Outcome of a navigation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A newer signal arrived during the debounce; nothing was done.
    Superseded,
    /// The resolver ran for the current item.
    Resolved(Resolution),
}
