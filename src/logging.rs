//! Lock-free diagnostics for the sampling loop.
//!
//! The sampling path must never block on I/O, so diagnostics go through a
//! fixed-size ring: the loop pushes formatted entries (drop-on-full), the
//! outer layer drains them to UART or stderr at its leisure.
//!
//! ```text
//! Sampling loop            DiagStream           Drain (outer layer)
//! ─────────────            ──────────           ───────────────────
//! diag_info!() ─────────▶ [E0][E1][E2] ───────▶ UART / stderr
//! non-blocking             lock-free ring        blocking ok
//! ```
//!
//! Debug-mode per-cycle summaries and fault reports both use this path.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Diag buffer size (number of entries). Must be a power of 2.
pub const DIAG_BUFFER_SIZE: usize = 64;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum DiagLevel {
    Error = 0,
    Info = 1,
    Debug = 2,
}

impl DiagLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagLevel::Error => "ERROR",
            DiagLevel::Info => "INFO",
            DiagLevel::Debug => "DEBUG",
        }
    }
}

/// A single diagnostic entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct DiagEntry {
    /// Scheduler tick at which the entry was pushed.
    pub tick: u32,
    /// Severity.
    pub level: DiagLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl DiagEntry {
    /// Message as UTF-8, lossy on truncation damage.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

/// Lock-free SPSC diagnostic ring.
///
/// Single producer (the sampling loop), single consumer (the drain).
/// Push never blocks; entries are dropped when the ring is full and the
/// drop count is reported instead.
pub struct DiagStream<const N: usize = DIAG_BUFFER_SIZE> {
    entries: UnsafeCell<[DiagEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Single producer, single consumer. The producer only writes the
// slot it just claimed via write_idx; the consumer only reads slots the
// producer has published (Release store / Acquire load pairing).
unsafe impl<const N: usize> Sync for DiagStream<N> {}
unsafe impl<const N: usize> Send for DiagStream<N> {}

impl<const N: usize> DiagStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Diag buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new(
                [DiagEntry {
                    tick: 0,
                    level: DiagLevel::Info,
                    len: 0,
                    msg: [0; MAX_MSG_LEN],
                }; N],
            ),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push an entry (never blocks).
    ///
    /// Returns `true` if queued, `false` if dropped (ring full).
    #[inline]
    pub fn push(&self, tick: u32, level: DiagLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: Single producer; this slot is not yet published, so the
        // consumer cannot be reading it.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.tick = tick;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Drain the next entry, if any.
    #[inline]
    pub fn drain(&self) -> Option<DiagEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: Single consumer; the producer published this slot before
        // advancing write_idx.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        read != write
    }

    /// Count of messages dropped because the ring was full.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset the dropped counter (after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for DiagStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, returning the bytes written.
///
/// Output is truncated to the buffer; nothing here allocates.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Format a drained entry for line-oriented output.
///
/// Format: `[tick] LEVEL: message\n`
pub fn format_entry(entry: &DiagEntry, buf: &mut [u8]) -> usize {
    format_to_buffer(
        buf,
        format_args!(
            "[{:8}] {}: {}\n",
            entry.tick,
            entry.level.as_str(),
            entry.message()
        ),
    )
}

/// Push a formatted diagnostic without blocking.
#[macro_export]
macro_rules! diag {
    ($level:expr, $stream:expr, $tick:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($tick, $level, &buf[..len]);
    }};
}

/// Info-level diagnostic.
#[macro_export]
macro_rules! diag_info {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::diag!($crate::logging::DiagLevel::Info, $stream, $tick, $($arg)*)
    };
}

/// Error-level diagnostic.
#[macro_export]
macro_rules! diag_error {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::diag!($crate::logging::DiagLevel::Error, $stream, $tick, $($arg)*)
    };
}

/// Debug-level diagnostic.
#[macro_export]
macro_rules! diag_debug {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::diag!($crate::logging::DiagLevel::Debug, $stream, $tick, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diag_stream_basic() {
        let stream = DiagStream::<16>::new();

        assert!(stream.push(1000, DiagLevel::Info, b"test message"));
        assert!(stream.has_entries());

        let entry = stream.drain().unwrap();
        assert_eq!(entry.tick, 1000);
        assert_eq!(entry.level, DiagLevel::Info);
        assert_eq!(entry.message(), "test message");

        assert!(!stream.has_entries());
    }

    #[test]
    fn test_diag_stream_full_drops() {
        let stream = DiagStream::<4>::new();

        assert!(stream.push(1, DiagLevel::Info, b"1"));
        assert!(stream.push(2, DiagLevel::Info, b"2"));
        assert!(stream.push(3, DiagLevel::Info, b"3"));
        assert!(stream.push(4, DiagLevel::Info, b"4"));

        // Should drop
        assert!(!stream.push(5, DiagLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);

        // Drain one, should be able to push again
        stream.drain();
        assert!(stream.push(6, DiagLevel::Info, b"6"));
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = DiagStream::<4>::new();
        let long = [b'x'; MAX_MSG_LEN + 40];

        assert!(stream.push(0, DiagLevel::Debug, &long));
        let entry = stream.drain().unwrap();
        assert_eq!(entry.len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("Pin {} pot: {}", 26, 3141));
        assert_eq!(&buf[..len], b"Pin 26 pot: 3141");
    }

    #[test]
    fn test_format_entry_line() {
        let stream = DiagStream::<4>::new();
        stream.push(42, DiagLevel::Error, b"adc fault");
        let entry = stream.drain().unwrap();

        let mut buf = [0u8; 160];
        let len = format_entry(&entry, &mut buf);
        let line = core::str::from_utf8(&buf[..len]).unwrap();

        assert!(line.contains("42"));
        assert!(line.contains("ERROR"));
        assert!(line.contains("adc fault"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_diag_macros() {
        static STREAM: DiagStream<16> = DiagStream::new();

        diag_info!(STREAM, 7, "button: {} pot: {}", 0, 6283);
        let entry = STREAM.drain().unwrap();
        assert_eq!(entry.level, DiagLevel::Info);
        assert_eq!(entry.message(), "button: 0 pot: 6283");
    }
}
