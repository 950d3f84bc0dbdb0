//! Routes native log traffic into the `log` facade.
//!
//! The native side is handed exactly one `extern "C"` callback per process
//! (registration is guarded in [`crate::gpu::NativeGpu::load`]). Messages are
//! decoded leniently and mapped level-for-level; a short denylist drops
//! shader-validation spam the native side is known to emit on valid modules.

use std::ffi::{CStr, c_char, c_int};

use crate::raw::LogLevel;

/// Message prefixes never surfaced to the host sink.
///
/// Substring-prefix matching is a blunt instrument: a genuine diagnostic that
/// happens to share a prefix is silently lost. Accepted trade-off until the
/// native side tags suppressible categories itself.
pub(crate) const SUPPRESSED_PREFIXES: [&str; 3] = [
    "Unknown decoration",
    "Failed to parse shader",
    "Shader module will not be validated",
];

pub(crate) fn should_surface(message: &str) -> bool {
    !SUPPRESSED_PREFIXES
        .iter()
        .any(|prefix| message.starts_with(prefix))
}

/// Fixed native→host level mapping; unknown levels surface as warnings, Off
/// (which the native side should never emit from) maps to nothing.
pub(crate) fn host_level(native: c_int) -> Option<log::Level> {
    match LogLevel::from_native(native) {
        Some(LogLevel::Off) => None,
        Some(LogLevel::Error) => Some(log::Level::Error),
        Some(LogLevel::Warn) => Some(log::Level::Warn),
        Some(LogLevel::Info) => Some(log::Level::Info),
        Some(LogLevel::Debug) => Some(log::Level::Debug),
        Some(LogLevel::Trace) => Some(log::Level::Trace),
        None => Some(log::Level::Warn),
    }
}

/// The process-wide callback handed to `wgpu_set_log_callback`.
///
/// # Safety
///
/// Called by the native library with a nul-terminated message pointer that is
/// only valid for the duration of the call; the message is copied out before
/// returning.
pub(crate) unsafe extern "C" fn native_log_callback(level: c_int, message: *const c_char) {
    if message.is_null() {
        return;
    }
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    if !should_surface(&message) {
        return;
    }
    if let Some(level) = host_level(level) {
        log::log!(target: "wgpu_native", level, "{message}");
    }
}

/// Maps a host severity threshold down to the nearest native level.
///
/// Thresholds follow the conventional numeric severities (Error 40, Warn 30,
/// Info 20, Debug 10, Trace 5); anything below Trace disables native logging.
pub fn native_level_for_threshold(threshold: u32) -> LogLevel {
    if threshold >= 40 {
        LogLevel::Error
    } else if threshold >= 30 {
        LogLevel::Warn
    } else if threshold >= 20 {
        LogLevel::Info
    } else if threshold >= 10 {
        LogLevel::Debug
    } else if threshold >= 5 {
        LogLevel::Trace
    } else {
        LogLevel::Off
    }
}

/// Numeric severity of a host log filter, for re-propagation to the native
/// side whenever the host level changes.
pub fn threshold_for_filter(filter: log::LevelFilter) -> u32 {
    match filter {
        log::LevelFilter::Off => 0,
        log::LevelFilter::Error => 40,
        log::LevelFilter::Warn => 30,
        log::LevelFilter::Info => 20,
        log::LevelFilter::Debug => 10,
        log::LevelFilter::Trace => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── suppression ───────────────────────────────────────────────────────

    #[test]
    fn denylisted_prefixes_are_suppressed() {
        for prefix in SUPPRESSED_PREFIXES {
            assert!(!should_surface(prefix));
            assert!(!should_surface(&format!("{prefix}: extra detail")));
        }
    }

    #[test]
    fn other_messages_surface() {
        assert!(should_surface("Validation error in fragment stage"));
        // The denylist matches prefixes, not substrings.
        assert!(should_surface("note: Unknown decoration seen earlier"));
    }

    // ── native → host levels ──────────────────────────────────────────────

    #[test]
    fn native_levels_map_one_to_one() {
        assert_eq!(host_level(1), Some(log::Level::Error));
        assert_eq!(host_level(2), Some(log::Level::Warn));
        assert_eq!(host_level(3), Some(log::Level::Info));
        assert_eq!(host_level(4), Some(log::Level::Debug));
        assert_eq!(host_level(5), Some(log::Level::Trace));
    }

    #[test]
    fn off_and_unknown_levels() {
        assert_eq!(host_level(0), None);
        assert_eq!(host_level(99), Some(log::Level::Warn));
        assert_eq!(host_level(-1), Some(log::Level::Warn));
    }

    // ── host → native thresholds ──────────────────────────────────────────

    #[test]
    fn threshold_boundaries() {
        assert_eq!(native_level_for_threshold(40), LogLevel::Error);
        assert_eq!(native_level_for_threshold(30), LogLevel::Warn);
        assert_eq!(native_level_for_threshold(20), LogLevel::Info);
        assert_eq!(native_level_for_threshold(10), LogLevel::Debug);
        assert_eq!(native_level_for_threshold(5), LogLevel::Trace);
    }

    #[test]
    fn values_between_boundaries_round_down() {
        assert_eq!(native_level_for_threshold(50), LogLevel::Error);
        assert_eq!(native_level_for_threshold(35), LogLevel::Warn);
        assert_eq!(native_level_for_threshold(25), LogLevel::Info);
        assert_eq!(native_level_for_threshold(11), LogLevel::Debug);
        assert_eq!(native_level_for_threshold(9), LogLevel::Trace);
    }

    #[test]
    fn below_trace_is_off() {
        assert_eq!(native_level_for_threshold(4), LogLevel::Off);
        assert_eq!(native_level_for_threshold(0), LogLevel::Off);
    }

    // ── end to end through the C callback ─────────────────────────────────

    struct CaptureLogger {
        records: std::sync::Mutex<Vec<(log::Level, String)>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLogger = CaptureLogger {
        records: std::sync::Mutex::new(Vec::new()),
    };

    #[test]
    fn callback_surfaces_mapped_and_drops_denylisted() {
        use std::ffi::CString;

        log::set_logger(&CAPTURE).expect("another logger is installed in this test binary");
        log::set_max_level(log::LevelFilter::Trace);

        let benign = CString::new("Unknown decoration `Block` for block").unwrap();
        let real = CString::new("Validation failure in set 0").unwrap();
        unsafe {
            native_log_callback(2, benign.as_ptr());
            native_log_callback(2, real.as_ptr());
            native_log_callback(3, std::ptr::null());
        }

        let records = CAPTURE.records.lock().unwrap();
        assert_eq!(
            *records,
            vec![(log::Level::Warn, "Validation failure in set 0".to_owned())]
        );
    }

    #[test]
    fn filter_thresholds_round_trip() {
        let cases = [
            (log::LevelFilter::Error, LogLevel::Error),
            (log::LevelFilter::Warn, LogLevel::Warn),
            (log::LevelFilter::Info, LogLevel::Info),
            (log::LevelFilter::Debug, LogLevel::Debug),
            (log::LevelFilter::Trace, LogLevel::Trace),
            (log::LevelFilter::Off, LogLevel::Off),
        ];
        for (filter, native) in cases {
            assert_eq!(native_level_for_threshold(threshold_for_filter(filter)), native);
        }
    }
}
