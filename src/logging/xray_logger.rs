use super::XrayLogLevel;
use std::fmt;
use tracing::Level;

/// Logging interface the segment tracer reports its own diagnostics through.
pub trait TraceLogger: Send + Sync {
    fn log(&self, level: XrayLogLevel, msg: &dyn fmt::Display);
}

/// Options for [`XrayTracingLogger`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XrayLoggerOptions {
    /// Emit every forwarded message at this severity instead of its own.
    ///
    /// The original severity is kept in the `original_level` field.
    pub fix_level: Option<XrayLogLevel>,
}

/// Forwards trace diagnostics at or above a threshold to `tracing`.
///
/// Every event carries `type = "xray"`.
#[derive(Clone, Debug)]
pub struct XrayTracingLogger {
    level: XrayLogLevel,
    options: XrayLoggerOptions,
}

impl XrayTracingLogger {
    pub fn new(level: XrayLogLevel, options: XrayLoggerOptions) -> Self {
        Self { level, options }
    }

    /// The severity a message logged at `level` is emitted with, or `None`
    /// when it falls below the threshold.
    pub fn forwarded_level(&self, level: XrayLogLevel) -> Option<XrayLogLevel> {
        (level >= self.level).then(|| self.options.fix_level.unwrap_or(level))
    }
}

macro_rules! forward {
    ($level:expr, $original:expr, $msg:expr) => {
        match $original {
            Some(original) => tracing::event!(
                $level,
                "type" = "xray",
                original_level = %original,
                "{}",
                $msg
            ),
            None => tracing::event!($level, "type" = "xray", "{}", $msg),
        }
    };
}

impl TraceLogger for XrayTracingLogger {
    fn log(&self, level: XrayLogLevel, msg: &dyn fmt::Display) {
        let Some(emit_at) = self.forwarded_level(level) else {
            return;
        };
        let original = self.options.fix_level.map(|_| level);

        match emit_at {
            XrayLogLevel::Debug => forward!(Level::DEBUG, original, msg),
            XrayLogLevel::Info => forward!(Level::INFO, original, msg),
            XrayLogLevel::Warn => forward!(Level::WARN, original, msg),
            XrayLogLevel::Error => forward!(Level::ERROR, original, msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_threshold_filters_lower_levels() {
        let logger = XrayTracingLogger::new(XrayLogLevel::Warn, XrayLoggerOptions::default());

        assert_eq!(logger.forwarded_level(XrayLogLevel::Debug), None);
        assert_eq!(logger.forwarded_level(XrayLogLevel::Info), None);
        assert_eq!(logger.forwarded_level(XrayLogLevel::Warn), Some(XrayLogLevel::Warn));
        assert_eq!(logger.forwarded_level(XrayLogLevel::Error), Some(XrayLogLevel::Error));
    }

    #[test]
    fn test_fix_level_relabels_forwarded_messages() {
        let logger = XrayTracingLogger::new(
            XrayLogLevel::Debug,
            XrayLoggerOptions {
                fix_level: Some(XrayLogLevel::Info),
            },
        );

        for level in XrayLogLevel::ALL {
            assert_eq!(logger.forwarded_level(level), Some(XrayLogLevel::Info));
        }
    }

    #[test]
    fn test_fix_level_still_honours_threshold() {
        let logger = XrayTracingLogger::new(
            XrayLogLevel::Error,
            XrayLoggerOptions {
                fix_level: Some(XrayLogLevel::Info),
            },
        );

        assert_eq!(logger.forwarded_level(XrayLogLevel::Warn), None);
        assert_eq!(logger.forwarded_level(XrayLogLevel::Error), Some(XrayLogLevel::Info));
    }

    #[test]
    fn test_log_emits_event_with_type_field() {
        let logger = XrayTracingLogger::new(XrayLogLevel::Info, XrayLoggerOptions::default());

        let out = capture(|| {
            logger.log(XrayLogLevel::Debug, &"hidden");
            logger.log(XrayLogLevel::Warn, &"daemon unreachable");
        });

        assert!(!out.contains("hidden"));
        assert!(out.contains("WARN"));
        assert!(out.contains("daemon unreachable"));
        assert!(out.contains(r#"type="xray""#));
        assert!(!out.contains("original_level"));
    }

    #[test]
    fn test_log_with_fix_level_keeps_original_level() {
        let logger = XrayTracingLogger::new(
            XrayLogLevel::Debug,
            XrayLoggerOptions {
                fix_level: Some(XrayLogLevel::Info),
            },
        );

        let out = capture(|| logger.log(XrayLogLevel::Error, &"failed to send segment"));

        assert!(out.contains("INFO"));
        assert!(!out.contains("ERROR"));
        assert!(out.contains("original_level=error"));
        assert!(out.contains("failed to send segment"));
    }
}
