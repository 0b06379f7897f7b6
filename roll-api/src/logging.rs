use std::fmt::Write as _;
use std::io::{self, IsTerminal};

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;36m",
        Level::TRACE => "\x1b[90m",
    }
}

/// One event per line: dim local timestamp, padded level, dim target,
/// then the event fields.  Colors only go out when the writer reports
/// ANSI support, so piped output stays clean.
struct ServerLogFormat;

impl<S, N> FormatEvent<S, N> for ServerLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            let color = level_color(meta.level());
            write!(
                writer,
                "{DIM}{stamp}{RESET} {color}{:>5}{RESET} {DIM}{}:{RESET} ",
                meta.level(),
                meta.target(),
            )?;
        } else {
            write!(writer, "{stamp} {:>5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber.  Filtering comes from `RUST_LOG`, or
/// `info` when unset; output goes to stdout.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(ServerLogFormat)
        .with_ansi(io::stdout().is_terminal())
        .with_filter(filter);

    tracing_subscriber::registry().with(stdout_layer).init();
}
