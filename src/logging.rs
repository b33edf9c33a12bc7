use colored::{Color, Colorize};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;

/// Prints `doser: warning: ...` style lines; debug and trace also name the module
pub struct CliFormatter {
    color: bool,
}

fn label(level: &Level) -> (&'static str, Color) {
    match *level {
        Level::ERROR => ("error", Color::Red),
        Level::WARN => ("warning", Color::Yellow),
        Level::INFO => ("note", Color::Green),
        Level::DEBUG => ("debug", Color::Blue),
        Level::TRACE => ("trace", Color::BrightBlack),
    }
}

impl<S, N> FormatEvent<S, N> for CliFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let (name, color) = label(meta.level());

        if self.color {
            write!(writer, "doser: {}: ", name.color(color).bold())?;
        } else {
            write!(writer, "doser: {}: ", name)?;
        }
        if *meta.level() >= Level::DEBUG {
            write!(writer, "[{}] ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str, color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(CliFormatter { color })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_by_severity() {
        assert_eq!(label(&Level::WARN), ("warning", Color::Yellow));
        assert_eq!(label(&Level::ERROR).0, "error");
        assert_eq!(label(&Level::DEBUG).0, "debug");
    }
}
