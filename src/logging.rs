use std::env;

use chrono::{SecondsFormat, Utc};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Route `log` records to stderr so stdout stays machine-readable.
///
/// Records whose target starts with one of `filter_targets` are dropped.
pub fn setup_logger(
    level: Option<String>,
    filter_targets: Vec<String>,
) -> Result<(), fern::InitError> {
    let level = get_log_level(level);
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .level(level)
        .filter(move |metadata| {
            !filter_targets
                .iter()
                .any(|filter| metadata.target().starts_with(filter))
        })
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

/// Level from the command line, else `RUST_LOG`, else `warn`.
pub fn get_log_level(level: Option<String>) -> LevelFilter {
    let requested = match level {
        Some(level) => level,
        None => env::var("RUST_LOG").unwrap_or_default(),
    };
    parse_level(&requested).unwrap_or(LevelFilter::Warn)
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse::<LevelFilter>().ok()
}
