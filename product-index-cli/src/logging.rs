//! Logger setup: `env_logger` with a compact format and an optional log file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::error::CliError;

/// Install the global logger.
///
/// Info lines print bare; warnings and errors get a colored `[LEVEL]` tag.
/// `--verbose` adds timestamps and debug output, `--quiet` keeps only
/// warnings and errors. Without either flag `RUST_LOG` decides.
pub(crate) fn init_logging(
    quiet: bool,
    verbose: bool,
    logfile: Option<&Path>,
) -> Result<(), CliError> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(LevelFilter::Warn);
    }

    builder.format(move |buf, record| {
        let level = record.level();
        if verbose {
            writeln!(
                buf,
                "{} {} {}",
                buf.timestamp_seconds(),
                level_tag(level),
                record.args()
            )
        } else if level <= Level::Warn {
            writeln!(buf, "{} {}", level_tag(level), record.args())
        } else {
            writeln!(buf, "{}", record.args())
        }
    });

    match logfile {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(Target::Pipe(Box::new(TeeWriter::new(io::stdout(), file))));
        }
        None => {
            builder.target(Target::Stdout);
        }
    }

    builder
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))
}

fn level_tag(level: Level) -> String {
    let tag = format!("[{}]", level);
    match level {
        Level::Error => tag.if_supports_color(Stdout, |t| t.red()).to_string(),
        Level::Warn => tag.if_supports_color(Stdout, |t| t.yellow()).to_string(),
        Level::Info => tag.if_supports_color(Stdout, |t| t.green()).to_string(),
        Level::Debug | Level::Trace => tag.if_supports_color(Stdout, |t| t.dimmed()).to_string(),
    }
}

/// Writes everything to the console and an ANSI-free copy to a file.
struct TeeWriter<C: Write, F: Write> {
    console: C,
    file: F,
}

impl<C: Write, F: Write> TeeWriter<C, F> {
    fn new(console: C, file: F) -> Self {
        Self { console, file }
    }
}

impl<C: Write, F: Write> Write for TeeWriter<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(&strip_ansi_escapes::strip(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}
