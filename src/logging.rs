//! One-time logger setup for embedding hosts.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

static INIT_LOGGER: Once = Once::new();

/// Installs a debug-level `env_logger` writing to stderr, or appending to
/// `log_file`.
///
/// Only the first call has any effect. Later calls return `Ok(())` without
/// touching the file system. If the log file cannot be opened the logger
/// stays on stderr and the error is returned.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> io::Result<()> {
    let mut opened = Ok(());
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(LevelFilter::Debug);
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });
        if let Some(path) = log_file {
            match OpenOptions::new().append(true).create(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(err) => opened = Err(err),
            }
        }
        let _ = builder.try_init();
    });
    opened
}
