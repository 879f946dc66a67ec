/// Logger setup.
///
/// The game owns the terminal (raw mode, alternate screen), so while
/// playing, log records go to a file in the data directory. The other
/// subcommands log to stderr. `RUST_LOG` overrides the configured level.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

pub const LOG_FILE: &str = "snake-arcade.log";

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

/// Install the global logger. If `file` cannot be opened the logger falls
/// back to stderr and the open error is returned for the caller to report.
pub fn init(default_level: &str, file: Option<&Path>) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format_timestamp_millis();

    let mut outcome = Ok(());
    if let Some(path) = file {
        match open_append(path) {
            Ok(f) => {
                builder.target(Target::Pipe(Box::new(f)));
            }
            Err(e) => outcome = Err(e),
        }
    }

    // A logger may already be installed (tests); keep the first one.
    let _ = builder.try_init();
    outcome
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
