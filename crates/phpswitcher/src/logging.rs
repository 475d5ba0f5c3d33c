use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use phpswitcher_platform::AppPaths;

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Drop the older half of the log, cut at a line boundary, once it exceeds `max_size`.
fn trim_log_file(path: &Path, max_size: u64) -> io::Result<()> {
    if std::fs::metadata(path)?.len() <= max_size {
        return Ok(());
    }

    let contents = std::fs::read(path)?;
    let half = contents.len() / 2;
    let keep_from = contents[half..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(half, |pos| half + pos + 1);
    std::fs::write(path, &contents[keep_from..])
}

/// Terminal verbosity: an explicit level wins, then `--verbose`, then warnings only.
pub fn terminal_level(verbose: bool, requested: Option<LevelFilter>) -> LevelFilter {
    requested.unwrap_or(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    })
}

/// Log to stderr at `term_level` and to the log file in the data dir at debug.
pub fn init_logging(paths: &AppPaths, term_level: LevelFilter, max_log_size: u64) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("phpswitcher")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = paths.log_file();
    let file_error = paths
        .ensure_dirs()
        .and_then(|()| {
            if log_path.exists() {
                trim_log_file(&log_path, max_log_size)?;
            }
            open_log_file(&log_path)
        })
        .map(|file| loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)))
        .err();

    let _ = CombinedLogger::init(loggers);
    match file_error {
        None => log::debug!("Logging initialized, log file: {}", log_path.display()),
        Some(e) => log::debug!("File logging disabled for {}: {e}", log_path.display()),
    }
}
