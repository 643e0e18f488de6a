pub mod fake_sns;
pub mod forms;

use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};

/// Routes `log` output (and `tracing` events, through its `log` feature) to the terminal.
///
/// Safe to call from every test; only the first call installs the logger.
pub fn setup_logging() {
    let _ = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
