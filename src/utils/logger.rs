use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn verbose_now() -> bool {
    log::max_level() >= LevelFilter::Debug
}

/// Install the global logger once. Later calls are no-ops.
///
/// Our own module is filtered at debug and the global max level decides what is emitted, so
/// [`set_verbose`] can change verbosity after the logger exists. Verbose mode also tags each
/// line with the thread it came from, so the timer, dispatch and forwarding threads of one batch
/// can be told apart.
pub fn setup_logging(verbose: bool) {
    let installed = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), LevelFilter::Debug)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let stamp = chrono::Local::now().format("%H:%M:%S");
            let verbose = verbose_now();
            let thread = if verbose {
                format!(" {}", std::thread::current().name().unwrap_or("?").dimmed())
            } else {
                String::new()
            };
            let tag = match record.level() {
                Level::Error => Some("ERROR".red()),
                Level::Warn => Some("WARN".yellow()),
                Level::Debug if verbose => Some("DEBUG".blue()),
                _ => None,
            };
            match tag {
                Some(tag) => writeln!(
                    buf,
                    "[{name} {stamp}{thread} {tag} {}] {}",
                    record.target().white(),
                    record.args()
                ),
                None => writeln!(buf, "[{name} {stamp}{thread}] {}", record.args()),
            }
        })
        .try_init()
        .is_ok();
    if installed {
        set_verbose(verbose);
    }
}

/// Switch between info and debug output on the installed logger.
pub fn set_verbose(verbose: bool) {
    log::set_max_level(level_for(verbose));
}
