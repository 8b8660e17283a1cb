//! Line-oriented front end for the colon command line.
//!
//! Reads commands from stdin, one per line, and prints each response.
//! `:q` or end of input exits.
//!
//! Usage: `RUST_LOG=debug cargo run --bin colon_repl [settings.json]`

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use makeup::config::SETTINGS_FILENAME;
use makeup::{CommandDispatcher, Settings};

fn main() -> makeup::Result<()> {
    env_logger::init();

    let settings_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME));
    let settings = Settings::load_or_default(&settings_path);
    let session = settings.session();
    let theme = settings.theme.resolve()?;

    let dispatcher = CommandDispatcher::new().with_variable("dev_mode", session.dev_mode());
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let response = dispatcher.dispatch(line.trim_end());
        if response.is_quit() {
            break;
        }
        let text = response.display_text();
        if text.is_empty() {
            continue;
        }
        let color = match response.kind() {
            makeup::ResponseKind::Plain => theme.text,
            makeup::ResponseKind::Ok => theme.ok,
            makeup::ResponseKind::Error => theme.error,
        };
        if session.dev_mode() {
            writeln!(stdout, "[{color}] {text}")?;
        } else {
            writeln!(stdout, "{text}")?;
        }
    }

    Ok(())
}
