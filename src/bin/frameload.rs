/// Frameload demo CLI
///
/// Drives synthetic load sessions so the scheduler's frame slicing can be
/// observed from a terminal, without embedding it in a real render loop.
use frameload::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
