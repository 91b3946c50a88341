//! Thin binary: everything lives in `cli/`, this only maps errors to an exit code.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
