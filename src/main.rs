//! shapestat CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, prints errors to
//! stderr, and maps the outcome to an exit status. All loading and
//! booting happens in the CLI module.

use shapestat::cli;

fn main() {
    match cli::run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", e.code(), e);
            std::process::exit(1);
        }
    }
}
