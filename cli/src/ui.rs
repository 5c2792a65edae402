// Terminal UI utilities
// Everything here writes to stderr; stdout carries command output only.

use colored::Colorize;

pub fn print_error(message: &str) {
    eprintln!("{}", format!("Error: {}", message).bright_red().bold());
}
