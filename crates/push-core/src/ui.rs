//! Operator-facing messages.
//!
//! Progress goes to stdout, warnings and fatal errors to stderr. Diagnostics
//! that only matter when debugging go through `tracing` instead.

use console::style;

/// A task finished.
pub fn success(msg: impl AsRef<str>) {
    println!("{}", style(msg.as_ref()).green());
}

/// Something was deliberately skipped.
pub fn notice(msg: impl AsRef<str>) {
    println!("{}", style(msg.as_ref()).yellow());
}

/// Something is about to happen on a remote host.
pub fn progress(msg: impl AsRef<str>) {
    println!("{}", style(msg.as_ref()).cyan());
}

pub fn warn(msg: impl AsRef<str>) {
    eprintln!(
        "\n{}\n",
        style(format!("WARNING: {}", msg.as_ref())).magenta()
    );
}

pub fn fatal(msg: impl AsRef<str>) {
    eprintln!("\n{}\n", style(format!("FATAL: {}", msg.as_ref())).red());
    eprintln!("{}", style("Aborting.").red());
}
