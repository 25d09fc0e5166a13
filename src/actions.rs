//! Workflow commands understood by the GitHub Actions runner.

use std::fmt::Display;

/// Makes the runner redact `secret` from all subsequent log output.
pub fn add_mask(secret: &str) {
    if !secret.is_empty() {
        println!("{}", command("add-mask", secret));
    }
}

/// Marks the current step as failed with `message`.
pub fn error(message: impl Display) {
    println!("{}", command("error", message));
}

fn command(name: &str, value: impl Display) -> String {
    let value = value
        .to_string()
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::{}::{}", name, value)
}
