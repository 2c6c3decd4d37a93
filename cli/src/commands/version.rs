//! Command: print version information.

/// Version string, preferring the one stamped in by the build script.
#[must_use]
pub fn version() -> &'static str {
    option_env!("MOAR_DOTS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the moar-dots version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("moar-dots {}", version());
}
