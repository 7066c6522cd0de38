//! Shared plumbing for the `get-cpython` and `run-cpython-tests` binaries.

pub mod telemetry;

pub use telemetry::init_tracing;

/// Exit status for any failure reported by [`exit_with_error`].
pub const FAILURE_EXIT: i32 = 1;

/// Render an error chain as a single line.
///
/// Causes are joined with `": "` and embedded newlines (git diagnostics are
/// often multi-line) are folded into `" | "`.
pub fn one_line(err: &anyhow::Error) -> String {
    format!("{err:#}")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Print `error: <message>` on stderr and exit with [`FAILURE_EXIT`].
pub fn exit_with_error(err: anyhow::Error) -> ! {
    eprintln!("error: {}", one_line(&err));
    std::process::exit(FAILURE_EXIT)
}
