//! Test fixture (S6): exits immediately with the status given as
//! argv[1] (defaults to 7).
use std::process::ExitCode;

fn main() -> ExitCode {
    let code: u8 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    ExitCode::from(code)
}
