use std::ffi::CString;

use nix::sys::ptrace::{self, Options};
use nix::sys::wait::waitpid;
use nix::unistd::{execvp, fork, ForkResult, Pid};

use crate::error::{EngineError, Result};

/// Forks, marks the child traceable, execs `argv[0]` with the rest of
/// `argv`, and returns the paused child's pid once the exec-generated
/// initial stop has been consumed.
///
/// The child requests tracing before exec, so the exec itself is what
/// raises the first stop — there's no window where the child runs
/// untraced code that the tracer could miss.
pub fn launch(argv: &[CString]) -> Result<Pid> {
    match unsafe { fork() }.map_err(EngineError::Fork)? {
        ForkResult::Child => {
            ptrace::traceme().expect("PTRACE_TRACEME");
            let err = execvp(&argv[0], argv).unwrap_err();
            eprintln!("keyed: {}: {}", argv[0].to_string_lossy(), err);
            std::process::exit(1);
        }
        ForkResult::Parent { child } => {
            waitpid(child, None).map_err(|e| EngineError::TraceProtocol("waitpid", e))?;
            ptrace::setoptions(child, Options::PTRACE_O_EXITKILL)
                .map_err(|e| EngineError::TraceProtocol("setoptions", e))?;
            Ok(child)
        }
    }
}
