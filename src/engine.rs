use log::debug;
use nix::sys::ptrace;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use crate::descriptors::DescriptorTracker;
use crate::error::{EngineError, Result};
use crate::keystream::{Key, Keystream};
use crate::memory::{read_child_lossy, write_child};
use crate::registers::{self, RegisterSlot};
use crate::syscall::{self, SyscallKind};

/// Owns everything the trace loop needs across the life of one child
/// run: the derived key (via its keystream), the monitored-descriptor
/// set, the substitution buffer, and the optional forged PID. Built
/// once key derivation has produced a key, dropped at process exit —
/// this is deliberately a value rather than ambient globals, so KS and
/// the rest of the substitution logic stay unit-testable on their own.
pub struct Engine {
    keystream: Keystream,
    monitored: DescriptorTracker,
    buffer: Vec<u8>,
    fake_pid: Option<i64>,
}

impl Engine {
    pub fn new(key: Key, fake_pid: Option<i64>) -> Engine {
        Engine {
            keystream: Keystream::new(&key),
            monitored: DescriptorTracker::new(),
            buffer: Vec::new(),
            fake_pid,
        }
    }

    /// Drives `pid` to completion, alternating syscall-entry and
    /// syscall-exit stops, substituting entropy reads with keystream
    /// bytes and optionally forging `getpid`. Returns the status code
    /// the child itself requested on exit.
    pub fn run(&mut self, pid: Pid) -> Result<i32> {
        loop {
            resume_to_next_stop(pid)?;
            if let Some(status) = wait_for(pid)? {
                return Ok(status);
            }

            let mut regs = registers::get_regs(pid)?;
            let nr = registers::syscall_number(&regs);
            let kind = syscall::classify(nr);

            if kind == SyscallKind::Exit {
                // The child's requested status is sitting in arg0 of the
                // exit/exit_group call itself; no exit-stop to await.
                return Ok(registers::arg(&regs, 0) as i32);
            }

            let mut capture_fd = false;
            let mut size: usize = 0;
            let mut dest: u64 = 0;

            match kind {
                SyscallKind::OpenPath => {
                    // `open`'s pathname is arg0; `openat`'s is arg1 (arg0
                    // is the dirfd, e.g. AT_FDCWD for the common case).
                    // glibc/Rust's File::open routes through openat, so
                    // picking the wrong slot here would probe the dirfd
                    // value itself as an address.
                    let path_arg = if nr == syscall::SYS_OPENAT { 1 } else { 0 };
                    let path_addr = registers::arg(&regs, path_arg) as usize;
                    let path = read_child_lossy(pid, path_addr, syscall::ENTROPY_PATH_PROBE_LEN)?;
                    if syscall::is_entropy_device_path(&path) {
                        capture_fd = true;
                    }
                }
                SyscallKind::Close => {
                    let fd = registers::arg(&regs, 0) as i32;
                    if self.monitored.contains(fd) {
                        debug!("keyed: close({})", fd);
                        self.monitored.remove(fd);
                    }
                }
                SyscallKind::Read => {
                    let fd = registers::arg(&regs, 0) as i32;
                    if self.monitored.contains(fd) {
                        dest = registers::arg(&regs, 1);
                        size = registers::arg(&regs, 2) as usize;
                        debug!("keyed: read({}, {:#x}, {})", fd, dest, size);
                    }
                }
                SyscallKind::GetRandom => {
                    dest = registers::arg(&regs, 0);
                    size = registers::arg(&regs, 1) as usize;
                    debug!("keyed: getrandom({:#x}, {})", dest, size);
                }
                _ => {}
            }

            // Classified -> Disarmed. The real syscall must never run: it
            // would consume real kernel entropy, could let the child
            // observe intermediate bytes via a split read, and a blocking
            // read from /dev/random could deadlock this loop entirely.
            if size > 0 {
                registers::disarm(&mut regs);
                registers::set_regs(pid, &regs)?;
                if self.buffer.len() < size {
                    self.buffer.resize(size, 0);
                }
            }

            // Disarmed -> ExitStopped, unconditionally: PTRACE_SYSCALL
            // always stops at the *next* syscall boundary, so we must
            // consume this syscall's exit stop before the next entry
            // stop can be this syscall's successor rather than its own.
            resume_to_next_stop(pid)?;
            if let Some(status) = wait_for(pid)? {
                return Ok(status);
            }

            // ExitStopped -> Substituted
            if size > 0 {
                self.keystream.fill(&mut self.buffer, size);
                write_child(pid, dest as usize, &self.buffer[..size])?;
                let mut exit_regs = registers::get_regs(pid)?;
                registers::set_return_value(&mut exit_regs, size as i64);
                registers::set_regs(pid, &exit_regs)?;
            }

            // Substituted -> TrackerUpdated
            if capture_fd {
                let exit_regs = registers::get_regs(pid)?;
                let fd = registers::return_value(&exit_regs);
                if fd >= 0 {
                    self.monitored.add(fd as i32)?;
                    debug!("keyed: monitoring fd {}", fd);
                }
            }

            // TrackerUpdated -> PidForged
            if kind == SyscallKind::GetPid {
                if let Some(fake) = self.fake_pid {
                    registers::poke_reg(pid, RegisterSlot::ReturnValue, fake)?;
                    debug!("keyed: getpid() = {}", fake);
                }
            }
        }
    }
}

fn resume_to_next_stop(pid: Pid) -> Result<()> {
    ptrace::syscall(pid, None).map_err(|e| EngineError::TraceProtocol("PTRACE_SYSCALL", e))
}

/// Waits for the next stop of `pid`. `Some(status)` means the child has
/// terminated and the tracer should mirror that status; `None` means it
/// merely stopped at a syscall boundary and the loop should continue.
fn wait_for(pid: Pid) -> Result<Option<i32>> {
    match waitpid(pid, None).map_err(|e| EngineError::TraceProtocol("waitpid", e))? {
        WaitStatus::Exited(_, status) => Ok(Some(status)),
        WaitStatus::Signaled(_, signal, _) => Ok(Some(128 + signal as i32)),
        _ => Ok(None),
    }
}
