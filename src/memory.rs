use std::io::{IoSlice, IoSliceMut};

use nix::sys::uio::{process_vm_readv, process_vm_writev, RemoteIoVec};
use nix::unistd::Pid;

use crate::error::{EngineError, Result};

/// Copies `len` bytes from the tracee's virtual address `addr` into a
/// freshly allocated tracer-side buffer. Single-shot: does not
/// interrupt the tracee and never touches its registers. A short
/// transfer is treated as fatal, matching the rest of this crate's
/// policy that anything leaving the substitution invariant in doubt
/// aborts the run.
pub fn read_child(pid: Pid, addr: usize, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let remote = [RemoteIoVec { base: addr, len }];
    let mut local = [IoSliceMut::new(&mut buf)];
    let n = process_vm_readv(pid, &mut local, &remote)
        .map_err(|e| EngineError::TraceProtocol("process_vm_readv", e))?;
    if n != len {
        return Err(EngineError::TraceProtocol(
            "process_vm_readv",
            nix::Error::EIO,
        ));
    }
    Ok(buf)
}

/// Copies up to `len` bytes from the tracee's virtual address `addr`,
/// returning whatever was actually transferred instead of treating a
/// short count as fatal. Meant for probes like the open-path check,
/// where the requested length is a ceiling (e.g. the longer of the two
/// canonical device names plus its NUL) rather than a size the caller
/// knows is mapped: a probe landing right at the end of a mapped page
/// can legitimately come back short on a valid path.
pub fn read_child_lossy(pid: Pid, addr: usize, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let remote = [RemoteIoVec { base: addr, len }];
    let mut local = [IoSliceMut::new(&mut buf)];
    let n = process_vm_readv(pid, &mut local, &remote)
        .map_err(|e| EngineError::TraceProtocol("process_vm_readv", e))?;
    buf.truncate(n);
    Ok(buf)
}

/// Copies `bytes` from tracer memory into the tracee's virtual address
/// `addr`. Same single-shot, register-preserving, fatal-on-partial-
/// transfer contract as [`read_child`].
pub fn write_child(pid: Pid, addr: usize, bytes: &[u8]) -> Result<()> {
    let remote = [RemoteIoVec {
        base: addr,
        len: bytes.len(),
    }];
    let local = [IoSlice::new(bytes)];
    let n = process_vm_writev(pid, &local, &remote)
        .map_err(|e| EngineError::TraceProtocol("process_vm_writev", e))?;
    if n != bytes.len() {
        return Err(EngineError::TraceProtocol(
            "process_vm_writev",
            nix::Error::EIO,
        ));
    }
    Ok(())
}
