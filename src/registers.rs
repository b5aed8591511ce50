use libc::user_regs_struct;
use nix::sys::ptrace;
use nix::unistd::Pid;

use crate::error::{EngineError, Result};

/// The tracee's user-visible register file at a syscall stop. A plain
/// alias rather than a newtype: every field we need (orig_rax, rax,
/// rdi, rsi, rdx, r10) is already named sensibly by `libc`, and wrapping
/// it would just be indirection.
pub type Registers = user_regs_struct;

/// Syscall number the kernel will not execute. Poking this into the
/// syscall-number slot at entry makes the kernel return `-ENOSYS`
/// without doing any I/O — see [`disarm`].
pub const DISARM_SYSCALL: i64 = -1;

/// The two register slots this crate ever pokes individually, named to
/// match the platform's entry/exit convention rather than the raw
/// register name (`orig_rax` / `rax` on x86_64).
#[derive(Copy, Clone)]
pub enum RegisterSlot {
    SyscallNumber,
    ReturnValue,
}

pub fn get_regs(pid: Pid) -> Result<Registers> {
    ptrace::getregs(pid).map_err(|e| EngineError::TraceProtocol("getregs", e))
}

pub fn set_regs(pid: Pid, regs: &Registers) -> Result<()> {
    ptrace::setregs(pid, *regs).map_err(|e| EngineError::TraceProtocol("setregs", e))
}

/// Reads the current value of `which`, via a fresh [`get_regs`], then
/// writes `value` back via [`set_regs`]. Callers that already hold a
/// snapshot from this stop should mutate it directly and call
/// `set_regs` once instead of paying for an extra round trip.
pub fn poke_reg(pid: Pid, which: RegisterSlot, value: i64) -> Result<()> {
    let mut regs = get_regs(pid)?;
    match which {
        RegisterSlot::SyscallNumber => regs.orig_rax = value as u64,
        RegisterSlot::ReturnValue => regs.rax = value as u64,
    }
    set_regs(pid, &regs)
}

pub fn syscall_number(regs: &Registers) -> i64 {
    regs.orig_rax as i64
}

/// Overwrites the syscall-number slot with [`DISARM_SYSCALL`] in an
/// already-fetched snapshot; caller still has to `set_regs` it back.
pub fn disarm(regs: &mut Registers) {
    regs.orig_rax = DISARM_SYSCALL as u64;
}

pub fn return_value(regs: &Registers) -> i64 {
    regs.rax as i64
}

pub fn set_return_value(regs: &mut Registers, value: i64) {
    regs.rax = value as u64;
}

/// The first four syscall arguments, in calling-convention order.
pub fn arg(regs: &Registers, index: usize) -> u64 {
    match index {
        0 => regs.rdi,
        1 => regs.rsi,
        2 => regs.rdx,
        3 => regs.r10,
        _ => unreachable!("syscall argument index out of range: {}", index),
    }
}
