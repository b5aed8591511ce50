use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;

use nix::sys::termios::{self, LocalFlags, SetArg};

use crate::error::{EngineError, Result};

/// Including the would-be line terminator, matching the reference
/// tool's `PASSPHRASE_MAX`.
pub const MAX_PASSPHRASE_LEN: usize = 1024;

/// A passphrase in memory, between acquisition and key derivation.
/// Zeroized on drop so it doesn't linger in a freed allocation.
pub struct Passphrase(Vec<u8>);

impl Passphrase {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for Passphrase {
    fn drop(&mut self) {
        for b in self.0.iter_mut() {
            unsafe { std::ptr::write_volatile(b, 0) };
        }
    }
}

/// Reads the passphrase from the first line of `path`. A missing
/// trailing newline is not an error; EOF simply ends the line.
pub fn from_keyfile(path: &Path) -> Result<Passphrase> {
    let mut file = File::open(path).map_err(|e| EngineError::Io("keyfile", e))?;
    let mut buf = vec![0u8; MAX_PASSPHRASE_LEN];
    let n = file
        .read(&mut buf)
        .map_err(|e| EngineError::Io("keyfile", e))?;
    if n == MAX_PASSPHRASE_LEN {
        return Err(EngineError::PassphraseTooLong);
    }
    let line_end = buf[..n].iter().position(|&b| b == b'\n').unwrap_or(n);
    buf.truncate(line_end);
    Ok(Passphrase(buf))
}

/// Prompts on the controlling terminal with echo disabled, then
/// re-prompts `confirmations` more times; any mismatch is fatal.
pub fn from_terminal(confirmations: u32) -> Result<Passphrase> {
    let first = read_line_no_echo("passphrase: ")?;
    for _ in 0..confirmations {
        let again = read_line_no_echo("passphrase (again): ")?;
        if again.as_bytes() != first.as_bytes() {
            return Err(EngineError::PassphraseMismatch);
        }
    }
    Ok(first)
}

fn read_line_no_echo(prompt: &str) -> Result<Passphrase> {
    let mut tty = OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")
        .map_err(|e| EngineError::Io("/dev/tty", e))?;
    let fd = tty.as_raw_fd();

    let original = termios::tcgetattr(fd).map_err(|e| EngineError::Termios("tcgetattr", e))?;
    let mut silent = original.clone();
    silent.local_flags.remove(LocalFlags::ECHO);
    termios::tcsetattr(fd, SetArg::TCSANOW, &silent)
        .map_err(|e| EngineError::Termios("tcsetattr", e))?;

    tty.write_all(prompt.as_bytes())
        .map_err(|e| EngineError::Io("/dev/tty", e))?;
    let mut buf = vec![0u8; MAX_PASSPHRASE_LEN];
    let read_result = tty.read(&mut buf);

    // Always restore the terminal, even if the read failed.
    let restore_result = termios::tcsetattr(fd, SetArg::TCSANOW, &original);
    let _ = tty.write_all(b"\n");

    let n = read_result.map_err(|e| EngineError::Io("/dev/tty", e))?;
    restore_result.map_err(|e| EngineError::Termios("tcsetattr", e))?;

    if n == MAX_PASSPHRASE_LEN {
        return Err(EngineError::PassphraseTooLong);
    }
    let line_end = buf[..n].iter().position(|&b| b == b'\n').unwrap_or(n);
    buf.truncate(line_end);
    Ok(Passphrase(buf))
}
