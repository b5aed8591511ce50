use std::io;

use thiserror::Error;

/// Everything that can go fatally wrong while setting up or driving the
/// trace loop. Every variant here is, per the error handling design,
/// unconditionally fatal: nothing in this crate recovers from one of
/// these and keeps going. `main` is the only place that matches on this
/// type to print a diagnostic and choose a process exit code.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Setup error: opening the terminal or a keyfile.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] io::Error),

    /// Setup error: adjusting terminal echo for passphrase entry.
    #[error("{0}: {1}")]
    Termios(&'static str, #[source] nix::Error),

    /// Setup error: forking the child.
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),

    /// Trace-protocol error: resuming, waiting on, or inspecting the
    /// tracee left it in an indeterminate state. Always fatal.
    #[error("ptrace {0} failed: {1}")]
    TraceProtocol(&'static str, #[source] nix::Error),

    /// Setup error: the KDF could not allocate its working memory.
    #[error("not enough memory to derive key")]
    Kdf,

    #[error("passphrase too long")]
    PassphraseTooLong,

    #[error("passphrases don't match")]
    PassphraseMismatch,

    /// Capacity error: more concurrently-open entropy descriptors than
    /// the bounded tracker can hold.
    #[error("too many open entropy file descriptors")]
    DescriptorCapacity,
}

pub type Result<T> = std::result::Result<T, EngineError>;
