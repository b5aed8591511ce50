use std::ffi::{CString, OsString};
use std::path::PathBuf;

use structopt::clap::{App, AppSettings, Arg, Error as ClapError};

/// Parsed command-line configuration. Immutable once parsed; consumed
/// by `main` to drive passphrase acquisition, key derivation, and the
/// launcher.
pub struct Opt {
    pub keyfile: Option<PathBuf>,
    pub passphrase_repeat: u32,
    pub fake_pid: Option<i64>,
    pub verbose: u8,
    pub command: Vec<String>,
}

/// Used by `-p` when no attached value is given.
const DEFAULT_FAKE_PID: i64 = 2;

/// Parses argv per the keyed(1) option grammar: `-h`, `-k FILE`,
/// `-n N`, `-p[PID]`, `-v` (repeatable), then the child command and its
/// arguments. Built with the clap builder API (re-exported through
/// `structopt::clap`) rather than the `#[derive(StructOpt)]` form,
/// because `-p[PID]`'s optional attached value needs `min_values(0)`,
/// which the derive macro has no clean attribute for.
///
/// `AppSettings::TrailingVarArg` reproduces what `getopt`'s `+` prefix
/// gives: option parsing stops at the first positional, so a flag
/// inside the child's own argument list (e.g. the child being run with
/// its own `-v`) is never mistaken for ours.
pub fn parse<I, T>(args: I) -> Result<Opt, ClapError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = App::new("keyed")
        .about("Runs a command with its random-number requests replaced by deterministic output")
        .setting(AppSettings::TrailingVarArg)
        .setting(AppSettings::DontCollapseArgsInUsage)
        .arg(
            Arg::with_name("keyfile")
                .short("k")
                .value_name("FILE")
                .takes_value(true)
                .help("Read the passphrase from FILE (first line)"),
        )
        .arg(
            Arg::with_name("repeat")
                .short("n")
                .value_name("N")
                .takes_value(true)
                .default_value("1")
                .help("Number of times to repeat the passphrase prompt"),
        )
        .arg(
            Arg::with_name("fake_pid")
                .short("p")
                .value_name("PID")
                .takes_value(true)
                .min_values(0)
                .max_values(1)
                .help("Also intercept getpid() syscalls; PID defaults to 2 if omitted"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase verbosity"),
        )
        .arg(
            Arg::with_name("command")
                .required(true)
                .multiple(true)
                .help("Command to run, and its arguments"),
        )
        .get_matches_from_safe(args)?;

    let keyfile = matches.value_of_os("keyfile").map(PathBuf::from);

    let passphrase_repeat = matches
        .value_of("repeat")
        .unwrap()
        .parse()
        .unwrap_or(1);

    let fake_pid = if matches.is_present("fake_pid") {
        Some(
            matches
                .value_of("fake_pid")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_FAKE_PID),
        )
    } else {
        None
    };

    let verbose = matches.occurrences_of("verbose") as u8;

    let command = matches
        .values_of("command")
        .unwrap()
        .map(String::from)
        .collect();

    Ok(Opt {
        keyfile,
        passphrase_repeat,
        fake_pid,
        verbose,
        command,
    })
}

/// Converts the parsed command and its arguments into the `CString`
/// vector `execvp` needs.
pub fn command_as_cstrings(command: &[String]) -> Vec<CString> {
    command
        .iter()
        .map(|s| CString::new(s.as_str()).expect("command argument contains a NUL byte"))
        .collect()
}
