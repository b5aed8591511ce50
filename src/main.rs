use keyed::cli::{self, Opt};
use keyed::error::Result;
use keyed::{engine::Engine, kdf, launcher, passphrase};

fn main() {
    let opt = match cli::parse(std::env::args_os()) {
        Ok(opt) => opt,
        Err(e) => {
            if e.use_stderr() {
                eprintln!("{}", e.message);
                std::process::exit(1);
            } else {
                println!("{}", e.message);
                std::process::exit(0);
            }
        }
    };

    init_logging(opt.verbose);

    match run(opt) {
        Ok(status) => std::process::exit(status),
        Err(e) => {
            eprintln!("keyed: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .init();
}

fn run(opt: Opt) -> Result<i32> {
    let pass = match &opt.keyfile {
        Some(path) => passphrase::from_keyfile(path)?,
        None => passphrase::from_terminal(opt.passphrase_repeat)?,
    };
    let key = kdf::derive_key(pass.as_bytes())?;
    drop(pass);

    let argv = cli::command_as_cstrings(&opt.command);
    let pid = launcher::launch(&argv)?;

    let mut engine = Engine::new(key, opt.fake_pid);
    engine.run(pid)
}
