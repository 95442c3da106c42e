//! `ren` entrypoint: a minimal host around the `ren` library — run a
//! script file, evaluate one expression, or drop into a line-at-a-time
//! REPL.
//!
//! Logging and panic-hook setup are grounded on `ox-bin::main`'s
//! `AppStartup::configure_logging`/`install_panic_hook` pattern, adapted
//! from an async TUI startup to a synchronous CLI one.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use ren::config;
use ren::host::{self, HostError};

fn mold(engine: &core_action::Engine, ctx: &core_trampoline::RuntimeContext, value: &core_value::Cell) -> String {
    core_action::mold(engine, &ctx.symbols, value)
}

#[derive(Parser, Debug)]
#[command(name = "ren", version, about = "A minimal homoiconic-interpreter host")]
struct Args {
    /// Script file to run. If omitted (and `--eval` is also omitted), starts a REPL.
    pub script: Option<PathBuf>,
    /// Evaluate a single expression given on the command line instead of a script file.
    #[arg(long = "eval")]
    pub eval: Option<String>,
    /// Configuration file path (overrides discovery of `ren.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn configure_logging() -> Result<Option<WorkerGuard>> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("ren.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "ren.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn run_and_report(source: &str, what: &str, config: &config::Config) -> Result<()> {
    let (mut engine, mut ctx, coupling) = host::new_session_with_config(config);
    match host::reb_value(&mut engine, &mut ctx, coupling, source) {
        Ok(value) => {
            let rendered = mold(&engine, &ctx, &value);
            println!("{rendered}");
            Ok(())
        }
        Err(HostError::Scan(e)) => {
            error!(target: "ren.scan", %what, error = %e, "scan failed");
            anyhow::bail!("scan error in {what}: {e}");
        }
        Err(HostError::Thrown(label)) => {
            error!(target: "ren.eval", %what, %label, "uncaught throw");
            anyhow::bail!("{what}: uncaught throw: {label}");
        }
    }
}

fn repl(config: &config::Config) -> Result<()> {
    let (mut engine, mut ctx, coupling) = host::new_session_with_config(config);
    let stdin = io::stdin();
    loop {
        print!(">> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match host::reb_value(&mut engine, &mut ctx, coupling, line) {
            Ok(value) => println!("== {}", mold(&engine, &ctx, &value)),
            Err(HostError::Scan(e)) => println!("** scan error: {e}"),
            Err(HostError::Thrown(label)) => println!("** uncaught throw: {label}"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging()?;
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;

    if let Some(expr) = args.eval.as_deref() {
        return run_and_report(expr, "--eval", &config);
    }

    if let Some(path) = args.script.as_ref() {
        let source = std::fs::read_to_string(path)?;
        return run_and_report(&source, &path.display().to_string(), &config);
    }

    repl(&config)
}
