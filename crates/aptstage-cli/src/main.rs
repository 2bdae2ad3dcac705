mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{SessionOpts, EXIT_CONFIG_ERROR, EXIT_FAILURE};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "aptstage",
    version,
    about = "Stage installation-time package sources over a target tree"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Configure, run a command against the staged root, then deconfigure.
    Run {
        #[command(flatten)]
        session: SessionOpts,
        /// Command and arguments to run (after --); sees the staged root in
        /// $APTSTAGE_ROOT.
        #[arg(required = true, last = true)]
        command: Vec<String>,
    },
    /// Configure only and print the staged root; teardown is left to the
    /// operator.
    Stage {
        #[command(flatten)]
        session: SessionOpts,
    },
    /// Render the mirror intent document without touching anything.
    Intent {
        /// TOML file with the mirror selection.
        #[arg(long)]
        mirror_config: Option<PathBuf>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("APTSTAGE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Run { session, command } => commands::run::run(&session, &command, json_output),
        Commands::Stage { session } => commands::stage::run(&session, json_output),
        Commands::Intent { mirror_config } => {
            commands::intent::run(mirror_config.as_deref(), json_output)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("mirror config error:")
                || msg.starts_with("cannot detect codename")
            {
                EXIT_CONFIG_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
