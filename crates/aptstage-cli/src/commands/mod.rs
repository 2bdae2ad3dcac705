pub mod completions;
pub mod intent;
pub mod run;
pub mod stage;

use aptstage_compose::{select_composer, CommandRunner, HostRunner, NullRunner};
use aptstage_core::{detect_codename, Configurer, HostTooling, InstallContext, LogSink};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Session flags shared by the subcommands that configure a root.
#[derive(Debug, Args)]
pub struct SessionOpts {
    /// Source tree to stage package sources over.
    #[arg(long)]
    pub source: PathBuf,

    /// Mounted installation media carrying the package pool.
    #[arg(long, default_value = "/cdrom")]
    pub media: PathBuf,

    /// Root under which installer logs are written.
    #[arg(long, default_value = "/")]
    pub log_root: PathBuf,

    /// Assume no network: media sources only, no proxy, no index refresh on
    /// deconfigure.
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Copy instead of mount; log external commands instead of running them.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Release codename for the media source line (default: detected from
    /// the source tree's lsb-release).
    #[arg(long)]
    pub codename: Option<String>,

    /// TOML file with the mirror selection.
    #[arg(long)]
    pub mirror_config: Option<PathBuf>,
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn load_mirror(path: Option<&Path>) -> Result<toml::Value, String> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("mirror config error: cannot read {}: {e}", path.display()))?;
            text.parse::<toml::Value>()
                .map_err(|e| format!("mirror config error: {e}"))
        }
        None => Ok(toml::Value::Table(toml::value::Table::new())),
    }
}

/// Assemble a configurer and its context from the command-line flags.
pub fn build_session(opts: &SessionOpts) -> Result<(Configurer, InstallContext), String> {
    let runner: Arc<dyn CommandRunner> = if opts.dry_run {
        Arc::new(NullRunner)
    } else {
        Arc::new(HostRunner)
    };
    let composer = select_composer(if opts.dry_run { "copy" } else { "overlay" })
        .map_err(|e| e.to_string())?;

    let codename = match &opts.codename {
        Some(codename) => codename.clone(),
        None => detect_codename(&opts.source)
            .map_err(|e| format!("cannot detect codename in {}: {e}", opts.source.display()))?,
    };

    let ctx = InstallContext {
        log_root: opts.log_root.clone(),
        media: opts.media.clone(),
        has_network: !opts.offline,
        codename,
        mirror: load_mirror(opts.mirror_config.as_deref())?,
    };
    let session = Configurer::new(
        &opts.source,
        composer,
        Arc::clone(&runner),
        Arc::new(HostTooling::new(runner)),
        Arc::new(LogSink::new()),
    );
    Ok((session, ctx))
}
