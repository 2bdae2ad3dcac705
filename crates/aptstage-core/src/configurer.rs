use crate::context::{DiagnosticSink, InstallContext};
use crate::lifecycle::{validate_transition, Phase};
use crate::sources::{
    media_source_line, render_intent, APT_CONFIG_DIR, APT_LIST_CACHE, INTENT_LOG_PATH,
    MEDIA_MOUNTPOINT, ORIGINAL_LIST, PROXY_FRAGMENT, SOURCES_LIST,
};
use crate::tooling::PackageTooling;
use crate::CoreError;
use aptstage_compose::{
    copy_tree, unique_dir, CommandRunner, LayerComposer, LowerSpec, MountJournal, ScratchPool,
};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Drives the package-source setup around one install.
///
/// `configure` builds two stacked views of the source tree: a "configured"
/// view holding the user's mirror selection, and a "for-install" view on top
/// of it that additionally prefers the pool on the installation media.
/// `deconfigure` undoes the media preference and brings the installed system
/// back to the configured state.
pub struct Configurer {
    source: PathBuf,
    configured: Option<PathBuf>,
    phase: Phase,
    composer: Box<dyn LayerComposer>,
    mounts: MountJournal,
    scratch: ScratchPool,
    tooling: Arc<dyn PackageTooling>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Configurer {
    pub fn new(
        source: impl Into<PathBuf>,
        composer: Box<dyn LayerComposer>,
        runner: Arc<dyn CommandRunner>,
        tooling: Arc<dyn PackageTooling>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            source: source.into(),
            configured: None,
            phase: Phase::Unconfigured,
            composer,
            mounts: MountJournal::new(runner),
            scratch: ScratchPool::new(),
            tooling,
            diagnostics,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The configured tree, once `configure` has built it.
    pub fn configured(&self) -> Option<&Path> {
        self.configured.as_deref()
    }

    pub fn tracked_mounts(&self) -> &[PathBuf] {
        self.mounts.tracked()
    }

    pub fn tracked_scratch(&self) -> &[PathBuf] {
        self.scratch.tracked()
    }

    /// Build both stages and return the for-install root, ready for package
    /// installs that prefer the installation media.
    pub fn configure(&mut self, ctx: &InstallContext) -> Result<PathBuf, CoreError> {
        validate_transition(self.phase, Phase::Configuring)?;
        self.phase = Phase::Configuring;
        info!(composer = self.composer.name(), "configuring package sources");

        let root = self.build_stages(ctx)?;

        self.phase = Phase::Configured;
        info!("for-install root ready at {}", root.display());
        Ok(root)
    }

    fn build_stages(&mut self, ctx: &InstallContext) -> Result<PathBuf, CoreError> {
        // Stage one: the source tree with the user's mirror selection
        // applied. Survives deconfigure as the restoration origin.
        let configured = self.scratch.new_dir()?;
        let upper = self.composer.compose(
            &mut self.mounts,
            &mut self.scratch,
            &LowerSpec::path(&self.source),
            &configured,
        )?;

        let intent = ctx.log_root.join(INTENT_LOG_PATH);
        if let Some(parent) = intent.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&intent, render_intent(&ctx.mirror, Utc::now())?)?;
        self.diagnostics.note("AptSourceIntent", &intent);
        self.tooling.apply_config(&configured, &intent)?;

        // Stage two: the configured view plus the media pool on top. The
        // root is caller-owned, not scratch, so it outlives the unwind.
        let for_install = unique_dir("aptstage-install-")?;
        self.composer.compose(
            &mut self.mounts,
            &mut self.scratch,
            &LowerSpec::stacked(upper, &self.source),
            &for_install,
        )?;

        let media_mount = for_install.join(MEDIA_MOUNTPOINT);
        fs::create_dir_all(&media_mount)?;
        if self.composer.performs_mounts() {
            self.mounts.bind(&ctx.media, &media_mount)?;
        }

        if ctx.has_network {
            // Keep the mirror sources active alongside the media source.
            fs::rename(
                for_install.join(SOURCES_LIST),
                for_install.join(ORIGINAL_LIST),
            )?;
        } else {
            let proxy = for_install.join(PROXY_FRAGMENT);
            if proxy.exists() {
                fs::remove_file(proxy)?;
            }
        }
        fs::write(
            for_install.join(SOURCES_LIST),
            media_source_line(&ctx.codename),
        )?;

        self.tooling.update_index(&for_install)?;

        self.configured = Some(configured);
        Ok(for_install)
    }

    /// Undo the media preference in `install_root` and leave it with the
    /// configured package sources.
    pub fn deconfigure(
        &mut self,
        ctx: &InstallContext,
        install_root: &Path,
    ) -> Result<(), CoreError> {
        validate_transition(self.phase, Phase::Deconfiguring)?;
        self.phase = Phase::Deconfiguring;

        if self.composer.performs_mounts() {
            self.teardown(ctx, install_root)?;
        } else {
            debug!(
                composer = self.composer.name(),
                "nothing mounted, skipping teardown"
            );
        }

        self.phase = Phase::Deconfigured;
        info!("package sources restored in {}", install_root.display());
        Ok(())
    }

    /// Best-effort cleanup for a session that failed mid-operation:
    /// releases every tracked mount in reverse order, then removes the
    /// pooled scratch directories. The first failed unmount aborts and
    /// leaves the remaining resources tracked for another attempt.
    pub fn abort(&mut self) -> Result<(), CoreError> {
        self.mounts.unwind()?;
        self.scratch.unwind()?;
        self.configured = None;
        self.phase = Phase::Deconfigured;
        Ok(())
    }

    fn teardown(&mut self, ctx: &InstallContext, install_root: &Path) -> Result<(), CoreError> {
        let configured = self.configured.clone().ok_or(CoreError::NotConfigured)?;

        // The for-install view comes down before anything is restored.
        // Writes through a still-mounted view land in its upper layer and
        // vanish with the unmount; the restored configuration has to be
        // real content in the root.
        let media_mount = install_root.join(MEDIA_MOUNTPOINT);
        self.composer.teardown(&mut self.mounts, &media_mount)?;
        self.composer.teardown(&mut self.mounts, install_root)?;
        if media_mount.exists() {
            fs::remove_dir(&media_mount)?;
        }

        let restore: &[&str] = if ctx.has_network {
            &[APT_CONFIG_DIR]
        } else {
            // Without network the media index stays authoritative, so the
            // cache snapshot comes along with the configuration.
            &[APT_CONFIG_DIR, APT_LIST_CACHE]
        };
        for dir in restore {
            let target = install_root.join(dir);
            if target.exists() {
                fs::remove_dir_all(&target)?;
            }
            copy_tree(&configured.join(dir), &target)?;
        }

        self.mounts.unwind()?;

        if ctx.has_network {
            // Refresh once the tracked mounts are gone, so the index
            // reflects the restored sources.
            self.tooling.update_index(install_root)?;
        }

        self.scratch.unwind()?;
        Ok(())
    }
}
