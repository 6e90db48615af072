//! Viewer sessions
//!
//! A [`ViewerSession`] owns one mount and, once rendered, one engine
//! viewer. Initialization walks a fixed state machine:
//!
//! ```text
//! Idle -> WaitingVisible -> EngineLoading -> Fetching -> ParsingLocal -> RenderedOk
//!                                                         |
//!                                                         +-> FallbackDownloading -> RenderedOk
//! ```
//!
//! Any stage may end in `Failed`, which replaces the viewer area with one
//! short [`InlineMessage`](crate::InlineMessage). Only a parse failure is
//! recovered, by escalating to the engine's own download.

use std::error::Error as _;
use std::rc::Rc;
use std::time::Duration;

use molview_io::{cache_busted, now_stamp, prepare, sniff, Format, TextFetcher};
use molview_settings::{Style, ViewerRequest};

use crate::engine::{DownloadCall, Engine, MolViewer, MountSurface, Provisioner, ViewerOptions};
use crate::error::{SessionError, SessionResult};
use crate::loader::{has_atoms, try_load, LoadAttempt};

/// Delay before the layout-settle render pass
pub const SECOND_PASS_DELAY: Duration = Duration::from_millis(60);

/// Viewer background, white
pub const BACKGROUND_COLOR: u32 = 0xffffff;

/// Lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    WaitingVisible,
    EngineLoading,
    Fetching,
    ParsingLocal,
    FallbackDownloading,
    RenderedOk,
    Failed,
}

/// How the displayed model got into the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPath {
    /// Fetched text parsed by a candidate format
    Text,
    /// Engine-native download of the cache-busted URL
    EngineDownload,
}

/// Summary of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub format: Format,
    pub path: LoadPath,
    pub atom_count: usize,
}

/// Result of [`ViewerSession::initialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Rendered(LoadReport),
    /// The session had already been initialized; nothing was done
    AlreadyInitialized,
}

/// Collaborators shared by every session on a page
#[derive(Clone)]
pub struct SessionContext {
    pub engine: Rc<dyn Engine>,
    pub provisioner: Rc<dyn Provisioner>,
    pub fetcher: Rc<dyn TextFetcher>,
}

impl SessionContext {
    pub fn new(
        engine: Rc<dyn Engine>,
        provisioner: Rc<dyn Provisioner>,
        fetcher: Rc<dyn TextFetcher>,
    ) -> Self {
        SessionContext {
            engine,
            provisioner,
            fetcher,
        }
    }
}

/// One mount and its viewer
pub struct ViewerSession {
    request: ViewerRequest,
    mount: Rc<dyn MountSurface>,
    context: SessionContext,
    viewer: Option<Box<dyn MolViewer>>,
    state: SessionState,
    history: Vec<SessionState>,
    initialized: bool,
    report: Option<LoadReport>,
    applied_style: Option<Style>,
}

impl ViewerSession {
    /// Create an idle session for a discovered mount
    pub fn new(request: ViewerRequest, mount: Rc<dyn MountSurface>, context: SessionContext) -> Self {
        ViewerSession {
            request,
            mount,
            context,
            viewer: None,
            state: SessionState::Idle,
            history: vec![SessionState::Idle],
            initialized: false,
            report: None,
            applied_style: None,
        }
    }

    /// Mount identifier
    pub fn id(&self) -> &str {
        self.mount.id()
    }

    pub fn request(&self) -> &ViewerRequest {
        &self.request
    }

    pub fn mount(&self) -> &Rc<dyn MountSurface> {
        &self.mount
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a rendered viewer exists that can be refreshed or reloaded
    pub fn is_live(&self) -> bool {
        self.viewer.is_some()
    }

    /// Outcome of the last successful load
    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }

    /// Style handed to the engine by the last render
    pub fn applied_style(&self) -> Option<&Style> {
        self.applied_style.as_ref()
    }

    /// Start waiting for the mount to become visible
    pub fn await_visibility(&mut self) {
        if self.state == SessionState::Idle {
            self.transition(SessionState::WaitingVisible);
        }
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("[{}] {:?} -> {:?}", self.mount.id(), self.state, next);
        self.state = next;
        self.history.push(next);
    }

    /// Run the full pipeline once
    ///
    /// Later calls return [`InitOutcome::AlreadyInitialized`] without doing
    /// anything, whatever the first call's outcome was.
    pub async fn initialize(&mut self) -> SessionResult<InitOutcome> {
        if self.initialized {
            log::debug!("[{}] already initialized", self.id());
            return Ok(InitOutcome::AlreadyInitialized);
        }
        self.initialized = true;
        self.await_visibility();

        match self.run_pipeline().await {
            Ok(report) => Ok(InitOutcome::Rendered(report)),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn run_pipeline(&mut self) -> SessionResult<LoadReport> {
        let url = self.request.source_url.clone().ok_or(SessionError::NoSource)?;

        self.transition(SessionState::EngineLoading);
        self.context
            .provisioner
            .ensure_engine()
            .await
            .map_err(SessionError::Engine)?;

        let options = ViewerOptions {
            background_alpha: self.request.background_alpha,
            disable_mouse: self.request.mouse_disabled,
        };
        let mut viewer = self
            .context
            .engine
            .create_viewer(self.mount.as_ref(), &options)
            .map_err(SessionError::ViewerInit)?;
        if self.request.mouse_disabled {
            self.mount.disable_pointer_events();
        }

        self.transition(SessionState::Fetching);
        let text = self.fetch(&url).await?;

        self.transition(SessionState::ParsingLocal);
        let clean = prepare(&text);
        let guess = self
            .request
            .declared_type
            .explicit()
            .unwrap_or_else(|| sniff(&clean));
        let attempt = LoadAttempt::new(self.request.declared_type, guess);

        let (format, path) = match try_load(viewer.as_mut(), &clean, &attempt) {
            Some(format) => (format, LoadPath::Text),
            None => {
                self.transition(SessionState::FallbackDownloading);
                self.download_fallback(&url, guess, viewer.as_mut()).await?;
                (guess, LoadPath::EngineDownload)
            }
        };

        self.present(viewer.as_mut()).await;
        let report = LoadReport {
            format,
            path,
            atom_count: atom_count(viewer.as_ref()),
        };
        log::info!(
            "[{}] rendered {} as {} ({} atoms, {:?})",
            self.id(),
            url,
            report.format,
            report.atom_count,
            report.path
        );

        self.viewer = Some(viewer);
        self.report = Some(report.clone());
        self.transition(SessionState::RenderedOk);
        Ok(report)
    }

    async fn fetch(&self, url: &str) -> SessionResult<String> {
        log::debug!("[{}] fetching {}", self.id(), url);
        self.context
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|source| SessionError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// Let the engine fetch and parse a cache-busted copy itself
    async fn download_fallback(
        &self,
        url: &str,
        hint: Format,
        viewer: &mut dyn MolViewer,
    ) -> SessionResult<()> {
        log::warn!(
            "[{}] no atoms after text parse of {}; trying engine download as {}",
            self.id(),
            url,
            hint
        );
        let nocache = cache_busted(url, now_stamp());
        let engine = &self.context.engine;

        let mut result = engine
            .download(&nocache, viewer, DownloadCall::TypeOption(hint))
            .await;
        if let Err(e) = &result {
            log::debug!("[{}] download with type option failed: {}", self.id(), e);
            result = engine
                .download(&nocache, viewer, DownloadCall::TrailingFormat(hint))
                .await;
        }

        let no_atoms = || SessionError::NoAtoms {
            url: url.to_string(),
            hint,
        };
        if let Err(e) = result {
            log::error!("[{}] download failed: {}", self.id(), e);
            return Err(no_atoms());
        }
        if !has_atoms(viewer) {
            return Err(no_atoms());
        }
        Ok(())
    }

    /// Style, render and spin, then a second pass once layout has settled
    async fn present(&mut self, viewer: &mut dyn MolViewer) {
        if self.mount.is_attached() {
            self.mount.clear_messages();
            self.mount.ensure_positioned();
        }

        viewer.set_background_color(BACKGROUND_COLOR);
        viewer.remove_all_surfaces();
        viewer.reset_style();
        // ViewerRequest styles are never empty
        let style = self.request.style.clone();
        viewer.set_style(&style);
        viewer.resize();
        viewer.zoom_to();
        viewer.render();
        self.applied_style = Some(style);

        if let Some(spin) = &self.request.spin {
            if let Err(e) = viewer.spin(&spin.axis, spin.speed) {
                log::warn!("[{}] spin failed: {}", self.id(), e);
            }
        }

        tokio::time::sleep(SECOND_PASS_DELAY).await;
        if self.mount.is_attached() {
            viewer.resize();
            viewer.zoom_to();
            viewer.render();
        } else {
            log::debug!("[{}] mount detached, skipping second pass", self.id());
        }
    }

    /// Resize and redraw a live viewer, e.g. after its tab panel opened
    pub fn refresh(&mut self) -> bool {
        match self.viewer.as_mut() {
            Some(viewer) => {
                viewer.resize();
                viewer.render();
                true
            }
            None => false,
        }
    }

    /// Replace the source of a live viewer and load it directly
    ///
    /// Bypasses the initialization gate and the fallback download. Returns
    /// `Ok(None)` when the session has no live viewer yet.
    pub async fn reload(&mut self, url: &str) -> SessionResult<Option<LoadReport>> {
        let Some(mut viewer) = self.viewer.take() else {
            log::debug!("[{}] reload of {} ignored, no live viewer", self.id(), url);
            return Ok(None);
        };

        self.request = self.request.with_source(url);
        let result = self.reload_into(viewer.as_mut()).await;
        self.viewer = Some(viewer);

        match result {
            Ok(report) => {
                self.report = Some(report.clone());
                self.transition(SessionState::RenderedOk);
                Ok(Some(report))
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn reload_into(&mut self, viewer: &mut dyn MolViewer) -> SessionResult<LoadReport> {
        let url = self.request.source_url.clone().ok_or(SessionError::NoSource)?;
        let text = self.fetch(&url).await?;

        let clean = prepare(&text);
        let guess = self
            .request
            .declared_type
            .explicit()
            .unwrap_or_else(|| sniff(&clean));
        let attempt = LoadAttempt::new(self.request.declared_type, guess);
        let format = try_load(viewer, &clean, &attempt).ok_or_else(|| SessionError::NoAtoms {
            url: url.clone(),
            hint: guess,
        })?;

        self.present(viewer).await;
        log::info!("[{}] reloaded {} as {}", self.id(), url, format);
        Ok(LoadReport {
            format,
            path: LoadPath::Text,
            atom_count: atom_count(viewer),
        })
    }

    fn fail(&mut self, error: &SessionError) {
        self.transition(SessionState::Failed);

        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        log::error!("[{}] {}", self.id(), detail);

        if self.mount.is_attached() {
            self.mount.show_message(error.inline_message());
        } else {
            log::debug!("[{}] mount detached, not showing message", self.id());
        }
    }
}

fn atom_count(viewer: &dyn MolViewer) -> usize {
    match viewer.active_atom_count() {
        Some(n) if n > 0 => n,
        _ => viewer.first_model_atom_count().unwrap_or(0),
    }
}
