//! Headless reference engine
//!
//! Implements the engine traits on top of the molview-io readers. Nothing
//! is drawn; every call is recorded so a caller can inspect what a real
//! engine would have been asked to do through a [`ViewerProbe`].

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use molview_io::{parse_str, Format, LocalFuture, Model, TextFetcher};
use molview_settings::{SpinDirective, Style};

use crate::engine::{DownloadCall, Engine, MolViewer, MountSurface, ViewerOptions};
use crate::error::{EngineError, EngineResult};

/// Axes accepted by [`MolViewer::spin`]
const SPIN_AXES: [&str; 6] = ["x", "y", "z", "vx", "vy", "vz"];

#[derive(Debug, Default)]
struct ViewerState {
    mount_id: String,
    options: ViewerOptions,
    models: Vec<Model>,
    style: Option<Style>,
    background: Option<u32>,
    surface_clears: usize,
    render_passes: usize,
    spin: Option<SpinDirective>,
}

/// Read-only view of a headless viewer's recorded state
#[derive(Debug, Clone)]
pub struct ViewerProbe(Rc<RefCell<ViewerState>>);

impl ViewerProbe {
    fn state(&self) -> Ref<'_, ViewerState> {
        self.0.borrow()
    }

    /// Mount the viewer was created for
    pub fn mount_id(&self) -> String {
        self.state().mount_id.clone()
    }

    pub fn options(&self) -> ViewerOptions {
        self.state().options
    }

    /// Currently loaded models
    pub fn models(&self) -> Vec<Model> {
        self.state().models.clone()
    }

    /// Atom count of the active (most recently added) model
    pub fn atom_count(&self) -> usize {
        self.state().models.last().map_or(0, Model::atom_count)
    }

    /// Style applied last, `None` after a reset
    pub fn style(&self) -> Option<Style> {
        self.state().style.clone()
    }

    pub fn background(&self) -> Option<u32> {
        self.state().background
    }

    pub fn surface_clears(&self) -> usize {
        self.state().surface_clears
    }

    /// Number of completed render calls
    pub fn render_passes(&self) -> usize {
        self.state().render_passes
    }

    pub fn spin(&self) -> Option<SpinDirective> {
        self.state().spin.clone()
    }
}

/// Viewer of the [`HeadlessEngine`]
#[derive(Debug)]
pub struct HeadlessViewer {
    state: Rc<RefCell<ViewerState>>,
}

impl MolViewer for HeadlessViewer {
    fn remove_all_models(&mut self) {
        self.state.borrow_mut().models.clear();
    }

    fn add_model(&mut self, text: &str, format: Format) -> EngineResult<()> {
        let model = parse_str(text, format).map_err(|e| EngineError::Parse {
            format,
            message: e.to_string(),
        })?;
        log::debug!(
            "headless viewer added {} model with {} atoms",
            format,
            model.atom_count()
        );
        self.state.borrow_mut().models.push(model);
        Ok(())
    }

    fn active_atom_count(&self) -> Option<usize> {
        self.state.borrow().models.last().map(Model::atom_count)
    }

    fn first_model_atom_count(&self) -> Option<usize> {
        self.state.borrow().models.first().map(Model::atom_count)
    }

    fn set_background_color(&mut self, rgb: u32) {
        self.state.borrow_mut().background = Some(rgb);
    }

    fn remove_all_surfaces(&mut self) {
        self.state.borrow_mut().surface_clears += 1;
    }

    fn reset_style(&mut self) {
        self.state.borrow_mut().style = None;
    }

    fn set_style(&mut self, style: &Style) {
        self.state.borrow_mut().style = Some(style.clone());
    }

    fn resize(&mut self) {}

    fn zoom_to(&mut self) {}

    fn render(&mut self) {
        self.state.borrow_mut().render_passes += 1;
    }

    fn spin(&mut self, axis: &str, speed: f64) -> EngineResult<()> {
        if !SPIN_AXES.contains(&axis) {
            return Err(EngineError::Unsupported(format!("spin axis '{}'", axis)));
        }
        self.state.borrow_mut().spin = Some(SpinDirective {
            axis: axis.to_string(),
            speed,
        });
        Ok(())
    }
}

/// Engine that parses with the built-in readers and draws nothing
pub struct HeadlessEngine {
    fetcher: Rc<dyn TextFetcher>,
    probes: RefCell<Vec<ViewerProbe>>,
    downloads: RefCell<Vec<String>>,
}

impl HeadlessEngine {
    /// Create an engine whose native download uses `fetcher`
    pub fn new(fetcher: Rc<dyn TextFetcher>) -> Self {
        HeadlessEngine {
            fetcher,
            probes: RefCell::new(Vec::new()),
            downloads: RefCell::new(Vec::new()),
        }
    }

    /// Probes of every viewer created so far
    pub fn probes(&self) -> Vec<ViewerProbe> {
        self.probes.borrow().clone()
    }

    /// URLs passed to the native download, in call order
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }

    /// Probe of the viewer created for `mount_id`
    pub fn probe(&self, mount_id: &str) -> Option<ViewerProbe> {
        self.probes
            .borrow()
            .iter()
            .find(|p| p.state().mount_id == mount_id)
            .cloned()
    }
}

impl Engine for HeadlessEngine {
    fn create_viewer(
        &self,
        mount: &dyn MountSurface,
        options: &ViewerOptions,
    ) -> EngineResult<Box<dyn MolViewer>> {
        if !mount.is_attached() {
            return Err(EngineError::ViewerInit(format!(
                "mount '{}' is not attached",
                mount.id()
            )));
        }

        let state = Rc::new(RefCell::new(ViewerState {
            mount_id: mount.id().to_string(),
            options: *options,
            ..Default::default()
        }));
        self.probes.borrow_mut().push(ViewerProbe(Rc::clone(&state)));
        Ok(Box::new(HeadlessViewer { state }))
    }

    fn download<'a>(
        &'a self,
        url: &'a str,
        viewer: &'a mut dyn MolViewer,
        call: DownloadCall,
    ) -> LocalFuture<'a, EngineResult<()>> {
        Box::pin(async move {
            self.downloads.borrow_mut().push(url.to_string());
            let text = self
                .fetcher
                .fetch_text(url)
                .await
                .map_err(|source| EngineError::Download {
                    url: url.to_string(),
                    source,
                })?;
            // Like the browser engine, a parse problem only shows as missing atoms
            if let Err(e) = viewer.add_model(&text, call.format()) {
                log::debug!("native download of {} did not parse: {}", url, e);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InlineMessage;
    use molview_io::{IoError, IoResult};
    use std::cell::Cell;

    struct Mount {
        attached: Cell<bool>,
    }

    impl MountSurface for Mount {
        fn id(&self) -> &str {
            "m1"
        }
        fn is_attached(&self) -> bool {
            self.attached.get()
        }
        fn show_message(&self, _message: InlineMessage) {}
        fn clear_messages(&self) {}
        fn ensure_positioned(&self) {}
        fn disable_pointer_events(&self) {}
    }

    struct Fixed(&'static str);

    impl TextFetcher for Fixed {
        fn fetch_text<'a>(&'a self, _url: &'a str) -> LocalFuture<'a, IoResult<String>> {
            let text = self.0.to_string();
            Box::pin(async move { Ok(text) })
        }
    }

    struct Offline;

    impl TextFetcher for Offline {
        fn fetch_text<'a>(&'a self, url: &'a str) -> LocalFuture<'a, IoResult<String>> {
            Box::pin(async move {
                Err(IoError::Status {
                    status: 404,
                    url: url.to_string(),
                })
            })
        }
    }

    const WATER: &str = "3\nwater\nO 0 0 0\nH 0.96 0 0\nH -0.24 0.93 0\n";

    fn mount() -> Mount {
        Mount {
            attached: Cell::new(true),
        }
    }

    #[test]
    fn test_viewer_records_calls() {
        let engine = HeadlessEngine::new(Rc::new(Offline));
        let mut viewer = engine
            .create_viewer(&mount(), &ViewerOptions::default())
            .unwrap();
        let probe = engine.probe("m1").unwrap();

        viewer.add_model(WATER, Format::Xyz).unwrap();
        viewer.set_style(&Style::fallback());
        viewer.render();
        viewer.spin("x", 0.5).unwrap();

        assert_eq!(probe.atom_count(), 3);
        assert_eq!(viewer.first_model_atom_count(), Some(3));
        assert_eq!(probe.style(), Some(Style::fallback()));
        assert_eq!(probe.render_passes(), 1);
        assert_eq!(probe.spin().map(|s| s.axis), Some("x".to_string()));

        viewer.reset_style();
        viewer.remove_all_models();
        assert_eq!(probe.style(), None);
        assert_eq!(viewer.active_atom_count(), None);
    }

    #[test]
    fn test_parse_errors_and_empty_models() {
        let engine = HeadlessEngine::new(Rc::new(Offline));
        let mut viewer = engine
            .create_viewer(&mount(), &ViewerOptions::default())
            .unwrap();

        assert!(matches!(
            viewer.add_model("garbage", Format::Xyz),
            Err(EngineError::Parse { format: Format::Xyz, .. })
        ));
        // PDB accepts anything, but finds nothing
        viewer.add_model("garbage", Format::Pdb).unwrap();
        assert_eq!(viewer.active_atom_count(), Some(0));
    }

    #[test]
    fn test_unknown_spin_axis() {
        let engine = HeadlessEngine::new(Rc::new(Offline));
        let mut viewer = engine
            .create_viewer(&mount(), &ViewerOptions::default())
            .unwrap();
        assert!(viewer.spin("w", 1.0).is_err());
    }

    #[test]
    fn test_detached_mount() {
        let engine = HeadlessEngine::new(Rc::new(Offline));
        let detached = mount();
        detached.attached.set(false);
        assert!(matches!(
            engine.create_viewer(&detached, &ViewerOptions::default()),
            Err(EngineError::ViewerInit(_))
        ));
    }

    #[tokio::test]
    async fn test_download_adds_model() {
        let engine = HeadlessEngine::new(Rc::new(Fixed(WATER)));
        let mut viewer = engine
            .create_viewer(&mount(), &ViewerOptions::default())
            .unwrap();

        engine
            .download("/w.xyz", viewer.as_mut(), DownloadCall::TypeOption(Format::Xyz))
            .await
            .unwrap();
        assert_eq!(viewer.active_atom_count(), Some(3));
        assert_eq!(engine.downloads(), vec!["/w.xyz"]);

        // wrong format: no error, just no new model
        engine
            .download("/w.xyz", viewer.as_mut(), DownloadCall::TrailingFormat(Format::Sdf))
            .await
            .unwrap();
        assert_eq!(engine.probe("m1").unwrap().models().len(), 1);
    }

    #[tokio::test]
    async fn test_download_transport_error() {
        let engine = HeadlessEngine::new(Rc::new(Offline));
        let mut viewer = engine
            .create_viewer(&mount(), &ViewerOptions::default())
            .unwrap();
        let err = engine
            .download("/gone.pdb", viewer.as_mut(), DownloadCall::TypeOption(Format::Pdb))
            .await
            .unwrap_err();
        match err {
            EngineError::Download { url, source } => {
                assert_eq!(url, "/gone.pdb");
                assert!(source.is_transport());
            }
            other => panic!("expected a download error, got {:?}", other),
        }
    }
}
