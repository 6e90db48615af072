//! Page runtime driven through page events against the headless engine

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashMap;
use tokio::task::LocalSet;
use tokio::time;

use molview_io::{Format, IoError, IoResult, LocalFuture, TextFetcher};
use molview_page::{
    ObserveOptions, PageEvent, PageHost, PageLoader, ScriptCache, ScriptError, ScriptLoadState,
    ScriptResult,
};
use molview_scene::{HeadlessEngine, InlineMessage, MountSurface, SessionState};
use molview_settings::{LoaderConfig, MountAttributes};

const CORE: &str = "/js/core.js";
const UI: &str = "/js/ui.js";

const WATER_XYZ: &str = "3\nwater\nO 0.000 0.000 0.000\nH 0.757 0.586 0.000\nH -0.757 0.586 0.000\n";

const GLYCINE_PDB: &str = "\
HEADER    AMINO ACID
ATOM      1  N   GLY A   1      -0.966   0.493   1.500  1.00  0.00           N
ATOM      2  CA  GLY A   1       0.257   0.418   0.692  1.00  0.00           C
ATOM      3  C   GLY A   1      -0.094   0.017  -0.716  1.00  0.00           C
ATOM      4  O   GLY A   1      -1.056  -0.682  -0.923  1.00  0.00           O
END
";

// ============================================================================
// Fake page
// ============================================================================

struct Mount {
    id: String,
    messages: RefCell<Vec<InlineMessage>>,
}

impl MountSurface for Mount {
    fn id(&self) -> &str {
        &self.id
    }
    fn is_attached(&self) -> bool {
        true
    }
    fn show_message(&self, message: InlineMessage) {
        self.messages.borrow_mut().push(message);
    }
    fn clear_messages(&self) {
        self.messages.borrow_mut().clear();
    }
    fn ensure_positioned(&self) {}
    fn disable_pointer_events(&self) {}
}

struct Slot {
    attrs: MountAttributes,
    visible: Cell<bool>,
    surface: Rc<Mount>,
}

#[derive(Default)]
struct Page {
    slots: RefCell<Vec<(String, Rc<Slot>)>>,
    intersection: bool,
    observed: RefCell<Vec<String>>,
    engine: Cell<bool>,
    broken_scripts: bool,
    markup_scripts: Vec<String>,
    script_inserts: RefCell<Vec<String>>,
}

impl Page {
    fn add(&self, id: &str, attrs: MountAttributes, visible: bool) {
        let slot = Slot {
            attrs,
            visible: Cell::new(visible),
            surface: Rc::new(Mount {
                id: id.to_string(),
                messages: RefCell::default(),
            }),
        };
        self.slots.borrow_mut().push((id.to_string(), Rc::new(slot)));
    }

    fn slot(&self, id: &str) -> Option<Rc<Slot>> {
        self.slots
            .borrow()
            .iter()
            .find(|(slot_id, _)| slot_id == id)
            .map(|(_, slot)| slot.clone())
    }

    fn show(&self, id: &str) {
        if let Some(slot) = self.slot(id) {
            slot.visible.set(true);
        }
    }

    fn messages(&self, id: &str) -> Vec<InlineMessage> {
        self.slot(id)
            .map(|slot| slot.surface.messages.borrow().clone())
            .unwrap_or_default()
    }
}

impl PageHost for Page {
    fn mount_ids(&self) -> Vec<String> {
        self.slots.borrow().iter().map(|(id, _)| id.clone()).collect()
    }
    fn attributes(&self, id: &str) -> Option<MountAttributes> {
        self.slot(id).map(|slot| slot.attrs.clone())
    }
    fn is_visible(&self, id: &str) -> bool {
        self.slot(id).is_some_and(|slot| slot.visible.get())
    }
    fn surface(&self, id: &str) -> Option<Rc<dyn MountSurface>> {
        self.slot(id).map(|slot| slot.surface.clone() as Rc<dyn MountSurface>)
    }
    fn supports_intersection(&self) -> bool {
        self.intersection
    }
    fn observe(&self, id: &str, _options: &ObserveOptions) {
        self.observed.borrow_mut().push(id.to_string());
    }
    fn unobserve(&self, id: &str) {
        self.observed.borrow_mut().retain(|o| o != id);
    }
    fn engine_present(&self) -> bool {
        self.engine.get()
    }
    fn has_script(&self, src: &str) -> bool {
        self.markup_scripts.iter().any(|s| s == src)
    }
    fn load_script<'a>(&'a self, src: &'a str, existing: bool) -> LocalFuture<'a, ScriptResult<()>> {
        Box::pin(async move {
            if !existing {
                self.script_inserts.borrow_mut().push(src.to_string());
            }
            time::sleep(Duration::from_millis(25)).await;
            if self.broken_scripts {
                return Err(ScriptError::LoadFailed {
                    src: src.to_string(),
                });
            }
            if src == CORE {
                self.engine.set(true);
            }
            Ok(())
        })
    }
}

/// Serves bodies by URL and counts every request
#[derive(Default)]
struct Server {
    bodies: AHashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl Server {
    fn with(files: &[(&str, &str)]) -> Rc<Self> {
        Rc::new(Server {
            bodies: files
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            requests: RefCell::default(),
        })
    }

    fn hits(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| *r == url).count()
    }
}

impl TextFetcher for Server {
    fn fetch_text<'a>(&'a self, url: &'a str) -> LocalFuture<'a, IoResult<String>> {
        Box::pin(async move {
            self.requests.borrow_mut().push(url.to_string());
            self.bodies.get(url).cloned().ok_or(IoError::Status {
                status: 404,
                url: url.to_string(),
            })
        })
    }
}

fn config() -> LoaderConfig {
    LoaderConfig {
        core_script_url: CORE.to_string(),
        ui_script_url: UI.to_string(),
        debug: true,
    }
}

fn loader(page: &Rc<Page>, server: &Rc<Server>) -> (PageLoader, Rc<HeadlessEngine>) {
    let engine = Rc::new(HeadlessEngine::new(server.clone()));
    let loader = PageLoader::new(
        page.clone(),
        engine.clone(),
        server.clone(),
        config(),
        ScriptCache::new(),
    );
    (loader, engine)
}

async fn settle() {
    time::sleep(Duration::from_millis(500)).await;
}

async fn state_of(loader: &PageLoader, id: &str) -> Option<SessionState> {
    match loader.session(id) {
        Some(session) => Some(session.lock().await.state()),
        None => None,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn scan_loads_core_script_once_for_many_mounts() {
    let page = Rc::new(Page::default());
    page.add("a", MountAttributes::with_url("/gly.pdb"), true);
    page.add("b", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB)]);
    let (loader, engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            settle().await;

            assert_eq!(*page.script_inserts.borrow(), vec![CORE]);
            assert_eq!(loader.cache().state(CORE), ScriptLoadState::Done);
            assert_eq!(loader.cache().state(UI), ScriptLoadState::NotStarted);
            for id in ["a", "b"] {
                assert_eq!(state_of(&loader, id).await, Some(SessionState::RenderedOk));
                assert_eq!(engine.probe(id).map(|p| p.atom_count()), Some(4));
            }
            assert_eq!(server.hits("/gly.pdb"), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn ui_script_follows_core_when_a_mount_wants_controls() {
    let page = Rc::new(Page {
        markup_scripts: vec![CORE.to_string()],
        ..Default::default()
    });
    page.add(
        "a",
        MountAttributes {
            ui: Some("true".into()),
            ..MountAttributes::with_url("/gly.pdb")
        },
        true,
    );
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB)]);
    let (loader, _engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            settle().await;

            // Core came from page markup, so only the UI script is inserted
            assert_eq!(*page.script_inserts.borrow(), vec![UI]);
            assert_eq!(loader.cache().state(CORE), ScriptLoadState::Done);
            assert_eq!(loader.cache().state(UI), ScriptLoadState::Done);
            assert_eq!(state_of(&loader, "a").await, Some(SessionState::RenderedOk));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn broken_engine_script_fails_every_session() {
    let page = Rc::new(Page {
        broken_scripts: true,
        ..Default::default()
    });
    page.add("a", MountAttributes::with_url("/gly.pdb"), true);
    page.add("b", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB)]);
    let (loader, _engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            settle().await;

            for id in ["a", "b"] {
                assert_eq!(state_of(&loader, id).await, Some(SessionState::Failed));
                assert_eq!(page.messages(id), vec![InlineMessage::EngineLoadFailed]);
            }
            assert_eq!(server.hits("/gly.pdb"), 0);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn intersection_starts_only_the_reported_mount() {
    let page = Rc::new(Page {
        intersection: true,
        ..Default::default()
    });
    page.add("a", MountAttributes::with_url("/gly.pdb"), true);
    page.add("b", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB)]);
    let (loader, _engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            assert_eq!(*page.observed.borrow(), vec!["a", "b"]);
            settle().await;
            assert!(loader.registry().is_empty());

            loader.handle(PageEvent::Intersecting("b".into()));
            loader.handle(PageEvent::Intersecting("b".into()));
            settle().await;

            assert_eq!(*page.observed.borrow(), vec!["a"]);
            assert_eq!(loader.registry().ids(), vec!["b"]);
            assert_eq!(state_of(&loader, "b").await, Some(SessionState::RenderedOk));
            assert_eq!(server.hits("/gly.pdb"), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn hidden_mount_waits_for_tab_click_after_polling_gives_up() {
    let page = Rc::new(Page::default());
    page.add("tab", MountAttributes::with_url("/gly.pdb"), false);
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB)]);
    let (loader, _engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            assert!(loader.scheduler().is_polling("tab"));

            time::sleep(Duration::from_secs(25)).await;
            assert!(!loader.scheduler().is_polling("tab"));
            assert!(!loader.registry().is_initialized("tab"));

            page.show("tab");
            loader.handle(PageEvent::TabClicked);
            settle().await;

            assert_eq!(state_of(&loader, "tab").await, Some(SessionState::RenderedOk));
            assert_eq!(server.hits("/gly.pdb"), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn inserted_mount_is_scheduled() {
    let page = Rc::new(Page::default());
    let server = Server::with(&[("/late.xyz", WATER_XYZ)]);
    let (loader, engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            page.add("late", MountAttributes::with_url("/late.xyz"), false);
            loader.handle(PageEvent::Inserted(vec!["late".into()]));

            time::sleep(Duration::from_millis(700)).await;
            assert!(loader.registry().is_empty());

            page.show("late");
            settle().await;
            let session = loader.session("late").unwrap();
            let session = session.lock().await;
            assert_eq!(session.report().map(|r| r.format), Some(Format::Xyz));
            assert_eq!(engine.probe("late").map(|p| p.atom_count()), Some(3));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn variation_reloads_live_viewer_only() {
    let page = Rc::new(Page::default());
    page.add("product", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB), ("/water.xyz", WATER_XYZ)]);
    let (loader, engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            // Before any session exists
            loader.handle(PageEvent::VariationFound {
                mount: "product".into(),
                url: "/water.xyz".into(),
            });
            settle().await;
            assert_eq!(server.hits("/water.xyz"), 0);

            loader.handle(PageEvent::DomReady);
            settle().await;
            assert_eq!(engine.probe("product").map(|p| p.atom_count()), Some(4));

            loader.handle(PageEvent::VariationFound {
                mount: "product".into(),
                url: "/water.xyz".into(),
            });
            settle().await;

            assert_eq!(server.hits("/water.xyz"), 1);
            assert_eq!(engine.probe("product").map(|p| p.atom_count()), Some(3));
            let session = loader.session("product").unwrap();
            let session = session.lock().await;
            assert_eq!(session.request().source_url.as_deref(), Some("/water.xyz"));
            assert_eq!(server.hits("/gly.pdb"), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn latest_variation_wins_while_a_reload_is_running() {
    let page = Rc::new(Page::default());
    page.add("product", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[
        ("/gly.pdb", GLYCINE_PDB),
        ("/water.xyz", WATER_XYZ),
        ("/gly2.pdb", GLYCINE_PDB),
    ]);
    let (loader, engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            settle().await;

            loader.handle(PageEvent::VariationFound {
                mount: "product".into(),
                url: "/water.xyz".into(),
            });
            time::sleep(Duration::from_millis(10)).await;
            loader.handle(PageEvent::VariationFound {
                mount: "product".into(),
                url: "/gly2.pdb".into(),
            });
            settle().await;

            let session = loader.session("product").unwrap();
            let session = session.lock().await;
            assert_eq!(session.request().source_url.as_deref(), Some("/gly2.pdb"));
            assert_eq!(session.report().map(|r| r.format), Some(Format::Pdb));
            assert_eq!(engine.probe("product").map(|p| p.atom_count()), Some(4));
            assert_eq!(server.hits("/gly2.pdb"), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn queued_variations_skip_to_the_newest() {
    let page = Rc::new(Page::default());
    page.add("product", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[
        ("/gly.pdb", GLYCINE_PDB),
        ("/water.xyz", WATER_XYZ),
        ("/a.xyz", WATER_XYZ),
        ("/gly2.pdb", GLYCINE_PDB),
    ]);
    let (loader, _engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            settle().await;

            for url in ["/water.xyz", "/a.xyz", "/gly2.pdb"] {
                loader.handle(PageEvent::VariationFound {
                    mount: "product".into(),
                    url: url.into(),
                });
                time::sleep(Duration::from_millis(5)).await;
            }
            settle().await;

            // The first reload already held the session; the middle one was overtaken
            assert_eq!(server.hits("/water.xyz"), 1);
            assert_eq!(server.hits("/a.xyz"), 0);
            assert_eq!(server.hits("/gly2.pdb"), 1);
            let session = loader.session("product").unwrap();
            let session = session.lock().await;
            assert_eq!(session.request().source_url.as_deref(), Some("/gly2.pdb"));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn tab_layout_change_redraws_visible_viewers() {
    let page = Rc::new(Page::default());
    page.add("a", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB)]);
    let (loader, engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            settle().await;
            let before = engine.probe("a").map(|p| p.render_passes()).unwrap_or_default();
            assert_eq!(before, 2);

            loader.handle(PageEvent::TabLayoutChanged);
            assert_eq!(engine.probe("a").map(|p| p.render_passes()), Some(before + 1));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn missing_url_fails_without_network() {
    let page = Rc::new(Page::default());
    page.add("empty", MountAttributes::default(), true);
    let server = Server::with(&[]);
    let (loader, _engine) = loader(&page, &server);

    LocalSet::new()
        .run_until(async {
            loader.handle(PageEvent::DomReady);
            settle().await;
            assert_eq!(page.messages("empty"), vec![InlineMessage::NoFileUrl]);
            assert!(page.script_inserts.borrow().is_empty());
            assert!(server.requests.borrow().is_empty());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn events_flow_through_the_channel() {
    let page = Rc::new(Page::default());
    page.add("a", MountAttributes::with_url("/gly.pdb"), true);
    let server = Server::with(&[("/gly.pdb", GLYCINE_PDB)]);
    let (loader, _engine) = loader(&page, &server);
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    LocalSet::new()
        .run_until(async {
            tx.send(PageEvent::DomReady).unwrap();
            tx.send(PageEvent::DomReady).unwrap();
            drop(tx);
            loader.run(rx).await;
            settle().await;
            assert_eq!(state_of(&loader, "a").await, Some(SessionState::RenderedOk));
            assert_eq!(server.hits("/gly.pdb"), 1);
        })
        .await;
}
