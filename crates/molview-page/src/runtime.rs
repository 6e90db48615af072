//! Page runtime
//!
//! Ties the page together: page events feed the visibility scheduler,
//! which starts one [`ViewerSession`] per mount on the local task set.
//! Sessions share the script cache and the registry, nothing else.
//!
//! # Events
//!
//! | event | effect |
//! |---|---|
//! | `DomReady` | observe or scan every mount |
//! | `Intersecting` | stop observing, schedule the mount |
//! | `Inserted` | schedule late-added mounts |
//! | `TabClicked` | waiting mounts re-check visibility |
//! | `TabLayoutChanged` | live, visible viewers resize and redraw |
//! | `VariationFound` | live viewer reloads a new source; the newest one wins |

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tokio::sync::mpsc;

use molview_io::TextFetcher;
use molview_scene::{Engine, InitOutcome, SessionContext, ViewerSession};
use molview_settings::{LoaderConfig, ViewerRequest};

use crate::host::PageHost;
use crate::registry::{SessionRegistry, SharedSession};
use crate::scripts::{ScriptCache, ScriptProvisioner};
use crate::visibility::{MountInitializer, SchedulerConfig, VisibilityScheduler};

// ============================================================================
// Page Events
// ============================================================================

/// Something the host page reports to the loader
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Document finished loading
    DomReady,
    /// An observed mount came within the observation margin
    Intersecting(String),
    /// Mounts inserted after load
    Inserted(Vec<String>),
    /// A host tab link was clicked
    TabClicked,
    /// Host tab panels changed class or style
    TabLayoutChanged,
    /// A product variation selected a new structure for a mount
    VariationFound { mount: String, url: String },
}

// ============================================================================
// Session Startup
// ============================================================================

struct SessionStarter {
    host: Rc<dyn PageHost>,
    registry: SessionRegistry,
    context: SessionContext,
}

impl MountInitializer for SessionStarter {
    fn initialize(&self, id: &str) {
        if !self.registry.mark_initialized(id) {
            log::debug!("[{}] already initialized", id);
            return;
        }
        let Some(surface) = self.host.surface(id) else {
            log::warn!("[{}] mount vanished before init", id);
            return;
        };

        let attrs = self.host.attributes(id).unwrap_or_default();
        let request = ViewerRequest::from_attributes(&attrs);
        let session: SharedSession = Rc::new(tokio::sync::Mutex::new(ViewerSession::new(
            request,
            surface,
            self.context.clone(),
        )));
        self.registry.insert(id, session.clone());

        let id = id.to_string();
        tokio::task::spawn_local(async move {
            let mut session = session.lock().await;
            match session.initialize().await {
                Ok(InitOutcome::Rendered(report)) => log::info!(
                    "[{}] rendered {} via {:?}, {} atoms",
                    id,
                    report.format,
                    report.path,
                    report.atom_count
                ),
                Ok(InitOutcome::AlreadyInitialized) => {}
                // Already logged and shown by the session
                Err(e) => log::debug!("[{}] init ended in failure: {}", id, e),
            }
        });
    }
}

// ============================================================================
// Page Loader
// ============================================================================

/// Loader for every mount on one page
///
/// Must be driven from inside a [`tokio::task::LocalSet`]; sessions and
/// visibility watchers are local tasks.
pub struct PageLoader {
    host: Rc<dyn PageHost>,
    registry: SessionRegistry,
    cache: ScriptCache,
    scheduler: VisibilityScheduler,
    variations: Variations,
}

impl PageLoader {
    pub fn new(
        host: Rc<dyn PageHost>,
        engine: Rc<dyn Engine>,
        fetcher: Rc<dyn TextFetcher>,
        config: LoaderConfig,
        cache: ScriptCache,
    ) -> Self {
        Self::with_scheduler(host, engine, fetcher, config, cache, SchedulerConfig::default())
    }

    pub fn with_scheduler(
        host: Rc<dyn PageHost>,
        engine: Rc<dyn Engine>,
        fetcher: Rc<dyn TextFetcher>,
        config: LoaderConfig,
        cache: ScriptCache,
        scheduling: SchedulerConfig,
    ) -> Self {
        let registry = SessionRegistry::new();
        let provisioner = Rc::new(ScriptProvisioner::new(host.clone(), cache.clone(), config));
        let starter = Rc::new(SessionStarter {
            host: host.clone(),
            registry: registry.clone(),
            context: SessionContext::new(engine, provisioner, fetcher),
        });
        let scheduler = VisibilityScheduler::new(host.clone(), registry.clone(), starter, scheduling);

        PageLoader {
            host,
            registry,
            cache,
            scheduler,
            variations: Variations::default(),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    pub fn scheduler(&self) -> &VisibilityScheduler {
        &self.scheduler
    }

    /// Session for a mount, once it has started
    pub fn session(&self, id: &str) -> Option<SharedSession> {
        self.registry.get(id)
    }

    pub fn handle(&self, event: PageEvent) {
        log::debug!("page event {:?}", event);
        match event {
            PageEvent::DomReady => self.scheduler.on_dom_ready(),
            PageEvent::Intersecting(id) => self.scheduler.on_intersecting(&id),
            PageEvent::Inserted(ids) => self.scheduler.on_inserted(&ids),
            PageEvent::TabClicked => self.scheduler.on_tab_clicked(),
            PageEvent::TabLayoutChanged => self.refresh_visible(),
            PageEvent::VariationFound { mount, url } => self.reload(mount, url),
        }
    }

    /// Handle events until every sender is gone
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<PageEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        log::debug!("page event channel closed");
    }

    fn refresh_visible(&self) {
        for id in self.registry.ids() {
            if !self.host.is_visible(&id) {
                continue;
            }
            let Some(session) = self.registry.get(&id) else {
                continue;
            };
            // A session still loading will render on its own
            let refreshed = match session.try_lock() {
                Ok(mut session) => session.refresh(),
                Err(_) => false,
            };
            if refreshed {
                log::debug!("[{}] refreshed after tab layout change", id);
            }
        }
    }

    fn reload(&self, mount: String, url: String) {
        let Some(session) = self.registry.get(&mount) else {
            log::debug!("[{}] variation ignored, no session", mount);
            return;
        };

        let generation = self.variations.bump(&mount);
        let variations = self.variations.clone();
        tokio::task::spawn_local(async move {
            let mut session = session.lock().await;
            if !variations.is_latest(&mount, generation) {
                log::debug!("[{}] variation {} superseded", mount, url);
                return;
            }
            match session.reload(&url).await {
                Ok(Some(report)) => {
                    log::info!("[{}] variation loaded {} as {}", mount, url, report.format)
                }
                Ok(None) => log::debug!("[{}] variation ignored, viewer not live", mount),
                Err(e) => log::warn!("[{}] variation reload of {} failed: {}", mount, url, e),
            }
        });
    }
}

/// Latest variation request per mount
///
/// Reloads queue on the session lock; only the newest one for a mount runs
/// once it gets the lock.
#[derive(Clone, Default)]
struct Variations {
    latest: Rc<RefCell<AHashMap<String, u64>>>,
}

impl Variations {
    fn bump(&self, mount: &str) -> u64 {
        let mut latest = self.latest.borrow_mut();
        let generation = latest.entry(mount.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_latest(&self, mount: &str, generation: u64) -> bool {
        self.latest.borrow().get(mount) == Some(&generation)
    }
}
