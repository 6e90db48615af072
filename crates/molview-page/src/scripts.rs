//! Engine script provisioning
//!
//! Each script URL is loaded at most once per page however many sessions
//! ask for it. The [`ScriptCache`] keeps one entry per URL:
//!
//! ```text
//! NotStarted -> InFlight -> Done
//!                  |
//!                  +-> NotStarted (load error, so a later caller may retry)
//! ```
//!
//! Callers arriving while a load is in flight wait on it instead of
//! starting another.

use std::rc::Rc;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use tokio::sync::watch;

use molview_io::LocalFuture;
use molview_scene::{EngineError, EngineResult, Provisioner};
use molview_settings::LoaderConfig;

use crate::error::{ScriptError, ScriptResult};
use crate::host::PageHost;

/// Observable load state of one script URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLoadState {
    NotStarted,
    InFlight,
    Done,
}

enum Entry {
    /// Resolves to `Some(loaded)` once the load settles
    InFlight(watch::Receiver<Option<bool>>),
    Done,
}

enum Action {
    Wait(watch::Receiver<Option<bool>>),
    Start(watch::Sender<Option<bool>>),
}

/// Page-wide script load cache
#[derive(Clone, Default)]
pub struct ScriptCache {
    entries: Arc<Mutex<AHashMap<String, Entry>>>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, src: &str) -> ScriptLoadState {
        match self.entries.lock().get(src) {
            None => ScriptLoadState::NotStarted,
            Some(Entry::InFlight(_)) => ScriptLoadState::InFlight,
            Some(Entry::Done) => ScriptLoadState::Done,
        }
    }

    /// Load `src` through `host` unless it is loaded or loading already
    pub async fn load_once(&self, host: &dyn PageHost, src: &str) -> ScriptResult<()> {
        let action = {
            let mut entries = self.entries.lock();
            match entries.get(src) {
                Some(Entry::Done) => return Ok(()),
                Some(Entry::InFlight(rx)) => Action::Wait(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    entries.insert(src.to_string(), Entry::InFlight(rx));
                    Action::Start(tx)
                }
            }
        };

        match action {
            Action::Wait(mut rx) => {
                log::debug!("joining in-flight load of {}", src);
                let loaded = rx
                    .wait_for(Option::is_some)
                    .await
                    .map(|settled| *settled == Some(true))
                    .map_err(|_| ScriptError::Abandoned {
                        src: src.to_string(),
                    })?;
                if loaded {
                    Ok(())
                } else {
                    Err(ScriptError::LoadFailed {
                        src: src.to_string(),
                    })
                }
            }
            Action::Start(tx) => {
                let existing = host.has_script(src);
                if existing {
                    log::debug!("reusing script element for {}", src);
                }
                let result = host.load_script(src, existing).await;

                {
                    let mut entries = self.entries.lock();
                    if result.is_ok() {
                        entries.insert(src.to_string(), Entry::Done);
                    } else {
                        entries.remove(src);
                    }
                }
                // Nobody waiting is fine
                let _ = tx.send(Some(result.is_ok()));
                result
            }
        }
    }
}

/// Makes sure the engine scripts are in the page before a session starts
pub struct ScriptProvisioner {
    host: Rc<dyn PageHost>,
    cache: ScriptCache,
    config: LoaderConfig,
}

impl ScriptProvisioner {
    pub fn new(host: Rc<dyn PageHost>, cache: ScriptCache, config: LoaderConfig) -> Self {
        ScriptProvisioner {
            host,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    /// Load the core script, and the UI script if any mount wants controls
    pub async fn ensure_loaded(&self) -> ScriptResult<()> {
        if self.host.engine_present() {
            return Ok(());
        }

        let core = self.config.core_script_url.as_str();
        let want_ui = self.host.wants_ui();
        log::info!(
            "loading engine {} {}",
            core,
            if want_ui { "(+UI)" } else { "(no UI)" }
        );

        self.cache.load_once(self.host.as_ref(), core).await?;
        if want_ui {
            self.cache
                .load_once(self.host.as_ref(), &self.config.ui_script_url)
                .await?;
        }

        if self.host.engine_present() {
            Ok(())
        } else {
            Err(ScriptError::EngineMissing {
                src: core.to_string(),
            })
        }
    }
}

impl Provisioner for ScriptProvisioner {
    fn ensure_engine(&self) -> LocalFuture<'_, EngineResult<()>> {
        Box::pin(async move {
            self.ensure_loaded().await.map_err(|e| {
                log::error!("failed ensuring engine: {}", e);
                EngineError::Unavailable(e.to_string())
            })
        })
    }
}
