//! Visibility scheduling
//!
//! Decides when a mount starts its session. Mounts near the viewport are
//! reported by intersection observation when the host supports it, or
//! found by a full scan when the page is ready. A mount that is present
//! but hidden (a collapsed tab panel, say) is polled for a bounded number
//! of attempts and re-checked whenever a host tab is clicked.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashSet;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::host::{ObserveOptions, PageHost};
use crate::registry::SessionRegistry;

/// Timing of the hidden-mount fallback
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    /// Polls before the poller gives up; tab clicks still re-check after that
    pub max_polls: u32,
    /// Delay between a tab click and the re-check, so the panel can open
    pub tab_recheck_delay: Duration,
    pub observe: ObserveOptions,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            poll_interval: Duration::from_millis(500),
            max_polls: 40,
            tab_recheck_delay: Duration::from_millis(60),
            observe: ObserveOptions::default(),
        }
    }
}

/// Starts the session for a mount that has become visible
pub trait MountInitializer {
    fn initialize(&self, id: &str);
}

/// What a hidden-mount watcher needs; holds no tab sender so watchers end
/// when the scheduler is dropped
#[derive(Clone)]
struct Watcher {
    host: Rc<dyn PageHost>,
    registry: SessionRegistry,
    initializer: Rc<dyn MountInitializer>,
    config: SchedulerConfig,
    polling: Rc<RefCell<AHashSet<String>>>,
}

impl Watcher {
    /// Initialize `id` if it is visible and not yet initialized
    fn check(&self, id: &str) -> bool {
        if self.registry.is_initialized(id) {
            return true;
        }
        if self.host.is_visible(id) {
            self.initializer.initialize(id);
            return true;
        }
        false
    }

    async fn wait_until_visible(self, id: String, mut tabs: broadcast::Receiver<()>) {
        let period = self.config.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        let mut polls = 0u32;

        loop {
            tokio::select! {
                _ = ticker.tick(), if polls < self.config.max_polls => {
                    polls += 1;
                    if self.check(&id) {
                        break;
                    }
                    if polls >= self.config.max_polls {
                        log::warn!("[{}] giving up init (not visible)", id);
                        self.polling.borrow_mut().remove(&id);
                    }
                }
                event = tabs.recv() => match event {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        time::sleep(self.config.tab_recheck_delay).await;
                        if self.check(&id) {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        self.polling.borrow_mut().remove(&id);
    }
}

/// Schedules session initialization for the mounts of one page
///
/// Hidden-mount watchers are `spawn_local` tasks, so the scheduler must be
/// driven from inside a [`tokio::task::LocalSet`].
pub struct VisibilityScheduler {
    watcher: Watcher,
    tabs: broadcast::Sender<()>,
}

impl VisibilityScheduler {
    pub fn new(
        host: Rc<dyn PageHost>,
        registry: SessionRegistry,
        initializer: Rc<dyn MountInitializer>,
        config: SchedulerConfig,
    ) -> Self {
        let (tabs, _) = broadcast::channel(16);
        VisibilityScheduler {
            watcher: Watcher {
                host,
                registry,
                initializer,
                config,
                polling: Rc::default(),
            },
            tabs,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.watcher.config
    }

    /// Whether a hidden-mount poller is running for `id`
    pub fn is_polling(&self, id: &str) -> bool {
        self.watcher.polling.borrow().contains(id)
    }

    /// Page ready: observe every mount, or scan them all without observation
    pub fn on_dom_ready(&self) {
        let host = &self.watcher.host;
        let ids = host.mount_ids();
        if host.supports_intersection() {
            log::debug!("observing {} mount(s)", ids.len());
            for id in &ids {
                host.observe(id, &self.watcher.config.observe);
            }
        } else {
            log::debug!("no intersection observation, scanning {} mount(s)", ids.len());
            for id in &ids {
                self.schedule(id);
            }
        }
    }

    /// First qualifying intersection of an observed mount
    pub fn on_intersecting(&self, id: &str) {
        self.watcher.host.unobserve(id);
        self.schedule(id);
    }

    /// Mounts added to the document after load
    pub fn on_inserted(&self, ids: &[String]) {
        for id in ids {
            self.schedule(id);
        }
    }

    /// A host tab was clicked; every waiting mount re-checks shortly after
    pub fn on_tab_clicked(&self) {
        // No receivers means nothing is waiting
        let _ = self.tabs.send(());
    }

    /// Initialize `id` now if visible, otherwise start watching it
    pub fn schedule(&self, id: &str) {
        if self.watcher.check(id) {
            return;
        }
        if !self.watcher.polling.borrow_mut().insert(id.to_string()) {
            log::debug!("[{}] already waiting for visibility", id);
            return;
        }

        log::debug!("[{}] not visible yet, polling", id);
        let watcher = self.watcher.clone();
        let tabs = self.tabs.subscribe();
        let id = id.to_string();
        tokio::task::spawn_local(watcher.wait_until_visible(id, tabs));
    }
}
