//! Page Illustration Manager: owns every page's state and the generation
//! operation that mutates it.
//!
//! DESIGN
//! ======
//! The manager is driven by a single owner (`&mut self`), so state is never
//! locked. A generation request is a detached tokio task; when it finishes it
//! posts a [`Completion`] over an mpsc channel and the owner folds it into the
//! store with the same keyed update used by the synchronous operations.
//!
//! There is no cancellation. A request always resolves and applies, even if a
//! newer request for the same page was issued meanwhile; with
//! [`StalePolicy::Discard`] such superseded completions are dropped instead.
//!
//! Auto-trigger happens in [`PageIllustrationManager::observe_message`]: a page
//! with no state, or idle with no images, gets a request immediately. The
//! request marks the page `pending` before returning, so observing the same
//! message again never issues a second one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::{IllustrationConfig, StalePolicy};
use super::pages::PageDescriptor;
use super::service::{IllustrationError, ImageService};
use super::state::{GeneratedImage, PageIllustrationState, PageKey};
use super::store::PageStore;
use super::view::{PageView, project};

/// Monotonic id of one generation request.
pub type RequestId = u64;

/// Result of a finished request, posted back to the manager.
#[derive(Debug)]
pub struct Completion {
    pub key: PageKey,
    pub request_id: RequestId,
    pub prompt: String,
    pub outcome: Result<String, IllustrationError>,
}

/// Posts exactly one [`Completion`] per request. If the task ends without
/// reporting (the service panicked or the task was aborted), the drop posts
/// a failure so `in_flight` still drains.
struct CompletionReporter {
    tx: mpsc::UnboundedSender<Completion>,
    pending: Option<(PageKey, RequestId, String)>,
}

impl CompletionReporter {
    fn report(mut self, outcome: Result<String, IllustrationError>) {
        self.post(outcome);
    }

    fn post(&mut self, outcome: Result<String, IllustrationError>) {
        if let Some((key, request_id, prompt)) = self.pending.take() {
            // A closed channel means the manager is gone and nobody is left
            // to show the result.
            let _ = self.tx.send(Completion { key, request_id, prompt, outcome });
        }
    }
}

impl Drop for CompletionReporter {
    fn drop(&mut self) {
        self.post(Err(IllustrationError::RequestFailed("image request aborted".into())));
    }
}

pub struct PageIllustrationManager {
    store: PageStore,
    service: Arc<dyn ImageService>,
    config: IllustrationConfig,
    /// Latest request issued per page.
    latest: HashMap<PageKey, RequestId>,
    next_request_id: RequestId,
    in_flight: usize,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl PageIllustrationManager {
    #[must_use]
    pub fn new(service: Arc<dyn ImageService>, config: IllustrationConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store: PageStore::new(),
            service,
            config,
            latest: HashMap::new(),
            next_request_id: 1,
            in_flight: 0,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn config(&self) -> &IllustrationConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self, key: &PageKey) -> Option<&PageIllustrationState> {
        self.store.get(key)
    }

    /// Number of requests issued but not yet folded back in.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // =========================================================================
    // RECONCILIATION
    // =========================================================================

    /// Register a message's pages and auto-trigger the un-illustrated ones.
    ///
    /// Idempotent: re-observing an unchanged message issues nothing new.
    /// Returns the number of requests started.
    pub fn observe_message(&mut self, message_id: Option<&str>, pages: &[PageDescriptor]) -> usize {
        let mut started = 0;
        for page in pages {
            let key = PageKey::for_message(message_id, page.id);
            let prompt = match self.store.get(&key) {
                None => page.detail.clone(),
                Some(state) if state.needs_auto_trigger() => state.draft().to_string(),
                Some(_) => continue,
            };
            self.store.ensure(&key, &page.detail);
            debug!(%key, "illustration: auto-trigger");
            if self.request_image(&key, &prompt).is_some() {
                started += 1;
            }
        }
        started
    }

    // =========================================================================
    // GENERATION
    // =========================================================================

    /// Start a generation request for `key` with `prompt`.
    ///
    /// Returns `None` (and changes nothing) when the trimmed prompt is empty.
    /// Must be called within a tokio runtime.
    pub fn request_image(&mut self, key: &PageKey, prompt: &str) -> Option<RequestId> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        self.store.upsert(key, prompt, |state| state.begin(prompt));

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.latest.insert(key.clone(), request_id);
        self.in_flight += 1;

        info!(%key, request_id, prompt_len = prompt.len(), "illustration: request started");

        let request = self.config.request_for(prompt);
        let service = Arc::clone(&self.service);
        let reporter = CompletionReporter {
            tx: self.tx.clone(),
            pending: Some((key.clone(), request_id, request.prompt.clone())),
        };
        tokio::spawn(async move {
            let outcome = service.generate(&request).await.and_then(|resp| {
                resp.images
                    .into_iter()
                    .next()
                    .filter(|url| !url.is_empty())
                    .ok_or(IllustrationError::NoImageReturned)
            });
            reporter.report(outcome);
        });

        Some(request_id)
    }

    // =========================================================================
    // USER OPERATIONS
    // =========================================================================

    /// Replace the draft prompt. No-op for unknown keys.
    pub fn set_draft(&mut self, key: &PageKey, text: &str) {
        self.store.update(key, |state| state.set_draft(text));
    }

    /// Flip edit mode. No-op for unknown keys.
    pub fn toggle_editing(&mut self, key: &PageKey) {
        self.store.update(key, PageIllustrationState::toggle_editing);
    }

    /// Regenerate with the draft, or `fallback_prompt` when the draft is empty.
    pub fn submit(&mut self, key: &PageKey, fallback_prompt: &str) -> Option<RequestId> {
        let draft = self.store.get(key).map(|s| s.draft().to_string()).unwrap_or_default();
        let prompt = if draft.is_empty() { fallback_prompt } else { draft.as_str() };
        let request_id = self.request_image(key, prompt)?;
        self.store.update(key, PageIllustrationState::stop_editing);
        Some(request_id)
    }

    /// Show an older version. Returns `false` when `index` is out of range.
    pub fn select_version(&mut self, key: &PageKey, index: usize) -> bool {
        self.store.update(key, |state| state.select(index)).unwrap_or(false)
    }

    // =========================================================================
    // VIEW
    // =========================================================================

    #[must_use]
    pub fn view(&self, message_id: Option<&str>, page: &PageDescriptor) -> PageView {
        let key = PageKey::for_message(message_id, page.id);
        project(&key, self.store.get(&key), page)
    }

    #[must_use]
    pub fn views(&self, message_id: Option<&str>, pages: &[PageDescriptor]) -> Vec<PageView> {
        pages.iter().map(|page| self.view(message_id, page)).collect()
    }

    // =========================================================================
    // EVENT LOOP
    // =========================================================================

    /// Fold every completion already delivered, without waiting.
    /// Returns how many were received.
    pub fn apply_ready(&mut self) -> usize {
        let mut count = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            count += 1;
        }
        count
    }

    /// Wait for the next completion and fold it in.
    /// Returns its key, or `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<PageKey> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        let key = completion.key.clone();
        self.apply(completion);
        Some(key)
    }

    /// Wait until every outstanding request has been folded in.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completion { key, request_id, prompt, outcome } = completion;

        let latest = self.latest.get(&key).copied();
        if self.config.stale_policy == StalePolicy::Discard && latest != Some(request_id) {
            debug!(%key, request_id, ?latest, "illustration: stale completion discarded");
            return;
        }

        match outcome {
            Ok(url) => {
                info!(%key, request_id, "illustration: image ready");
                self.store
                    .upsert(&key, &prompt, |state| state.complete(GeneratedImage::new(url), &prompt));
            }
            Err(e) => {
                warn!(%key, request_id, error = %e, "illustration: request failed");
                self.store.upsert(&key, &prompt, |state| state.fail(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
