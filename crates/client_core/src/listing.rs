//! Paginated listing with a debounced search box, shared by every table view.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Client, ClientId, Payment, Policy, PolicyId},
    protocol::Page,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error};

use crate::{
    config::Settings,
    error::{ClientError, Result},
    services::{ClientService, PaymentService, PolicyService},
};

/// Where a listing gets its pages from.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn list(&self, page: u32, limit: u32) -> Result<Page<Self::Item>>;

    fn supports_search(&self) -> bool {
        false
    }

    async fn search(&self, _term: &str, _page: u32, _limit: u32) -> Result<Page<Self::Item>> {
        Err(ClientError::SearchUnsupported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page_size: u32,
    pub debounce: Duration,
}

impl ListOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            page_size: settings.page_size.max(1),
            debounce: settings.search_debounce(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub search: String,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: Option<u64>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            search: String::new(),
            page: 1,
            total_pages: 1,
            total_items: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, Default)]
struct Query {
    term: String,
    page: u32,
}

struct Inner<S: PageSource> {
    source: S,
    options: ListOptions,
    state: watch::Sender<ListState<S::Item>>,
    generation: AtomicU64,
    query: Mutex<Query>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<S: PageSource> Inner<S> {
    /// Starts a new generation; answers from older ones are dropped.
    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn cancel_pending(&self) {
        if let Some(handle) = lock(&self.pending).take() {
            handle.abort();
        }
    }

    async fn fetch(&self) {
        let generation = self.bump();
        let Query { term, page } = lock(&self.query).clone();
        let limit = self.options.page_size;

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.page = page;
            state.search = term.clone();
        });

        let result = if term.trim().is_empty() {
            self.source.list(page, limit).await
        } else {
            self.source.search(term.trim(), page, limit).await
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, page, "discarding stale page");
            return;
        }

        self.state.send_modify(|state| {
            state.loading = false;
            match result {
                Ok(fetched) => {
                    state.items = fetched.items;
                    state.total_pages = fetched.total_pages.max(1);
                    state.total_items = fetched.total_items;
                }
                Err(err) => {
                    error!(%err, page, "listing fetch failed");
                    state.error = Some(err.user_message());
                }
            }
        });
    }
}

/// Owns the page/search state of one table view and publishes it through a
/// watch channel.
pub struct ListController<S: PageSource> {
    inner: Arc<Inner<S>>,
}

impl<S: PageSource> Clone for ListController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PageSource> ListController<S> {
    pub fn new(source: S, options: ListOptions) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                options,
                state,
                generation: AtomicU64::new(0),
                query: Mutex::new(Query {
                    term: String::new(),
                    page: 1,
                }),
                pending: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<S::Item>> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState<S::Item> {
        self.inner.state.borrow().clone()
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Re-fetches the current page with the current search term.
    pub async fn refresh(&self) {
        self.inner.cancel_pending();
        self.inner.fetch().await;
    }

    /// Moves to `page` and fetches it right away. Returns `false` when the
    /// page is outside `1..=total_pages`.
    pub async fn set_page(&self, page: u32) -> bool {
        let total_pages = self.inner.state.borrow().total_pages;
        if page < 1 || page > total_pages {
            return false;
        }
        lock(&self.inner.query).page = page;
        self.inner.cancel_pending();
        self.inner.fetch().await;
        true
    }

    pub async fn next_page(&self) -> bool {
        let page = self.inner.state.borrow().page;
        self.set_page(page.saturating_add(1)).await
    }

    pub async fn prev_page(&self) -> bool {
        let page = self.inner.state.borrow().page;
        if page <= 1 {
            return false;
        }
        self.set_page(page - 1).await
    }

    /// Replaces the search term and goes back to page 1. A blank term lists
    /// immediately; otherwise the search runs once typing pauses for the
    /// debounce window.
    pub async fn set_search(&self, term: impl Into<String>) -> Result<()> {
        let term = term.into();
        let blank = term.trim().is_empty();
        if !blank && !self.inner.source.supports_search() {
            return Err(ClientError::SearchUnsupported);
        }

        {
            let mut query = lock(&self.inner.query);
            query.term = term.clone();
            query.page = 1;
        }
        self.inner.cancel_pending();
        self.inner.bump();

        if blank {
            self.inner.fetch().await;
            return Ok(());
        }

        self.inner.state.send_modify(|state| {
            state.search = term;
            state.page = 1;
            state.loading = true;
        });
        let inner = Arc::clone(&self.inner);
        let delay = self.inner.options.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.fetch().await;
        });
        *lock(&self.inner.pending) = Some(handle);
        Ok(())
    }
}

pub struct ClientsSource(pub ClientService);

#[async_trait]
impl PageSource for ClientsSource {
    type Item = Client;

    async fn list(&self, page: u32, limit: u32) -> Result<Page<Client>> {
        self.0.list(page, limit).await
    }

    fn supports_search(&self) -> bool {
        true
    }

    async fn search(&self, term: &str, page: u32, limit: u32) -> Result<Page<Client>> {
        self.0.search(term, page, limit).await
    }
}

pub struct PoliciesSource(pub PolicyService);

#[async_trait]
impl PageSource for PoliciesSource {
    type Item = Policy;

    async fn list(&self, page: u32, limit: u32) -> Result<Page<Policy>> {
        self.0.list(page, limit).await
    }

    fn supports_search(&self) -> bool {
        true
    }

    async fn search(&self, term: &str, page: u32, limit: u32) -> Result<Page<Policy>> {
        self.0.search(term, page, limit).await
    }
}

pub struct PaymentsSource(pub PaymentService);

#[async_trait]
impl PageSource for PaymentsSource {
    type Item = Payment;

    async fn list(&self, page: u32, limit: u32) -> Result<Page<Payment>> {
        self.0.list(page, limit).await
    }
}

pub struct ClientPoliciesSource {
    pub service: PolicyService,
    pub client_id: ClientId,
}

#[async_trait]
impl PageSource for ClientPoliciesSource {
    type Item = Policy;

    async fn list(&self, page: u32, limit: u32) -> Result<Page<Policy>> {
        self.service.for_client(self.client_id, page, limit).await
    }
}

pub struct PolicyPaymentsSource {
    pub service: PaymentService,
    pub policy_id: PolicyId,
}

#[async_trait]
impl PageSource for PolicyPaymentsSource {
    type Item = Payment;

    async fn list(&self, page: u32, limit: u32) -> Result<Page<Payment>> {
        self.service.for_policy(self.policy_id, page, limit).await
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
