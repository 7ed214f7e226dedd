//! Debounced, filter-driven list fetching.
//!
//! A [`ListController`] owns the current [`Filter`] and runs as a background
//! task. Handles push partial filter updates over a channel; the task waits
//! for the filter to stay unchanged for the debounce window, then issues one
//! fetch. Every fetch carries a sequence number and a response older than the
//! last applied one is dropped, so a slow early request can never overwrite a
//! newer result.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use gymshop_client::catalog::{
    BOOKINGS_PATH, BRANDS_PATH, CART_ITEMS_PATH, CATEGORIES_PATH, ORDERS_PATH, SERVICES_PATH,
    SUPPLIERS_PATH, USERS_PATH, WISHLIST_PATH,
};
use gymshop_client::{ApiError, StorefrontClient};
use gymshop_core::{
    AppConfig, Booking, Brand, CartItem, Category, Filter, Order, Paginated, Pagination,
    Service, Supplier, User, WishlistItem, DEFAULT_PAGE_LIMIT,
};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Instant};

use crate::notify::{Notice, Notifier};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Anything that can produce one page of `T` for a filter.
pub trait ListSource<T>: Send + Sync + 'static {
    fn fetch(
        &self,
        filter: Filter,
    ) -> impl Future<Output = Result<Paginated<T>, ApiError>> + Send;
}

/// A list endpoint of the storefront API.
pub struct ApiList<T> {
    client: Arc<StorefrontClient>,
    path: &'static str,
    _row: PhantomData<fn() -> T>,
}

impl<T> ApiList<T> {
    #[must_use]
    pub fn new(client: Arc<StorefrontClient>, path: &'static str) -> Self {
        Self {
            client,
            path,
            _row: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &'static str {
        self.path
    }
}

impl<T> ListSource<T> for ApiList<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch(&self, filter: Filter) -> Result<Paginated<T>, ApiError> {
        self.client.list(self.path, &filter).await
    }
}

#[must_use]
pub fn services(client: Arc<StorefrontClient>) -> ApiList<Service> {
    ApiList::new(client, SERVICES_PATH)
}

#[must_use]
pub fn brands(client: Arc<StorefrontClient>) -> ApiList<Brand> {
    ApiList::new(client, BRANDS_PATH)
}

#[must_use]
pub fn categories(client: Arc<StorefrontClient>) -> ApiList<Category> {
    ApiList::new(client, CATEGORIES_PATH)
}

#[must_use]
pub fn suppliers(client: Arc<StorefrontClient>) -> ApiList<Supplier> {
    ApiList::new(client, SUPPLIERS_PATH)
}

#[must_use]
pub fn users(client: Arc<StorefrontClient>) -> ApiList<User> {
    ApiList::new(client, USERS_PATH)
}

#[must_use]
pub fn bookings(client: Arc<StorefrontClient>) -> ApiList<Booking> {
    ApiList::new(client, BOOKINGS_PATH)
}

#[must_use]
pub fn wishlist(client: Arc<StorefrontClient>) -> ApiList<WishlistItem> {
    ApiList::new(client, WISHLIST_PATH)
}

#[must_use]
pub fn cart_items(client: Arc<StorefrontClient>) -> ApiList<CartItem> {
    ApiList::new(client, CART_ITEMS_PATH)
}

#[must_use]
pub fn orders(client: Arc<StorefrontClient>) -> ApiList<Order> {
    ApiList::new(client, ORDERS_PATH)
}

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub debounce: Duration,
    pub default_limit: u32,
    /// Keys that must be present and non-null before any fetch is issued.
    pub required_keys: Vec<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            default_limit: DEFAULT_PAGE_LIMIT,
            required_keys: Vec::new(),
        }
    }
}

impl ListOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            debounce: config.list_debounce(),
            default_limit: config.default_page_limit,
            required_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn require(mut self, key: &str) -> Self {
        self.required_keys.push(key.to_owned());
        self
    }

    fn is_ready(&self, filter: &Filter) -> bool {
        self.required_keys.iter().all(|k| filter.has_value(k))
    }
}

#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub list: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub pagination: Pagination,
    pub filters: Filter,
}

impl<T> ListState<T> {
    fn new(filters: Filter) -> Self {
        Self {
            list: Vec::new(),
            loading: false,
            error: None,
            pagination: Pagination::default(),
            filters,
        }
    }
}

pub struct ListController;

impl ListController {
    /// Starts the controller task and returns the first handle to it.
    ///
    /// The first fetch happens one debounce window after spawning. The task
    /// ends once every handle is dropped.
    #[must_use]
    pub fn spawn<T, S>(
        source: S,
        initial_filter: Filter,
        options: ListOptions,
        notifier: Arc<dyn Notifier>,
    ) -> ListHandle<T>
    where
        T: Send + Sync + 'static,
        S: ListSource<T>,
    {
        let filter = initial_filter.with_default_limit(options.default_limit);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ListState::new(filter.clone()));

        tokio::spawn(run(
            Arc::new(source),
            filter,
            options,
            commands_rx,
            state_tx,
            notifier,
        ));

        ListHandle {
            commands: commands_tx,
            state: state_rx,
        }
    }
}

async fn run<T, S>(
    source: Arc<S>,
    mut filter: Filter,
    options: ListOptions,
    mut commands: mpsc::UnboundedReceiver<Filter>,
    state: watch::Sender<ListState<T>>,
    notifier: Arc<dyn Notifier>,
) where
    T: Send + Sync + 'static,
    S: ListSource<T>,
{
    let (results_tx, mut results) =
        mpsc::unbounded_channel::<(u64, Result<Paginated<T>, ApiError>)>();
    let mut issued: u64 = 0;
    let mut applied: u64 = 0;
    let mut in_flight: usize = 0;
    let mut settling = true;
    let deadline = sleep(options.debounce);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(partial) = command else { break };
                filter.merge(partial);
                filter = std::mem::take(&mut filter).with_default_limit(options.default_limit);
                let snapshot = filter.clone();
                state.send_modify(|s| s.filters = snapshot);
                deadline.as_mut().reset(Instant::now() + options.debounce);
                settling = true;
            }
            () = &mut deadline, if settling => {
                settling = false;
                if !options.is_ready(&filter) {
                    tracing::debug!(required = ?options.required_keys, "required filter key missing; fetch skipped");
                    continue;
                }
                issued += 1;
                in_flight += 1;
                state.send_modify(|s| s.loading = true);

                let seq = issued;
                let source = Arc::clone(&source);
                let tx = results_tx.clone();
                let query = filter.clone();
                tokio::spawn(async move {
                    let result = source.fetch(query).await;
                    let _ = tx.send((seq, result));
                });
            }
            Some((seq, result)) = results.recv() => {
                in_flight -= 1;
                let loading = in_flight > 0;
                if seq < applied {
                    tracing::debug!(seq, applied, "stale list response discarded");
                    state.send_modify(|s| s.loading = loading);
                    continue;
                }
                applied = seq;
                match result {
                    Ok(page) => state.send_modify(|s| {
                        s.list = page.body;
                        s.pagination = page.meta.pagination;
                        s.error = None;
                        s.loading = loading;
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, "list fetch failed");
                        notifier.notify(Notice::error(e.to_string()));
                        let message = e.to_string();
                        state.send_modify(|s| {
                            s.error = Some(message);
                            s.loading = loading;
                        });
                    }
                }
            }
        }
    }
}

/// Cheap to clone; every clone drives the same controller.
pub struct ListHandle<T> {
    commands: mpsc::UnboundedSender<Filter>,
    state: watch::Receiver<ListState<T>>,
}

impl<T> Clone for ListHandle<T> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Clone> ListHandle<T> {
    /// Shallow-merges `partial` into the current filter.
    pub fn update_filters(&self, partial: Filter) {
        if self.commands.send(partial).is_err() {
            tracing::debug!("list controller stopped; filter update dropped");
        }
    }

    pub fn on_change_page(&self, page: u32) {
        self.update_filters(Filter::new().with("page", page));
    }

    /// A new search term always starts again from the first page.
    pub fn on_change_search(&self, term: &str) {
        self.update_filters(Filter::new().with("search", term).with("page", 1_u32));
    }

    #[must_use]
    pub fn state(&self) -> ListState<T> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state.clone()
    }

    /// Waits for the next state change. Returns `false` once the controller
    /// has stopped.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
