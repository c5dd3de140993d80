//! Per-user session context.
//!
//! A [`Session`] owns everything that used to be ambient global state in a
//! storefront UI: the HTTP client with its cookie jar, the read-replica cache
//! of the user's cart and wishlist, the location table and an event bus. It is
//! created when the user's session starts and torn down on logout. Stores are
//! cheap handles obtained from it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use moka::future::Cache;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use giftshop_core::User;

use crate::address::AddressResolver;
use crate::cache::{CacheKey, CacheValue};
use crate::cart::CartStore;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::ApiClient;
use crate::mutation::MutationTracker;
use crate::notice::Notice;
use crate::telemetry;
use crate::wishlist::WishlistStore;

const EVENT_CAPACITY: usize = 64;
const CACHE_CAPACITY: u64 = 1000;

/// Signals broadcast to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// The cached cart is stale; re-read it.
    CartInvalidated,
    /// The cached wishlist is stale; re-read it.
    WishlistInvalidated,
    /// A mutation failed and the user should see this notice.
    Notice(Notice),
    /// A request was rejected with 401 and local auth state was cleared.
    SessionExpired,
    /// Navigate to the login entry point.
    RedirectToLogin {
        /// Path of the login page.
        path: String,
    },
    /// The session was torn down by the user.
    LoggedOut,
}

/// Session context shared by all stores.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
    events: broadcast::Sender<StoreEvent>,
    address: AddressResolver,
    cart_mutations: MutationTracker,
    wishlist_mutations: MutationTracker,
    redirect_scheduled: AtomicBool,
}

impl Session {
    /// Start a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn start(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();
        let api = ApiClient::new(config)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(SessionInner {
                api,
                cache,
                events,
                address: AddressResolver::new(),
                cart_mutations: MutationTracker::default(),
                wishlist_mutations: MutationTracker::default(),
                redirect_scheduled: AtomicBool::new(false),
            }),
        })
    }

    /// The REST client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.inner.api.config()
    }

    /// Subscribe to store events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Cart store bound to this session.
    #[must_use]
    pub fn cart(&self) -> CartStore {
        CartStore::new(self.clone())
    }

    /// Wishlist store bound to this session.
    #[must_use]
    pub fn wishlist(&self) -> WishlistStore {
        WishlistStore::new(self.clone())
    }

    /// Address resolver for this session.
    #[must_use]
    pub fn address(&self) -> &AddressResolver {
        &self.inner.address
    }

    /// Load the location table from the configured URL into the resolver.
    pub async fn load_address_data(&self) {
        self.inner
            .address
            .load_from_url(&self.inner.api, &self.config().address_data_url)
            .await;
    }

    pub(crate) fn cart_mutations(&self) -> &MutationTracker {
        &self.inner.cart_mutations
    }

    pub(crate) fn wishlist_mutations(&self) -> &MutationTracker {
        &self.inner.wishlist_mutations
    }

    // =========================================================================
    // Cache
    // =========================================================================

    pub(crate) async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let value = self.inner.cache.get(key).await;
        if value.is_some() {
            debug!(key = ?key, "Cache hit");
        }
        value
    }

    pub(crate) async fn store(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    pub(crate) async fn invalidate(&self, key: &CacheKey) {
        self.inner.cache.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    pub(crate) fn emit(&self, event: StoreEvent) {
        // No subscribers is fine; the event is simply dropped.
        let _ = self.inner.events.send(event);
    }

    // =========================================================================
    // Auth state
    // =========================================================================

    /// Fetch the signed-in user, or `None` if there is no valid session.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than 401.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<Option<User>> {
        if let Some(CacheValue::User(user)) = self.cached(&CacheKey::CurrentUser).await {
            return Ok(Some(*user));
        }

        match self.inner.api.get_json::<User>("api/auth/user").await {
            Ok(user) => {
                telemetry::set_sentry_user(&user);
                self.store(CacheKey::CurrentUser, CacheValue::User(Box::new(user.clone())))
                    .await;
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized { .. }) => {
                self.invalidate(&CacheKey::CurrentUser).await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The cached user, without touching the network.
    pub async fn cached_user(&self) -> Option<User> {
        match self.cached(&CacheKey::CurrentUser).await {
            Some(CacheValue::User(user)) => Some(*user),
            _ => None,
        }
    }

    /// Handle a 401: clear local auth state and schedule the login redirect.
    ///
    /// Repeated expiries while a redirect is already scheduled do not schedule
    /// another one.
    pub async fn expire(&self) {
        tracing::warn!("Session expired, clearing local auth state");
        self.invalidate_all().await;
        telemetry::clear_sentry_user();
        self.emit(StoreEvent::SessionExpired);

        if self.inner.redirect_scheduled.swap(true, Ordering::AcqRel) {
            return;
        }

        let session = self.clone();
        let delay = self.config().redirect_delay;
        let path = self.config().login_path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.inner.redirect_scheduled.store(false, Ordering::Release);
            tracing::info!(path = %path, "Redirecting to login");
            session.emit(StoreEvent::RedirectToLogin { path });
        });
    }

    /// Tear down the session's cached state.
    pub async fn logout(&self) {
        self.invalidate_all().await;
        telemetry::clear_sentry_user();
        self.emit(StoreEvent::LoggedOut);
        tracing::info!("Session torn down");
    }
}
