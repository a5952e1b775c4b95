//! Process-scoped cache of the authorization server's signing keys
//!
//! The cache holds the whole key mapping behind an [`ArcSwap`] so a refresh
//! is an atomic replacement of the entire set. Concurrent readers always see
//! either the old mapping or the new one, never a partial update. Duplicate
//! concurrent refreshes are wasteful but harmless.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use reqwest::{
    header::{self, HeaderValue},
    Client, StatusCode,
};

use super::{
    error::AuthError,
    jwks::{Jwk, Jwks, KeyId, KeyIdRef},
};

#[derive(Debug, Default)]
struct CachedKeys {
    keys: HashMap<KeyId, Jwk>,
    etag: Option<HeaderValue>,
    last_modified: Option<HeaderValue>,
}

impl From<Jwks> for CachedKeys {
    fn from(jwks: Jwks) -> Self {
        let keys = jwks
            .into_keys()
            .into_iter()
            .map(|key| (key.kid().to_owned(), key))
            .collect();

        Self {
            keys,
            etag: None,
            last_modified: None,
        }
    }
}

#[derive(Debug)]
struct RemoteSource {
    url: String,
    client: Client,
}

// Caps how often a burst of unknown key ids can hit the remote source.
const MISS_REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Inner {
    cached: ArcSwap<CachedKeys>,
    remote: Option<RemoteSource>,
    last_miss_refresh: Mutex<Option<Instant>>,
}

/// A shared, refreshable set of trusted signing keys
///
/// Cheap to clone; all clones share the same underlying cache. Entries live
/// for the process lifetime and are only ever replaced wholesale.
#[derive(Clone, Debug)]
#[must_use]
pub struct KeyStore {
    inner: Arc<Inner>,
}

impl KeyStore {
    /// Constructs a key store over a fixed, local key set
    pub fn new(jwks: Jwks) -> Self {
        Self {
            inner: Arc::new(Inner {
                cached: ArcSwap::from_pointee(CachedKeys::from(jwks)),
                remote: None,
                last_miss_refresh: Mutex::new(None),
            }),
        }
    }

    /// Constructs a key store backed by a remote JWKS document
    ///
    /// The initial fetch happens eagerly so a misconfigured source fails at
    /// startup instead of on the first request. All fetches are bounded by
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial fetch fails or the document is
    /// malformed.
    pub async fn from_url(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("barkeep/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        let store = Self {
            inner: Arc::new(Inner {
                cached: ArcSwap::from_pointee(CachedKeys::default()),
                remote: Some(RemoteSource {
                    url: url.into(),
                    client,
                }),
                last_miss_refresh: Mutex::new(None),
            }),
        };

        store.refresh().await?;

        Ok(store)
    }

    /// Looks up a key by id in the current cache
    #[must_use]
    pub fn get(&self, kid: &KeyIdRef) -> Option<Jwk> {
        self.inner.cached.load().keys.get(kid).cloned()
    }

    /// Looks up a key by id, refreshing from the remote source on a miss
    ///
    /// At most one on-demand refresh is attempted per lookup, and misses
    /// within [`MISS_REFRESH_COOLDOWN`] of the previous on-demand refresh
    /// skip the fetch entirely, so a burst of tokens naming unknown key ids
    /// cannot turn into a fetch per request. There is no fallback to "try
    /// all keys".
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeySetUnavailable`] if the refresh fails and
    /// [`AuthError::UnknownKey`] if no matching key exists afterwards.
    pub(crate) async fn get_or_refresh(&self, kid: &KeyIdRef) -> Result<Jwk, AuthError> {
        if let Some(key) = self.get(kid) {
            return Ok(key);
        }

        if self.inner.remote.is_some() {
            if !self.miss_refresh_permitted() {
                tracing::debug!(%kid, "unknown key id within refresh cooldown");
                return Err(AuthError::UnknownKey);
            }

            self.refresh().await.map_err(|err| {
                tracing::warn!(error = %err, "key set refresh failed");
                AuthError::KeySetUnavailable
            })?;

            if let Some(key) = self.get(kid) {
                return Ok(key);
            }
        }

        tracing::debug!(%kid, "no key in the key set matches the token");
        Err(AuthError::UnknownKey)
    }

    /// Claims the miss-refresh slot if the cooldown has elapsed
    ///
    /// A failed refresh still consumes the slot; an unreachable source
    /// should not be hammered either.
    fn miss_refresh_permitted(&self) -> bool {
        let mut last = self.inner.last_miss_refresh.lock();
        match *last {
            Some(at) if at.elapsed() < MISS_REFRESH_COOLDOWN => false,
            _ => {
                *last = Some(Instant::now());
                true
            }
        }
    }

    /// Replaces the cached key set
    pub fn set_keys(&self, jwks: Jwks) {
        self.inner.cached.store(Arc::new(CachedKeys::from(jwks)));
    }

    /// Refreshes the key set from the remote source
    ///
    /// Uses conditional request headers when the source supplied them. On
    /// failure the cached set is left unchanged; no retries are attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreachable, responds with an
    /// error status, or returns a malformed document.
    #[tracing::instrument(skip(self), fields(jwks.url = tracing::field::Empty))]
    pub async fn refresh(&self) -> Result<(), reqwest::Error> {
        let Some(remote) = &self.inner.remote else {
            return Ok(());
        };

        tracing::Span::current().record("jwks.url", remote.url.as_str());
        tracing::debug!("refreshing key set");

        let mut request = remote.client.get(&remote.url);

        {
            let cached = self.inner.cached.load();
            if let Some(etag) = &cached.etag {
                request = request.header(header::IF_NONE_MATCH, etag);
            } else if let Some(last_modified) = &cached.last_modified {
                request = request.header(header::IF_MODIFIED_SINCE, last_modified);
            }
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            tracing::debug!("key set not modified");
            return Ok(());
        } else if let Err(err) = response.error_for_status_ref() {
            tracing::warn!(
                http.status_code = response.status().as_u16(),
                "key set refresh failed; unexpected response status",
            );
            return Err(err);
        }

        let etag = response.headers().get(header::ETAG).map(ToOwned::to_owned);
        let last_modified = response
            .headers()
            .get(header::LAST_MODIFIED)
            .map(ToOwned::to_owned);

        let jwks = response.json::<Jwks>().await?;

        let mut cached = CachedKeys::from(jwks);
        cached.etag = etag;
        cached.last_modified = last_modified;

        let count = cached.keys.len();
        self.inner.cached.store(Arc::new(cached));
        tracing::info!(jwks.keys = count, "key set refreshed");

        Ok(())
    }

    /// Spawns a background task that refreshes the key set on an interval
    ///
    /// Refresh failures are ignored; the next tick tries again.
    pub fn spawn_refresh(&self, interval: Duration) {
        let this = self.clone();

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await;

            loop {
                timer.tick().await;
                let _ = this.refresh().await;
            }
        });
    }
}
