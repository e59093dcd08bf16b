/// Suggestion pool service
///
/// Owns at most one materialized pool of catalog items at a time, keyed by
/// the exact filter set it was built for. A pool is built by sweeping the
/// discovery endpoint page by page (bounded, batched), deduplicating by id
/// and shuffling; selection then serves the first item the caller has not
/// seen yet, recycling from the start once the whole pool has been shown.
use crate::{
    error::AppResult,
    models::{CatalogItem, ContentKind, FilterSet, TitleDetails},
    services::catalog::{CatalogProvider, SortKey},
};
use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Hard cap on pages fetched per sweep, bounding worst-case remote calls
const MAX_PAGES: u32 = 50;
/// Pages fetched concurrently per batch
const PAGE_BATCH: usize = 5;
/// How many unseen candidates a miniseries selection will verify via details
const MINISERIES_PROBE_LIMIT: usize = 5;
/// A single-season show with more episodes than this is a regular series
const MINISERIES_MAX_EPISODES: u32 = 12;

/// One materialized pool and the filter set that produced it
struct Pool {
    filters: FilterSet,
    items: Vec<CatalogItem>,
    built_at: DateTime<Utc>,
}

struct PoolState {
    pool: Option<Pool>,
    rng: StdRng,
}

/// Serves random, non-repeating content suggestions
///
/// All mutation happens under one async lock, so a build in progress is a
/// suspend point concurrent callers converge on instead of triggering a
/// second redundant sweep, and the pool/key pair is always replaced as one
/// unit.
pub struct SuggestionService {
    catalog: Arc<dyn CatalogProvider>,
    state: Mutex<PoolState>,
}

impl SuggestionService {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self::with_rng(catalog, StdRng::from_os_rng())
    }

    /// Creates a service with an explicit random source, for deterministic tests
    pub fn with_rng(catalog: Arc<dyn CatalogProvider>, rng: StdRng) -> Self {
        Self {
            catalog,
            state: Mutex::new(PoolState { pool: None, rng }),
        }
    }

    /// Returns one suggestion matching the filters, avoiding already-shown ids
    ///
    /// Reuses the cached pool when the filters are unchanged; otherwise the
    /// previous pool is discarded and a fresh sweep runs. `Ok(None)` means the
    /// filters currently match nothing, which is a valid outcome and distinct
    /// from a failed catalog request.
    pub async fn random_suggestion(
        &self,
        filters: &FilterSet,
        shown_ids: &[u64],
    ) -> AppResult<Option<CatalogItem>> {
        let mut state = self.state.lock().await;

        let reusable = state
            .pool
            .as_ref()
            .is_some_and(|pool| pool.filters == *filters);

        if reusable {
            // Pool key matches; skip straight to selection
            if let Some(pool) = state.pool.as_ref() {
                tracing::debug!(
                    pool_size = pool.items.len(),
                    built_at = %pool.built_at,
                    "Reusing cached suggestion pool"
                );
            }
        } else {
            // Any filter change discards the old pool wholesale. Dropping it
            // before the sweep keeps the state empty if page 1 fails.
            state.pool = None;
            let PoolState { pool, rng } = &mut *state;
            *pool = Some(Self::build_pool(&self.catalog, filters, rng).await?);
        }

        let Some(pool) = state.pool.as_ref() else {
            return Ok(None);
        };
        self.select(pool, shown_ids).await
    }

    /// Forces the service back to its empty state, independent of filters
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        if state.pool.take().is_some() {
            tracing::info!("Suggestion pool cleared");
        }
    }

    /// Sweeps the discovery endpoint and materializes a pool
    ///
    /// Page 1 failures propagate; failures on later pages only truncate the
    /// sweep, keeping everything already gathered.
    async fn build_pool(
        catalog: &Arc<dyn CatalogProvider>,
        filters: &FilterSet,
        rng: &mut StdRng,
    ) -> AppResult<Pool> {
        let sort = SortKey::choose(rng);

        let first = catalog.discover(filters, 1, sort).await?;
        let total_pages = first.total_pages.min(MAX_PAGES);
        let mut items = first.items;

        if !items.is_empty() && total_pages > 1 {
            let pages: Vec<u32> = (2..=total_pages).collect();
            for batch in pages.chunks(PAGE_BATCH) {
                let mut tasks = Vec::with_capacity(batch.len());
                for &page in batch {
                    let catalog = Arc::clone(catalog);
                    let filters = filters.clone();
                    tasks.push((
                        page,
                        tokio::spawn(async move { catalog.discover(&filters, page, sort).await }),
                    ));
                }

                let mut batch_failed = false;
                for (page, task) in tasks {
                    match task.await {
                        Ok(Ok(fetched)) => items.extend(fetched.items),
                        Ok(Err(error)) => {
                            tracing::warn!(page = page, error = %error, "Page fetch failed, truncating sweep");
                            batch_failed = true;
                        }
                        Err(error) => {
                            tracing::warn!(page = page, error = %error, "Page task join error, truncating sweep");
                            batch_failed = true;
                        }
                    }
                }

                if batch_failed {
                    break;
                }
            }
        }

        let fetched = items.len();
        let mut seen = HashSet::with_capacity(items.len());
        items.retain(|item| seen.insert(item.id));

        items.shuffle(rng);

        tracing::info!(
            pool_size = items.len(),
            duplicates = fetched - items.len(),
            pages = total_pages,
            sort = ?sort,
            "Suggestion pool built"
        );

        Ok(Pool {
            filters: filters.clone(),
            items,
            built_at: Utc::now(),
        })
    }

    /// Picks the first pool item absent from the caller's shown history
    async fn select(&self, pool: &Pool, shown_ids: &[u64]) -> AppResult<Option<CatalogItem>> {
        if pool.items.is_empty() {
            tracing::debug!("Pool is empty, nothing to suggest");
            return Ok(None);
        }

        let shown: HashSet<u64> = shown_ids.iter().copied().collect();
        let unseen: Vec<&CatalogItem> = pool
            .items
            .iter()
            .filter(|item| !shown.contains(&item.id))
            .collect();

        if unseen.is_empty() {
            // History covers the whole pool: recycle from the start
            tracing::debug!(pool_size = pool.items.len(), "History exhausted the pool, recycling");
            return Ok(pool.items.first().cloned());
        }

        if pool.filters.kind == ContentKind::Miniseries {
            for candidate in unseen.iter().take(MINISERIES_PROBE_LIMIT) {
                match self
                    .catalog
                    .details(ContentKind::Miniseries, candidate.id)
                    .await
                {
                    Ok(details) if classifies_as_miniseries(&details) => {
                        return Ok(Some((*candidate).clone()));
                    }
                    Ok(details) => {
                        tracing::debug!(
                            id = candidate.id,
                            seasons = ?details.number_of_seasons,
                            episodes = ?details.number_of_episodes,
                            "Candidate is not a miniseries, probing next"
                        );
                    }
                    Err(error) => {
                        tracing::warn!(id = candidate.id, error = %error, "Detail probe failed, skipping candidate");
                    }
                }
            }
            // No candidate verified within the probe budget; serve the first
            // unseen one rather than failing the request.
        }

        Ok(unseen.first().map(|item| (*item).clone()))
    }
}

/// Detail-based miniseries classification: exactly one season and a bounded
/// episode count. Shows without an episode count pass on the season check.
fn classifies_as_miniseries(details: &TitleDetails) -> bool {
    details.number_of_seasons == Some(1)
        && details
            .number_of_episodes
            .map_or(true, |count| count <= MINISERIES_MAX_EPISODES)
}
