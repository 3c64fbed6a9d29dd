//! Search orchestration: enumerate, score, deduplicate, materialize.
//!
//! Only the strategies that end up in a returned list get their P&L curve
//! recomputed; everything upstream works on aggregates.

mod request;
mod response;

use std::time::Instant;

use tracing::{info, info_span};
use uuid::Uuid;

pub use request::{DEFAULT_DEDUP_OVERSAMPLE, DEFAULT_TOP_N, SearchRequest};
pub use response::{RankedList, RankedStrategy, SearchResponse};

use crate::cancel::CancelFlag;
use crate::dedup::remove_duplicates;
use crate::enumerator::{ParallelConfig, collect_candidates};
use crate::error::SearchError;
use crate::evaluator::Candidate;
use crate::observability::{record_rejections, record_search, record_units_evaluated};
use crate::scoring::{RankedIndex, Ranking, score_pool};
use crate::universe::UniverseCache;

/// Run one search against `cache`.
///
/// The stop flag is polled but never reset here.
///
/// # Errors
///
/// Precondition failures from [`SearchRequest::validate`],
/// [`SearchError::Cancelled`] if the flag is raised, or
/// [`SearchError::ThreadPool`].
pub fn run_search(
    cache: &UniverseCache,
    request: &SearchRequest,
    cancel: &CancelFlag,
    parallel: &ParallelConfig,
) -> Result<SearchResponse, SearchError> {
    let search_id = Uuid::new_v4();
    let span = info_span!(
        "search",
        %search_id,
        mode = %request.mode,
        max_legs = request.max_legs,
        universe = cache.len()
    );
    let _guard = span.enter();
    let started = Instant::now();

    let result = execute(search_id, cache, request, cancel, parallel);
    let elapsed = started.elapsed();

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) if e.is_cancelled() => "cancelled",
        Err(e) => e.code().reason(),
    };
    record_search(request.mode.as_str(), outcome, elapsed.as_secs_f64());

    result.map(|mut response| {
        response.elapsed_ms = elapsed.as_millis() as u64;
        info!(
            candidates = response.n_candidates,
            weight_sets = response.n_weight_sets,
            elapsed_ms = response.elapsed_ms,
            "Search complete"
        );
        response
    })
}

fn execute(
    search_id: Uuid,
    cache: &UniverseCache,
    request: &SearchRequest,
    cancel: &CancelFlag,
    parallel: &ParallelConfig,
) -> Result<SearchResponse, SearchError> {
    let configs = request.validate(cache.len())?;

    let pool = collect_candidates(
        cache,
        &request.constraints,
        request.max_legs,
        request.mode,
        cancel,
        parallel,
    )?;
    record_units_evaluated(pool.diagnostics.units_evaluated);
    record_rejections(&pool.diagnostics.rejections);

    let scored = score_pool(&pool.candidates, &configs, request.retained_per_ranking());
    let per_set = scored
        .per_set
        .into_iter()
        .map(|ranking| materialize(cache, &pool.candidates, ranking, request))
        .collect();
    let consensus = materialize(cache, &pool.candidates, scored.consensus, request);

    Ok(SearchResponse {
        search_id,
        per_set,
        consensus,
        n_candidates: pool.len(),
        n_weight_sets: configs.len(),
        diagnostics: pool.diagnostics,
        elapsed_ms: 0,
    })
}

/// Dedup (optionally), cut to `top_n`, re-rank 1..n and build curves.
fn materialize(
    cache: &UniverseCache,
    candidates: &[Candidate],
    ranking: Ranking,
    request: &SearchRequest,
) -> RankedList {
    let entries: Vec<(RankedIndex, &Candidate)> = ranking
        .entries
        .into_iter()
        .map(|e| (e, &candidates[e.index]))
        .collect();

    let kept = if request.dedup {
        remove_duplicates(entries, request.top_n, |item| item.1)
    } else {
        let mut entries = entries;
        entries.truncate(request.top_n);
        entries
    };

    let strategies = kept
        .into_iter()
        .enumerate()
        .map(|(i, (entry, candidate))| RankedStrategy::build(cache, candidate, i + 1, entry.score))
        .collect();

    RankedList {
        name: ranking.name,
        strategies,
    }
}
