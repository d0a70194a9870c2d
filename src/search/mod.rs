// Quarry's Search Module - the Butler
//
// Ranked, exact-match search over the content store: classify the query,
// over-fetch full-text matches, re-rank through the boost pipeline and group
// the survivors by curated room.

pub mod query;
pub mod rooms;
pub mod scoring;
pub mod tokenizer;

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::database::ContentStore;
use crate::error::{QuarryError, Result};
use crate::fuzzy;
use crate::workspace::Workspace;

pub use query::{PreparedQuery, QueryKind};
pub use rooms::{ManifestDecoder, Room, RoomManifest, TomlManifestDecoder};
pub use scoring::{Boost, BoostInput, BoostPipeline};

/// Hard ceiling on results per query
pub const MAX_LIMIT: usize = 50;

/// Candidates fetched per requested result before re-ranking
pub const OVERFETCH_FACTOR: usize = 3;

/// A ranked chunk match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub path: String,
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub snippet: String,
    pub score: f64,
    pub room: Option<String>,
    pub is_entry: bool,
    /// Boosts that fired, in pipeline order
    pub boosts: Vec<String>,
}

/// Results sharing a room, in ranked order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchGroup {
    /// `None` for ungrouped results
    pub room: Option<String>,
    pub summary: Option<String>,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub kind: Option<QueryKind>,
    pub total: usize,
    pub groups: Vec<SearchGroup>,
    /// Near-miss room names when the room filter matched nothing declared
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub room_suggestions: Vec<String>,
}

impl SearchResponse {
    fn empty(query: &str, kind: Option<QueryKind>) -> Self {
        Self {
            query: query.to_string(),
            kind,
            total: 0,
            groups: Vec::new(),
            room_suggestions: Vec::new(),
        }
    }

    /// Every result, group by group
    pub fn results(&self) -> impl Iterator<Item = &SearchResult> {
        self.groups.iter().flat_map(|g| g.results.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Ranked search engine over one workspace's content store
pub struct Butler<'a> {
    store: &'a ContentStore,
    root: PathBuf,
    manifest: RoomManifest,
    pipeline: BoostPipeline,
    default_limit: usize,
}

impl<'a> Butler<'a> {
    /// Build a search engine for `workspace`, decoding its rooms manifest with `decoder`
    pub fn open(
        workspace: &Workspace,
        store: &'a ContentStore,
        decoder: &dyn ManifestDecoder,
    ) -> Result<Self> {
        let manifest = RoomManifest::load(&workspace.rooms_path(), decoder)?;
        Ok(Self::new(
            store,
            workspace.root.clone(),
            manifest,
            workspace.config.search.default_limit,
        ))
    }

    pub fn new(
        store: &'a ContentStore,
        root: PathBuf,
        manifest: RoomManifest,
        default_limit: usize,
    ) -> Self {
        Self {
            store,
            root,
            manifest,
            pipeline: BoostPipeline::default(),
            default_limit: default_limit.clamp(1, MAX_LIMIT),
        }
    }

    /// 0 means the configured default; anything above [`MAX_LIMIT`] is clamped
    pub fn effective_limit(&self, limit: usize) -> usize {
        if limit == 0 {
            self.default_limit
        } else {
            limit.min(MAX_LIMIT)
        }
    }

    /// Search the index
    ///
    /// Blank queries return an empty response. An unknown `room_filter` also
    /// returns empty, with near-miss room names in `room_suggestions`.
    pub fn search(
        &self,
        query: &str,
        limit: usize,
        room_filter: Option<&str>,
    ) -> Result<SearchResponse> {
        let Some(prepared) = query::prepare(query) else {
            debug!("Blank query, nothing to search");
            return Ok(SearchResponse::empty(query, None));
        };

        if self.store.latest_scan()?.is_none() {
            return Err(QuarryError::NotIndexed {
                root: self.root.clone(),
            });
        }

        if let Some(room) = room_filter {
            if !self.manifest.has_room(room) {
                let mut response = SearchResponse::empty(query, Some(prepared.kind));
                response.room_suggestions = fuzzy::suggestions(room, self.manifest.room_names());
                debug!(
                    "Unknown room '{}', suggestions: {:?}",
                    room, response.room_suggestions
                );
                return Ok(response);
            }
        }

        let limit = self.effective_limit(limit);
        let hits = self
            .store
            .search_chunks(&prepared.fts, limit * OVERFETCH_FACTOR)?;
        let fetched = hits.len();

        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .filter_map(|hit| {
                let room = self.manifest.assign(&hit.path).map(str::to_string);
                if room_filter.is_some() && room.as_deref() != room_filter {
                    return None;
                }

                let is_entry = self.manifest.is_entry_point(&hit.path);
                let (score, boosts) = self.pipeline.apply(
                    -hit.rank,
                    &BoostInput {
                        path: &hit.path,
                        is_entry,
                        query: &prepared.normalized,
                        words: &prepared.words,
                    },
                );

                Some(SearchResult {
                    path: hit.path,
                    chunk_index: hit.chunk_index,
                    start_line: hit.start_line,
                    end_line: hit.end_line,
                    snippet: hit.snippet,
                    score,
                    room,
                    is_entry,
                    boosts: boosts.into_iter().map(str::to_string).collect(),
                })
            })
            .collect();

        // Stable: equal scores keep the store's (rank, path, chunk) order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);

        let total = results.len();
        let groups = self.group(results);

        info!(
            "🔍 '{}' ({:?}): {} of {} fetched results in {} groups",
            prepared.normalized,
            prepared.kind,
            total,
            fetched,
            groups.len()
        );

        Ok(SearchResponse {
            query: query.to_string(),
            kind: Some(prepared.kind),
            total,
            groups,
            room_suggestions: Vec::new(),
        })
    }

    /// Group ranked results by room, rooms in first-seen order
    fn group(&self, results: Vec<SearchResult>) -> Vec<SearchGroup> {
        let mut groups: Vec<SearchGroup> = Vec::new();
        for result in results {
            match groups.iter_mut().find(|g| g.room == result.room) {
                Some(group) => group.results.push(result),
                None => groups.push(SearchGroup {
                    summary: result
                        .room
                        .as_deref()
                        .and_then(|room| self.manifest.summary(room))
                        .map(str::to_string),
                    room: result.room.clone(),
                    results: vec![result],
                }),
            }
        }
        groups
    }
}
