use crate::config::{PROGRESS_INTERVAL, REDIRECT_MAX_DEPTH};
use crate::content::extract_links;
use crate::models::{PageKind, WikiPage};
use crate::registry::TitleRegistry;
use crate::stats::{human_duration, ExtractStats};
use anyhow::Result;
use indicatif::ProgressBar;
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::{info, warn};

/// Accumulates the link graph over one streaming pass.
///
/// Pages arrive in arbitrary order relative to their redirects and incoming
/// links, so redirects whose title already holds an ID cannot be resolved
/// eagerly; they are parked in `redirects` and collapsed by [`finish`] once
/// the full ID space is known.
///
/// [`finish`]: GraphBuilder::finish
pub struct GraphBuilder {
    registry: TitleRegistry,
    adjacency: FxHashMap<u32, Vec<u32>>,
    redirects: FxHashMap<u32, u32>,
    stats: ExtractStats,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            registry: TitleRegistry::new(),
            adjacency: FxHashMap::default(),
            redirects: FxHashMap::default(),
            stats: ExtractStats::default(),
        }
    }

    /// Drains `pages` into the builder, stopping early at `limit` pages.
    ///
    /// Emits progress every [`PROGRESS_INTERVAL`] pages; a failed page read
    /// aborts the pass with the parse error.
    pub fn ingest<I>(&mut self, pages: I, limit: Option<u64>) -> Result<()>
    where
        I: IntoIterator<Item = Result<WikiPage>>,
    {
        let pb = ProgressBar::new_spinner();
        let start = Instant::now();
        let mut interval_start = Instant::now();

        for page in pages {
            self.add_page(page?);

            if self.stats.pages % PROGRESS_INTERVAL == 0 {
                pb.tick();
                let now = Instant::now();
                info!(
                    pages = self.stats.pages,
                    interval_secs = now.duration_since(interval_start).as_secs_f64(),
                    elapsed = %human_duration(start.elapsed()),
                    "Progress"
                );
                interval_start = now;
            }

            if let Some(limit) = limit {
                if self.stats.pages >= limit {
                    info!(limit, "Page limit reached, stopping stream");
                    break;
                }
            }
        }

        pb.finish_and_clear();
        Ok(())
    }

    pub fn add_page(&mut self, page: WikiPage) {
        self.stats.pages += 1;
        match page.kind {
            PageKind::Redirect(target) => self.add_redirect(page.title, target),
            PageKind::Article(text) => self.add_article(page.title, &text),
        }
    }

    fn add_redirect(&mut self, title: String, target: String) {
        self.stats.redirects += 1;
        let actual_id = self.registry.get_or_assign(&target);

        match self.registry.id_of(&title) {
            // Nothing ever linked to the redirect title: it never needs an
            // ID of its own, it just resolves to the target's.
            None => self.registry.alias(title, actual_id),
            // Something linked to the redirect title before this page was
            // parsed, so an ID is already in circulation. Park it for the
            // finalization rewrite.
            Some(redirected_id) if redirected_id != actual_id => {
                self.redirects.insert(redirected_id, actual_id);
                self.stats.deferred_redirects += 1;
            }
            Some(_) => {}
        }
    }

    fn add_article(&mut self, title: String, text: &str) {
        self.stats.articles += 1;
        let title_id = self.registry.get_or_assign(&title);

        let targets: Vec<u32> = extract_links(text)
            .map(|target| self.registry.get_or_assign(target))
            .collect();
        self.stats.links += targets.len() as u64;

        self.adjacency.insert(title_id, targets);
    }

    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    /// Runs the deferred redirect resolution and returns the finished graph.
    ///
    /// Rewrites every adjacency entry and forward registry entry that points
    /// at a redirected ID, and purges redirected IDs from the reverse
    /// registry direction -- after this, redirected IDs no longer denote
    /// addressable pages.
    pub fn finish(mut self) -> LinkGraph {
        self.resolve_chains();

        for targets in self.adjacency.values_mut() {
            for id in targets.iter_mut() {
                if let Some(&actual) = self.redirects.get(id) {
                    *id = actual;
                }
            }
        }

        let redirected_ids: Vec<u32> = self.redirects.keys().copied().collect();
        for id in redirected_ids {
            self.registry.remove_id(id);
        }

        self.registry.rewrite_ids(&self.redirects);

        info!(
            nodes = self.registry.id_count(),
            pages_with_links = self.adjacency.len(),
            redirects_rewritten = self.redirects.len(),
            "Redirects resolved"
        );

        LinkGraph {
            registry: self.registry,
            adjacency: self.adjacency,
            stats: self.stats,
        }
    }

    /// Collapses redirect chains (A points at B, B points at C) so every map
    /// value is a final target. Chains deeper than [`REDIRECT_MAX_DEPTH`] --
    /// including cycles -- stop at their last resolved hop.
    fn resolve_chains(&mut self) {
        let keys: Vec<u32> = self.redirects.keys().copied().collect();
        for key in keys {
            let mut target = self.redirects[&key];
            let mut depth = 0;
            while let Some(&next) = self.redirects.get(&target) {
                depth += 1;
                if depth > REDIRECT_MAX_DEPTH {
                    warn!(from = key, "Redirect chain too deep, stopping at last hop");
                    break;
                }
                target = next;
            }
            self.redirects.insert(key, target);
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The finished, redirect-free link graph.
pub struct LinkGraph {
    pub registry: TitleRegistry,
    pub adjacency: FxHashMap<u32, Vec<u32>>,
    pub stats: ExtractStats,
}

impl LinkGraph {
    pub fn node_count(&self) -> usize {
        self.registry.id_count()
    }

    pub fn edge_count(&self) -> u64 {
        self.adjacency.values().map(|v| v.len() as u64).sum()
    }
}

/// Streams `pages` through a [`GraphBuilder`] and finalizes in one call.
pub fn build_graph<I>(pages: I, limit: Option<u64>) -> Result<LinkGraph>
where
    I: IntoIterator<Item = Result<WikiPage>>,
{
    let mut builder = GraphBuilder::new();
    builder.ingest(pages, limit)?;
    Ok(builder.finish())
}
