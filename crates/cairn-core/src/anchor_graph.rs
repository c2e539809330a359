//! Anchored neighbourhood graph assembly
//!
//! The graph around an anchor is the anchor itself, every element anchored
//! to it, and every relationship attached to any of those elements. A
//! relationship joining two anchored elements is discoverable from both
//! ends, so relationships are accumulated in a map keyed by GUID.

use crate::anchor_search::AnchorSearch;
use crate::context::CallContext;
use crate::element::{Element, Guid};
use crate::error::Result;
use crate::query::{Pagination, QueryOptions, SequencingOrder};
use crate::relationship::Relationship;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anchor, its anchored elements and their deduplicated relationships
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnchorGraph {
    /// `None` when the anchor is absent or not visible to the caller
    pub anchor: Option<Element>,

    pub anchored_elements: Vec<Element>,

    /// Most recently created first
    pub relationships: Vec<Relationship>,
}

impl AnchorGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.anchor.is_none()
    }

    pub fn anchored_guids(&self) -> Vec<&Guid> {
        self.anchored_elements.iter().map(|e| &e.guid).collect()
    }

    pub fn relationship(&self, guid: &Guid) -> Option<&Relationship> {
        self.relationships.iter().find(|r| &r.guid == guid)
    }
}

/// Builds [`AnchorGraph`]s from repository primitives
pub struct AnchorGraphAssembler;

impl AnchorGraphAssembler {
    /// Assemble the graph rooted at `anchor_guid`.
    ///
    /// `paging` bounds only the anchored-element fetch; attachment links of
    /// each fetched element are read in full. An anchor the caller cannot
    /// see yields an empty graph; any other repository fault is returned.
    pub async fn build_anchored_graph(
        ctx: &CallContext,
        anchor_guid: &Guid,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<AnchorGraph> {
        options.validate()?;

        tracing::debug!(
            "Building anchored graph: anchor={}, as_of={:?}, effective={:?}, page={}+{}",
            anchor_guid,
            options.as_of_time,
            options.effective_time,
            paging.start_from,
            paging.page_size
        );

        let anchor = match ctx
            .repository
            .get_element_by_guid(&ctx.caller, anchor_guid, options)
            .await
        {
            Ok(Some(anchor)) => anchor,
            Ok(None) => {
                tracing::debug!("Anchor {} not found, returning empty graph", anchor_guid);
                return Ok(AnchorGraph::empty());
            }
            Err(e) if e.is_not_visible() => {
                tracing::warn!(
                    "Anchor {} not visible to {}: {}",
                    anchor_guid,
                    ctx.user_id(),
                    e
                );
                return Ok(AnchorGraph::empty());
            }
            Err(e) => return Err(e),
        };

        let mut accumulator: HashMap<Guid, Relationship> = HashMap::new();
        Self::accumulate_attachment_links(ctx, &anchor.guid, options, &mut accumulator).await?;

        let candidates: Vec<Element> =
            AnchorSearch::find_anchored_to(ctx, &anchor.guid, options, paging)
                .await?
                .into_iter()
                .filter(|e| e.guid != anchor.guid)
                .collect();

        // An element removed or hidden since the search is left out
        let mut anchored_elements = Vec::with_capacity(candidates.len());
        for element in candidates {
            match Self::accumulate_attachment_links(ctx, &element.guid, options, &mut accumulator).await {
                Ok(_) => anchored_elements.push(element),
                Err(e) if e.is_not_visible() => {
                    tracing::warn!("Skipping anchored element {}: {}", element.guid, e);
                }
                Err(e) => return Err(e),
            }
        }

        let mut relationships: Vec<Relationship> = accumulator.into_values().collect();
        relationships.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.guid.cmp(&a.guid))
        });

        tracing::debug!(
            "Anchored graph for {}: {} anchored elements, {} relationships",
            anchor.guid,
            anchored_elements.len(),
            relationships.len()
        );

        Ok(AnchorGraph {
            anchor: Some(anchor),
            anchored_elements,
            relationships,
        })
    }

    /// Read every attachment link of one element into the accumulator.
    /// Returns how many links were new.
    async fn accumulate_attachment_links(
        ctx: &CallContext,
        element_guid: &Guid,
        options: &QueryOptions,
        accumulator: &mut HashMap<Guid, Relationship>,
    ) -> Result<usize> {
        let sequencing = SequencingOrder::CreationDateRecent;
        let mut page = Pagination::max();
        let mut added = 0;

        loop {
            let links = ctx
                .repository
                .get_attachment_links(&ctx.caller, element_guid, None, &sequencing, options, &page)
                .await?;
            let returned = links.len();

            for link in links {
                if !accumulator.contains_key(&link.guid) {
                    accumulator.insert(link.guid.clone(), link);
                    added += 1;
                }
            }

            if page.is_last_page(returned) {
                break;
            }
            page = page.next();
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let graph = AnchorGraph::empty();
        assert!(graph.is_empty());
        assert!(graph.anchored_guids().is_empty());
        assert!(graph.relationships.is_empty());
    }
}
