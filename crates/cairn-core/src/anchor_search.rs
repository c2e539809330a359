//! Searches restricted by anchor, anchor domain or anchor scope

use crate::conditions::SearchConditionBuilder;
use crate::context::CallContext;
use crate::element::{Element, Guid};
use crate::error::Result;
use crate::limits::{validate_required_name, validate_search_string};
use crate::query::{FindQuery, Pagination, QueryOptions, SequencingOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One anchor and the elements anchored to it that matched a search.
/// Presentation only; never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorSearchMatches {
    pub anchor: Element,
    pub matches: Vec<Element>,
}

pub struct AnchorSearch;

impl AnchorSearch {
    /// Every element whose `Anchors` classification points at `anchor_guid`
    pub async fn find_anchored_to(
        ctx: &CallContext,
        anchor_guid: &Guid,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        let query = FindQuery::new()
            .with_classifications(SearchConditionBuilder::anchored_to(anchor_guid));

        ctx.repository
            .find_elements(&ctx.caller, &query, options, paging)
            .await
    }

    /// Text search over elements anchored within `domain_name`, grouped by
    /// anchor in first-match order. Groups whose anchor the caller cannot
    /// see are dropped.
    pub async fn find_in_anchor_domain(
        ctx: &CallContext,
        search_string: Option<&str>,
        domain_name: &str,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<AnchorSearchMatches>> {
        validate_required_name("anchorDomainName", domain_name)?;
        if let Some(search_string) = search_string {
            validate_search_string(search_string)?;
        }
        options.validate()?;

        let query = FindQuery::new()
            .with_properties(SearchConditionBuilder::default_text_search(search_string))
            .with_classifications(SearchConditionBuilder::anchor_domain(Some(domain_name)))
            .sequenced_by(SequencingOrder::Any);

        let matches = ctx
            .repository
            .find_elements(&ctx.caller, &query, options, paging)
            .await?;

        tracing::debug!(
            "Anchor domain search '{}' in {} matched {} elements",
            search_string.unwrap_or_default(),
            domain_name,
            matches.len()
        );

        let mut order: Vec<Guid> = Vec::new();
        let mut groups: HashMap<Guid, Vec<Element>> = HashMap::new();
        for element in matches {
            let Some(anchor) = element.anchor() else {
                continue;
            };
            groups
                .entry(anchor.anchor_guid.clone())
                .or_insert_with(|| {
                    order.push(anchor.anchor_guid.clone());
                    Vec::new()
                })
                .push(element);
        }

        let mut results = Vec::with_capacity(order.len());
        for anchor_guid in order {
            let anchor = match ctx
                .repository
                .get_element_by_guid(&ctx.caller, &anchor_guid, options)
                .await
            {
                Ok(Some(anchor)) => anchor,
                Ok(None) => continue,
                Err(e) if e.is_not_visible() => {
                    tracing::debug!("Skipping matches under invisible anchor {}", anchor_guid);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let matches = groups.remove(&anchor_guid).unwrap_or_default();
            results.push(AnchorSearchMatches { anchor, matches });
        }

        Ok(results)
    }

    /// Text search over elements whose anchor sits under `scope_guid`
    pub async fn find_in_anchor_scope(
        ctx: &CallContext,
        search_string: Option<&str>,
        scope_guid: &Guid,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        if let Some(search_string) = search_string {
            validate_search_string(search_string)?;
        }
        options.validate()?;

        let query = FindQuery::new()
            .with_properties(SearchConditionBuilder::default_text_search(search_string))
            .with_classifications(SearchConditionBuilder::anchor_scope(Some(scope_guid)));

        ctx.repository
            .find_elements(&ctx.caller, &query, options, paging)
            .await
    }
}
