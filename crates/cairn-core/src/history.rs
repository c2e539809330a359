//! Historical and as-of query shaping

use crate::anchor_graph::{AnchorGraph, AnchorGraphAssembler};
use crate::context::CallContext;
use crate::element::{Element, Guid};
use crate::error::{Error, Result};
use crate::query::{Pagination, QueryOptions};
use crate::relationship::Relationship;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `[from_time, to_time)` range of versions to return
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_time: Option<DateTime<Utc>>,

    /// Oldest version first instead of newest first
    #[serde(default)]
    pub oldest_first: bool,
}

impl HistoryWindow {
    /// Every version ever stored, newest first
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from_time: Option<DateTime<Utc>>, to_time: Option<DateTime<Utc>>) -> Self {
        Self {
            from_time,
            to_time,
            oldest_first: false,
        }
    }

    pub fn oldest_first(mut self) -> Self {
        self.oldest_first = true;
        self
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.from_time.map_or(true, |from| time >= from) && self.to_time.map_or(true, |to| time < to)
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from_time, self.to_time) {
            if from > to {
                return Err(Error::invalid_parameter(
                    "fromTime",
                    format!(
                        "{} is after toTime {}",
                        from.to_rfc3339(),
                        to.to_rfc3339()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Time-travelling variants of the catalog queries
pub struct HistoryQueries;

impl HistoryQueries {
    /// Versions of one element stored within `window`
    pub async fn element_history(
        ctx: &CallContext,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        window.validate()?;
        options.validate()?;
        tracing::debug!(
            "Element history: guid={}, from={:?}, to={:?}",
            guid,
            window.from_time,
            window.to_time
        );
        ctx.repository
            .get_element_history(&ctx.caller, guid, window, options, paging)
            .await
    }

    /// Versions of one relationship stored within `window`
    pub async fn relationship_history(
        ctx: &CallContext,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        window.validate()?;
        options.validate()?;
        ctx.repository
            .get_relationship_history(&ctx.caller, guid, window, options, paging)
            .await
    }

    /// The element as it was at `as_of`. Invisible or absent elements give `None`.
    pub async fn element_as_of(
        ctx: &CallContext,
        guid: &Guid,
        as_of: DateTime<Utc>,
        options: &QueryOptions,
    ) -> Result<Option<Element>> {
        let options = options.clone().as_of(as_of);
        options.validate()?;
        match ctx
            .repository
            .get_element_by_guid(&ctx.caller, guid, &options)
            .await
        {
            Ok(element) => Ok(element),
            Err(e) if e.is_not_visible() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The anchored graph reconstructed as it was at `as_of`
    pub async fn anchored_graph_as_of(
        ctx: &CallContext,
        anchor_guid: &Guid,
        as_of: DateTime<Utc>,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<AnchorGraph> {
        let options = options.clone().as_of(as_of);
        AnchorGraphAssembler::build_anchored_graph(ctx, anchor_guid, &options, paging).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_contains() {
        let now = Utc::now();
        let window = HistoryWindow::between(Some(now - Duration::hours(1)), Some(now));

        assert!(window.contains(now - Duration::minutes(30)));
        assert!(window.contains(now - Duration::hours(1)));
        assert!(!window.contains(now));
        assert!(HistoryWindow::all().contains(now));
    }

    #[test]
    fn test_window_validation() {
        let now = Utc::now();
        assert!(HistoryWindow::between(Some(now), Some(now - Duration::hours(1)))
            .validate()
            .is_err());
        assert!(HistoryWindow::between(None, Some(now)).validate().is_ok());
        assert!(HistoryWindow::all().oldest_first().oldest_first);
    }
}
