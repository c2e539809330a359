//! The repository capability the catalog composes against
//!
//! Implementations own storage, concurrency and visibility. Every read
//! honours the supplied [`QueryOptions`] and every result may be stale
//! relative to concurrent writers.

use crate::classification::Classification;
use crate::context::Caller;
use crate::element::{EffectiveWindow, Element, Guid, Properties};
use crate::error::Result;
use crate::history::HistoryWindow;
use crate::query::{FindQuery, Pagination, QueryOptions, SequencingOrder};
use crate::relationship::{EndSelector, Relationship};
use crate::typedef::TypeDef;
use async_trait::async_trait;

/// Entity, relationship and classification CRUD plus search and history.
///
/// `get_element_by_guid` reports an element the caller may not see as
/// [`Error::NotAuthorized`](crate::Error::NotAuthorized); searches simply
/// leave such elements out.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Element Retrieval
    // ─────────────────────────────────────────────────────────────────────────

    /// Get an element by identifier, historical when `as_of_time` is set
    async fn get_element_by_guid(
        &self,
        caller: &Caller,
        guid: &Guid,
        options: &QueryOptions,
    ) -> Result<Option<Element>>;

    /// Find elements by type, property conditions and classification conditions
    async fn find_elements(
        &self,
        caller: &Caller,
        query: &FindQuery,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Retrieval
    // ─────────────────────────────────────────────────────────────────────────

    /// Relationships where the element sits at either end
    async fn get_attachment_links(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        relationship_type: Option<&str>,
        sequencing: &SequencingOrder,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>>;

    /// Elements at the far end of relationships where `element_guid` sits at
    /// the selected end
    async fn get_related_elements(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        end: EndSelector,
        relationship_type: Option<&str>,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>>;

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// Every stored version of an element within the window
    async fn get_element_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>>;

    /// Every stored version of a relationship within the window
    async fn get_relationship_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a new element and return its identifier
    async fn create_element(&self, caller: &Caller, element: Element, options: &QueryOptions) -> Result<Guid>;

    /// Merge `properties` into an element's property bag
    async fn update_element_properties(
        &self,
        caller: &Caller,
        guid: &Guid,
        properties: Properties,
        options: &QueryOptions,
    ) -> Result<()>;

    /// Replace the window during which an element is effective
    async fn update_element_effective_window(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: EffectiveWindow,
        options: &QueryOptions,
    ) -> Result<()>;

    /// Delete an element and every relationship attached to it
    async fn delete_element(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()>;

    /// Store a new relationship and return its identifier
    async fn create_relationship(
        &self,
        caller: &Caller,
        relationship: Relationship,
        options: &QueryOptions,
    ) -> Result<Guid>;

    async fn delete_relationship(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()>;

    /// Attach or replace a classification on an element
    async fn classify_element(
        &self,
        caller: &Caller,
        guid: &Guid,
        classification: Classification,
        options: &QueryOptions,
    ) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Types
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_type_def_by_name(&self, name: &str) -> Result<Option<TypeDef>>;
}
