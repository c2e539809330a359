//! Shared fixtures for the catalog integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cairn_core::{
    AnchorRef, CallContext, Caller, Classification, EffectiveWindow, Element, EndSelector, FindQuery, Guid, HistoryWindow,
    Error, MetadataRepository, Pagination, Properties, QueryOptions, Relationship, Result, SequencingOrder, TypeDef,
};
use cairn_storage::MemoryRepository;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn caller() -> Caller {
    Caller::new("garygeeke")
}

pub fn options() -> QueryOptions {
    QueryOptions::new()
}

pub fn memory() -> Arc<MemoryRepository> {
    Arc::new(MemoryRepository::new())
}

pub fn context(repository: Arc<dyn MetadataRepository>) -> CallContext {
    CallContext::new(repository, caller())
}

pub async fn create(ctx: &CallContext, element: Element) -> Guid {
    ctx.repository
        .create_element(&ctx.caller, element, &options())
        .await
        .unwrap()
}

pub async fn link(ctx: &CallContext, type_name: &str, end1: &Guid, end2: &Guid) -> Guid {
    ctx.repository
        .create_relationship(
            &ctx.caller,
            Relationship::new(type_name, end1.clone(), end2.clone()),
            &options(),
        )
        .await
        .unwrap()
}

pub fn asset(name: &str) -> Element {
    Element::new("Asset")
        .with_qualified_name(format!("Asset::{}", name))
        .with_property("name", name)
}

pub fn anchored(type_name: &str, name: &str, anchor: &Guid) -> Element {
    Element::new(type_name)
        .with_qualified_name(format!("{}::{}", type_name, name))
        .with_property("name", name)
        .with_anchor(AnchorRef::new(anchor.clone(), "Asset").with_domain("Asset"))
}

pub async fn pause() {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
}

/// Records the options of every repository call before delegating
pub struct RecordingRepository {
    inner: Arc<MemoryRepository>,
    seen: Mutex<Vec<(&'static str, QueryOptions)>>,
}

impl RecordingRepository {
    pub fn new(inner: Arc<MemoryRepository>) -> Self {
        Self {
            inner,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: &'static str, options: &QueryOptions) {
        self.seen.lock().unwrap().push((call, options.clone()));
    }

    pub fn calls(&self) -> Vec<(&'static str, QueryOptions)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.seen.lock().unwrap().clear();
    }
}

#[async_trait]
impl MetadataRepository for RecordingRepository {
    async fn get_element_by_guid(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<Option<Element>> {
        self.record("get_element_by_guid", options);
        self.inner.get_element_by_guid(caller, guid, options).await
    }

    async fn find_elements(
        &self,
        caller: &Caller,
        query: &FindQuery,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.record("find_elements", options);
        self.inner.find_elements(caller, query, options, paging).await
    }

    async fn get_attachment_links(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        relationship_type: Option<&str>,
        sequencing: &SequencingOrder,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        self.record("get_attachment_links", options);
        self.inner
            .get_attachment_links(caller, element_guid, relationship_type, sequencing, options, paging)
            .await
    }

    async fn get_related_elements(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        end: EndSelector,
        relationship_type: Option<&str>,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.record("get_related_elements", options);
        self.inner
            .get_related_elements(caller, element_guid, end, relationship_type, options, paging)
            .await
    }

    async fn get_element_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.record("get_element_history", options);
        self.inner.get_element_history(caller, guid, window, options, paging).await
    }

    async fn get_relationship_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        self.record("get_relationship_history", options);
        self.inner.get_relationship_history(caller, guid, window, options, paging).await
    }

    async fn create_element(&self, caller: &Caller, element: Element, options: &QueryOptions) -> Result<Guid> {
        self.record("create_element", options);
        self.inner.create_element(caller, element, options).await
    }

    async fn update_element_properties(
        &self,
        caller: &Caller,
        guid: &Guid,
        properties: Properties,
        options: &QueryOptions,
    ) -> Result<()> {
        self.record("update_element_properties", options);
        self.inner.update_element_properties(caller, guid, properties, options).await
    }

    async fn update_element_effective_window(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: EffectiveWindow,
        options: &QueryOptions,
    ) -> Result<()> {
        self.record("update_element_effective_window", options);
        self.inner.update_element_effective_window(caller, guid, window, options).await
    }

    async fn delete_element(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()> {
        self.record("delete_element", options);
        self.inner.delete_element(caller, guid, options).await
    }

    async fn create_relationship(&self, caller: &Caller, relationship: Relationship, options: &QueryOptions) -> Result<Guid> {
        self.record("create_relationship", options);
        self.inner.create_relationship(caller, relationship, options).await
    }

    async fn delete_relationship(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()> {
        self.record("delete_relationship", options);
        self.inner.delete_relationship(caller, guid, options).await
    }

    async fn classify_element(
        &self,
        caller: &Caller,
        guid: &Guid,
        classification: Classification,
        options: &QueryOptions,
    ) -> Result<()> {
        self.record("classify_element", options);
        self.inner.classify_element(caller, guid, classification, options).await
    }

    async fn get_type_def_by_name(&self, name: &str) -> Result<Option<TypeDef>> {
        self.inner.get_type_def_by_name(name).await
    }
}

/// Simulates a concurrent writer: the first `stale_reads` searches see an
/// empty result even though matching elements exist
pub struct StaleReadRepository {
    inner: Arc<MemoryRepository>,
    stale_reads: AtomicUsize,
}

impl StaleReadRepository {
    pub fn new(inner: Arc<MemoryRepository>, stale_reads: usize) -> Self {
        Self {
            inner,
            stale_reads: AtomicUsize::new(stale_reads),
        }
    }
}

#[async_trait]
impl MetadataRepository for StaleReadRepository {
    async fn get_element_by_guid(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<Option<Element>> {
        self.inner.get_element_by_guid(caller, guid, options).await
    }

    async fn find_elements(
        &self,
        caller: &Caller,
        query: &FindQuery,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        let stale = self
            .stale_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(Vec::new());
        }
        self.inner.find_elements(caller, query, options, paging).await
    }

    async fn get_attachment_links(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        relationship_type: Option<&str>,
        sequencing: &SequencingOrder,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        self.inner
            .get_attachment_links(caller, element_guid, relationship_type, sequencing, options, paging)
            .await
    }

    async fn get_related_elements(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        end: EndSelector,
        relationship_type: Option<&str>,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.inner
            .get_related_elements(caller, element_guid, end, relationship_type, options, paging)
            .await
    }

    async fn get_element_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.inner.get_element_history(caller, guid, window, options, paging).await
    }

    async fn get_relationship_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        self.inner.get_relationship_history(caller, guid, window, options, paging).await
    }

    async fn create_element(&self, caller: &Caller, element: Element, options: &QueryOptions) -> Result<Guid> {
        self.inner.create_element(caller, element, options).await
    }

    async fn update_element_properties(
        &self,
        caller: &Caller,
        guid: &Guid,
        properties: Properties,
        options: &QueryOptions,
    ) -> Result<()> {
        self.inner.update_element_properties(caller, guid, properties, options).await
    }

    async fn update_element_effective_window(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: EffectiveWindow,
        options: &QueryOptions,
    ) -> Result<()> {
        self.inner.update_element_effective_window(caller, guid, window, options).await
    }

    async fn delete_element(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()> {
        self.inner.delete_element(caller, guid, options).await
    }

    async fn create_relationship(&self, caller: &Caller, relationship: Relationship, options: &QueryOptions) -> Result<Guid> {
        self.inner.create_relationship(caller, relationship, options).await
    }

    async fn delete_relationship(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()> {
        self.inner.delete_relationship(caller, guid, options).await
    }

    async fn classify_element(
        &self,
        caller: &Caller,
        guid: &Guid,
        classification: Classification,
        options: &QueryOptions,
    ) -> Result<()> {
        self.inner.classify_element(caller, guid, classification, options).await
    }

    async fn get_type_def_by_name(&self, name: &str) -> Result<Option<TypeDef>> {
        self.inner.get_type_def_by_name(name).await
    }
}

/// Simulates an element deleted by another caller mid-read: it still turns up
/// in searches, but reading its links reports it gone
pub struct VanishingRepository {
    inner: Arc<MemoryRepository>,
    vanished: Guid,
}

impl VanishingRepository {
    pub fn new(inner: Arc<MemoryRepository>, vanished: Guid) -> Self {
        Self { inner, vanished }
    }
}

#[async_trait]
impl MetadataRepository for VanishingRepository {
    async fn get_element_by_guid(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<Option<Element>> {
        self.inner.get_element_by_guid(caller, guid, options).await
    }

    async fn find_elements(
        &self,
        caller: &Caller,
        query: &FindQuery,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.inner.find_elements(caller, query, options, paging).await
    }

    async fn get_attachment_links(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        relationship_type: Option<&str>,
        sequencing: &SequencingOrder,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        if *element_guid == self.vanished {
            return Err(Error::ElementNotFound(element_guid.clone()));
        }
        self.inner
            .get_attachment_links(caller, element_guid, relationship_type, sequencing, options, paging)
            .await
    }

    async fn get_related_elements(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        end: EndSelector,
        relationship_type: Option<&str>,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.inner
            .get_related_elements(caller, element_guid, end, relationship_type, options, paging)
            .await
    }

    async fn get_element_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.inner.get_element_history(caller, guid, window, options, paging).await
    }

    async fn get_relationship_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        self.inner.get_relationship_history(caller, guid, window, options, paging).await
    }

    async fn create_element(&self, caller: &Caller, element: Element, options: &QueryOptions) -> Result<Guid> {
        self.inner.create_element(caller, element, options).await
    }

    async fn update_element_properties(
        &self,
        caller: &Caller,
        guid: &Guid,
        properties: Properties,
        options: &QueryOptions,
    ) -> Result<()> {
        self.inner.update_element_properties(caller, guid, properties, options).await
    }

    async fn update_element_effective_window(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: EffectiveWindow,
        options: &QueryOptions,
    ) -> Result<()> {
        self.inner.update_element_effective_window(caller, guid, window, options).await
    }

    async fn delete_element(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()> {
        self.inner.delete_element(caller, guid, options).await
    }

    async fn create_relationship(&self, caller: &Caller, relationship: Relationship, options: &QueryOptions) -> Result<Guid> {
        self.inner.create_relationship(caller, relationship, options).await
    }

    async fn delete_relationship(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<()> {
        self.inner.delete_relationship(caller, guid, options).await
    }

    async fn classify_element(
        &self,
        caller: &Caller,
        guid: &Guid,
        classification: Classification,
        options: &QueryOptions,
    ) -> Result<()> {
        self.inner.classify_element(caller, guid, classification, options).await
    }

    async fn get_type_def_by_name(&self, name: &str) -> Result<Option<TypeDef>> {
        self.inner.get_type_def_by_name(name).await
    }
}
