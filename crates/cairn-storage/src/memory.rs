//! In-memory versioned repository
//!
//! Every write records a new revision, so history and as-of reads are
//! answered from the same store as current reads. Deletes leave tombstones.

use crate::error::{StorageError, StorageResult};
use crate::versioned::Versioned;
use async_trait::async_trait;
use cairn_core::classification::{MEMENTO_CLASSIFICATION, ZONE_MEMBERSHIP_CLASSIFICATION, ZONE_MEMBERSHIP_PROPERTY};
use cairn_core::typedef::{classify_value, AttributeDef};
use cairn_core::{
    Caller, Classification, EffectiveWindow, Element, EndSelector, FindQuery, Guid, HistoryWindow, MetadataRepository, Pagination,
    Properties, QueryOptions, Relationship, Result, SequencingOrder, TypeDef, TypeDefCategory,
};
use cairn_search::{sort_elements, sort_relationships, ElementFilter, ElementMatcher};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Items kept in insertion order with a GUID index
#[derive(Debug)]
pub(crate) struct Table<T> {
    rows: Vec<(Guid, Versioned<T>)>,
    index: HashMap<Guid, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    pub(crate) fn get(&self, guid: &Guid) -> Option<&Versioned<T>> {
        self.index.get(guid).map(|&i| &self.rows[i].1)
    }

    pub(crate) fn get_mut(&mut self, guid: &Guid) -> Option<&mut Versioned<T>> {
        let i = *self.index.get(guid)?;
        Some(&mut self.rows[i].1)
    }

    pub(crate) fn contains_key(&self, guid: &Guid) -> bool {
        self.index.contains_key(guid)
    }

    /// Replaces the history of an existing GUID in place
    pub(crate) fn insert(&mut self, guid: Guid, history: Versioned<T>) {
        match self.index.get(&guid) {
            Some(&i) => self.rows[i].1 = history,
            None => {
                self.index.insert(guid.clone(), self.rows.len());
                self.rows.push((guid, history));
            }
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Guid, &Versioned<T>)> {
        self.rows.iter().map(|(guid, history)| (guid, history))
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Versioned<T>> {
        self.rows.iter().map(|(_, history)| history)
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Everything the repository holds, in creation order
#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub(crate) elements: Table<Element>,
    pub(crate) relationships: Table<Relationship>,
    pub(crate) type_defs: HashMap<String, TypeDef>,
}

impl MemoryState {
    /// Whether `actual` is `wanted` or inherits from it
    fn is_type_of(&self, actual: &str, wanted: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(actual.to_string());
        while let Some(name) = current {
            if name == wanted {
                return true;
            }
            current = self.type_defs.get(&name).and_then(|t| t.super_type.clone());
            if !visited.insert(name) {
                return false;
            }
        }
        false
    }

    fn type_matches(&self, query: &FindQuery, actual: &str) -> bool {
        query
            .type_name
            .as_deref()
            .map_or(true, |wanted| self.is_type_of(actual, wanted))
            && (query.subtype_names.is_empty()
                || query.subtype_names.iter().any(|s| self.is_type_of(actual, s)))
    }

    /// Attribute definition on `type_name` or any of its super types
    fn find_attribute(&self, type_name: &str, attribute: &str) -> Option<&AttributeDef> {
        let mut visited = HashSet::new();
        let mut current = self.type_defs.get(type_name);
        while let Some(type_def) = current {
            if !visited.insert(type_def.name.as_str()) {
                return None;
            }
            if let Some(def) = type_def.attribute(attribute) {
                return Some(def);
            }
            current = type_def
                .super_type
                .as_deref()
                .and_then(|s| self.type_defs.get(s));
        }
        None
    }

    /// Unregistered types are accepted as-is
    fn check_type_def(&self, type_name: &str, category: TypeDefCategory, properties: &Properties) -> StorageResult<()> {
        let Some(type_def) = self.type_defs.get(type_name) else {
            return Ok(());
        };
        if type_def.category != category {
            return Err(StorageError::WrongTypeCategory {
                type_name: type_name.to_string(),
                expected: format!("{:?}", category).to_lowercase(),
            });
        }
        for (name, value) in properties {
            if let Some(def) = self.find_attribute(type_name, name) {
                if !value.is_null() && !def.attribute_type.accepts(value) {
                    return Err(StorageError::InvalidProperty {
                        type_name: type_name.to_string(),
                        property: name.clone(),
                        reason: format!(
                            "expected {:?}, got {:?}",
                            def.attribute_type,
                            classify_value(value)
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn zones_of(element: &Element) -> Vec<String> {
        element
            .classification(ZONE_MEMBERSHIP_CLASSIFICATION)
            .and_then(|c| c.properties.get(ZONE_MEMBERSHIP_PROPERTY))
            .and_then(|v| v.as_array())
            .map(|zones| zones.iter().filter_map(|z| z.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    fn is_visible(caller: &Caller, element: &Element) -> bool {
        caller.can_see_zones(&Self::zones_of(element))
    }

    /// Memento elements only appear for lineage; effectivity applies always
    fn passes_options(element: &Element, options: &QueryOptions) -> bool {
        (options.for_lineage || !element.has_classification(MEMENTO_CLASSIFICATION))
            && element.is_effective_at(options.effective_time)
    }

    fn readable_element(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Option<&Element> {
        self.elements
            .get(guid)?
            .at(options.as_of_time)
            .filter(|e| Self::is_visible(caller, e) && Self::passes_options(e, options))
    }

    fn relationship_readable(&self, caller: &Caller, relationship: &Relationship, options: &QueryOptions) -> bool {
        relationship.is_effective_at(options.effective_time)
            && self.readable_element(caller, &relationship.end1, options).is_some()
            && self.readable_element(caller, &relationship.end2, options).is_some()
    }

    /// The element a read is anchored on: absent is not-found, hidden is
    /// not-authorized
    fn require_readable(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> StorageResult<&Element> {
        let element = self
            .elements
            .get(guid)
            .and_then(|h| h.at(options.as_of_time))
            .ok_or_else(|| StorageError::ElementNotFound(guid.clone()))?;
        if !Self::is_visible(caller, element) {
            return Err(StorageError::NotAuthorized {
                user: caller.user_id.clone(),
                guid: guid.clone(),
            });
        }
        if !Self::passes_options(element, options) {
            return Err(StorageError::ElementNotFound(guid.clone()));
        }
        Ok(element)
    }

    /// Current state of an element the caller may change
    fn element_for_write(&self, caller: &Caller, guid: &Guid) -> StorageResult<Element> {
        let element = self
            .elements
            .get(guid)
            .and_then(|h| h.current())
            .ok_or_else(|| StorageError::ElementNotFound(guid.clone()))?;
        if !Self::is_visible(caller, element) {
            return Err(StorageError::NotAuthorized {
                user: caller.user_id.clone(),
                guid: guid.clone(),
            });
        }
        Ok(element.clone())
    }

    fn relationships_at(&self, as_of_time: Option<DateTime<Utc>>) -> impl Iterator<Item = &Relationship> {
        self.relationships.values().filter_map(move |h| h.at(as_of_time))
    }
}

/// In-memory repository
///
/// Useful for testing and for driving the catalog from the CLI.
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            offline: AtomicBool::new(false),
        }
    }

    pub(crate) fn from_state(state: MemoryState) -> Self {
        Self {
            state: RwLock::new(state),
            offline: AtomicBool::new(false),
        }
    }

    pub(crate) fn read(&self) -> StorageResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }

    /// While offline every call fails with a repository fault
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.is_offline() {
            return Err(StorageError::Offline);
        }
        Ok(())
    }

    pub fn register_type_def(&self, type_def: TypeDef) -> StorageResult<()> {
        let mut state = self.write()?;
        tracing::debug!("Registering type {} ({:?})", type_def.name, type_def.category);
        state.type_defs.insert(type_def.name.clone(), type_def);
        Ok(())
    }

    pub fn type_defs(&self) -> StorageResult<Vec<TypeDef>> {
        let state = self.read()?;
        let mut type_defs: Vec<TypeDef> = state.type_defs.values().cloned().collect();
        type_defs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(type_defs)
    }

    /// Elements that currently exist, including hidden ones
    pub fn element_count(&self) -> StorageResult<usize> {
        let state = self.read()?;
        Ok(state.elements.values().filter(|h| !h.is_deleted()).count())
    }

    pub fn relationship_count(&self) -> StorageResult<usize> {
        let state = self.read()?;
        Ok(state.relationships.values().filter(|h| !h.is_deleted()).count())
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataRepository for MemoryRepository {
    // ─────────────────────────────────────────────────────────────────────────
    // Element Retrieval
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_element_by_guid(&self, caller: &Caller, guid: &Guid, options: &QueryOptions) -> Result<Option<Element>> {
        self.check_online()?;
        let state = self.read()?;

        let Some(element) = state.elements.get(guid).and_then(|h| h.at(options.as_of_time)) else {
            return Ok(None);
        };
        if !MemoryState::is_visible(caller, element) {
            return Err(StorageError::NotAuthorized {
                user: caller.user_id.clone(),
                guid: guid.clone(),
            }
            .into());
        }
        if !MemoryState::passes_options(element, options) {
            return Ok(None);
        }
        Ok(Some(element.clone()))
    }

    async fn find_elements(
        &self,
        caller: &Caller,
        query: &FindQuery,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.check_online()?;
        let filter = ElementFilter::compile(query, options.effective_time)?;
        let state = self.read()?;

        let mut results: Vec<Element> = state
            .elements
            .values()
            .filter_map(|h| h.at(options.as_of_time))
            .filter(|e| state.type_matches(query, &e.type_name))
            .filter(|e| MemoryState::is_visible(caller, e) && MemoryState::passes_options(e, options))
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        sort_elements(&mut results, &query.sequencing);
        tracing::trace!("find_elements matched {} elements", results.len());
        Ok(paging.apply(results))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Retrieval
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_attachment_links(
        &self,
        caller: &Caller,
        element_guid: &Guid,
        relationship_type: Option<&str>,
        sequencing: &SequencingOrder,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        self.check_online()?;
        let state = self.read()?;
        state.require_readable(caller, element_guid, options)?;

        let mut links: Vec<Relationship> = state
            .relationships_at(options.as_of_time)
            .filter(|r| r.has_end(element_guid, EndSelector::Either))
            .filter(|r| relationship_type.map_or(true, |t| state.is_type_of(&r.type_name, t)))
            .filter(|r| state.relationship_readable(caller, r, options))
            .cloned()
            .collect();

        sort_relationships(&mut links, sequencing);
        Ok(paging.apply(links))
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
        self.check_online()?;
        let state = self.read()?;
        state.require_readable(caller, element_guid, options)?;

        let mut seen = HashSet::new();
        let related: Vec<Element> = state
            .relationships_at(options.as_of_time)
            .filter(|r| r.has_end(element_guid, end))
            .filter(|r| relationship_type.map_or(true, |t| state.is_type_of(&r.type_name, t)))
            .filter(|r| r.is_effective_at(options.effective_time))
            .filter_map(|r| r.other_end(element_guid))
            .filter(|guid| seen.insert((*guid).clone()))
            .filter_map(|guid| state.readable_element(caller, guid, options))
            .cloned()
            .collect();

        Ok(paging.apply(related))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_element_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Element>> {
        self.check_online()?;
        let state = self.read()?;
        let history = state
            .elements
            .get(guid)
            .ok_or_else(|| StorageError::ElementNotFound(guid.clone()))?;

        let latest = history.revisions().iter().rev().find_map(|r| r.state.as_ref());
        if let Some(latest) = latest {
            if !MemoryState::is_visible(caller, latest) {
                return Err(StorageError::NotAuthorized {
                    user: caller.user_id.clone(),
                    guid: guid.clone(),
                }
                .into());
            }
        }

        let mut versions: Vec<Element> = history
            .revisions()
            .iter()
            .filter(|r| window.contains(r.recorded_at))
            .filter(|r| options.as_of_time.map_or(true, |t| r.recorded_at <= t))
            .filter_map(|r| r.state.as_ref())
            .filter(|e| options.for_lineage || !e.has_classification(MEMENTO_CLASSIFICATION))
            .cloned()
            .collect();

        if !window.oldest_first {
            versions.reverse();
        }
        Ok(paging.apply(versions))
    }

    async fn get_relationship_history(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: &HistoryWindow,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<Relationship>> {
        self.check_online()?;
        let state = self.read()?;
        let history = state
            .relationships
            .get(guid)
            .ok_or_else(|| StorageError::RelationshipNotFound(guid.clone()))?;

        let mut versions: Vec<Relationship> = history
            .revisions()
            .iter()
            .filter(|r| window.contains(r.recorded_at))
            .filter(|r| options.as_of_time.map_or(true, |t| r.recorded_at <= t))
            .filter_map(|r| r.state.as_ref())
            .filter(|r| {
                [&r.end1, &r.end2].iter().all(|end| {
                    state
                        .elements
                        .get(end)
                        .and_then(|h| h.revisions().iter().rev().find_map(|rev| rev.state.as_ref()))
                        .map_or(true, |e| MemoryState::is_visible(caller, e))
                })
            })
            .cloned()
            .collect();

        if !window.oldest_first {
            versions.reverse();
        }
        Ok(paging.apply(versions))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    async fn create_element(&self, caller: &Caller, element: Element, _options: &QueryOptions) -> Result<Guid> {
        self.check_online()?;
        if !element.effective.is_well_formed() {
            return Err(cairn_core::Error::invalid_parameter(
                "effectiveTo",
                "effective window ends before it starts",
            ));
        }

        let mut state = self.write()?;
        if state.elements.contains_key(&element.guid) {
            return Err(StorageError::DuplicateGuid(element.guid).into());
        }
        state.check_type_def(&element.type_name, TypeDefCategory::Entity, &element.properties)?;
        for classification in &element.classifications {
            state.check_type_def(&classification.name, TypeDefCategory::Classification, &classification.properties)?;
        }

        let now = Utc::now();
        let mut element = element;
        element.created_at = now;
        element.updated_at = now;
        element.version = 1;

        let guid = element.guid.clone();
        tracing::debug!("{} created {} {}", caller.user_id, element.type_name, guid);
        state.elements.insert(guid.clone(), Versioned::new(element, now));
        Ok(guid)
    }

    async fn update_element_properties(
        &self,
        caller: &Caller,
        guid: &Guid,
        properties: Properties,
        _options: &QueryOptions,
    ) -> Result<()> {
        self.check_online()?;
        let mut state = self.write()?;
        let mut element = state.element_for_write(caller, guid)?;

        element.properties.extend(properties);
        state.check_type_def(&element.type_name, TypeDefCategory::Entity, &element.properties)?;

        let now = Utc::now();
        element.updated_at = now;
        element.version += 1;

        if let Some(history) = state.elements.get_mut(guid) {
            history.record(Some(element), now);
        }
        Ok(())
    }

    async fn update_element_effective_window(
        &self,
        caller: &Caller,
        guid: &Guid,
        window: EffectiveWindow,
        _options: &QueryOptions,
    ) -> Result<()> {
        self.check_online()?;
        if !window.is_well_formed() {
            return Err(cairn_core::Error::invalid_parameter(
                "effectiveTo",
                "effective window ends before it starts",
            ));
        }

        let mut state = self.write()?;
        let mut element = state.element_for_write(caller, guid)?;
        if element.effective == window {
            return Ok(());
        }
        element.effective = window;

        let now = Utc::now();
        element.updated_at = now;
        element.version += 1;

        if let Some(history) = state.elements.get_mut(guid) {
            history.record(Some(element), now);
        }
        Ok(())
    }

    async fn delete_element(&self, caller: &Caller, guid: &Guid, _options: &QueryOptions) -> Result<()> {
        self.check_online()?;
        let mut state = self.write()?;
        state.element_for_write(caller, guid)?;

        let now = Utc::now();
        if let Some(history) = state.elements.get_mut(guid) {
            history.record(None, now);
        }

        let attached: Vec<Guid> = state
            .relationships
            .iter()
            .filter(|(_, h)| h.current().map_or(false, |r| r.has_end(guid, EndSelector::Either)))
            .map(|(g, _)| g.clone())
            .collect();
        for relationship_guid in &attached {
            if let Some(history) = state.relationships.get_mut(relationship_guid) {
                history.record(None, now);
            }
        }

        tracing::debug!(
            "{} deleted {} and {} attached relationships",
            caller.user_id,
            guid,
            attached.len()
        );
        Ok(())
    }

    async fn create_relationship(
        &self,
        caller: &Caller,
        relationship: Relationship,
        _options: &QueryOptions,
    ) -> Result<Guid> {
        self.check_online()?;
        let mut state = self.write()?;

        state.element_for_write(caller, &relationship.end1)?;
        state.element_for_write(caller, &relationship.end2)?;
        if state.relationships.contains_key(&relationship.guid) {
            return Err(StorageError::DuplicateGuid(relationship.guid).into());
        }
        state.check_type_def(&relationship.type_name, TypeDefCategory::Relationship, &relationship.properties)?;

        let now = Utc::now();
        let mut relationship = relationship;
        relationship.created_at = now;
        relationship.updated_at = now;
        relationship.version = 1;

        let guid = relationship.guid.clone();
        tracing::debug!(
            "{} linked {} -[{}]-> {}",
            caller.user_id,
            relationship.end1,
            relationship.type_name,
            relationship.end2
        );
        state.relationships.insert(guid.clone(), Versioned::new(relationship, now));
        Ok(guid)
    }

    async fn delete_relationship(&self, caller: &Caller, guid: &Guid, _options: &QueryOptions) -> Result<()> {
        self.check_online()?;
        let mut state = self.write()?;

        let history = state
            .relationships
            .get_mut(guid)
            .filter(|h| !h.is_deleted())
            .ok_or_else(|| StorageError::RelationshipNotFound(guid.clone()))?;
        history.record(None, Utc::now());

        tracing::debug!("{} deleted relationship {}", caller.user_id, guid);
        Ok(())
    }

    async fn classify_element(
        &self,
        caller: &Caller,
        guid: &Guid,
        classification: Classification,
        _options: &QueryOptions,
    ) -> Result<()> {
        self.check_online()?;
        let mut state = self.write()?;
        let mut element = state.element_for_write(caller, guid)?;
        state.check_type_def(&classification.name, TypeDefCategory::Classification, &classification.properties)?;

        let now = Utc::now();
        element.classify(classification);
        element.updated_at = now;
        element.version += 1;

        if let Some(history) = state.elements.get_mut(guid) {
            history.record(Some(element), now);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Types
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_type_def_by_name(&self, name: &str) -> Result<Option<TypeDef>> {
        self.check_online()?;
        let state = self.read()?;
        Ok(state.type_defs.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::typedef::{AttributeType, PrimitiveKind};
    use cairn_core::{AnchorRef, SearchConditionBuilder};
    use serde_json::json;

    fn caller() -> Caller {
        Caller::new("garygeeke")
    }

    fn opts() -> QueryOptions {
        QueryOptions::new()
    }

    fn asset(name: &str) -> Element {
        Element::new("Asset")
            .with_qualified_name(format!("Asset::{}", name))
            .with_property("name", name)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = MemoryRepository::new();
        let guid = repo.create_element(&caller(), asset("Payroll"), &opts()).await.unwrap();

        let element = repo.get_element_by_guid(&caller(), &guid, &opts()).await.unwrap().unwrap();
        assert_eq!(element.qualified_name(), Some("Asset::Payroll"));
        assert_eq!(element.version, 1);

        assert!(repo
            .get_element_by_guid(&caller(), &Guid::new(), &opts())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_with_type_inheritance() {
        let repo = MemoryRepository::new();
        repo.register_type_def(TypeDef::entity("Asset")).unwrap();
        repo.register_type_def(TypeDef::entity("DataFile").with_super_type("Asset")).unwrap();

        let file = Element::new("DataFile").with_property("name", "payroll.csv");
        repo.create_element(&caller(), file, &opts()).await.unwrap();
        repo.create_element(&caller(), Element::new("Process"), &opts()).await.unwrap();

        let results = repo
            .find_elements(&caller(), &FindQuery::of_type("Asset"), &opts(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].type_name, "DataFile");
    }

    #[tokio::test]
    async fn test_super_type_cycle_terminates() {
        let repo = MemoryRepository::new();
        repo.register_type_def(TypeDef::entity("A").with_super_type("B")).unwrap();
        repo.register_type_def(TypeDef::entity("B").with_super_type("A")).unwrap();
        repo.create_element(&caller(), Element::new("A"), &opts()).await.unwrap();

        let results = repo
            .find_elements(&caller(), &FindQuery::of_type("C"), &opts(), &Pagination::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_typed_properties_checked() {
        let repo = MemoryRepository::new();
        repo.register_type_def(
            TypeDef::entity("Asset").with_attribute("size", AttributeType::primitive(PrimitiveKind::Integer)),
        )
        .unwrap();

        let bad = Element::new("Asset").with_property("size", "large");
        let err = repo.create_element(&caller(), bad, &opts()).await.unwrap_err();
        assert!(matches!(err, cairn_core::Error::InvalidParameter { .. }));

        let good = Element::new("Asset").with_property("size", 3);
        assert!(repo.create_element(&caller(), good, &opts()).await.is_ok());
    }

    #[tokio::test]
    async fn test_zone_hidden_element() {
        let repo = MemoryRepository::new();
        let hidden = asset("Secret").with_classification(
            Classification::new(ZONE_MEMBERSHIP_CLASSIFICATION).with_property(ZONE_MEMBERSHIP_PROPERTY, json!(["hr"])),
        );
        let guid = repo.create_element(&caller(), hidden, &opts()).await.unwrap();

        let outsider = Caller::new("peterprofile").with_zone("data-lake");
        let err = repo.get_element_by_guid(&outsider, &guid, &opts()).await.unwrap_err();
        assert!(matches!(err, cairn_core::Error::NotAuthorized { .. }));

        let found = repo
            .find_elements(&outsider, &FindQuery::of_type("Asset"), &opts(), &Pagination::default())
            .await
            .unwrap();
        assert!(found.is_empty());

        let insider = Caller::new("faithbroker").with_zone("hr");
        assert!(repo.get_element_by_guid(&insider, &guid, &opts()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memento_needs_lineage() {
        let repo = MemoryRepository::new();
        let archived = asset("Old").with_classification(Classification::new(MEMENTO_CLASSIFICATION));
        let guid = repo.create_element(&caller(), archived, &opts()).await.unwrap();

        assert!(repo.get_element_by_guid(&caller(), &guid, &opts()).await.unwrap().is_none());
        let lineage = opts().for_lineage(true);
        assert!(repo.get_element_by_guid(&caller(), &guid, &lineage).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_cascades_and_keeps_history() {
        let repo = MemoryRepository::new();
        let a = repo.create_element(&caller(), asset("A"), &opts()).await.unwrap();
        let b = repo.create_element(&caller(), asset("B"), &opts()).await.unwrap();
        let link = repo
            .create_relationship(&caller(), Relationship::new("DataFlow", a.clone(), b.clone()), &opts())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let before_delete = Utc::now();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        repo.delete_element(&caller(), &a, &opts()).await.unwrap();

        assert!(repo.get_element_by_guid(&caller(), &a, &opts()).await.unwrap().is_none());
        assert_eq!(repo.relationship_count().unwrap(), 0);
        let links = repo
            .get_attachment_links(&caller(), &b, None, &SequencingOrder::Any, &opts(), &Pagination::default())
            .await
            .unwrap();
        assert!(links.is_empty());

        let past = opts().as_of(before_delete);
        assert!(repo.get_element_by_guid(&caller(), &a, &past).await.unwrap().is_some());
        let history = repo
            .get_relationship_history(&caller(), &link, &HistoryWindow::all(), &opts(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_update_records_revision() {
        let repo = MemoryRepository::new();
        let guid = repo.create_element(&caller(), asset("Payroll"), &opts()).await.unwrap();

        let mut update = Properties::new();
        update.insert("description".to_string(), json!("Monthly payroll"));
        repo.update_element_properties(&caller(), &guid, update, &opts()).await.unwrap();

        let history = repo
            .get_element_history(&caller(), &guid, &HistoryWindow::all(), &opts(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].version, 2);
        assert_eq!(history[0].string_property("description"), Some("Monthly payroll"));
        assert_eq!(history[1].version, 1);
    }

    #[tokio::test]
    async fn test_effective_window_update() {
        let repo = MemoryRepository::new();
        let guid = repo.create_element(&caller(), asset("Payroll"), &opts()).await.unwrap();
        let now = Utc::now();

        let retired = EffectiveWindow::new(None, Some(now - chrono::Duration::days(1)));
        repo.update_element_effective_window(&caller(), &guid, retired.clone(), &opts())
            .await
            .unwrap();

        let current = repo.get_element_by_guid(&caller(), &guid, &opts()).await.unwrap().unwrap();
        assert_eq!(current.effective, retired);
        assert_eq!(current.version, 2);
        assert!(repo
            .get_element_by_guid(&caller(), &guid, &opts().effective_at(now))
            .await
            .unwrap()
            .is_none());

        let backwards = EffectiveWindow::new(Some(now), Some(now - chrono::Duration::days(1)));
        let err = repo
            .update_element_effective_window(&caller(), &guid, backwards, &opts())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_anchor_search_through_repository() {
        let repo = MemoryRepository::new();
        let anchor = repo.create_element(&caller(), asset("Table"), &opts()).await.unwrap();
        let column = Element::new("Column")
            .with_property("name", "salary")
            .with_anchor(AnchorRef::new(anchor.clone(), "Asset").with_domain("Asset"));
        repo.create_element(&caller(), column, &opts()).await.unwrap();

        let query = FindQuery::new()
            .with_properties(SearchConditionBuilder::default_text_search(Some("SAL")))
            .with_classifications(SearchConditionBuilder::anchored_to(&anchor));
        let results = repo
            .find_elements(&caller(), &query, &opts(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let repo = MemoryRepository::new();
        repo.set_offline(true);

        let err = repo.get_element_by_guid(&caller(), &Guid::new(), &opts()).await.unwrap_err();
        assert!(matches!(err, cairn_core::Error::Repository(_)));
        assert!(repo.create_element(&caller(), asset("X"), &opts()).await.is_err());

        repo.set_offline(false);
        assert!(repo.create_element(&caller(), asset("X"), &opts()).await.is_ok());
    }
}
