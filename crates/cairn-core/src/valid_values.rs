//! Valid value hierarchy management and validation queries
//!
//! Valid values form a forest of `ValidValueDefinition` elements keyed by a
//! positional qualified name: `ValidValue:{type}:{property}:{map}:{value}`.
//! Absent inner segments render empty and trailing absent segments are
//! dropped, so `(None, "status")` is `ValidValue::status` and never collides
//! with a type called `status`.
//!
//! Grouping sets carry no preferred value and own their members through
//! `ValidValueMember` relationships (set at end 1). Leaves carry a preferred
//! value and may be joined to leaves of other hierarchies by symmetric
//! `ConsistentValidValues` relationships.
//!
//! Reads resolve a value specific-then-general: the type-specific definition
//! wins, and the "any type" definition applies when there is none.

use crate::conditions::SearchConditionBuilder;
use crate::context::CallContext;
use crate::element::{EffectiveWindow, Element, Guid, Properties, QUALIFIED_NAME_PROPERTY};
use crate::error::{Error, Result};
use crate::limits::{validate_optional_name, validate_required_name};
use crate::query::{FindQuery, Pagination, QueryOptions, SequencingOrder};
use crate::relationship::{EndSelector, Relationship};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const VALID_VALUE_DEFINITION_TYPE: &str = "ValidValueDefinition";
pub const VALID_VALUE_MEMBER_RELATIONSHIP: &str = "ValidValueMember";
pub const CONSISTENT_VALID_VALUES_RELATIONSHIP: &str = "ConsistentValidValues";

/// Reserved first segment of every valid value qualified name
pub const VALID_VALUE_QUALIFIED_NAME_PREFIX: &str = "ValidValue";

/// Scope stamped on every definition this module creates
pub const OPEN_METADATA_ECOSYSTEM_SCOPE: &str = "open-metadata-ecosystem";

pub const PREFERRED_VALUE_PROPERTY: &str = "preferredValue";
pub const CATEGORY_PROPERTY: &str = "category";
pub const SCOPE_PROPERTY: &str = "scope";
pub const DISPLAY_NAME_PROPERTY: &str = "displayName";
pub const DESCRIPTION_PROPERTY: &str = "description";
pub const IS_DEPRECATED_PROPERTY: &str = "isDeprecated";
pub const IS_CASE_SENSITIVE_PROPERTY: &str = "isCaseSensitive";
pub const IS_DEFAULT_VALUE_PROPERTY: &str = "isDefaultValue";
pub const TYPE_NAME_PROPERTY: &str = "typeName";
pub const PROPERTY_NAME_PROPERTY: &str = "propertyName";
pub const MAP_NAME_PROPERTY: &str = "mapName";

/// A position in the hierarchy: `(typeName?, propertyName?, mapName?)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidValuePath {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_name: Option<String>,
}

impl ValidValuePath {
    pub fn new(type_name: Option<&str>, property_name: Option<&str>, map_name: Option<&str>) -> Self {
        Self {
            type_name: type_name.map(str::to_string),
            property_name: property_name.map(str::to_string),
            map_name: map_name.map(str::to_string),
        }
    }

    /// The top of the forest
    pub fn root() -> Self {
        Self::default()
    }

    pub fn for_property(type_name: Option<&str>, property_name: &str) -> Self {
        Self::new(type_name, Some(property_name), None)
    }

    pub fn for_map(type_name: Option<&str>, property_name: &str, map_name: &str) -> Self {
        Self::new(type_name, Some(property_name), Some(map_name))
    }

    pub fn is_root(&self) -> bool {
        self.type_name.is_none() && self.property_name.is_none() && self.map_name.is_none()
    }

    /// Drop the most specific present segment, in the order map, property,
    /// type. The root has no parent.
    pub fn parent(&self) -> Option<Self> {
        let mut parent = self.clone();
        if parent.map_name.take().is_some()
            || parent.property_name.take().is_some()
            || parent.type_name.take().is_some()
        {
            Some(parent)
        } else {
            None
        }
    }

    /// This path followed by each ancestor, ending with the root
    pub fn lineage(&self) -> Vec<Self> {
        let mut lineage = vec![self.clone()];
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            lineage.push(parent.clone());
            current = parent;
        }
        lineage
    }

    /// The same path applying to any type
    pub fn without_type(&self) -> Self {
        Self {
            type_name: None,
            ..self.clone()
        }
    }

    /// The most specific present segment, used as a set's display name
    pub fn leaf_segment(&self) -> Option<&str> {
        self.map_name
            .as_deref()
            .or(self.property_name.as_deref())
            .or(self.type_name.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        validate_optional_name("typeName", self.type_name.as_deref())?;
        validate_optional_name("propertyName", self.property_name.as_deref())?;
        validate_optional_name("mapName", self.map_name.as_deref())
    }

    /// Qualified name of the set at this path, or of the leaf `preferred_value`
    /// beneath it
    pub fn qualified_name(&self, preferred_value: Option<&str>) -> String {
        let segments = [
            self.type_name.as_deref(),
            self.property_name.as_deref(),
            self.map_name.as_deref(),
            preferred_value,
        ];
        let mut qualified_name = VALID_VALUE_QUALIFIED_NAME_PREFIX.to_string();
        qualified_name.push_str(&join_positional(&segments, true));
        qualified_name
    }

    /// Category string encoding the same path, for filtering
    pub fn category(&self) -> String {
        let segments = [
            self.type_name.as_deref(),
            self.property_name.as_deref(),
            self.map_name.as_deref(),
        ];
        join_positional(&segments, false)
    }
}

/// Join segments up to the last present one; absent inner segments are empty
fn join_positional(segments: &[Option<&str>], leading_separator: bool) -> String {
    let Some(last) = segments.iter().rposition(Option::is_some) else {
        return String::new();
    };
    let joined = segments[..=last]
        .iter()
        .map(|s| s.unwrap_or_default())
        .collect::<Vec<_>>()
        .join(":");
    if leading_separator {
        format!(":{}", joined)
    } else {
        joined
    }
}

/// Full key of a leaf value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidValueKey {
    pub path: ValidValuePath,
    pub preferred_value: String,
}

impl ValidValueKey {
    pub fn new(
        type_name: Option<&str>,
        property_name: Option<&str>,
        map_name: Option<&str>,
        preferred_value: impl Into<String>,
    ) -> Self {
        Self {
            path: ValidValuePath::new(type_name, property_name, map_name),
            preferred_value: preferred_value.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        self.path.qualified_name(Some(&self.preferred_value))
    }

    pub fn without_type(&self) -> Self {
        Self {
            path: self.path.without_type(),
            preferred_value: self.preferred_value.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.path.validate()?;
        validate_required_name("preferredValue", &self.preferred_value)
    }
}

/// Descriptive properties supplied when setting up a value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidValueProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_deprecated: bool,

    #[serde(default)]
    pub is_case_sensitive: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<DateTime<Utc>>,

    #[serde(default)]
    pub additional_properties: Properties,
}

impl ValidValueProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, is_deprecated: bool) -> Self {
        self.is_deprecated = is_deprecated;
        self
    }

    pub fn case_sensitive(mut self, is_case_sensitive: bool) -> Self {
        self.is_case_sensitive = is_case_sensitive;
        self
    }

    pub fn effective_from(mut self, from: DateTime<Utc>) -> Self {
        self.effective_from = Some(from);
        self
    }

    pub fn effective_to(mut self, to: DateTime<Utc>) -> Self {
        self.effective_to = Some(to);
        self
    }

    pub fn effective_window(&self) -> EffectiveWindow {
        EffectiveWindow::new(self.effective_from, self.effective_to)
    }

    /// `current` with each bound supplied here replacing the stored one
    fn merge_window(&self, current: &EffectiveWindow) -> EffectiveWindow {
        EffectiveWindow::new(
            self.effective_from.or(current.from),
            self.effective_to.or(current.to),
        )
    }

    /// The descriptive part of a definition's property bag
    fn to_properties(&self, default_display_name: Option<&str>) -> Properties {
        let mut properties = self.additional_properties.clone();
        if let Some(display_name) = self.display_name.as_deref().or(default_display_name) {
            properties.insert(DISPLAY_NAME_PROPERTY.to_string(), display_name.into());
        }
        if let Some(description) = &self.description {
            properties.insert(DESCRIPTION_PROPERTY.to_string(), description.clone().into());
        }
        properties.insert(IS_DEPRECATED_PROPERTY.to_string(), self.is_deprecated.into());
        properties.insert(IS_CASE_SENSITIVE_PROPERTY.to_string(), self.is_case_sensitive.into());
        properties
    }
}

/// A valid value definition as read back from the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidValueDefinition {
    pub guid: Guid,
    pub qualified_name: String,
    pub path: ValidValuePath,

    /// `None` for grouping sets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    pub is_deprecated: bool,
    pub is_case_sensitive: bool,

    #[serde(default)]
    pub effective: EffectiveWindow,

    pub created_at: DateTime<Utc>,
}

impl ValidValueDefinition {
    /// Read a definition out of an element; `None` if it is not one
    pub fn from_element(element: &Element) -> Option<Self> {
        if element.type_name != VALID_VALUE_DEFINITION_TYPE {
            return None;
        }
        let string = |name: &str| element.string_property(name).map(str::to_string);

        Some(Self {
            guid: element.guid.clone(),
            qualified_name: element.qualified_name()?.to_string(),
            path: ValidValuePath {
                type_name: string(TYPE_NAME_PROPERTY),
                property_name: string(PROPERTY_NAME_PROPERTY),
                map_name: string(MAP_NAME_PROPERTY),
            },
            preferred_value: string(PREFERRED_VALUE_PROPERTY),
            display_name: string(DISPLAY_NAME_PROPERTY),
            description: string(DESCRIPTION_PROPERTY),
            category: string(CATEGORY_PROPERTY),
            scope: string(SCOPE_PROPERTY),
            is_deprecated: element.bool_property(IS_DEPRECATED_PROPERTY).unwrap_or(false),
            is_case_sensitive: element.bool_property(IS_CASE_SENSITIVE_PROPERTY).unwrap_or(false),
            effective: element.effective.clone(),
            created_at: element.created_at,
        })
    }

    pub fn is_set(&self) -> bool {
        self.preferred_value.is_none()
    }

    /// A grouping set holding the values of one map key
    pub fn is_map_name_set(&self) -> bool {
        self.is_set() && self.path.map_name.is_some()
    }
}

/// One entry of a value listing. Map-name sets carry their own members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidValueDetail {
    pub definition: ValidValueDefinition,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map_values: Vec<ValidValueDefinition>,
}

/// Builds, navigates and validates against the valid value forest
pub struct ValidValueManager;

impl ValidValueManager {
    // ─────────────────────────────────────────────────────────────────────────
    // Hierarchy construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Identifier of the grouping set at `path`, creating it and any missing
    /// ancestors on demand.
    ///
    /// Walks up from `path` to the deepest existing ancestor, then creates
    /// the missing levels top-down, each as a member of the level above.
    pub async fn ensure_parent_set(ctx: &CallContext, path: &ValidValuePath, options: &QueryOptions) -> Result<Guid> {
        path.validate()?;
        Self::validate_for_update(options)?;

        let lookup_options = Self::write_lookup_options(options);
        let mut missing = Vec::new();
        let mut parent_guid = None;
        for level in path.lineage() {
            match Self::lookup_guid(ctx, &level.qualified_name(None), &lookup_options).await? {
                Some(guid) => {
                    parent_guid = Some(guid);
                    break;
                }
                None => missing.push(level),
            }
        }

        while let Some(level) = missing.pop() {
            let properties = ValidValueProperties::new();
            let guid = Self::create_definition(ctx, &level, None, &properties, parent_guid.as_ref(), options).await?;
            parent_guid = Some(guid);
        }

        parent_guid.ok_or_else(|| Error::Internal(format!("no set resolved for {}", path.qualified_name(None))))
    }

    /// The grouping set at exactly `path`, without creating anything
    pub async fn find_set(ctx: &CallContext, path: &ValidValuePath, options: &QueryOptions) -> Result<Option<ValidValueDefinition>> {
        Self::lookup(ctx, &path.qualified_name(None), options).await
    }

    /// The set at `path`, or the any-type set when there is no specific one.
    /// The root never stands in for a type's own set.
    async fn resolve_set(ctx: &CallContext, path: &ValidValuePath, options: &QueryOptions) -> Result<Option<ValidValueDefinition>> {
        if let Some(set) = Self::find_set(ctx, path, options).await? {
            return Ok(Some(set));
        }
        match Self::general_path(path) {
            Some(general) => Self::find_set(ctx, &general, options).await,
            None => Ok(None),
        }
    }

    /// The any-type counterpart of a type-specific path, if it names a
    /// property
    fn general_path(path: &ValidValuePath) -> Option<ValidValuePath> {
        path.type_name.as_ref()?;
        let general = path.without_type();
        (!general.is_root()).then_some(general)
    }

    /// Existence checks on write paths see every definition regardless of its
    /// effective window, so a not-yet-effective name is never created twice
    fn write_lookup_options(options: &QueryOptions) -> QueryOptions {
        QueryOptions {
            effective_time: None,
            ..options.clone()
        }
    }

    /// Identifier of the leaf for `key`, creating it under its parent set when
    /// absent. An existing any-type value satisfies a type-specific key;
    /// [`Self::set_up_value`] creates a type-specific override instead.
    pub async fn ensure_leaf_value(ctx: &CallContext, key: &ValidValueKey, options: &QueryOptions) -> Result<Guid> {
        key.validate()?;
        Self::validate_for_update(options)?;

        if let Some(definition) = Self::resolve_leaf(ctx, key, &Self::write_lookup_options(options)).await? {
            return Ok(definition.guid);
        }

        let parent = Self::ensure_parent_set(ctx, &key.path, options).await?;
        Self::create_definition(
            ctx,
            &key.path,
            Some(&key.preferred_value),
            &ValidValueProperties::new(),
            Some(&parent),
            options,
        )
        .await
    }

    /// Create or update the leaf for `key` with descriptive properties
    pub async fn set_up_value(
        ctx: &CallContext,
        key: &ValidValueKey,
        properties: &ValidValueProperties,
        options: &QueryOptions,
    ) -> Result<Guid> {
        key.validate()?;
        Self::validate_for_update(options)?;

        let lookup_options = Self::write_lookup_options(options);
        if let Some(existing) = Self::lookup(ctx, &key.qualified_name(), &lookup_options).await? {
            let update = properties.to_properties(Some(&key.preferred_value));
            ctx.repository
                .update_element_properties(&ctx.caller, &existing.guid, update, options)
                .await?;

            let window = properties.merge_window(&existing.effective);
            if window != existing.effective {
                ctx.repository
                    .update_element_effective_window(&ctx.caller, &existing.guid, window, options)
                    .await?;
            }
            tracing::info!("Updated valid value {}", key.qualified_name());
            return Ok(existing.guid);
        }

        let parent = Self::ensure_parent_set(ctx, &key.path, options).await?;
        Self::create_definition(ctx, &key.path, Some(&key.preferred_value), properties, Some(&parent), options).await
    }

    /// Ensure the grouping set for one key of a map-typed property and apply
    /// descriptive properties to it
    pub async fn set_up_map_name(
        ctx: &CallContext,
        type_name: Option<&str>,
        property_name: &str,
        map_name: &str,
        properties: &ValidValueProperties,
        options: &QueryOptions,
    ) -> Result<Guid> {
        let path = ValidValuePath::for_map(type_name, property_name, map_name);
        let guid = Self::ensure_parent_set(ctx, &path, options).await?;

        let update = properties.to_properties(Some(map_name));
        ctx.repository
            .update_element_properties(&ctx.caller, &guid, update, options)
            .await?;

        if properties.effective_from.is_some() || properties.effective_to.is_some() {
            let current = Self::find_set(ctx, &path, &Self::write_lookup_options(options))
                .await?
                .map(|set| set.effective)
                .unwrap_or_default();
            let window = properties.merge_window(&current);
            if window != current {
                ctx.repository
                    .update_element_effective_window(&ctx.caller, &guid, window, options)
                    .await?;
            }
        }
        Ok(guid)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Leaf resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Specific-then-general lookup of a leaf
    pub async fn resolve_leaf(ctx: &CallContext, key: &ValidValueKey, options: &QueryOptions) -> Result<Option<ValidValueDefinition>> {
        if let Some(definition) = Self::lookup(ctx, &key.qualified_name(), options).await? {
            return Ok(Some(definition));
        }
        if Self::general_path(&key.path).is_some() {
            return Self::lookup(ctx, &key.without_type().qualified_name(), options).await;
        }
        Ok(None)
    }

    /// The leaf for `key`; a miss is an unknown-qualified-name error
    pub async fn get_value(ctx: &CallContext, key: &ValidValueKey, options: &QueryOptions) -> Result<ValidValueDefinition> {
        key.validate()?;
        options.validate()?;
        Self::resolve_leaf(ctx, key, options)
            .await?
            .ok_or_else(|| Error::UnknownQualifiedName(key.qualified_name()))
    }

    /// Delete the leaf `key` resolves to
    pub async fn delete_leaf_value(ctx: &CallContext, key: &ValidValueKey, options: &QueryOptions) -> Result<()> {
        key.validate()?;
        Self::validate_for_update(options)?;

        let definition = Self::resolve_leaf(ctx, key, options)
            .await?
            .ok_or_else(|| Error::UnknownQualifiedName(key.qualified_name()))?;

        ctx.repository
            .delete_element(&ctx.caller, &definition.guid, options)
            .await?;
        tracing::info!("Deleted valid value {}", definition.qualified_name);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consistency links
    // ─────────────────────────────────────────────────────────────────────────

    /// Join two leaves with a symmetric consistency relationship. Linking an
    /// already linked pair, in either order, returns the existing link.
    pub async fn link_consistent_values(
        ctx: &CallContext,
        key_a: &ValidValueKey,
        key_b: &ValidValueKey,
        options: &QueryOptions,
    ) -> Result<Guid> {
        key_a.validate()?;
        key_b.validate()?;
        Self::validate_for_update(options)?;

        let a = Self::resolve_leaf(ctx, key_a, options)
            .await?
            .ok_or_else(|| Error::UnknownQualifiedName(key_a.qualified_name()))?;
        let b = Self::resolve_leaf(ctx, key_b, options)
            .await?
            .ok_or_else(|| Error::UnknownQualifiedName(key_b.qualified_name()))?;

        if a.guid == b.guid {
            return Err(Error::invalid_parameter(
                "validValue",
                format!("{} cannot be consistent with itself", a.qualified_name),
            ));
        }

        if let Some(existing) = Self::consistency_links(ctx, &a.guid, &b.guid, options).await?.first() {
            tracing::debug!("{} and {} already consistent", a.qualified_name, b.qualified_name);
            return Ok(existing.guid.clone());
        }

        let relationship = Relationship::new(CONSISTENT_VALID_VALUES_RELATIONSHIP, a.guid.clone(), b.guid.clone());
        let created = ctx
            .repository
            .create_relationship(&ctx.caller, relationship, options)
            .await?;

        // A concurrent caller may have linked the same pair; keep the oldest.
        let links = Self::consistency_links(ctx, &a.guid, &b.guid, options).await?;
        if let Some(winner) = links.first() {
            if winner.guid != created {
                tracing::warn!(
                    "Consistency link {} <-> {} created concurrently, keeping {}",
                    a.qualified_name,
                    b.qualified_name,
                    winner.guid
                );
                ctx.repository
                    .delete_relationship(&ctx.caller, &created, options)
                    .await?;
                return Ok(winner.guid.clone());
            }
        }

        tracing::info!("Linked {} <-> {}", a.qualified_name, b.qualified_name);
        Ok(created)
    }

    /// Leaves consistent with `leaf_guid`, in either direction
    pub async fn list_consistent_values(
        ctx: &CallContext,
        leaf_guid: &Guid,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<ValidValueDefinition>> {
        options.validate()?;
        let elements = ctx
            .repository
            .get_related_elements(
                &ctx.caller,
                leaf_guid,
                EndSelector::Either,
                Some(CONSISTENT_VALID_VALUES_RELATIONSHIP),
                options,
                paging,
            )
            .await?;
        Ok(elements.iter().filter_map(ValidValueDefinition::from_element).collect())
    }

    /// [`Self::list_consistent_values`] for the leaf `key` resolves to
    pub async fn list_consistent_values_for(
        ctx: &CallContext,
        key: &ValidValueKey,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<ValidValueDefinition>> {
        let leaf = Self::get_value(ctx, key, options).await?;
        Self::list_consistent_values(ctx, &leaf.guid, options, paging).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `actual_value` is permitted for the property. A property with
    /// no valid value set at all permits anything.
    pub async fn is_valid_value(
        ctx: &CallContext,
        type_name: Option<&str>,
        property_name: Option<&str>,
        actual_value: &str,
        options: &QueryOptions,
    ) -> Result<bool> {
        let key = ValidValueKey::new(type_name, property_name, None, actual_value);
        key.validate()?;
        options.validate()?;

        if Self::resolve_leaf(ctx, &key, options).await?.is_some() {
            return Ok(true);
        }
        let governed = Self::resolve_set(ctx, &key.path, options).await?.is_some();
        Ok(!governed)
    }

    /// Whether `map_name` is a permitted key of a map-typed property
    pub async fn is_valid_map_name(
        ctx: &CallContext,
        type_name: Option<&str>,
        property_name: &str,
        map_name: &str,
        options: &QueryOptions,
    ) -> Result<bool> {
        let path = ValidValuePath::for_map(type_name, property_name, map_name);
        path.validate()?;
        options.validate()?;

        if Self::resolve_set(ctx, &path, options).await?.is_some() {
            return Ok(true);
        }
        let property_path = ValidValuePath::for_property(type_name, property_name);
        let governed = Self::resolve_set(ctx, &property_path, options).await?.is_some();
        Ok(!governed)
    }

    /// Whether `actual_value` is permitted under one key of a map-typed property
    pub async fn is_valid_map_value(
        ctx: &CallContext,
        type_name: Option<&str>,
        property_name: &str,
        map_name: &str,
        actual_value: &str,
        options: &QueryOptions,
    ) -> Result<bool> {
        let key = ValidValueKey::new(type_name, Some(property_name), Some(map_name), actual_value);
        key.validate()?;
        options.validate()?;

        if Self::resolve_leaf(ctx, &key, options).await?.is_some() {
            return Ok(true);
        }
        let governed = Self::resolve_set(ctx, &key.path, options).await?.is_some();
        Ok(!governed)
    }

    /// Direct members of the property's set. Map-name sets also carry their
    /// own members. An ungoverned property lists nothing.
    pub async fn list_valid_values(
        ctx: &CallContext,
        type_name: Option<&str>,
        property_name: Option<&str>,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<ValidValueDetail>> {
        let path = ValidValuePath::new(type_name, property_name, None);
        path.validate()?;
        options.validate()?;

        let Some(set) = Self::resolve_set(ctx, &path, options).await? else {
            return Ok(Vec::new());
        };

        let members = Self::members(ctx, &set.guid, options, paging).await?;
        let mut details = Vec::with_capacity(members.len());
        for definition in members {
            let map_values = if definition.is_map_name_set() {
                Self::members(ctx, &definition.guid, options, &Pagination::max()).await?
            } else {
                Vec::new()
            };
            details.push(ValidValueDetail {
                definition,
                map_values,
            });
        }
        Ok(details)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Writes cannot target a historical view
    fn validate_for_update(options: &QueryOptions) -> Result<()> {
        if options.as_of_time.is_some() {
            return Err(Error::invalid_parameter(
                "asOfTime",
                "valid values cannot be changed in a historical view",
            ));
        }
        options.validate()
    }

    async fn members(
        ctx: &CallContext,
        set_guid: &Guid,
        options: &QueryOptions,
        paging: &Pagination,
    ) -> Result<Vec<ValidValueDefinition>> {
        let elements = ctx
            .repository
            .get_related_elements(
                &ctx.caller,
                set_guid,
                EndSelector::End1,
                Some(VALID_VALUE_MEMBER_RELATIONSHIP),
                options,
                paging,
            )
            .await?;
        Ok(elements.iter().filter_map(ValidValueDefinition::from_element).collect())
    }

    /// Every definition carrying `qualified_name`, oldest first
    async fn find_by_qualified_name(
        ctx: &CallContext,
        qualified_name: &str,
        options: &QueryOptions,
    ) -> Result<Vec<ValidValueDefinition>> {
        let query = FindQuery::of_type(VALID_VALUE_DEFINITION_TYPE)
            .with_properties(Some(SearchConditionBuilder::qualified_name(qualified_name)))
            .sequenced_by(SequencingOrder::CreationDateOldest);

        let elements = ctx
            .repository
            .find_elements(&ctx.caller, &query, options, &Pagination::max())
            .await?;

        let mut definitions: Vec<ValidValueDefinition> = elements
            .iter()
            .filter_map(ValidValueDefinition::from_element)
            .filter(|d| d.qualified_name == qualified_name)
            .collect();
        definitions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.guid.cmp(&b.guid)));
        Ok(definitions)
    }

    /// The canonical (oldest) definition for a qualified name
    async fn lookup(ctx: &CallContext, qualified_name: &str, options: &QueryOptions) -> Result<Option<ValidValueDefinition>> {
        Ok(Self::find_by_qualified_name(ctx, qualified_name, options)
            .await?
            .into_iter()
            .next())
    }

    async fn lookup_guid(ctx: &CallContext, qualified_name: &str, options: &QueryOptions) -> Result<Option<Guid>> {
        Ok(Self::lookup(ctx, qualified_name, options).await?.map(|d| d.guid))
    }

    /// Consistency relationships joining `a` and `b`, oldest first
    async fn consistency_links(ctx: &CallContext, a: &Guid, b: &Guid, options: &QueryOptions) -> Result<Vec<Relationship>> {
        let sequencing = SequencingOrder::CreationDateOldest;
        let mut page = Pagination::max();
        let mut links = Vec::new();

        loop {
            let batch = ctx
                .repository
                .get_attachment_links(
                    &ctx.caller,
                    a,
                    Some(CONSISTENT_VALID_VALUES_RELATIONSHIP),
                    &sequencing,
                    options,
                    &page,
                )
                .await?;
            let returned = batch.len();
            links.extend(batch.into_iter().filter(|r| r.connects(a, b)));
            if page.is_last_page(returned) {
                break;
            }
            page = page.next();
        }

        links.sort_by(|x, y| x.created_at.cmp(&y.created_at).then_with(|| x.guid.cmp(&y.guid)));
        Ok(links)
    }

    fn definition_element(
        path: &ValidValuePath,
        preferred_value: Option<&str>,
        properties: &ValidValueProperties,
    ) -> Element {
        let mut element = Element::new(VALID_VALUE_DEFINITION_TYPE)
            .with_effective(properties.effective_window());

        let default_display_name = preferred_value.or(path.leaf_segment());
        element.properties = properties.to_properties(default_display_name);
        element.properties.insert(
            QUALIFIED_NAME_PROPERTY.to_string(),
            path.qualified_name(preferred_value).into(),
        );
        element
            .properties
            .insert(SCOPE_PROPERTY.to_string(), OPEN_METADATA_ECOSYSTEM_SCOPE.into());

        let category = path.category();
        if !category.is_empty() {
            element.properties.insert(CATEGORY_PROPERTY.to_string(), category.into());
        }
        if let Some(value) = preferred_value {
            element.properties.insert(PREFERRED_VALUE_PROPERTY.to_string(), value.into());
        }
        for (name, segment) in [
            (TYPE_NAME_PROPERTY, &path.type_name),
            (PROPERTY_NAME_PROPERTY, &path.property_name),
            (MAP_NAME_PROPERTY, &path.map_name),
        ] {
            if let Some(segment) = segment {
                element.properties.insert(name.to_string(), segment.clone().into());
            }
        }
        element
    }

    /// Create one definition as a member of `parent`, then re-resolve its
    /// qualified name. If a concurrent caller created the same name first,
    /// the new definition is removed and the older one returned.
    async fn create_definition(
        ctx: &CallContext,
        path: &ValidValuePath,
        preferred_value: Option<&str>,
        properties: &ValidValueProperties,
        parent: Option<&Guid>,
        options: &QueryOptions,
    ) -> Result<Guid> {
        let qualified_name = path.qualified_name(preferred_value);
        let element = Self::definition_element(path, preferred_value, properties);

        let created = ctx
            .repository
            .create_element(&ctx.caller, element, options)
            .await?;

        if let Some(parent) = parent {
            let membership = Relationship::new(VALID_VALUE_MEMBER_RELATIONSHIP, parent.clone(), created.clone())
                .with_property(IS_DEFAULT_VALUE_PROPERTY, false);
            ctx.repository
                .create_relationship(&ctx.caller, membership, options)
                .await?;
        }

        match Self::lookup_guid(ctx, &qualified_name, &Self::write_lookup_options(options)).await? {
            Some(winner) if winner != created => {
                tracing::warn!(
                    "{} was created concurrently, re-resolving to {}",
                    qualified_name,
                    winner
                );
                ctx.repository
                    .delete_element(&ctx.caller, &created, options)
                    .await?;
                Ok(winner)
            }
            _ => {
                tracing::info!("Created valid value definition {}", qualified_name);
                Ok(created)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_names_are_positional() {
        assert_eq!(ValidValuePath::root().qualified_name(None), "ValidValue");
        assert_eq!(
            ValidValuePath::new(Some("Asset"), None, None).qualified_name(None),
            "ValidValue:Asset"
        );
        assert_eq!(
            ValidValuePath::for_property(None, "status").qualified_name(None),
            "ValidValue::status"
        );
        assert_eq!(
            ValidValuePath::for_property(Some("Asset"), "status").qualified_name(Some("ACTIVE")),
            "ValidValue:Asset:status::ACTIVE"
        );
        assert_eq!(
            ValidValuePath::for_map(None, "additionalProperties", "colour").qualified_name(Some("red")),
            "ValidValue::additionalProperties:colour:red"
        );
    }

    #[test]
    fn test_any_type_path_does_not_collide_with_type() {
        let as_type = ValidValuePath::new(Some("status"), None, None);
        let as_property = ValidValuePath::for_property(None, "status");
        assert_ne!(as_type.qualified_name(None), as_property.qualified_name(None));
    }

    #[test]
    fn test_category() {
        assert_eq!(ValidValuePath::root().category(), "");
        assert_eq!(ValidValuePath::for_property(Some("Asset"), "status").category(), "Asset:status");
        assert_eq!(ValidValuePath::for_map(None, "props", "k").category(), ":props:k");
    }

    #[test]
    fn test_parent_drops_most_specific_segment() {
        let path = ValidValuePath::for_map(Some("Asset"), "props", "colour");
        let parent = path.parent().unwrap();
        assert_eq!(parent, ValidValuePath::for_property(Some("Asset"), "props"));
        let grandparent = parent.parent().unwrap();
        assert_eq!(grandparent, ValidValuePath::new(Some("Asset"), None, None));
        assert_eq!(grandparent.parent(), Some(ValidValuePath::root()));
        assert_eq!(ValidValuePath::root().parent(), None);

        // Missing segments are skipped
        let general = ValidValuePath::for_map(None, "props", "colour");
        assert_eq!(general.parent(), Some(ValidValuePath::for_property(None, "props")));
        assert_eq!(
            ValidValuePath::for_property(None, "props").parent(),
            Some(ValidValuePath::root())
        );
    }

    #[test]
    fn test_lineage_ends_at_root() {
        let lineage = ValidValuePath::for_map(Some("Asset"), "props", "colour").lineage();
        assert_eq!(lineage.len(), 4);
        assert!(lineage[3].is_root());
        assert_eq!(ValidValuePath::root().lineage(), vec![ValidValuePath::root()]);
    }

    #[test]
    fn test_key_validation() {
        assert!(ValidValueKey::new(Some("Asset"), Some("status"), None, "ACTIVE").validate().is_ok());
        assert!(matches!(
            ValidValueKey::new(Some("Asset"), Some("status"), None, "").validate(),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(ValidValueKey::new(Some(""), Some("status"), None, "ACTIVE").validate().is_err());
    }

    #[test]
    fn test_definition_element_shape() {
        let path = ValidValuePath::for_property(Some("Asset"), "status");
        let element = ValidValueManager::definition_element(
            &path,
            Some("ACTIVE"),
            &ValidValueProperties::new().with_description("In use"),
        );

        let definition = ValidValueDefinition::from_element(&element).unwrap();
        assert_eq!(definition.qualified_name, "ValidValue:Asset:status::ACTIVE");
        assert_eq!(definition.preferred_value.as_deref(), Some("ACTIVE"));
        assert_eq!(definition.display_name.as_deref(), Some("ACTIVE"));
        assert_eq!(definition.description.as_deref(), Some("In use"));
        assert_eq!(definition.category.as_deref(), Some("Asset:status"));
        assert_eq!(definition.scope.as_deref(), Some(OPEN_METADATA_ECOSYSTEM_SCOPE));
        assert_eq!(definition.path, path);
        assert!(!definition.is_set());
    }

    #[test]
    fn test_set_definition_has_no_preferred_value() {
        let path = ValidValuePath::for_map(None, "props", "colour");
        let element = ValidValueManager::definition_element(&path, None, &ValidValueProperties::new());
        let definition = ValidValueDefinition::from_element(&element).unwrap();

        assert!(definition.is_set());
        assert!(definition.is_map_name_set());
        assert_eq!(definition.display_name.as_deref(), Some("colour"));
    }

    #[test]
    fn test_non_definition_elements_ignored() {
        let element = Element::new("Asset").with_qualified_name("ValidValue:Asset");
        assert!(ValidValueDefinition::from_element(&element).is_none());
    }
}
