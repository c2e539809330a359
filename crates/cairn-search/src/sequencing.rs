//! Result ordering by `SequencingOrder`

use std::cmp::Ordering;

use cairn_core::{Element, Relationship, SequencingOrder};
use serde_json::Value;

use crate::traits::PropertySource;

/// Missing values sort after present ones; mismatched kinds compare by text
fn compare_property(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn by_property<T: PropertySource>(name: &str, a: &T, b: &T) -> Ordering {
    compare_property(a.property(name), b.property(name))
}

/// Sort elements in place. `Any` keeps repository order, which is
/// creation order for the in-memory store.
pub fn sort_elements(elements: &mut [Element], sequencing: &SequencingOrder) {
    match sequencing {
        SequencingOrder::Any => {}
        SequencingOrder::CreationDateRecent => {
            elements.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.guid.cmp(&a.guid)))
        }
        SequencingOrder::CreationDateOldest => {
            elements.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.guid.cmp(&b.guid)))
        }
        SequencingOrder::LastUpdateRecent => {
            elements.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| b.guid.cmp(&a.guid)))
        }
        SequencingOrder::LastUpdateOldest => {
            elements.sort_by(|a, b| a.updated_at.cmp(&b.updated_at).then_with(|| a.guid.cmp(&b.guid)))
        }
        SequencingOrder::PropertyAscending(name) => {
            elements.sort_by(|a, b| by_property(name, a, b).then_with(|| a.guid.cmp(&b.guid)))
        }
        SequencingOrder::PropertyDescending(name) => {
            elements.sort_by(|a, b| by_property(name, b, a).then_with(|| b.guid.cmp(&a.guid)))
        }
        SequencingOrder::Guid => elements.sort_by(|a, b| a.guid.cmp(&b.guid)),
    }
}

/// Sort relationships in place, with the same rules as [`sort_elements`]
pub fn sort_relationships(relationships: &mut [Relationship], sequencing: &SequencingOrder) {
    match sequencing {
        SequencingOrder::Any => {}
        SequencingOrder::CreationDateRecent => {
            relationships.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.guid.cmp(&a.guid)))
        }
        SequencingOrder::CreationDateOldest => {
            relationships.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.guid.cmp(&b.guid)))
        }
        SequencingOrder::LastUpdateRecent => {
            relationships.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| b.guid.cmp(&a.guid)))
        }
        SequencingOrder::LastUpdateOldest => {
            relationships.sort_by(|a, b| a.updated_at.cmp(&b.updated_at).then_with(|| a.guid.cmp(&b.guid)))
        }
        SequencingOrder::PropertyAscending(name) => {
            relationships.sort_by(|a, b| by_property(name, a, b).then_with(|| a.guid.cmp(&b.guid)))
        }
        SequencingOrder::PropertyDescending(name) => {
            relationships.sort_by(|a, b| by_property(name, b, a).then_with(|| b.guid.cmp(&a.guid)))
        }
        SequencingOrder::Guid => relationships.sort_by(|a, b| a.guid.cmp(&b.guid)),
    }
}
