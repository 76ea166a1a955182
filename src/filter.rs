//! Filter sets - conjunctive per-property value constraints
//!
//! A filter set maps property names to one-or-more accepted string values.
//! Multiple values on one property are a logical OR; multiple properties are
//! ANDed together. Validation runs once per lookup, before any scan or query
//! executes, and checks emptiness before property existence.

use std::collections::BTreeMap;

use crate::entity::{Entity, FieldValue};
use crate::{Error, Result};

/// Property name -> accepted string values.
///
/// Values are strings at the API; each store parses them through the field's
/// SQL type tag before matching or binding.
pub type FilterSet = BTreeMap<String, Vec<String>>;

/// Check a filter set against an entity's declared fields.
///
/// Raises `EmptyFilter` for a blank property name, an empty value list, or a
/// blank value; `UnknownProperty` for a name that matches no declared field.
pub fn validate<E: Entity>(filters: &FilterSet) -> Result<()> {
    for (name, values) in filters {
        if name.trim().is_empty() {
            return Err(Error::EmptyFilter("blank property name".to_string()));
        }
        if values.is_empty() {
            return Err(Error::EmptyFilter(format!("no accepted values for '{}'", name)));
        }
        if values.iter().any(|v| v.trim().is_empty()) {
            return Err(Error::EmptyFilter(format!("blank accepted value for '{}'", name)));
        }
        if !E::fields().iter().any(|f| f.name == name.as_str()) {
            return Err(Error::UnknownProperty {
                entity: E::TYPE_NAME.to_string(),
                property: name.clone(),
            });
        }
    }
    Ok(())
}

/// True when the entity satisfies every property constraint in the set.
///
/// Accepted values that cannot parse for the field's type never match.
/// Callers are expected to have validated the set first.
pub fn matches<E: Entity>(entity: &E, filters: &FilterSet) -> bool {
    filters.iter().all(|(name, values)| {
        let Some(field) = E::fields().iter().find(|f| f.name == name.as_str()) else {
            return false;
        };
        let actual = (field.get)(entity);
        values
            .iter()
            .filter_map(|v| FieldValue::parse(v, field.sql_type))
            .any(|accepted| accepted == actual)
    })
}

/// Convenience constructor used in tests and by simple callers
pub fn filter_set<const N: usize>(entries: [(&str, Vec<&str>); N]) -> FilterSet {
    entries
        .into_iter()
        .map(|(name, values)| {
            (name.to_string(), values.into_iter().map(str::to_string).collect())
        })
        .collect()
}
