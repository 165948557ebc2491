//! Binding-key construction.
//!
//! The compiler and the flattener both derive keys from ancestor ids through
//! these functions and nowhere else. If the two sides ever built keys
//! independently, a drifted rule would make cells silently render empty, so
//! the rule lives in exactly one place.

use crate::model::header::PropertyType;

/// Separator between key segments
pub const KEY_DELIMITER: char = '_';

/// Key for a deliverable property leaf: `deliverableId_taskId_TYPE_propertyId`
pub fn property_key(
    deliverable_id: &str,
    task_id: &str,
    kind: PropertyType,
    property_id: &str,
) -> String {
    format!(
        "{deliverable_id}{d}{task_id}{d}{}{d}{property_id}",
        kind.code(),
        d = KEY_DELIMITER
    )
}

/// Key for a child-property leaf: the parent's full key extended with the
/// child's type and id. Two children with the same name under different
/// parents can never collide because every ancestor id is in the key.
pub fn child_property_key(
    deliverable_id: &str,
    task_id: &str,
    parent_kind: PropertyType,
    parent_id: &str,
    child_kind: PropertyType,
    child_id: &str,
) -> String {
    format!(
        "{}{d}{}{d}{child_id}",
        property_key(deliverable_id, task_id, parent_kind, parent_id),
        child_kind.code(),
        d = KEY_DELIMITER
    )
}

/// Key for a tracked task date: `taskId_dateType`. A separate namespace from
/// deliverable properties; task ids and deliverable ids never overlap in
/// practice, and the compiler rejects any collision that does occur.
pub fn task_date_key(task_id: &str, date_type: &str) -> String {
    format!("{task_id}{KEY_DELIMITER}{date_type}")
}
