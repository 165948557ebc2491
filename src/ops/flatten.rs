use indexmap::IndexMap;

use crate::model::record::{CellValue, RowRecord};
use crate::model::rows::{DeliverableValues, MemberRow, NestedRowGroup, PropertyValue};
use crate::model::header::PropertyType;
use crate::schema::keys::{child_property_key, property_key, task_date_key};

/// Flatten nested server row groups into one record per member row.
///
/// Group identity fields are copied onto every member record. Property values
/// are keyed through the same binding-key rules the schema compiler uses, so
/// every key written here corresponds to a compiled leaf column. Absent
/// payload arrays are treated as empty; this function never fails.
pub fn flatten_groups(groups: &[NestedRowGroup]) -> Vec<RowRecord> {
    let mut records = Vec::new();
    for group in groups {
        for member in &group.members {
            records.push(flatten_member(group, member));
        }
    }
    records
}

fn flatten_member(group: &NestedRowGroup, member: &MemberRow) -> RowRecord {
    let mut record = RowRecord {
        row_key: format!("{}:{}", group.group_id, member.member_id),
        group_id: group.group_id.clone(),
        group_name: group.group_name.clone(),
        job_no: group.job_no.clone(),
        function_group: group.function_group.clone(),
        member_id: member.member_id.clone(),
        vendor: member.vendor.clone(),
        country: member.country.clone(),
        status: member.status.clone(),
        values: IndexMap::new(),
    };

    for deliverable in &member.deliverables {
        for prop in &deliverable.properties {
            apply_property(&mut record, deliverable, None, prop);
            for child in &prop.children {
                apply_property(&mut record, deliverable, Some(prop), child);
            }
        }
    }

    // Tracked task dates live in their own key namespace, apart from
    // deliverable properties
    for tracking in &member.task_tracking {
        if let Some(date) = &tracking.date {
            record.values.insert(
                task_date_key(&tracking.task_id, &tracking.date_type),
                CellValue::Date(date.clone()),
            );
        }
    }

    record
}

fn apply_property(
    record: &mut RowRecord,
    deliverable: &DeliverableValues,
    parent: Option<&PropertyValue>,
    prop: &PropertyValue,
) {
    let Some(raw) = &prop.value else { return };

    let converted = match prop.kind {
        // Unparseable numeric input stays NaN so validation can flag it,
        // rather than masquerading as zero
        PropertyType::Int | PropertyType::Float => {
            Some(CellValue::Number(raw.trim().parse().unwrap_or(f64::NAN)))
        }
        // TEXT, UNIT and plain DATE values are not carried into records;
        // their columns render empty
        PropertyType::Text | PropertyType::Unit | PropertyType::Date => None,
        PropertyType::DateTime => Some(CellValue::Date(raw.clone())),
    };
    let Some(value) = converted else { return };

    let key = match parent {
        Some(parent) => child_property_key(
            &deliverable.deliverable_id,
            &deliverable.task_id,
            parent.kind,
            &parent.property_id,
            prop.kind,
            &prop.property_id,
        ),
        None => property_key(
            &deliverable.deliverable_id,
            &deliverable.task_id,
            prop.kind,
            &prop.property_id,
        ),
    };
    record.values.insert(key, value);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
