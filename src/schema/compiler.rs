use std::collections::HashSet;

use crate::model::column::{CellKind, ColumnNode, GroupColumn, LeafColumn};
use crate::model::config::GridConfig;
use crate::model::header::{Deliverable, HeaderDescription, PropertyType, Task};
use crate::model::record::{
    KEY_COUNTRY, KEY_FUNCTION_GROUP, KEY_GROUP_ID, KEY_GROUP_NAME, KEY_JOB_NO, KEY_MEMBER_ID,
    KEY_STATUS, KEY_VENDOR,
};
use crate::ops::dispatch::resolve_cell_kind;
use crate::schema::keys::{child_property_key, property_key, task_date_key};

/// Error type for header parsing and column compilation.
/// Either variant aborts the dataset version; no partial tree is produced.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed header description: {0}")]
    Malformed(String),
    #[error("duplicate binding key {key:?} while compiling column {header:?}")]
    KeyCollision { key: String, header: String },
}

const IDENTITY_WIDTH: u32 = 120;
const DATE_WIDTH: u32 = 110;
const PROPERTY_WIDTH: u32 = 100;

/// Parse a JSON header description. Wrong types at any level surface as
/// `SchemaError::Malformed`; missing required fields are never defaulted.
pub fn parse_header(json: &str) -> Result<HeaderDescription, SchemaError> {
    serde_json::from_str(json).map_err(|e| SchemaError::Malformed(e.to_string()))
}

/// Compile a header description into the column tree.
///
/// Emits the fixed identity-leaf prefix, then one group per milestone, task,
/// and deliverable. Nodes with no children of the expected kind compile to
/// empty groups; hiding them is the renderer's decision, the compiler never
/// prunes. Every leaf's `CellKind` is fixed here, once.
pub fn compile(
    header: &HeaderDescription,
    config: &GridConfig,
) -> Result<Vec<ColumnNode>, SchemaError> {
    let mut seen = HashSet::new();
    let mut columns = identity_columns(config, &mut seen)?;

    for milestone in &header.milestones {
        let mut tasks = Vec::with_capacity(milestone.tasks.len());
        for task in &milestone.tasks {
            tasks.push(compile_task(task, &mut seen)?);
        }
        columns.push(ColumnNode::Group(GroupColumn {
            header: milestone.name.clone(),
            children: tasks,
        }));
    }

    Ok(columns)
}

/// The identity columns every dataset starts with, in declared order
fn identity_columns(
    config: &GridConfig,
    seen: &mut HashSet<String>,
) -> Result<Vec<ColumnNode>, SchemaError> {
    let prefix: [(&str, &str); 8] = [
        (KEY_GROUP_ID, "Group"),
        (KEY_GROUP_NAME, "Group Name"),
        (KEY_JOB_NO, "Job No"),
        (KEY_FUNCTION_GROUP, "Function Group"),
        (KEY_MEMBER_ID, "Item"),
        (KEY_VENDOR, "Vendor"),
        (KEY_COUNTRY, "Country"),
        (KEY_STATUS, "Status"),
    ];
    prefix
        .iter()
        .map(|(key, header)| {
            let kind = resolve_cell_kind(key, config);
            leaf_checked(seen, header, key.to_string(), IDENTITY_WIDTH, kind, None)
        })
        .collect()
}

fn compile_task(task: &Task, seen: &mut HashSet<String>) -> Result<ColumnNode, SchemaError> {
    let mut children = Vec::new();

    for dc in &task.date_categories {
        let key = task_date_key(&task.id, &dc.date_type);
        children.push(leaf_checked(
            seen,
            &dc.category,
            key,
            DATE_WIDTH,
            CellKind::DateEditor,
            None,
        )?);
    }

    for deliverable in &task.deliverables {
        children.push(compile_deliverable(&task.id, deliverable, seen)?);
    }

    Ok(ColumnNode::Group(GroupColumn {
        header: task.name.clone(),
        children,
    }))
}

fn compile_deliverable(
    task_id: &str,
    deliverable: &Deliverable,
    seen: &mut HashSet<String>,
) -> Result<ColumnNode, SchemaError> {
    let mut children = Vec::new();

    for prop in &deliverable.properties {
        if prop.children.is_empty() {
            let key = property_key(&deliverable.id, task_id, prop.kind, &prop.id);
            children.push(leaf_checked(
                seen,
                &prop.name,
                key,
                PROPERTY_WIDTH,
                kind_for_type(prop.kind),
                Some(prop.kind),
            )?);
        } else {
            // One group holding a leaf per child; the parent itself is header-only
            let mut grandchildren = Vec::with_capacity(prop.children.len());
            for child in &prop.children {
                let key = child_property_key(
                    &deliverable.id,
                    task_id,
                    prop.kind,
                    &prop.id,
                    child.kind,
                    &child.id,
                );
                grandchildren.push(leaf_checked(
                    seen,
                    &child.name,
                    key,
                    PROPERTY_WIDTH,
                    kind_for_type(child.kind),
                    Some(child.kind),
                )?);
            }
            children.push(ColumnNode::Group(GroupColumn {
                header: prop.name.clone(),
                children: grandchildren,
            }));
        }
    }

    Ok(ColumnNode::Group(GroupColumn {
        header: deliverable.name.clone(),
        children,
    }))
}

fn kind_for_type(kind: PropertyType) -> CellKind {
    if kind.is_date() {
        CellKind::DateEditor
    } else {
        CellKind::PlainText
    }
}

fn leaf_checked(
    seen: &mut HashSet<String>,
    header: &str,
    key: String,
    width: u32,
    kind: CellKind,
    value_type: Option<PropertyType>,
) -> Result<ColumnNode, SchemaError> {
    if !seen.insert(key.clone()) {
        return Err(SchemaError::KeyCollision {
            key,
            header: header.to_string(),
        });
    }
    Ok(ColumnNode::Leaf(LeafColumn {
        header: header.to_string(),
        binding_key: key,
        width,
        kind,
        value_type,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::{find_leaf, format_tree, leaves};

    fn single_milestone_json() -> &'static str {
        r#"[
            {
                "name": "M1",
                "tasks": [
                    {
                        "id": "T1",
                        "name": "Task1",
                        "deliverables": [
                            {
                                "id": "D1",
                                "name": "Del1",
                                "properties": [
                                    {"id": "P1", "type": "INT", "name": "Qty"}
                                ]
                            }
                        ]
                    }
                ]
            }
        ]"#
    }

    #[test]
    fn compiles_single_property_chain() {
        let header = parse_header(single_milestone_json()).unwrap();
        let tree = compile(&header, &GridConfig::default()).unwrap();

        // Identity prefix followed by one milestone group
        assert_eq!(tree.len(), 9);
        let milestone = match &tree[8] {
            ColumnNode::Group(g) => g,
            other => panic!("expected milestone group, got {other:?}"),
        };
        assert_eq!(milestone.header, "M1");

        let leaf = find_leaf(&tree, "D1_T1_INT_P1").expect("property leaf");
        assert_eq!(leaf.header, "Qty");
        assert_eq!(leaf.kind, CellKind::PlainText);
        assert_eq!(leaf.value_type, Some(PropertyType::Int));
    }

    #[test]
    fn milestone_subtree_snapshot() {
        let header = parse_header(single_milestone_json()).unwrap();
        let tree = compile(&header, &GridConfig::default()).unwrap();
        let milestone = std::slice::from_ref(&tree[8]);
        insta::assert_snapshot!(format_tree(milestone), @r"
M1/
  Task1/
    Del1/
      Qty [D1_T1_INT_P1] (PlainText)
");
    }

    #[test]
    fn identity_prefix_kinds() {
        let header = HeaderDescription { milestones: vec![] };
        let tree = compile(&header, &GridConfig::default()).unwrap();
        let kinds: Vec<CellKind> = leaves(&tree).iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CellKind::Hidden,     // GroupId
                CellKind::ReadOnly,   // GroupName
                CellKind::ReadOnly,   // JobNo
                CellKind::ReadOnly,   // FunctionGroup
                CellKind::ReadOnly,   // MemberId
                CellKind::ReadOnly,   // Vendor
                CellKind::CountryFlag,
                CellKind::StatusEditor,
            ]
        );
    }

    #[test]
    fn date_categories_become_date_editor_leaves() {
        let json = r#"[
            {"name": "M1", "tasks": [
                {"id": "T1", "name": "Task1", "date_categories": [
                    {"category": "Planned", "date_type": "PLANNED"},
                    {"category": "Actual", "date_type": "ACTUAL"}
                ]}
            ]}
        ]"#;
        let header = parse_header(json).unwrap();
        let tree = compile(&header, &GridConfig::default()).unwrap();

        let planned = find_leaf(&tree, "T1_PLANNED").expect("date leaf");
        assert_eq!(planned.header, "Planned");
        assert_eq!(planned.kind, CellKind::DateEditor);
        assert!(find_leaf(&tree, "T1_ACTUAL").is_some());
    }

    #[test]
    fn child_properties_compile_to_nested_group() {
        let json = r#"[
            {"name": "M1", "tasks": [
                {"id": "T1", "name": "Task1", "deliverables": [
                    {"id": "D1", "name": "Del1", "properties": [
                        {"id": "P1", "type": "UNIT", "name": "Weight", "children": [
                            {"id": "C1", "type": "FLOAT", "name": "Value"},
                            {"id": "C2", "type": "TEXT", "name": "Unit"}
                        ]}
                    ]}
                ]}
            ]}
        ]"#;
        let header = parse_header(json).unwrap();
        let tree = compile(&header, &GridConfig::default()).unwrap();

        let value = find_leaf(&tree, "D1_T1_UNIT_P1_FLOAT_C1").expect("child leaf");
        assert_eq!(value.kind, CellKind::PlainText);
        assert_eq!(value.value_type, Some(PropertyType::Float));
        assert!(find_leaf(&tree, "D1_T1_UNIT_P1_TEXT_C2").is_some());
        // No leaf for the parent property itself
        assert!(find_leaf(&tree, "D1_T1_UNIT_P1").is_none());
    }

    #[test]
    fn empty_nodes_yield_empty_groups_not_omissions() {
        let json = r#"[
            {"name": "M1", "tasks": [
                {"id": "T1", "name": "Bare", "deliverables": [
                    {"id": "D1", "name": "NoProps", "properties": []}
                ]}
            ]}
        ]"#;
        let header = parse_header(json).unwrap();
        let tree = compile(&header, &GridConfig::default()).unwrap();

        let milestone = match &tree[8] {
            ColumnNode::Group(g) => g,
            other => panic!("expected group, got {other:?}"),
        };
        let task = match &milestone.children[0] {
            ColumnNode::Group(g) => g,
            other => panic!("expected group, got {other:?}"),
        };
        let deliverable = match &task.children[0] {
            ColumnNode::Group(g) => g,
            other => panic!("expected group, got {other:?}"),
        };
        assert_eq!(deliverable.header, "NoProps");
        assert!(deliverable.children.is_empty());
    }

    #[test]
    fn all_binding_keys_are_distinct() {
        let json = r#"[
            {"name": "M1", "tasks": [
                {"id": "T1", "name": "Task1",
                 "date_categories": [{"category": "Planned", "date_type": "PLANNED"}],
                 "deliverables": [
                    {"id": "D1", "name": "Del1", "properties": [
                        {"id": "P1", "type": "INT", "name": "Qty"},
                        {"id": "P2", "type": "FLOAT", "name": "Weight"}
                    ]},
                    {"id": "D2", "name": "Del2", "properties": [
                        {"id": "P1", "type": "INT", "name": "Qty"}
                    ]}
                ]},
                {"id": "T2", "name": "Task2", "deliverables": [
                    {"id": "D1", "name": "Del1", "properties": [
                        {"id": "P1", "type": "INT", "name": "Qty"}
                    ]}
                ]}
            ]}
        ]"#;
        let header = parse_header(json).unwrap();
        let tree = compile(&header, &GridConfig::default()).unwrap();

        let keys: Vec<&str> = leaves(&tree).iter().map(|l| l.binding_key.as_str()).collect();
        let unique: HashSet<&str> = keys.iter().copied().collect();
        assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn duplicate_property_id_is_a_collision_error() {
        let json = r#"[
            {"name": "M1", "tasks": [
                {"id": "T1", "name": "Task1", "deliverables": [
                    {"id": "D1", "name": "Del1", "properties": [
                        {"id": "P1", "type": "INT", "name": "Qty"},
                        {"id": "P1", "type": "INT", "name": "Qty Again"}
                    ]}
                ]}
            ]}
        ]"#;
        let header = parse_header(json).unwrap();
        let err = compile(&header, &GridConfig::default()).unwrap_err();
        match err {
            SchemaError::KeyCollision { key, header } => {
                assert_eq!(key, "D1_T1_INT_P1");
                assert_eq!(header, "Qty Again");
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn malformed_header_is_rejected() {
        // tasks must be an array
        let err = parse_header(r#"[{"name": "M1", "tasks": 42}]"#).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }
}
