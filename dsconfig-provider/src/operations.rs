//! Minimal PATCH operations from a plan and the prior state.
//!
//! Each resource calls these once per attribute, in declaration order, so the
//! resulting list is deterministic. A plan value that is null or unknown
//! leaves the server value alone.

use std::collections::BTreeSet;

use dsconfig_client::Operation;
use dsconfig_resource::value::Attr;

pub fn add_string_operation_if_necessary(
    operations: &mut Vec<Operation>,
    plan: &Attr<String>,
    state: &Attr<String>,
    path: &str,
) {
    let Attr::Known(value) = plan else {
        return;
    };
    // the server treats "" as absent
    if value.is_empty() {
        return;
    }
    if state.known() != Some(value) {
        operations.push(Operation::replace(path, value.as_str()));
    }
}

pub fn add_bool_operation_if_necessary(
    operations: &mut Vec<Operation>,
    plan: &Attr<bool>,
    state: &Attr<bool>,
    path: &str,
) {
    if let Attr::Known(value) = plan {
        if state.known() != Some(value) {
            operations.push(Operation::replace(path, value.to_string()));
        }
    }
}

pub fn add_int64_operation_if_necessary(
    operations: &mut Vec<Operation>,
    plan: &Attr<i64>,
    state: &Attr<i64>,
    path: &str,
) {
    if let Attr::Known(value) = plan {
        if state.known() != Some(value) {
            operations.push(Operation::replace(path, value.to_string()));
        }
    }
}

/// One `add` for the values only in the plan, then one `remove` for the
/// values only in the state.
pub fn add_string_set_operations_if_necessary(
    operations: &mut Vec<Operation>,
    plan: &Attr<BTreeSet<String>>,
    state: &Attr<BTreeSet<String>>,
    path: &str,
) {
    let Attr::Known(plan) = plan else {
        return;
    };
    let empty = BTreeSet::new();
    let state = state.known().unwrap_or(&empty);

    let added: Vec<String> = plan.difference(state).cloned().collect();
    if !added.is_empty() {
        operations.push(Operation::add_values(path, added));
    }
    let removed: Vec<String> = state.difference(plan).cloned().collect();
    if !removed.is_empty() {
        operations.push(Operation::remove_values(path, removed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsconfig_client::OperationKind;

    fn set(values: &[&str]) -> Attr<BTreeSet<String>> {
        Attr::Known(values.iter().map(|v| v.to_string()).collect())
    }

    fn known(value: &str) -> Attr<String> {
        Attr::Known(value.to_string())
    }

    #[test]
    fn equal_scalars_produce_nothing() {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &known("x"), &known("x"), "description");
        add_bool_operation_if_necessary(&mut ops, &Attr::Known(true), &Attr::Known(true), "enabled");
        add_int64_operation_if_necessary(&mut ops, &Attr::Known(7), &Attr::Known(7), "limit");
        assert!(ops.is_empty());
    }

    #[test]
    fn changed_scalars_produce_one_replace_each() {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &known("x"), &known("y"), "description");
        add_bool_operation_if_necessary(&mut ops, &Attr::Known(false), &Attr::Known(true), "enabled");
        add_int64_operation_if_necessary(&mut ops, &Attr::Known(1000), &Attr::Null, "limit");
        assert_eq!(
            ops,
            vec![
                Operation::replace("description", "x"),
                Operation::replace("enabled", "false"),
                Operation::replace("limit", "1000"),
            ]
        );
    }

    #[test]
    fn unset_plan_produces_nothing() {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &Attr::Null, &known("y"), "description");
        add_string_operation_if_necessary(&mut ops, &Attr::Unknown, &known("y"), "description");
        add_bool_operation_if_necessary(&mut ops, &Attr::Unknown, &Attr::Known(true), "enabled");
        add_int64_operation_if_necessary(&mut ops, &Attr::Null, &Attr::Known(3), "limit");
        add_string_set_operations_if_necessary(&mut ops, &Attr::Null, &set(&["a"]), "values");
        add_string_set_operations_if_necessary(&mut ops, &Attr::Unknown, &set(&["a"]), "values");
        assert!(ops.is_empty());
    }

    #[test]
    fn empty_string_is_unset() {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &known(""), &known("y"), "description");
        add_string_operation_if_necessary(&mut ops, &known(""), &Attr::Null, "description");
        assert!(ops.is_empty());
    }

    #[test]
    fn set_order_is_irrelevant() {
        let mut ops = Vec::new();
        add_string_set_operations_if_necessary(
            &mut ops,
            &set(&["b", "a", "c"]),
            &set(&["c", "b", "a"]),
            "userBaseDN",
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn set_differences() {
        let mut ops = Vec::new();
        add_string_set_operations_if_necessary(
            &mut ops,
            &set(&["d", "a", "b"]),
            &set(&["b", "c", "e"]),
            "userBaseDN",
        );
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].op, OperationKind::Add);
        assert_eq!(ops[0].values, vec!["a", "d"]);
        assert_eq!(ops[1].op, OperationKind::Remove);
        assert_eq!(ops[1].values, vec!["c", "e"]);
        assert!(ops.iter().all(|op| op.path == "userBaseDN" && op.value.is_none()));
    }

    #[test]
    fn set_against_null_state_adds_everything() {
        let mut ops = Vec::new();
        add_string_set_operations_if_necessary(&mut ops, &set(&["x"]), &Attr::Null, "omitField");
        assert_eq!(ops, vec![Operation::add_values("omitField", vec!["x".to_string()])]);

        let mut ops = Vec::new();
        add_string_set_operations_if_necessary(&mut ops, &set(&[]), &set(&["x"]), "omitField");
        assert_eq!(ops, vec![Operation::remove_values("omitField", vec!["x".to_string()])]);
    }
}
