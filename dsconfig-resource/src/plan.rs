//! Schema driven plan modification.

use crate::{
    schema::{PlanModifier, Schema, TYPE_ATTRIBUTE},
    value::AttributeValues,
};

/// The outcome of planning a change to one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub planned_state: AttributeValues,
    /// Attributes whose change forces the object to be replaced.
    pub requires_replace: Vec<String>,
}

/// Plan the new state of a resource from its proposed configuration.
///
/// A null attribute gets its default, if it has one and applies to the
/// object's subtype. A null computed attribute becomes unknown, or keeps its
/// prior value with [`PlanModifier::UseStateForUnknown`]. Computed attributes
/// that do not apply to the object's subtype stay null.
pub fn plan_resource_change(
    schema: &Schema,
    prior: Option<&AttributeValues>,
    proposed: &AttributeValues,
) -> PlannedChange {
    let mut planned = proposed.clone();
    let type_ = proposed
        .raw(TYPE_ATTRIBUTE)
        .and_then(|v| v.as_str())
        .map(str::to_string);

    for (name, attribute) in &schema.attributes {
        if !proposed.is_null(name) {
            continue;
        }
        let applies = match &type_ {
            Some(t) => attribute.applies_to_type(t),
            // unknown subtype: assume it might apply
            None => true,
        };
        if !applies {
            continue;
        }
        if let Some(default) = &attribute.default {
            planned.insert(name, default.clone());
            continue;
        }
        if !attribute.computed {
            continue;
        }
        let prior_value = prior.and_then(|p| p.raw(name));
        match prior_value {
            Some(value) if attribute.has_modifier(PlanModifier::UseStateForUnknown) => {
                planned.insert(name, value.clone());
            }
            _ => planned.mark_unknown(name),
        }
    }

    let mut requires_replace = Vec::new();
    if let Some(prior) = prior {
        for (name, attribute) in &schema.attributes {
            if !attribute.has_modifier(PlanModifier::RequiresReplace) || planned.is_unknown(name)
            {
                continue;
            }
            if planned.raw(name) != prior.raw(name) {
                requires_replace.push(name.clone());
            }
        }
    }

    PlannedChange {
        planned_state: planned,
        requires_replace,
    }
}
