//! Classify request parameter keys.

use super::FilterOperator;

/// The separator between the parts of a filter key, as in `relation__field__operator`.
pub const FILTER_KEY_SEPARATOR: &str = "__";

/// What a request parameter key means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKey<'a> {
    /// `field__operator` or `relation__field__operator`.
    Filter {
        relation: Option<&'a str>,
        field: &'a str,
        operator: FilterOperator,
    },
    /// Sorting and pagination.
    Control(ControlKey),
    /// Looks like a filter but has an empty part or too many parts.
    Malformed,
    /// Anything else. Ignored.
    Other,
}

/// Parameters that control sorting and pagination rather than filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    SortField,
    SortOrder,
    First,
    Rows,
}

impl ControlKey {
    pub fn parse(key: &str) -> Option<ControlKey> {
        match key {
            "sortField" => Some(ControlKey::SortField),
            "sortOrder" => Some(ControlKey::SortOrder),
            "first" => Some(ControlKey::First),
            "rows" => Some(ControlKey::Rows),
            _ => None,
        }
    }
}

/// Classify a single parameter key.
pub fn classify(key: &str) -> ParamKey<'_> {
    if let Some(control) = ControlKey::parse(key) {
        return ParamKey::Control(control);
    }
    if !key.contains(FILTER_KEY_SEPARATOR) {
        return ParamKey::Other;
    }

    let parts = key.split(FILTER_KEY_SEPARATOR).collect::<Vec<_>>();
    if parts.iter().any(|part| part.is_empty()) {
        return ParamKey::Malformed;
    }
    match parts.as_slice() {
        [field, operator] => ParamKey::Filter {
            relation: None,
            field: *field,
            operator: FilterOperator::parse(operator),
        },
        [relation, field, operator] => ParamKey::Filter {
            relation: Some(*relation),
            field: *field,
            operator: FilterOperator::parse(operator),
        },
        _ => ParamKey::Malformed,
    }
}
