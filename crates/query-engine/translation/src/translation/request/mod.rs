//! The typed form of a list request, and how to parse it from raw parameters.

pub mod keys;

use enum_iterator::Sequence;
use indexmap::IndexMap;

use fleet_query_configuration::PaginationSettings;

use keys::{ControlKey, ParamKey};

/// The value of a request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// The value, or the last element of a list. A repeated control key takes the value
    /// given last.
    pub fn last(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::List(values) => values.last().map(String::as_str),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Request parameters in the order they were given.
pub type RawParams = IndexMap<String, ParamValue>;

/// The filter operators we know how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum OperatorKind {
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Equals,
    NotEquals,
    In,
    Lt,
    Lte,
    Gt,
    Gte,
    DateIs,
    DateIsNot,
    DateBefore,
    DateAfter,
}

impl OperatorKind {
    /// The name used in parameter keys.
    pub fn name(self) -> &'static str {
        match self {
            OperatorKind::Contains => "contains",
            OperatorKind::NotContains => "notContains",
            OperatorKind::StartsWith => "startsWith",
            OperatorKind::EndsWith => "endsWith",
            OperatorKind::Equals => "equals",
            OperatorKind::NotEquals => "notEquals",
            OperatorKind::In => "in",
            OperatorKind::Lt => "lt",
            OperatorKind::Lte => "lte",
            OperatorKind::Gt => "gt",
            OperatorKind::Gte => "gte",
            OperatorKind::DateIs => "dateIs",
            OperatorKind::DateIsNot => "dateIsNot",
            OperatorKind::DateBefore => "dateBefore",
            OperatorKind::DateAfter => "dateAfter",
        }
    }

    pub fn parse(name: &str) -> Option<OperatorKind> {
        enum_iterator::all::<OperatorKind>().find(|operator| operator.name() == name)
    }
}

/// An operator as written in a parameter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOperator {
    Known(OperatorKind),
    /// Applies no predicate.
    Unknown(String),
}

impl FilterOperator {
    pub fn parse(name: &str) -> FilterOperator {
        match OperatorKind::parse(name) {
            Some(operator) => FilterOperator::Known(operator),
            None => FilterOperator::Unknown(name.to_string()),
        }
    }
}

/// A single filter, possibly scoped to a related collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub relation: Option<String>,
    pub field: String,
    pub operator: FilterOperator,
    pub value: ParamValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `1` (in any numeric spelling) is ascending, anything else is descending.
    /// An absent order is ascending.
    pub fn from_sort_order(sort_order: Option<&str>) -> SortDirection {
        match sort_order {
            None => SortDirection::Asc,
            Some(sort_order) => match sort_order.trim().parse::<f64>() {
                Ok(number) if (number - 1.0).abs() < f64::EPSILON => SortDirection::Asc,
                _ => SortDirection::Desc,
            },
        }
    }
}

/// The single sort key of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub relation: Option<String>,
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse `field` or `relation.field`.
    pub fn parse(sort_field: &str, direction: SortDirection) -> SortSpec {
        match sort_field.split_once('.') {
            Some((relation, field)) => SortSpec {
                relation: Some(relation.to_string()),
                field: field.to_string(),
                direction,
            },
            None => SortSpec {
                relation: None,
                field: sort_field.to_string(),
                direction,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub offset: u64,
    pub limit: u64,
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec {
            offset: 0,
            limit: PaginationSettings::default().default_rows,
        }
    }
}

/// A parsed list request. Names are not checked against the metadata yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub filters: Vec<FilterClause>,
    pub sort: Option<SortSpec>,
    pub page: PageSpec,
}

impl ListRequest {
    pub fn builder() -> ListRequestBuilder {
        ListRequestBuilder::default()
    }
}

/// Accumulates the parts of a list request.
#[derive(Debug, Clone, Default)]
pub struct ListRequestBuilder {
    request: ListRequest,
}

impl ListRequestBuilder {
    #[must_use]
    pub fn filter(mut self, clause: FilterClause) -> Self {
        self.request.filters.push(clause);
        self
    }

    /// Filter a column of the collection being listed.
    #[must_use]
    pub fn column_filter(self, field: &str, operator: OperatorKind, value: ParamValue) -> Self {
        self.filter(FilterClause {
            relation: None,
            field: field.to_string(),
            operator: FilterOperator::Known(operator),
            value,
        })
    }

    /// Filter on the existence of a related record.
    #[must_use]
    pub fn relation_filter(
        self,
        relation: &str,
        field: &str,
        operator: OperatorKind,
        value: ParamValue,
    ) -> Self {
        self.filter(FilterClause {
            relation: Some(relation.to_string()),
            field: field.to_string(),
            operator: FilterOperator::Known(operator),
            value,
        })
    }

    #[must_use]
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.request.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.request.page.offset = offset;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.request.page.limit = limit;
        self
    }

    pub fn build(self) -> ListRequest {
        self.request
    }
}

/// Parse raw request parameters. This never fails: parameters that mean nothing are ignored
/// and pagination values that cannot be used fall back to their defaults.
pub fn parse_params(params: &RawParams, pagination: &PaginationSettings) -> ListRequest {
    let mut builder = ListRequest::builder().limit(pagination.default_rows);
    let mut sort_field = None;
    let mut sort_order = None;

    for (key, value) in params {
        match keys::classify(key) {
            ParamKey::Filter {
                relation,
                field,
                operator,
            } => {
                if let FilterOperator::Unknown(name) = &operator {
                    tracing::debug!(
                        key = key.as_str(),
                        operator = name.as_str(),
                        "unknown filter operator, ignoring"
                    );
                }
                builder = builder.filter(FilterClause {
                    relation: relation.map(str::to_string),
                    field: field.to_string(),
                    operator,
                    value: value.clone(),
                });
            }
            ParamKey::Control(ControlKey::SortField) => sort_field = value.last(),
            ParamKey::Control(ControlKey::SortOrder) => sort_order = value.last(),
            ParamKey::Control(ControlKey::First) => {
                builder = builder.offset(parse_offset(value.last()));
            }
            ParamKey::Control(ControlKey::Rows) => {
                builder = builder.limit(parse_rows(value.last(), pagination));
            }
            ParamKey::Malformed => {
                tracing::debug!(key = key.as_str(), "malformed filter parameter, ignoring");
            }
            ParamKey::Other => {}
        }
    }

    if let Some(sort_field) = sort_field.filter(|field| !field.is_empty()) {
        builder = builder.sort(SortSpec::parse(
            sort_field,
            SortDirection::from_sort_order(sort_order),
        ));
    }

    builder.build()
}

fn parse_offset(first: Option<&str>) -> u64 {
    first
        .map(leading_integer)
        .and_then(|offset| u64::try_from(offset).ok())
        .unwrap_or(0)
}

fn parse_rows(rows: Option<&str>, pagination: &PaginationSettings) -> u64 {
    match rows.map(leading_integer).and_then(|rows| u64::try_from(rows).ok()) {
        Some(rows) if rows > 0 => pagination.clamp(rows),
        _ => pagination.default_rows,
    }
}

/// The integer at the start of a string, after optional whitespace and sign.
/// `"12abc"` is 12; a string without leading digits is 0.
fn leading_integer(value: &str) -> i64 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, ParamValue)]) -> RawParams {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn every_operator_parses_from_its_name() {
        for operator in enum_iterator::all::<OperatorKind>() {
            assert_eq!(OperatorKind::parse(operator.name()), Some(operator));
        }
        assert_eq!(OperatorKind::parse("Contains"), None);
    }

    #[test]
    fn defaults_without_parameters() {
        let request = parse_params(&RawParams::new(), &PaginationSettings::default());
        assert_eq!(request, ListRequest::default());
        assert_eq!(request.page, PageSpec { offset: 0, limit: 10 });
    }

    #[test]
    fn filters_keep_their_order_and_values() {
        let request = parse_params(
            &params(&[
                ("name__contains", "Alpha".into()),
                ("page", "3".into()),
                ("marque__id__equals", vec!["1", "2"].into()),
            ]),
            &PaginationSettings::default(),
        );
        assert_eq!(
            request.filters,
            vec![
                FilterClause {
                    relation: None,
                    field: "name".to_string(),
                    operator: FilterOperator::Known(OperatorKind::Contains),
                    value: "Alpha".into(),
                },
                FilterClause {
                    relation: Some("marque".to_string()),
                    field: "id".to_string(),
                    operator: FilterOperator::Known(OperatorKind::Equals),
                    value: vec!["1", "2"].into(),
                },
            ]
        );
    }

    #[test]
    fn malformed_keys_are_ignored() {
        let request = parse_params(
            &params(&[("a__b__c__d", "1".into()), ("__equals", "1".into())]),
            &PaginationSettings::default(),
        );
        assert!(request.filters.is_empty());
    }

    #[test]
    fn sort_order_one_is_ascending() {
        for (sort_order, direction) in [
            (None, SortDirection::Asc),
            (Some("1"), SortDirection::Asc),
            (Some(" 1.0 "), SortDirection::Asc),
            (Some("01"), SortDirection::Asc),
            (Some("-1"), SortDirection::Desc),
            (Some("2"), SortDirection::Desc),
            (Some("asc"), SortDirection::Desc),
        ] {
            assert_eq!(
                SortDirection::from_sort_order(sort_order),
                direction,
                "sortOrder {sort_order:?}"
            );
        }
    }

    #[test]
    fn relation_sort_fields_are_split_on_the_first_dot() {
        let request = parse_params(
            &params(&[("sortOrder", "2".into()), ("sortField", "marque.name".into())]),
            &PaginationSettings::default(),
        );
        assert_eq!(
            request.sort,
            Some(SortSpec {
                relation: Some("marque".to_string()),
                field: "name".to_string(),
                direction: SortDirection::Desc,
            })
        );
    }

    #[test]
    fn an_empty_sort_field_means_no_sort() {
        let request = parse_params(
            &params(&[("sortField", "".into())]),
            &PaginationSettings::default(),
        );
        assert_eq!(request.sort, None);
    }

    #[test]
    fn pagination_falls_back_to_defaults() {
        let pagination = PaginationSettings {
            default_rows: 10,
            max_rows: Some(50),
        };
        for (first, rows, expected) in [
            ("20", "5", PageSpec { offset: 20, limit: 5 }),
            ("-3", "0", PageSpec { offset: 0, limit: 10 }),
            ("abc", "-5", PageSpec { offset: 0, limit: 10 }),
            ("7xyz", "12.9", PageSpec { offset: 7, limit: 12 }),
            ("0", "1000", PageSpec { offset: 0, limit: 50 }),
        ] {
            let request = parse_params(
                &params(&[("first", first.into()), ("rows", rows.into())]),
                &pagination,
            );
            assert_eq!(request.page, expected, "first={first} rows={rows}");
        }
    }

    #[test]
    fn repeated_control_keys_take_the_last_value() {
        let request = parse_params(
            &params(&[
                ("rows", vec!["5", "20"].into()),
                ("first", vec!["40", "10"].into()),
                ("sortField", vec!["id", "name"].into()),
                ("sortOrder", vec!["1", "-1"].into()),
            ]),
            &PaginationSettings::default(),
        );
        assert_eq!(request.page, PageSpec { offset: 10, limit: 20 });
        assert_eq!(
            request.sort,
            Some(SortSpec::parse("name", SortDirection::Desc))
        );
    }

    #[test]
    fn builder_accumulates_parts() {
        let request = ListRequest::builder()
            .column_filter("valeur", OperatorKind::Gte, "100".into())
            .relation_filter("marque", "name", OperatorKind::Equals, "Renault".into())
            .sort(SortSpec::parse("name", SortDirection::Asc))
            .offset(10)
            .limit(5)
            .build();
        assert_eq!(request.filters.len(), 2);
        assert_eq!(request.page, PageSpec { offset: 10, limit: 5 });
        assert_eq!(request.sort.map(|sort| sort.field), Some("name".to_string()));
    }
}
