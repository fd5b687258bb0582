//! Parsing of client filter/sort maps into a typed, closed plan.
//!
//! Only recognized field paths are accepted, each tagged with a kind that
//! restricts which matchers apply. The repository translates the parsed plan
//! into SQL; nothing client-supplied reaches the query untyped.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::errors::ValidationError;
use crate::expenses::expenses_lifecycle::ExpenseStatus;

/// The closed set of filterable and sortable claim paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Id,
    CreatedAt,
    CompletedAt,
    PassingDate,
    CustomerLastName,
    ObjectAddress,
    ObjectCity,
    CompanyName,
    HandlerName,
    MortgageInvoiceAmount,
    InsuranceInvoiceAmount,
    OtherInvoiceAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Id,
    Str,
    Date,
    Amount,
}

impl FieldPath {
    fn parse(path: &str) -> Result<Self, ValidationError> {
        match path {
            "id" => Ok(FieldPath::Id),
            "createdAt" => Ok(FieldPath::CreatedAt),
            "completedAt" => Ok(FieldPath::CompletedAt),
            "passingDate" => Ok(FieldPath::PassingDate),
            "customerLastName" => Ok(FieldPath::CustomerLastName),
            "objectAddress" => Ok(FieldPath::ObjectAddress),
            "objectCity" => Ok(FieldPath::ObjectCity),
            "company.name" => Ok(FieldPath::CompanyName),
            "handler.name" => Ok(FieldPath::HandlerName),
            "mortgageInvoiceAmount" => Ok(FieldPath::MortgageInvoiceAmount),
            "insuranceInvoiceAmount" => Ok(FieldPath::InsuranceInvoiceAmount),
            "otherInvoiceAmount" => Ok(FieldPath::OtherInvoiceAmount),
            other => Err(ValidationError::InvalidInput(format!(
                "Unrecognized field path '{}'",
                other
            ))),
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            FieldPath::Id => FieldKind::Id,
            FieldPath::CreatedAt | FieldPath::CompletedAt | FieldPath::PassingDate => {
                FieldKind::Date
            }
            FieldPath::CustomerLastName
            | FieldPath::ObjectAddress
            | FieldPath::ObjectCity
            | FieldPath::CompanyName
            | FieldPath::HandlerName => FieldKind::Str,
            FieldPath::MortgageInvoiceAmount
            | FieldPath::InsuranceInvoiceAmount
            | FieldPath::OtherInvoiceAmount => FieldKind::Amount,
        }
    }
}

/// A typed leaf value, already validated against the path kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Str(String),
    DateTime(NaiveDateTime),
    Amount(f64),
}

/// A matcher for one path. Range holds at least one bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    Contains(String),
    Equals(ScalarValue),
    Range {
        gte: Option<ScalarValue>,
        lte: Option<ScalarValue>,
    },
}

/// One filter condition: the paths are OR-joined (multi-column search via
/// `"a||b"` keys), each receiving the same matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGroup {
    pub paths: Vec<FieldPath>,
    pub matcher: Matcher,
}

/// The parsed listing plan. Groups are AND-joined. The status filter is kept
/// apart: the current status is derived from history, so it is applied in
/// memory after the fetch rather than translated to SQL.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    pub groups: Vec<FilterGroup>,
    pub states: Option<Vec<ExpenseStatus>>,
    pub sort: Vec<(FieldPath, SortDirection)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

const STATES_KEY: &str = "states";

pub fn parse_plan(
    filter: &Map<String, Value>,
    sort: &Map<String, Value>,
) -> Result<QueryPlan, ValidationError> {
    let mut plan = QueryPlan::default();

    for (key, value) in filter {
        if key == STATES_KEY {
            plan.states = Some(parse_states(value)?);
            continue;
        }

        let paths = key
            .split("||")
            .map(|p| FieldPath::parse(p.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        let kind = paths[0].kind();
        if paths.iter().any(|p| p.kind() != kind) {
            return Err(ValidationError::InvalidInput(format!(
                "Mixed field kinds in search key '{}'",
                key
            )));
        }
        let matcher = parse_matcher(kind, key, value)?;
        plan.groups.push(FilterGroup { paths, matcher });
    }

    // Insertion order of the sort map is the tie-break precedence.
    for (key, value) in sort {
        let path = FieldPath::parse(key)?;
        let direction = match value.as_str() {
            Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            _ => {
                return Err(ValidationError::InvalidInput(format!(
                    "Sort direction for '{}' must be 'asc' or 'desc'",
                    key
                )))
            }
        };
        plan.sort.push((path, direction));
    }

    Ok(plan)
}

fn parse_states(value: &Value) -> Result<Vec<ExpenseStatus>, ValidationError> {
    let entries = value.as_array().ok_or_else(|| {
        ValidationError::InvalidInput("'states' must be an array of status values".to_string())
    })?;
    entries
        .iter()
        .map(|entry| {
            let text = entry.as_str().ok_or_else(|| {
                ValidationError::InvalidInput("'states' entries must be strings".to_string())
            })?;
            ExpenseStatus::from_str(text)
                .map_err(|_| ValidationError::InvalidInput(format!("Unknown status '{}'", text)))
        })
        .collect()
}

fn parse_matcher(kind: FieldKind, key: &str, value: &Value) -> Result<Matcher, ValidationError> {
    let object = value.as_object().ok_or_else(|| {
        ValidationError::InvalidInput(format!(
            "Filter for '{}' must be an object with a matcher",
            key
        ))
    })?;

    let mut contains = None;
    let mut equals = None;
    let mut gte = None;
    let mut lte = None;
    for (matcher_key, matcher_value) in object {
        match matcher_key.as_str() {
            "contains" => contains = Some(matcher_value),
            "equals" => equals = Some(matcher_value),
            "gte" => gte = Some(matcher_value),
            "lte" => lte = Some(matcher_value),
            other => {
                return Err(ValidationError::InvalidInput(format!(
                    "Unknown matcher '{}' for '{}'",
                    other, key
                )))
            }
        }
    }

    if let Some(needle) = contains {
        if kind != FieldKind::Str {
            return Err(ValidationError::InvalidInput(format!(
                "'contains' does not apply to '{}'",
                key
            )));
        }
        let needle = needle.as_str().ok_or_else(|| {
            ValidationError::InvalidInput(format!("'contains' for '{}' must be a string", key))
        })?;
        return Ok(Matcher::Contains(needle.to_string()));
    }

    if let Some(value) = equals {
        return Ok(Matcher::Equals(parse_scalar(kind, key, value)?));
    }

    if gte.is_some() || lte.is_some() {
        if kind == FieldKind::Id || kind == FieldKind::Str {
            return Err(ValidationError::InvalidInput(format!(
                "Range matchers do not apply to '{}'",
                key
            )));
        }
        let gte = gte.map(|v| parse_scalar(kind, key, v)).transpose()?;
        let lte = lte.map(|v| parse_scalar(kind, key, v)).transpose()?;
        return Ok(Matcher::Range { gte, lte });
    }

    Err(ValidationError::InvalidInput(format!(
        "Filter for '{}' carries no matcher",
        key
    )))
}

fn parse_scalar(kind: FieldKind, key: &str, value: &Value) -> Result<ScalarValue, ValidationError> {
    match kind {
        FieldKind::Id | FieldKind::Str => {
            let text = value.as_str().ok_or_else(|| {
                ValidationError::InvalidInput(format!("Value for '{}' must be a string", key))
            })?;
            Ok(ScalarValue::Str(text.to_string()))
        }
        FieldKind::Date => {
            let text = value.as_str().ok_or_else(|| {
                ValidationError::InvalidInput(format!("Value for '{}' must be a date string", key))
            })?;
            Ok(ScalarValue::DateTime(parse_datetime(key, text)?))
        }
        FieldKind::Amount => {
            let number = value.as_f64().ok_or_else(|| {
                ValidationError::InvalidInput(format!("Value for '{}' must be a number", key))
            })?;
            Ok(ScalarValue::Amount(number))
        }
    }
}

fn parse_datetime(key: &str, text: &str) -> Result<NaiveDateTime, ValidationError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        .map_err(|_| {
            ValidationError::InvalidInput(format!("Cannot parse date '{}' for '{}'", text, key))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn rejects_unknown_paths_and_matchers() {
        let filter = map(json!({ "secretColumn": { "contains": "x" } }));
        assert!(parse_plan(&filter, &Map::new()).is_err());

        let filter = map(json!({ "objectCity": { "regex": ".*" } }));
        assert!(parse_plan(&filter, &Map::new()).is_err());
    }

    #[test]
    fn rejects_kind_mismatched_matchers() {
        let filter = map(json!({ "createdAt": { "contains": "2024" } }));
        assert!(parse_plan(&filter, &Map::new()).is_err());

        let filter = map(json!({ "customerLastName": { "gte": "A" } }));
        assert!(parse_plan(&filter, &Map::new()).is_err());

        let filter = map(json!({ "mortgageInvoiceAmount": { "gte": "high" } }));
        assert!(parse_plan(&filter, &Map::new()).is_err());
    }

    #[test]
    fn double_pipe_key_builds_one_or_group() {
        let filter = map(json!({ "objectAddress||objectCity": { "contains": "dam" } }));
        let plan = parse_plan(&filter, &Map::new()).unwrap();
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(
            plan.groups[0].paths,
            vec![FieldPath::ObjectAddress, FieldPath::ObjectCity]
        );
        assert_eq!(plan.groups[0].matcher, Matcher::Contains("dam".to_string()));
    }

    #[test]
    fn range_bounds_combine() {
        let filter = map(json!({
            "mortgageInvoiceAmount": { "gte": 100.0, "lte": 250.5 }
        }));
        let plan = parse_plan(&filter, &Map::new()).unwrap();
        match &plan.groups[0].matcher {
            Matcher::Range { gte, lte } => {
                assert_eq!(gte, &Some(ScalarValue::Amount(100.0)));
                assert_eq!(lte, &Some(ScalarValue::Amount(250.5)));
            }
            other => panic!("expected range matcher, got {:?}", other),
        }
    }

    #[test]
    fn states_are_split_off_from_sql_filters() {
        let filter = map(json!({
            "states": ["SUBMITTED", "RESUBMITTED"],
            "objectCity": { "equals": "Utrecht" }
        }));
        let plan = parse_plan(&filter, &Map::new()).unwrap();
        assert_eq!(
            plan.states,
            Some(vec![ExpenseStatus::Submitted, ExpenseStatus::Resubmitted])
        );
        assert_eq!(plan.groups.len(), 1);

        let filter = map(json!({ "states": ["PENDING"] }));
        assert!(parse_plan(&filter, &Map::new()).is_err());
    }

    #[test]
    fn sort_map_keeps_insertion_order() {
        let sort = map(json!({ "passingDate": "desc", "customerLastName": "asc" }));
        let plan = parse_plan(&Map::new(), &sort).unwrap();
        assert_eq!(
            plan.sort,
            vec![
                (FieldPath::PassingDate, SortDirection::Desc),
                (FieldPath::CustomerLastName, SortDirection::Asc),
            ]
        );

        let sort = map(json!({ "customerLastName": "upwards" }));
        assert!(parse_plan(&Map::new(), &sort).is_err());
    }

    #[test]
    fn date_values_accept_plain_dates() {
        let filter = map(json!({ "createdAt": { "gte": "2024-03-01" } }));
        let plan = parse_plan(&filter, &Map::new()).unwrap();
        match &plan.groups[0].matcher {
            Matcher::Range { gte: Some(ScalarValue::DateTime(dt)), .. } => {
                assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
            }
            other => panic!("expected date range, got {:?}", other),
        }
    }
}
