//! Compiles user supplied transaction filters into a parameterized SQL fragment.
//!
//! A request carries a list of [FilterModel]s, each naming a transaction field,
//! a comparison operator and a value by integer code. [compile_filters] checks
//! the codes and produces a [CompiledFilter]: a fragment such as
//! `amount > ?1 AND category_id = ?2 AND` plus the values to bind to `?1`, `?2`.
//!
//! The fragment always ends with `AND` (unless it is empty) so that callers can
//! append their own mandatory predicate, e.g. the per-user ownership check, and
//! continue numbering their parameters from [CompiledFilter::next_placeholder].
//! The same compiled filter is shared by the page, count and summary queries.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The errors that can occur when converting a [FilterModel] into a [FilterCriterion].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum FilterError {
    /// The field code does not refer to a filterable transaction field.
    #[error("field {0} was not found")]
    UnknownField(i64),

    /// The operator code does not refer to a known comparison operator.
    #[error("operator {0} was not found")]
    UnknownOperator(i64),
}

/// A transaction field that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Amount,
    SpentAt,
    Note,
    CategoryId,
}

impl FilterField {
    /// All fields in the order of their wire codes.
    pub const ALL: [FilterField; 4] = [
        FilterField::Amount,
        FilterField::SpentAt,
        FilterField::Note,
        FilterField::CategoryId,
    ];

    /// The column in the transaction table that this field maps to.
    pub fn column(self) -> &'static str {
        match self {
            FilterField::Amount => "amount",
            FilterField::SpentAt => "spent_at",
            FilterField::Note => "note",
            FilterField::CategoryId => "category_id",
        }
    }

    /// The integer used for this field in API requests.
    pub fn code(self) -> i64 {
        match self {
            FilterField::Amount => 0,
            FilterField::SpentAt => 1,
            FilterField::Note => 2,
            FilterField::CategoryId => 3,
        }
    }
}

impl TryFrom<i64> for FilterField {
    type Error = FilterError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FilterField::Amount),
            1 => Ok(FilterField::SpentAt),
            2 => Ok(FilterField::Note),
            3 => Ok(FilterField::CategoryId),
            unknown => Err(FilterError::UnknownField(unknown)),
        }
    }
}

/// A comparison between a field and a filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Lt,
    Gt,
    Neq,
    Le,
    Ge,
}

impl FilterOperator {
    /// All operators in the order of their wire codes.
    pub const ALL: [FilterOperator; 6] = [
        FilterOperator::Eq,
        FilterOperator::Lt,
        FilterOperator::Gt,
        FilterOperator::Neq,
        FilterOperator::Le,
        FilterOperator::Ge,
    ];

    /// The SQL comparator for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Lt => "<",
            FilterOperator::Gt => ">",
            FilterOperator::Neq => "<>",
            FilterOperator::Le => "<=",
            FilterOperator::Ge => ">=",
        }
    }

    /// The integer used for this operator in API requests.
    pub fn code(self) -> i64 {
        match self {
            FilterOperator::Eq => 0,
            FilterOperator::Lt => 1,
            FilterOperator::Gt => 2,
            FilterOperator::Neq => 3,
            FilterOperator::Le => 4,
            FilterOperator::Ge => 5,
        }
    }
}

impl TryFrom<i64> for FilterOperator {
    type Error = FilterError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FilterOperator::Eq),
            1 => Ok(FilterOperator::Lt),
            2 => Ok(FilterOperator::Gt),
            3 => Ok(FilterOperator::Neq),
            4 => Ok(FilterOperator::Le),
            5 => Ok(FilterOperator::Ge),
            unknown => Err(FilterError::UnknownOperator(unknown)),
        }
    }
}

/// A filter as it is sent by clients, with the field and operator given as codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterModel {
    /// The code of the [FilterField] to compare.
    pub property: i64,
    /// The code of the [FilterOperator] to compare with.
    pub operator: i64,
    /// The value to compare the field against.
    pub value: String,
}

/// A single validated search constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriterion {
    pub field: FilterField,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterCriterion {
    /// Create a filter criterion.
    pub fn new(field: FilterField, operator: FilterOperator, value: &str) -> Self {
        Self {
            field,
            operator,
            value: value.to_owned(),
        }
    }
}

impl TryFrom<&FilterModel> for FilterCriterion {
    type Error = FilterError;

    fn try_from(model: &FilterModel) -> Result<Self, Self::Error> {
        let operator = FilterOperator::try_from(model.operator)?;
        let field = FilterField::try_from(model.property)?;

        Ok(Self {
            field,
            operator,
            value: model.value.clone(),
        })
    }
}

/// An ordered list of criteria that are combined with `AND`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBatch(Vec<FilterCriterion>);

impl FilterBatch {
    /// Create a batch from criteria, keeping their order.
    pub fn new(criteria: Vec<FilterCriterion>) -> Self {
        Self(criteria)
    }

    /// Validate every model, failing on the first unknown field or operator.
    ///
    /// Either all models are converted or none are.
    pub fn from_models(models: &[FilterModel]) -> Result<Self, FilterError> {
        models
            .iter()
            .map(FilterCriterion::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Whether the batch has no criteria.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of criteria in the batch.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Compile the batch into a SQL fragment and its bound values.
    ///
    /// Criterion `i` (zero based) is bound to the placeholder `?{i + 1}`.
    pub fn compile(&self) -> CompiledFilter {
        if self.0.is_empty() {
            return CompiledFilter::default();
        }

        let mut predicates = Vec::with_capacity(self.0.len());
        let mut args = Vec::with_capacity(self.0.len());

        for (index, criterion) in self.0.iter().enumerate() {
            predicates.push(format!(
                "{} {} ?{}",
                criterion.field.column(),
                criterion.operator.symbol(),
                index + 1
            ));
            args.push(criterion.value.clone());
        }

        CompiledFilter {
            fragment: format!("{} AND", predicates.join(" AND ")),
            args,
        }
    }
}

/// The result of compiling a [FilterBatch].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    /// The boolean expression, either empty or ending in `AND`.
    pub fragment: String,
    /// The values for the placeholders `?1..=?N`, in order.
    pub args: Vec<String>,
}

impl CompiledFilter {
    /// The number of placeholders used by the fragment.
    pub fn param_count(&self) -> usize {
        self.args.len()
    }

    /// The index callers should use for the first placeholder they append.
    pub fn next_placeholder(&self) -> usize {
        self.args.len() + 1
    }
}

/// Validate and compile the filters from a request.
///
/// # Errors
///
/// Returns [Error::InvalidFilter] if any filter uses an unknown field or
/// operator code. Nothing is compiled in that case.
pub fn compile_filters(models: &[FilterModel]) -> Result<CompiledFilter, Error> {
    let batch = FilterBatch::from_models(models)?;

    Ok(batch.compile())
}

/// A code and its display value, used to describe the accepted filter codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub index: i64,
    pub value: String,
}

/// The fields and operators that the filter API accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub fields: Vec<FilterOption>,
    pub operators: Vec<FilterOption>,
}

/// List the accepted field and operator codes, ordered by code.
pub fn filter_settings() -> FilterSettings {
    let fields = FilterField::ALL
        .iter()
        .map(|field| FilterOption {
            index: field.code(),
            value: field.column().to_owned(),
        })
        .collect();

    let operators = FilterOperator::ALL
        .iter()
        .map(|operator| FilterOption {
            index: operator.code(),
            value: operator.symbol().to_owned(),
        })
        .collect();

    FilterSettings { fields, operators }
}

/// Route handler that describes the accepted filter codes.
pub async fn get_filter_settings_endpoint() -> Json<FilterSettings> {
    Json(filter_settings())
}
