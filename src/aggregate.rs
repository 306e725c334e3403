//! Parsing and evaluation of `--aggregate` expressions (`column=function`).
//!
//! The function set is closed: [`AggregateFunction`] names it and
//! [`Aggregator`] carries the running state for each variant behind a
//! `combine`/`finalize` contract.

use std::{fmt, str::FromStr};

use log::{debug, info};
use bigdecimal::BigDecimal;

use crate::{
    data::Row,
    decimal::{DIVISION_PRECISION, format_decimal, parse_decimal},
    error::{EvalError, EvalResult},
    filter::{is_word_char, is_word_or_space},
};

pub const AGGREGATE_SYNTAX: &str = "column=function";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Min,
    Max,
    Avg,
}

impl AggregateFunction {
    pub fn name(self) -> &'static str {
        match self {
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Avg => "avg",
        }
    }

    pub fn aggregator(self) -> Aggregator {
        match self {
            AggregateFunction::Min => Aggregator::Min(None),
            AggregateFunction::Max => Aggregator::Max(None),
            AggregateFunction::Avg => Aggregator::Avg {
                sum: BigDecimal::from(0u64),
                count: 0,
            },
        }
    }
}

impl FromStr for AggregateFunction {
    type Err = EvalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "min" => Ok(AggregateFunction::Min),
            "max" => Ok(AggregateFunction::Max),
            "avg" => Ok(AggregateFunction::Avg),
            other => Err(EvalError::UnknownFunction(other.to_string())),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running state of one aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregator {
    Min(Option<BigDecimal>),
    Max(Option<BigDecimal>),
    Avg { sum: BigDecimal, count: u64 },
}

impl Aggregator {
    /// Folds one value into the running state. Among equal values `min` and
    /// `max` keep the first one seen.
    pub fn combine(&mut self, value: BigDecimal) {
        match self {
            Aggregator::Min(current) => {
                if current.as_ref().is_none_or(|min| value < *min) {
                    *current = Some(value);
                }
            }
            Aggregator::Max(current) => {
                if current.as_ref().is_none_or(|max| value > *max) {
                    *current = Some(value);
                }
            }
            Aggregator::Avg { sum, count } => {
                *sum += value;
                *count += 1;
            }
        }
    }

    /// Returns the aggregate, or `None` when nothing was combined. The mean is
    /// rounded to [`DIVISION_PRECISION`] significant digits without trailing
    /// zeros.
    pub fn finalize(&self) -> Option<BigDecimal> {
        match self {
            Aggregator::Min(current) | Aggregator::Max(current) => current.clone(),
            Aggregator::Avg { count: 0, .. } => None,
            Aggregator::Avg { sum, count } => {
                let mean = sum.clone() / BigDecimal::from(*count);
                Some(mean.with_prec(DIVISION_PRECISION).normalized())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateExpression {
    pub column: String,
    pub function: AggregateFunction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    pub column: String,
    pub function: String,
    pub value: String,
}

/// Parses `column=function`: a run of word or space characters, `=`, then a
/// run of word characters naming the function (case-insensitive).
pub fn parse_aggregate(expression: &str) -> EvalResult<AggregateExpression> {
    let trimmed = expression.trim();
    let invalid = || EvalError::InvalidExpression {
        expression: trimmed.to_string(),
        expected: AGGREGATE_SYNTAX,
    };

    let (column, function) = trimmed.split_once('=').ok_or_else(invalid)?;
    if column.is_empty()
        || !column.chars().all(is_word_or_space)
        || function.is_empty()
        || !function.chars().all(is_word_char)
    {
        return Err(invalid());
    }

    Ok(AggregateExpression {
        column: column.trim().to_string(),
        function: function.parse()?,
    })
}

impl AggregateExpression {
    /// Reduces `rows` to a single value. Every row must carry the column and
    /// every value must be numeric.
    pub fn evaluate(&self, rows: &[Row]) -> EvalResult<AggregateResult> {
        if rows.is_empty() {
            return Err(EvalError::EmptyInput);
        }
        let mut aggregator = self.function.aggregator();
        for row in rows {
            let raw = row
                .get(&self.column)
                .ok_or_else(|| EvalError::ColumnNotFound(self.column.clone()))?;
            let value = parse_decimal(raw).ok_or_else(|| EvalError::NonNumericColumn {
                column: self.column.clone(),
                value: raw.to_string(),
            })?;
            aggregator.combine(value);
        }
        let value = aggregator.finalize().ok_or(EvalError::EmptyInput)?;
        debug!("Aggregated {} row(s) for {}={}", rows.len(), self.column, self.function);

        Ok(AggregateResult {
            column: self.column.clone(),
            function: self.function.name().to_string(),
            value: format_decimal(&value),
        })
    }
}

/// Parses `expression` and evaluates it over `rows`.
pub fn apply_aggregate(rows: &[Row], expression: &str) -> EvalResult<AggregateResult> {
    let parsed = parse_aggregate(expression)?;
    let result = parsed.evaluate(rows)?;
    info!("{}({}) = {}", result.function, result.column, result.value);
    Ok(result)
}
