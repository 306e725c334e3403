//! Parsing and application of `--where` expressions such as `price>300`,
//! `name=John` or `rating=4,5`.
//!
//! The type of the filtered column is inferred from the first row the filter
//! sees: when that value is a decimal number the column is compared
//! numerically, otherwise it is a string column and only `=` is allowed.
//! Chained filters each infer against their own input, so a later filter
//! inspects the first row that survived the earlier ones.

use std::fmt;

use log::debug;
use bigdecimal::BigDecimal;

use crate::{
    data::{Dataset, Row},
    decimal::parse_decimal,
    error::{EvalError, EvalResult},
};

pub const FILTER_SYNTAX: &str = "column[><=]value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Gt,
    Lt,
    Eq,
}

impl ComparisonOperator {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '>' => Some(ComparisonOperator::Gt),
            '<' => Some(ComparisonOperator::Lt),
            '=' => Some(ComparisonOperator::Eq),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            ComparisonOperator::Gt => '>',
            ComparisonOperator::Lt => '<',
            ComparisonOperator::Eq => '=',
        }
    }

    fn compare(self, left: &BigDecimal, right: &BigDecimal) -> bool {
        match self {
            ComparisonOperator::Gt => left > right,
            ComparisonOperator::Lt => left < right,
            ComparisonOperator::Eq => left == right,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub column: String,
    pub operator: ComparisonOperator,
    pub raw_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn infer(sample: &str) -> Self {
        if parse_decimal(sample).is_some() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }
}

enum Comparator<'a> {
    Numeric {
        operator: ComparisonOperator,
        rhs: BigDecimal,
    },
    Text {
        rhs: &'a str,
    },
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub(crate) fn is_word_or_space(ch: char) -> bool {
    is_word_char(ch) || ch.is_whitespace()
}

/// Parses `column OP value`. The column is a run of word or space
/// characters, the operator one of `>`, `<`, `=`, and the value everything
/// after it (trimmed, must not be empty or span lines).
pub fn parse_filter(expression: &str) -> EvalResult<FilterCondition> {
    let trimmed = expression.trim();
    let invalid = || EvalError::InvalidExpression {
        expression: trimmed.to_string(),
        expected: FILTER_SYNTAX,
    };

    let split = trimmed
        .find(|ch: char| !is_word_or_space(ch))
        .ok_or_else(invalid)?;
    if split == 0 {
        return Err(invalid());
    }
    let (column, rest) = trimmed.split_at(split);
    let mut chars = rest.chars();
    let operator = chars
        .next()
        .and_then(ComparisonOperator::from_char)
        .ok_or_else(invalid)?;
    let value = chars.as_str();
    if value.is_empty() || value.contains('\n') {
        return Err(invalid());
    }

    Ok(FilterCondition {
        column: column.trim().to_string(),
        operator,
        raw_value: value.trim().to_string(),
    })
}

impl FilterCondition {
    fn comparator(&self, sample: &str) -> EvalResult<Comparator<'_>> {
        let kind = ColumnKind::infer(sample);
        debug!(
            "Filter '{}{}{}' treats column as {:?}",
            self.column, self.operator, self.raw_value, kind
        );
        match kind {
            ColumnKind::Numeric => {
                let rhs = parse_decimal(&self.raw_value)
                    .ok_or_else(|| self.mismatch(&self.raw_value))?;
                Ok(Comparator::Numeric {
                    operator: self.operator,
                    rhs,
                })
            }
            ColumnKind::Text if self.operator == ComparisonOperator::Eq => Ok(Comparator::Text {
                rhs: &self.raw_value,
            }),
            ColumnKind::Text => Err(EvalError::UnsupportedOperator {
                column: self.column.clone(),
                operator: self.operator.symbol(),
            }),
        }
    }

    fn mismatch(&self, value: &str) -> EvalError {
        EvalError::TypeMismatch {
            column: self.column.clone(),
            value: value.to_string(),
        }
    }

    /// Returns the rows matching this condition, in input order.
    pub fn apply(&self, rows: &[Row]) -> EvalResult<Dataset> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let sample = first
            .get(&self.column)
            .ok_or_else(|| EvalError::ColumnNotFound(self.column.clone()))?;
        let comparator = self.comparator(sample)?;

        let mut filtered = Vec::new();
        for row in rows {
            let value = row
                .get(&self.column)
                .ok_or_else(|| EvalError::ColumnNotFound(self.column.clone()))?;
            let keep = match &comparator {
                Comparator::Numeric { operator, rhs } => {
                    let lhs = parse_decimal(value).ok_or_else(|| self.mismatch(value))?;
                    operator.compare(&lhs, rhs)
                }
                Comparator::Text { rhs } => value == *rhs,
            };
            if keep {
                filtered.push(row.clone());
            }
        }
        debug!(
            "Filter '{}{}{}' kept {} of {} row(s)",
            self.column,
            self.operator,
            self.raw_value,
            filtered.len(),
            rows.len()
        );
        Ok(filtered)
    }
}

/// Parses `expression` and keeps the rows of `rows` that satisfy it.
pub fn apply_where(rows: &[Row], expression: &str) -> EvalResult<Dataset> {
    parse_filter(expression)?.apply(rows)
}

/// Applies every expression in turn, each to the output of the previous one.
pub fn apply_filters<S: AsRef<str>>(rows: &[Row], expressions: &[S]) -> EvalResult<Dataset> {
    let mut current = rows.to_vec();
    for expression in expressions {
        current = apply_where(&current, expression.as_ref())?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("price", "100"), ("name", "Alpha")]),
            Row::from_pairs([("price", "200"), ("name", "Beta")]),
            Row::from_pairs([("price", "50"), ("name", "Alpha")]),
        ]
    }

    fn prices(rows: &[Row]) -> Vec<&str> {
        rows.iter().filter_map(|row| row.get("price")).collect()
    }

    #[test]
    fn parse_filter_splits_column_operator_and_value() {
        let condition = parse_filter("  unit price > 10,5 ").unwrap();
        assert_eq!(condition.column, "unit price");
        assert_eq!(condition.operator, ComparisonOperator::Gt);
        assert_eq!(condition.raw_value, "10,5");
    }

    #[test]
    fn parse_filter_keeps_later_operators_in_value() {
        let condition = parse_filter("a=b=c").unwrap();
        assert_eq!(condition.column, "a");
        assert_eq!(condition.operator, ComparisonOperator::Eq);
        assert_eq!(condition.raw_value, "b=c");
    }

    #[test]
    fn parse_filter_rejects_malformed_input() {
        for expr in ["badexpr", "", ">5", "price>", "price >  ", "price!5", "a-b=1", "a=\nb"] {
            let err = parse_filter(expr).unwrap_err();
            assert!(
                matches!(err, EvalError::InvalidExpression { .. }),
                "{expr:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn numeric_operators_compare_decimals() {
        let rows = sample_rows();
        assert_eq!(prices(&apply_where(&rows, "price>100").unwrap()), ["200"]);
        assert_eq!(prices(&apply_where(&rows, "price<100").unwrap()), ["50"]);
        assert_eq!(prices(&apply_where(&rows, "price=100").unwrap()), ["100"]);
        assert_eq!(prices(&apply_where(&rows, "price=100,0").unwrap()), ["100"]);
    }

    #[test]
    fn string_equality_preserves_order() {
        let rows = sample_rows();
        assert_eq!(prices(&apply_where(&rows, "name=Alpha").unwrap()), ["100", "50"]);
    }

    #[test]
    fn string_column_rejects_ordering_operators() {
        let err = apply_where(&sample_rows(), "name>Gamma").unwrap_err();
        assert_eq!(
            err,
            EvalError::UnsupportedOperator {
                column: "name".into(),
                operator: '>'
            }
        );
    }

    #[test]
    fn numeric_column_against_text_is_type_mismatch() {
        let err = apply_where(&sample_rows(), "price>foo").unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
    }

    #[test]
    fn non_numeric_cell_after_numeric_sample_is_type_mismatch() {
        let rows = vec![
            Row::from_pairs([("qty", "1")]),
            Row::from_pairs([("qty", "n/a")]),
        ];
        let err = apply_where(&rows, "qty>0").unwrap_err();
        assert_eq!(
            err,
            EvalError::TypeMismatch {
                column: "qty".into(),
                value: "n/a".into()
            }
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let err = apply_where(&sample_rows(), "age>30").unwrap_err();
        assert_eq!(err, EvalError::ColumnNotFound("age".into()));
    }

    #[test]
    fn empty_input_short_circuits() {
        assert!(apply_where(&[], "price>100").unwrap().is_empty());
        assert!(apply_where(&[], "missing>100").unwrap().is_empty());
        assert!(apply_where(&[], "badexpr").is_err());
    }

    #[test]
    fn chained_filters_infer_against_their_own_input() {
        // "code" is text in the first row but numeric among the survivors.
        let rows = vec![
            Row::from_pairs([("code", "x1"), ("keep", "no")]),
            Row::from_pairs([("code", "7"), ("keep", "yes")]),
            Row::from_pairs([("code", "3"), ("keep", "yes")]),
        ];
        assert!(matches!(
            apply_where(&rows, "code>5").unwrap_err(),
            EvalError::UnsupportedOperator { .. }
        ));
        let filtered = apply_filters(&rows, &["keep=yes", "code>5"]).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].get("code"), Some("7"));
    }

    #[test]
    fn wide_integers_compare_numerically() {
        let rows = vec![
            Row::from_pairs([("id", "123456789012345678901234567890")]),
            Row::from_pairs([("id", "5")]),
        ];
        let filtered = apply_where(&rows, "id>10").unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].get("id"), Some("123456789012345678901234567890"));
    }

    #[test]
    fn apply_filters_without_expressions_returns_input() {
        let rows = sample_rows();
        let empty: [&str; 0] = [];
        assert_eq!(apply_filters(&rows, &empty).unwrap(), rows);
    }
}
