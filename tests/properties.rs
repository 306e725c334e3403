use std::str::FromStr;

use csvtool::{
    aggregate::apply_aggregate,
    data::Row,
    error::EvalError,
    filter::{apply_filters, apply_where},
};
use proptest::prelude::*;
use bigdecimal::BigDecimal;

fn decimal_text() -> impl Strategy<Value = String> {
    (-100_000i64..=100_000, 0i64..=3)
        .prop_map(|(mantissa, scale)| BigDecimal::new(mantissa.into(), scale).to_string())
}

fn value_rows(values: &[String]) -> Vec<Row> {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            Row::from_pairs([
                ("id".to_string(), idx.to_string()),
                ("v".to_string(), value.clone()),
            ])
        })
        .collect()
}

fn dec(text: &str) -> BigDecimal {
    BigDecimal::from_str(text).expect("decimal")
}

proptest! {
    #[test]
    fn greater_than_keeps_exact_ordered_subset(
        values in proptest::collection::vec(decimal_text(), 1..40),
        threshold in decimal_text(),
    ) {
        let rows = value_rows(&values);
        let filtered = apply_where(&rows, &format!("v>{threshold}")).unwrap();
        let expected: Vec<Row> = rows
            .iter()
            .filter(|row| dec(row.get("v").unwrap()) > dec(&threshold))
            .cloned()
            .collect();
        prop_assert_eq!(filtered, expected);
    }

    #[test]
    fn chained_filters_equal_combined_predicate(
        values in proptest::collection::vec(decimal_text(), 1..40),
        low in decimal_text(),
        high in decimal_text(),
    ) {
        let rows = value_rows(&values);
        let chained = apply_filters(&rows, &[format!("v>{low}"), format!("v<{high}")]).unwrap();
        let expected: Vec<Row> = rows
            .iter()
            .filter(|row| {
                let v = dec(row.get("v").unwrap());
                v > dec(&low) && v < dec(&high)
            })
            .cloned()
            .collect();
        prop_assert_eq!(chained, expected);
    }

    #[test]
    fn min_avg_max_bound_every_value(values in proptest::collection::vec(decimal_text(), 1..40)) {
        let rows = value_rows(&values);
        let min = dec(&apply_aggregate(&rows, "v=min").unwrap().value);
        let max = dec(&apply_aggregate(&rows, "v=max").unwrap().value);
        let avg = dec(&apply_aggregate(&rows, "v=avg").unwrap().value);
        for value in &values {
            let value = dec(value);
            prop_assert!(min <= value && value <= max);
        }
        prop_assert!(min <= avg && avg <= max);
    }

    #[test]
    fn empty_input_never_errors_for_filters(
        column in "[a-z]{1,8}",
        op in prop_oneof![Just('>'), Just('<'), Just('=')],
        value in "[a-z0-9]{1,8}",
    ) {
        let filtered = apply_where(&[], &format!("{column}{op}{value}")).unwrap();
        prop_assert!(filtered.is_empty());
    }

    #[test]
    fn empty_input_always_fails_aggregation(
        column in "[a-z]{1,8}",
        function in prop_oneof![Just("min"), Just("max"), Just("avg")],
    ) {
        let err = apply_aggregate(&[], &format!("{column}={function}")).unwrap_err();
        prop_assert_eq!(err, EvalError::EmptyInput);
    }
}
