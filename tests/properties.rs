use proptest::prelude::*;

use table_explorer::data::{
    apply_filters, apply_sort, Column, FilterSet, FilterSpec, Kind, SortSpec, Table, Value,
};

const MAKES: [&str; 4] = ["BMW", "Ford", "Kia", "Toyota"];

/// Rows of (year, make index); `seq` records the original position.
fn rows() -> impl Strategy<Value = Vec<(Option<i32>, Option<usize>)>> {
    prop::collection::vec(
        (prop::option::of(2000..2021i32), prop::option::of(0..MAKES.len())),
        0..40,
    )
}

fn table(rows: &[(Option<i32>, Option<usize>)]) -> Table {
    let year = rows
        .iter()
        .map(|(y, _)| y.map_or(Value::Missing, |y| Value::Number(y as f64)))
        .collect();
    let make = rows
        .iter()
        .map(|(_, m)| m.map_or(Value::Missing, |m| Value::from(MAKES[m])))
        .collect();
    Table::new(vec![
        Column::new("year", Kind::Numeric, year),
        Column::new("make", Kind::Categorical, make),
        Column::numeric("seq", (0..rows.len()).map(|i| i as f64)),
    ])
    .unwrap()
}

fn seq(table: &Table) -> Vec<f64> {
    table
        .column("seq")
        .unwrap()
        .values
        .iter()
        .filter_map(Value::as_f64)
        .collect()
}

fn specs(lo: i32, hi: i32, allowed: &[usize]) -> FilterSet {
    FilterSet::from([
        ("year".to_string(), FilterSpec::range(lo as f64, hi as f64)),
        (
            "make".to_string(),
            FilterSpec::set(allowed.iter().map(|&m| MAKES[m])),
        ),
    ])
}

proptest! {
    #[test]
    fn filtered_rows_are_an_ordered_subset_satisfying_every_spec(
        rows in rows(),
        lo in 1995..2025i32,
        hi in 1995..2025i32,
        allowed in prop::collection::vec(0..MAKES.len(), 0..3),
    ) {
        let input = table(&rows);
        let filters = specs(lo, hi, &allowed);
        let out = apply_filters(&input, &filters).unwrap();

        prop_assert!(out.len() <= input.len());
        let kept = seq(&out);
        prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));

        for (name, spec) in &filters {
            for value in &out.column(name).unwrap().values {
                prop_assert!(spec.matches(value), "{name}: {value:?} fails {spec:?}");
            }
        }
        if lo > hi {
            prop_assert!(out.is_empty());
        }
    }

    #[test]
    fn filtering_is_idempotent(
        rows in rows(),
        lo in 1995..2025i32,
        hi in 1995..2025i32,
        allowed in prop::collection::vec(0..MAKES.len(), 0..3),
    ) {
        let filters = specs(lo, hi, &allowed);
        let once = apply_filters(&table(&rows), &filters).unwrap();
        let twice = apply_filters(&once, &filters).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn empty_multiselect_keeps_everything(rows in rows()) {
        let input = table(&rows);
        let filters = FilterSet::from([("make".to_string(), FilterSpec::set(Vec::<Value>::new()))]);
        prop_assert_eq!(apply_filters(&input, &filters).unwrap(), input);
    }

    #[test]
    fn sort_is_stable_with_missing_last(rows in rows(), ascending in any::<bool>()) {
        let input = table(&rows);
        let spec = SortSpec { column: "make".to_string(), ascending };
        let out = apply_sort(&input, Some(&spec)).unwrap();
        prop_assert_eq!(out.len(), input.len());

        let keys = &out.column("make").unwrap().values;
        let order = seq(&out);
        for i in 1..keys.len() {
            let (a, b) = (&keys[i - 1], &keys[i]);
            if a == b {
                prop_assert!(order[i - 1] < order[i], "tie broken at {i}");
            } else if b.is_missing() {
                continue;
            } else {
                prop_assert!(!a.is_missing(), "missing before a value at {i}");
                prop_assert!(if ascending { a < b } else { a > b }, "out of order at {i}");
            }
        }
    }
}
