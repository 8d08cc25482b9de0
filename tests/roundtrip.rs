use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use table_explorer::data::infer::{parse_datetime, InferOptions};
use table_explorer::data::loader::read_csv;
use table_explorer::data::{
    apply_group, export, AggregateFn, Column, ExportFormat, GroupSpec, Kind, Table, Value,
};

fn sales() -> Table {
    let sold = |s: &str| parse_datetime(s).map_or(Value::Missing, Value::DateTime);
    Table::new(vec![
        Column::numeric("year", [2015.0, 2014.0, 2015.0, 2012.0, 2013.0, 2014.0]),
        Column::new(
            "make",
            Kind::Categorical,
            vec![
                "Kia".into(),
                "BMW".into(),
                "Kia".into(),
                "BMW".into(),
                "Kia".into(),
                Value::Missing,
            ],
        ),
        Column::new(
            "sellingprice",
            Kind::Numeric,
            vec![
                Value::Number(21500.0),
                Value::Missing,
                Value::Number(9950.5),
                Value::Number(30000.0),
                Value::Number(12049.5),
                Value::Number(8000.0),
            ],
        ),
        Column::new(
            "saledate",
            Kind::Temporal,
            vec![
                sold("2014-12-16T12:30:00-08:00"),
                sold("2015-01-15 09:00:00"),
                Value::Missing,
                sold("Thu Jan 29 2015 04:30:00 GMT-0800 (PST)"),
                sold("2015-02-03"),
                sold("02/04/2015"),
            ],
        ),
        Column::new(
            "seller",
            Kind::Text,
            vec![
                "kia motors america, inc".into(),
                "financial services \"remarketing\"".into(),
                "santander consumer".into(),
                "hertz".into(),
                "avis corporation".into(),
                "nissan-infiniti lt".into(),
            ],
        ),
    ])
    .unwrap()
}

#[test]
fn csv_export_reloads_to_the_same_table() {
    let table = sales();
    let bytes = export(&table, ExportFormat::Csv).unwrap();
    let reloaded = read_csv(bytes.as_slice(), &InferOptions::default()).unwrap();
    assert_eq!(reloaded, table);
}

#[test]
fn timezone_is_dropped_before_export() {
    let bytes = export(&sales(), ExportFormat::Csv).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("2014-12-16T12:30:00"));
    assert!(!text.contains("-08:00"));
}

#[test]
fn grouped_table_exports_in_group_order() {
    let spec = GroupSpec::new("make").target("sellingprice", AggregateFn::Mean);
    let grouped = apply_group(&sales(), &spec).unwrap();
    let text = String::from_utf8(export(&grouped, ExportFormat::Csv).unwrap()).unwrap();
    assert_eq!(text, "make,sellingprice\nKia,14500\nBMW,30000\n,8000\n");
}

#[test]
fn xlsx_export_reads_back() {
    let bytes = export(&sales(), ExportFormat::Xlsx).unwrap();
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range("Filtered Data").unwrap();
    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();

    assert_eq!(rows.len(), 7);
    assert_eq!(
        rows[0],
        vec![
            Data::String("year".to_string()),
            Data::String("make".to_string()),
            Data::String("sellingprice".to_string()),
            Data::String("saledate".to_string()),
            Data::String("seller".to_string()),
        ]
    );
    assert_eq!(rows[1][0], Data::Float(2015.0));
    assert_eq!(rows[1][1], Data::String("Kia".to_string()));
    assert_eq!(rows[2][2], Data::Empty);
    assert_eq!(rows[6][1], Data::Empty);

    // 2014-12-16 12:30 as an Excel serial date.
    let serial = match &rows[1][3] {
        Data::DateTime(dt) => dt.as_f64(),
        Data::Float(f) => *f,
        other => panic!("expected a date cell, got {other:?}"),
    };
    assert!((serial - 41989.520833).abs() < 1e-5);
}
