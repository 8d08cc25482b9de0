use std::fmt;
use std::str::FromStr;

use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, XlsxError};
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::model::{Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = EngineError;

    /// Accepts a format name or file extension, with or without a leading dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(EngineError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Serializes tables to file bytes. Writing them anywhere is up to the caller.
#[derive(Debug, Clone)]
pub struct Exporter {
    pub sheet_name: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            sheet_name: "Filtered Data".to_string(),
        }
    }
}

impl Exporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    pub fn serialize(&self, table: &Table, format: ExportFormat) -> Result<Vec<u8>, EngineError> {
        let bytes = match format {
            ExportFormat::Csv => to_csv(table)?,
            ExportFormat::Xlsx => self.to_xlsx(table)?,
        };
        log::info!(
            "Serialized {} rows x {} columns as {format} ({} bytes)",
            table.len(),
            table.columns().len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn to_xlsx(&self, table: &Table) -> Result<Vec<u8>, EngineError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        let header = Format::new().set_bold();
        let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for (c, column) in table.columns().iter().enumerate() {
            let col = ColNum::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
            worksheet.write_string_with_format(0, col, &column.name, &header)?;

            for (r, value) in column.values.iter().enumerate() {
                let row = RowNum::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
                // Categorical labels are plain strings here; spreadsheets
                // have no categorical cell type.
                match value {
                    Value::Missing => {}
                    Value::Number(n) => {
                        worksheet.write_number(row, col, *n)?;
                    }
                    Value::DateTime(d) => {
                        worksheet.write_datetime_with_format(row, col, d, &datetime)?;
                    }
                    Value::Text(s) => {
                        worksheet.write_string(row, col, s)?;
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn to_csv(table: &Table) -> Result<Vec<u8>, EngineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in 0..table.len() {
        writer.write_record(
            (0..table.columns().len()).map(|col| table.cell(row, col).to_string()),
        )?;
    }
    writer
        .into_inner()
        .map_err(|e| EngineError::Csv(csv::Error::from(e.into_error())))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{Column, Kind};

    fn table() -> Table {
        let sold = NaiveDate::from_ymd_opt(2015, 1, 2)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        Table::new(vec![
            Column::numeric("year", [2015.0, 2014.0]),
            Column::categorical("make", ["Kia", "Ford, Inc"]),
            Column::new("price", Kind::Numeric, vec![Value::Number(9500.5), Value::Missing]),
            Column::new("saledate", Kind::Temporal, vec![sold.into(), Value::Missing]),
        ])
        .unwrap()
    }

    #[test]
    fn csv_layout() {
        let bytes = Exporter::default().serialize(&table(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "year,make,price,saledate\n\
             2015,Kia,9500.5,2015-01-02T10:30:00\n\
             2014,\"Ford, Inc\",,\n"
        );
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = Exporter::default().serialize(&table(), ExportFormat::Xlsx).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(".xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!(matches!(
            "parquet".parse::<ExportFormat>(),
            Err(EngineError::UnsupportedFormat(f)) if f == "parquet"
        ));
    }
}
