use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, StringArray},
    csv::ReaderBuilder,
    datatypes::{DataType, Field, Schema},
};
use std::{io::Cursor, sync::Arc};

use crate::process::utils::clean_str;

/// A decoded wide-format CSV: header names plus string rows.
/// Empty cells are `None`, never a sentinel string.
#[derive(Debug)]
pub struct WideTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl WideTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Decode raw CSV bytes into a [`WideTable`].
///
/// All columns are read as nullable Utf8 through Arrow's CSV reader, which
/// handles quoted fields with embedded commas (`"Korea, South"`). Ragged or
/// undecodable input is a hard error naming `source`.
pub fn parse_csv(source: &str, bytes: &[u8]) -> Result<WideTable> {
    let text =
        std::str::from_utf8(bytes).with_context(|| format!("{} is not valid utf-8", source))?;
    let header_line = text
        .lines()
        .next()
        .ok_or_else(|| anyhow!("{} is empty", source))?;
    let headers: Vec<String> = header_line.split(',').map(clean_str).collect();

    let fields: Vec<Field> = headers
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .build(Cursor::new(bytes))
        .with_context(|| format!("building csv reader for {}", source))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.with_context(|| format!("decoding csv rows from {}", source))?;
        let columns: Vec<&StringArray> = batch
            .columns()
            .iter()
            .map(|col| {
                col.as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| anyhow!("non-utf8 column decoded from {}", source))
            })
            .collect::<Result<_>>()?;

        for i in 0..batch.num_rows() {
            let row = columns
                .iter()
                .map(|col| {
                    if col.is_null(i) {
                        return None;
                    }
                    let value = col.value(i).trim();
                    if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }
    }

    Ok(WideTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_commas_and_empty_cells() {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20\n\
                   ,\"Korea, South\",36.0,128.0,1\n\
                   Hubei,China,30.97,112.27,444\n";
        let table = parse_csv("cases", csv.as_bytes()).unwrap();

        assert_eq!(
            table.headers,
            vec!["Province/State", "Country/Region", "Lat", "Long", "1/22/20"]
        );
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.rows[0][0], None);
        assert_eq!(table.rows[0][1].as_deref(), Some("Korea, South"));
        assert_eq!(table.rows[1][0].as_deref(), Some("Hubei"));
        assert_eq!(table.rows[1][4].as_deref(), Some("444"));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = parse_csv("deaths", b"").unwrap_err();
        assert!(err.to_string().contains("deaths"));
    }

    #[test]
    fn ragged_rows_are_an_error() {
        let csv = "a,b,c\n1,2,3\n1,2\n";
        assert!(parse_csv("cases", csv.as_bytes()).is_err());
    }
}
