//! [`SpecTable`] construction and lookups.

use crate::spec::{EnumCellValue, SchemaError, SpecTable};
use crate::util::{find_column_in_list, validate_unique_columns};

impl SpecTable {
    /// Build a table, validating unique column names and row widths.
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<EnumCellValue>>,
    ) -> Result<Self, SchemaError> {
        validate_unique_columns(&columns)?;
        for (n_idx_row, row) in rows.iter().enumerate() {
            validate_row_width(n_idx_row, row.len(), columns.len())?;
        }
        Ok(Self { columns, rows })
    }

    /// Build an empty table with the given header.
    pub fn with_columns<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns.into_iter().map(Into::into).collect(), vec![])
    }

    /// Append one row.
    pub fn push_row(&mut self, row: Vec<EnumCellValue>) -> Result<(), SchemaError> {
        validate_row_width(self.rows.len(), row.len(), self.columns.len())?;
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<EnumCellValue>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Index of `name` by normalized (trimmed, case-insensitive) match.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        find_column_in_list(&self.columns, name)
    }

    /// Like [`Self::find_column`], but a miss is a [`SchemaError::MissingColumn`].
    pub fn require_column(&self, table: &str, name: &str) -> Result<usize, SchemaError> {
        self.find_column(name)
            .ok_or_else(|| SchemaError::MissingColumn {
                table: table.to_string(),
                column: name.to_string(),
            })
    }

    /// Cell at `(row, col)`, `None` when out of bounds.
    pub fn cell(&self, n_idx_row: usize, n_idx_col: usize) -> Option<&EnumCellValue> {
        self.rows.get(n_idx_row).and_then(|row| row.get(n_idx_col))
    }

    /// Iterate one column top to bottom.
    pub fn column_values(&self, n_idx_col: usize) -> impl Iterator<Item = &EnumCellValue> + '_ {
        self.rows.iter().map(move |row| &row[n_idx_col])
    }

    /// Consume the table into its header and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<EnumCellValue>>) {
        (self.columns, self.rows)
    }
}

fn validate_row_width(row: usize, found: usize, expected: usize) -> Result<(), SchemaError> {
    if found != expected {
        return Err(SchemaError::RowWidthMismatch {
            row,
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_duplicate_columns() {
        let err = SpecTable::with_columns(["sku", "sku"]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumns(_)));
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = SpecTable::with_columns(["a", "b"]).unwrap();
        table.push_row(vec!["1".into(), "2".into()]).unwrap();

        let err = table.push_row(vec!["3".into()]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::RowWidthMismatch {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_require_column_names_missing_column() {
        let table = SpecTable::with_columns(["sku_id"]).unwrap();
        assert_eq!(table.require_column("SKU", " SKU_ID ").unwrap(), 0);
        assert_eq!(
            table.require_column("SKU", "style_key").unwrap_err(),
            SchemaError::MissingColumn {
                table: "SKU".to_string(),
                column: "style_key".to_string()
            }
        );
    }

    #[test]
    fn test_column_values_iterates_rows() {
        let table = SpecTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec!["x".into(), 1i64.into()],
                vec!["y".into(), 2i64.into()],
            ],
        )
        .unwrap();
        let l_vals: Vec<String> = table.column_values(1).map(EnumCellValue::to_text).collect();
        assert_eq!(l_vals, vec!["1", "2"]);
        assert_eq!(table.cell(1, 0), Some(&EnumCellValue::from("y")));
        assert_eq!(table.cell(2, 0), None);
    }
}
