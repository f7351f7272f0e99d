//! Row extraction helpers shared by summary computation and outlier flagging.
//!
//! Batches arrive straight from a table scan, so group columns can be any
//! renderable Arrow type and value columns are either native numerics or
//! raw strings that still need coercion through [`NumericParser`].

use datafusion::arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray, UInt64Array,
};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::record_batch::RecordBatch;

use crate::error::{FivenumError, Result};
use crate::parse::{NumericParser, ParsedValue};

/// Extracts per-row group keys, one entry per grouping column.
///
/// SQL NULL group values render as the string `"NULL"` so that records with
/// missing group labels still land in a stable group.
pub(crate) fn group_keys(
    batch: &RecordBatch,
    group_columns: &[String],
) -> Result<Vec<Vec<String>>> {
    let mut result: Vec<Vec<String>> = vec![vec![]; batch.num_rows()];

    for col_name in group_columns {
        let col_idx = batch
            .schema()
            .index_of(col_name)
            .map_err(|_| FivenumError::column_not_found(col_name))?;
        let array = batch.column(col_idx);

        if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
            for (i, row) in result.iter_mut().enumerate() {
                row.push(render_group_value(strings, i));
            }
        } else {
            // Non-string group columns (dates, numerics, booleans) render
            // through the cast kernel.
            let casted = cast(array, &DataType::Utf8)?;
            let strings = casted
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| FivenumError::TypeMismatch {
                    expected: "Utf8".to_string(),
                    found: format!("{:?}", casted.data_type()),
                })?;
            for (i, row) in result.iter_mut().enumerate() {
                row.push(render_group_value(strings, i));
            }
        }
    }

    Ok(result)
}

fn render_group_value(array: &StringArray, index: usize) -> String {
    if array.is_null(index) {
        "NULL".to_string()
    } else {
        array.value(index).to_string()
    }
}

/// Classifies every row of the value column as numeric, missing, or invalid.
///
/// Native numeric columns pass through directly (nulls become
/// [`ParsedValue::Missing`], non-finite floats become invalid); string
/// columns go through the parser.
pub(crate) fn value_cells(
    batch: &RecordBatch,
    value_column: &str,
    parser: &NumericParser,
) -> Result<Vec<ParsedValue>> {
    let col_idx = batch
        .schema()
        .index_of(value_column)
        .map_err(|_| FivenumError::column_not_found(value_column))?;
    let array = batch.column(col_idx);

    let mut cells = Vec::with_capacity(batch.num_rows());

    if let Some(floats) = array.as_any().downcast_ref::<Float64Array>() {
        for i in 0..floats.len() {
            cells.push(if floats.is_null(i) {
                ParsedValue::Missing
            } else {
                classify_numeric(floats.value(i))
            });
        }
    } else if let Some(floats) = array.as_any().downcast_ref::<Float32Array>() {
        for i in 0..floats.len() {
            cells.push(if floats.is_null(i) {
                ParsedValue::Missing
            } else {
                classify_numeric(f64::from(floats.value(i)))
            });
        }
    } else if let Some(ints) = array.as_any().downcast_ref::<Int64Array>() {
        for i in 0..ints.len() {
            cells.push(if ints.is_null(i) {
                ParsedValue::Missing
            } else {
                ParsedValue::Numeric(ints.value(i) as f64)
            });
        }
    } else if let Some(ints) = array.as_any().downcast_ref::<Int32Array>() {
        for i in 0..ints.len() {
            cells.push(if ints.is_null(i) {
                ParsedValue::Missing
            } else {
                ParsedValue::Numeric(f64::from(ints.value(i)))
            });
        }
    } else if let Some(ints) = array.as_any().downcast_ref::<UInt64Array>() {
        for i in 0..ints.len() {
            cells.push(if ints.is_null(i) {
                ParsedValue::Missing
            } else {
                ParsedValue::Numeric(ints.value(i) as f64)
            });
        }
    } else if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
        for i in 0..strings.len() {
            cells.push(if strings.is_null(i) {
                ParsedValue::Missing
            } else {
                parser.parse(strings.value(i))
            });
        }
    } else {
        return Err(FivenumError::TypeMismatch {
            expected: "a numeric or Utf8 value column".to_string(),
            found: format!("{:?}", array.data_type()),
        });
    }

    Ok(cells)
}

fn classify_numeric(value: f64) -> ParsedValue {
    if value.is_finite() {
        ParsedValue::Numeric(value)
    } else {
        ParsedValue::Invalid(value.to_string())
    }
}
