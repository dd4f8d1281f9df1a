use super::CapturedSet;
use crate::error::MssqlDbError;
use crate::results::Record;
use crate::types::RowValues;

fn is_out_marker(set: &CapturedSet, out_arg: &str) -> bool {
    matches!(
        set,
        CapturedSet::Records(records)
            if records.first().is_some_and(|r| r.contains_key(out_arg))
    )
}

/// Pick one captured set from a stored procedure's output.
///
/// Returns `None` when nothing came back, when `index` is out of range, or
/// when the only set present is the out argument's marker row: a procedure
/// that returned no data of its own must not be mistaken for one that did.
#[must_use]
pub fn get_result_set<'a>(
    results: &'a [CapturedSet],
    index: usize,
    out_arg: Option<&str>,
) -> Option<&'a CapturedSet> {
    if results.is_empty() {
        return None;
    }
    if results.len() == 1
        && let Some(out) = out_arg
        && is_out_marker(&results[0], &out.to_lowercase())
    {
        return None;
    }
    results.get(index)
}

/// First record of the first real result set.
#[must_use]
pub fn get_first_result_set<'a>(
    results: &'a [CapturedSet],
    out_arg: Option<&str>,
) -> Option<&'a Record> {
    get_result_set(results, 0, out_arg)?
        .as_records()?
        .first()
}

/// Read the out argument from the last captured set.
///
/// For raw (`as_dict == false`) output the value is located through the
/// `Columns` entry just before the last rows.
///
/// # Errors
///
/// Returns `MssqlDbError::MissingOutArgument` naming the (lowercased)
/// argument when it is not there.
pub fn get_out_value<'a>(
    results: &'a [CapturedSet],
    out_arg: &str,
) -> Result<&'a RowValues, MssqlDbError> {
    let out = out_arg.to_lowercase();
    let missing = || MssqlDbError::MissingOutArgument(out.clone());

    match results.last() {
        Some(CapturedSet::Records(records)) => records
            .first()
            .and_then(|r| r.get(&out))
            .ok_or_else(missing),
        Some(CapturedSet::Rows(rows)) => {
            let columns = match results.len().checked_sub(2).and_then(|i| results.get(i)) {
                Some(CapturedSet::Columns(columns)) => columns,
                _ => return Err(missing()),
            };
            let position = columns
                .iter()
                .rposition(|c| *c == out)
                .ok_or_else(missing)?;
            rows.first()
                .and_then(|row| row.get(position))
                .ok_or_else(missing)
        }
        _ => Err(missing()),
    }
}
