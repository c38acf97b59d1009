use log::info;

use crate::{
    error::{Result, Stage},
    frame::Frame,
    reconcile::schema_difference,
};

/// Stacks `second` below `first` and assigns a fresh dense row identity.
///
/// Both frames must carry the same column set; `second` is realigned to
/// `first`'s column order. Whatever identities the inputs carried are
/// discarded.
pub fn merge(first: Frame, second: Frame) -> Result<Frame> {
    let difference = schema_difference(&first, &second);
    if !difference.is_empty() {
        return Err(difference.into_error(Stage::Merge));
    }
    let (first_rows, second_rows) = (first.len(), second.len());
    let order = first.columns().to_vec();
    let second = second.reorder_columns(&order, Stage::Merge)?;

    let mut merged = first;
    merged.append(second);
    merged.reindex();
    info!(
        "Merged {} + {} row(s) into {} row(s)",
        first_rows,
        second_rows,
        merged.len()
    );
    Ok(merged)
}
