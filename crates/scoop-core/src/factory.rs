//! Raw record to [`Flavor`] conversion.

use crate::flavor::{Flavor, RawRecord};

/// Convert raw records into flavors, in source order.
///
/// Invalid records are skipped; they never abort the conversion of the rest.
pub fn convert(records: &[RawRecord]) -> Vec<Flavor> {
    convert_with_stats(records).0
}

/// Like [`convert`], also returning how many records were dropped.
pub fn convert_with_stats(records: &[RawRecord]) -> (Vec<Flavor>, usize) {
    let mut flavors = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for (index, record) in records.iter().enumerate() {
        match Flavor::from_record(record) {
            Ok(flavor) => flavors.push(flavor),
            Err(reason) => {
                tracing::debug!(index, %reason, "dropping invalid record");
                dropped += 1;
            }
        }
    }

    (flavors, dropped)
}
