//! Ranking order for the board.

use std::cmp::Ordering;

use crate::fields::fields_for;
use crate::format::parse_numeric;
use crate::model::{Record, Tab};

/// Orders records by the tab's speed field, highest first, without touching
/// the input.
///
/// Records whose speed is absent or non-numeric go after every record with a
/// value. The sort is stable: equal speeds and absent speeds keep their input
/// order, so re-sorting identical input yields identical output.
pub fn sort_by<'a, R>(tab: Tab, records: &'a [R]) -> Vec<&'a Record>
where
    R: AsRef<Record>,
{
    let field = fields_for(tab).speed;
    let mut keyed: Vec<(Option<f64>, &Record)> = records
        .iter()
        .map(|r| {
            let record = <R as AsRef<Record>>::as_ref(r);
            (parse_numeric(record.value(field)), record)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_desc_absent_last(*a, *b));
    keyed.into_iter().map(|(_, record)| record).collect()
}

fn compare_desc_absent_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
