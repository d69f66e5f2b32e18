//! Tab → record field mapping.

use crate::model::{Field, Tab};

/// The record fields a tab reads as speed, direction and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub speed: Field,
    pub direction: Field,
    pub time: Field,
}

/// Lookup table from tab to fields. Unrecognized tab ids have already been
/// folded into `Tab::AverageWind` by `Tab::from_id`.
pub fn fields_for(tab: Tab) -> FieldMap {
    match tab {
        Tab::AverageWind => FieldMap {
            speed: Field::Speed,
            direction: Field::Dir,
            time: Field::Time,
        },
        Tab::Gust => FieldMap {
            speed: Field::GustSpeed,
            direction: Field::GustDir,
            time: Field::Time,
        },
    }
}
