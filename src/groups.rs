/// Group selection and client-side group filtering.
///
/// The backend tags each station with zero or more group names (growing
/// regions, in practice) and reports the full list of groups alongside the
/// rows. The board shows one button per group plus a leading "all" button;
/// picking a group narrows the cached rows locally and never refetches.

use std::borrow::Cow;

use crate::model::Record;

/// Sentinel group meaning "no filtering".
pub const ALL_GROUPS: &str = "全部";

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// Currently selected group plus the groups the bar offers.
///
/// `available` always starts with `ALL_GROUPS`, followed by backend groups
/// in the order received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFilter {
    selected: String,
    available: Vec<String>,
}

impl Default for GroupFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupFilter {
    pub fn new() -> Self {
        Self {
            selected: ALL_GROUPS.to_string(),
            available: vec![ALL_GROUPS.to_string()],
        }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn is_all(&self) -> bool {
        self.selected == ALL_GROUPS
    }

    /// Replaces the offered groups with the backend's list.
    ///
    /// `ALL_GROUPS` is prepended unless the backend already sent it, in which
    /// case it is moved to the front rather than listed twice. The selection
    /// survives if the group is still offered, otherwise it resets to all.
    pub fn set_available(&mut self, backend_groups: &[String]) {
        let mut available = Vec::with_capacity(backend_groups.len() + 1);
        available.push(ALL_GROUPS.to_string());
        available.extend(
            backend_groups
                .iter()
                .filter(|g| g.as_str() != ALL_GROUPS)
                .cloned(),
        );
        self.available = available;

        if !self.available.contains(&self.selected) {
            self.selected = ALL_GROUPS.to_string();
        }
    }

    /// Selects an offered group. Returns `false`, leaving the selection
    /// unchanged, if the bar does not offer `group`.
    pub fn select(&mut self, group: &str) -> bool {
        if !self.available.iter().any(|g| g == group) {
            return false;
        }
        self.selected = group.to_string();
        true
    }

    /// Narrows `records` to the current selection.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Cow<'a, [Record]> {
        filter_by_group(records, &self.selected)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Keeps records that belong to `selection`.
///
/// `ALL_GROUPS` returns the input slice itself, borrowed, with no copying.
/// Otherwise a record is kept when its tag list contains the selection or
/// its single tag equals it; records with unknown group data are dropped.
pub fn filter_by_group<'a>(records: &'a [Record], selection: &str) -> Cow<'a, [Record]> {
    if selection == ALL_GROUPS {
        return Cow::Borrowed(records);
    }
    Cow::Owned(
        records
            .iter()
            .filter(|r| r.groups.contains(selection))
            .cloned()
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn rec(name: &str, groups: Value) -> Record {
        serde_json::from_value(json!({"name": name, "station_id": name, "groups": groups}))
            .expect("record should decode")
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // --- filter_by_group ----------------------------------------------------

    #[test]
    fn test_all_returns_the_same_slice() {
        let records = vec![rec("a", json!(["A"])), rec("b", json!(null))];
        let filtered = filter_by_group(&records, ALL_GROUPS);
        assert!(matches!(filtered, Cow::Borrowed(_)), "all must not copy");
        assert!(
            std::ptr::eq(&*filtered, records.as_slice()),
            "all must hand back the identical slice"
        );
    }

    #[test]
    fn test_tag_list_membership() {
        let records = vec![rec("ab", json!(["A", "B"]))];
        assert_eq!(names(&filter_by_group(&records, "A")), ["ab"]);
        assert_eq!(names(&filter_by_group(&records, "B")), ["ab"]);
        assert!(filter_by_group(&records, "C").is_empty());
    }

    #[test]
    fn test_single_tag_membership() {
        let records = vec![rec("a", json!("A"))];
        assert_eq!(names(&filter_by_group(&records, "A")), ["a"]);
        assert!(filter_by_group(&records, "B").is_empty());
    }

    #[test]
    fn test_unknown_groups_are_dropped_by_any_specific_group() {
        let records = vec![
            rec("none", json!(null)),
            rec("number", json!(5)),
            rec("tagged", json!(["A"])),
        ];
        assert_eq!(names(&filter_by_group(&records, "A")), ["tagged"]);
        assert_eq!(
            names(&filter_by_group(&records, ALL_GROUPS)),
            ["none", "number", "tagged"],
            "all keeps records regardless of group data"
        );
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let records = vec![
            rec("c", json!(["A"])),
            rec("x", json!(["B"])),
            rec("a", json!("A")),
            rec("b", json!(["B", "A"])),
        ];
        assert_eq!(names(&filter_by_group(&records, "A")), ["c", "a", "b"]);
    }

    // --- GroupFilter --------------------------------------------------------

    #[test]
    fn test_new_filter_selects_all() {
        let filter = GroupFilter::new();
        assert!(filter.is_all());
        assert_eq!(filter.available(), strings(&[ALL_GROUPS]).as_slice());
    }

    #[test]
    fn test_available_always_starts_with_all() {
        let mut filter = GroupFilter::new();
        filter.set_available(&strings(&["茶葉產區", "咖啡產區"]));
        assert_eq!(filter.available(), strings(&[ALL_GROUPS, "茶葉產區", "咖啡產區"]).as_slice());
    }

    #[test]
    fn test_all_from_backend_is_not_duplicated() {
        let mut filter = GroupFilter::new();
        filter.set_available(&strings(&["茶葉產區", ALL_GROUPS, "咖啡產區"]));
        assert_eq!(filter.available(), strings(&[ALL_GROUPS, "茶葉產區", "咖啡產區"]).as_slice());
    }

    #[test]
    fn test_selection_survives_when_still_offered() {
        let mut filter = GroupFilter::new();
        filter.set_available(&strings(&["A", "B"]));
        assert!(filter.select("B"));
        filter.set_available(&strings(&["B", "C"]));
        assert_eq!(filter.selected(), "B");
    }

    #[test]
    fn test_selection_resets_when_group_disappears() {
        let mut filter = GroupFilter::new();
        filter.set_available(&strings(&["A", "B"]));
        assert!(filter.select("A"));
        filter.set_available(&strings(&["B"]));
        assert!(filter.is_all(), "vanished group should fall back to all");
    }

    #[test]
    fn test_selecting_unoffered_group_is_rejected() {
        let mut filter = GroupFilter::new();
        filter.set_available(&strings(&["A"]));
        assert!(!filter.select("Z"));
        assert!(filter.is_all());
    }

    #[test]
    fn test_apply_uses_current_selection() {
        let records = vec![rec("a", json!(["A"])), rec("b", json!(["B"]))];
        let mut filter = GroupFilter::new();
        filter.set_available(&strings(&["A", "B"]));
        assert_eq!(filter.apply(&records).len(), 2);
        filter.select("B");
        assert_eq!(names(&filter.apply(&records)), ["b"]);
    }
}
