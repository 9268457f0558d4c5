// Field Mapper
// Ordered collection of source-field -> destination-field rows: seeded
// service defaults (not deletable) plus user-added rows (deletable, removed
// only after an explicit confirm).

use std::collections::HashSet;

use crate::models::requests::FieldMapEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    SourceLabel,
    DestinationValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMappingRow {
    pub id: u64,
    pub source_label: String,
    pub destination_value: String,
    pub deletable: bool,
}

#[derive(Debug, Clone)]
pub struct FieldMapper {
    rows: Vec<FieldMappingRow>,
    next_id: u64,
    pending_remove: Option<u64>,
}

impl FieldMapper {
    /// Seed the service's default rows. Defaults are never deletable.
    pub fn seeded(defaults: &[(&str, &str)]) -> Self {
        let rows = defaults
            .iter()
            .enumerate()
            .map(|(i, (source, dest))| FieldMappingRow {
                id: i as u64,
                source_label: source.to_string(),
                destination_value: dest.to_string(),
                deletable: false,
            })
            .collect::<Vec<_>>();

        Self {
            next_id: rows.len() as u64,
            rows,
            pending_remove: None,
        }
    }

    /// Rebuild rows from a saved sync's `data_map` (edit mode). Rows whose
    /// source label matches a service default stay non-deletable.
    pub fn from_saved(entries: &[FieldMapEntry], defaults: &[(&str, &str)]) -> Self {
        let default_sources: HashSet<&str> = defaults.iter().map(|(s, _)| *s).collect();
        let rows = entries
            .iter()
            .enumerate()
            .map(|(i, e)| FieldMappingRow {
                id: i as u64,
                source_label: e.source_field.clone(),
                destination_value: e.destination_field.clone(),
                deletable: !default_sources.contains(e.source_field.as_str()),
            })
            .collect::<Vec<_>>();

        Self {
            next_id: rows.len() as u64,
            rows,
            pending_remove: None,
        }
    }

    pub fn rows(&self) -> &[FieldMappingRow] {
        &self.rows
    }

    pub fn row(&self, id: u64) -> Option<&FieldMappingRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Append a fresh empty row. Only user-added rows are deletable.
    pub fn add_row(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(FieldMappingRow {
            id,
            source_label: String::new(),
            destination_value: String::new(),
            deletable: true,
        });
        id
    }

    /// First half of the two-phase removal: remember which row the user asked
    /// to delete so the host can show a confirm/cancel affordance. Refused for
    /// unknown or non-deletable rows.
    pub fn request_remove(&mut self, id: u64) -> bool {
        match self.row(id) {
            Some(row) if row.deletable => {
                self.pending_remove = Some(id);
                true
            }
            _ => false,
        }
    }

    pub fn pending_remove(&self) -> Option<u64> {
        self.pending_remove
    }

    /// Confirm the pending removal. Returns the removed row's id.
    pub fn confirm_remove(&mut self) -> Option<u64> {
        let id = self.pending_remove.take()?;
        self.rows.retain(|r| r.id != id);
        Some(id)
    }

    /// Cancel leaves the collection untouched.
    pub fn cancel_remove(&mut self) {
        self.pending_remove = None;
    }

    /// Update exactly the row matching `id`; unmatched ids are a no-op.
    pub fn update_row(&mut self, id: u64, field: RowField, value: &str) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
            match field {
                RowField::SourceLabel => row.source_label = value.to_string(),
                RowField::DestinationValue => row.destination_value = value.to_string(),
            }
        }
    }

    /// Destination values already taken by some row. Render-time helper for
    /// disabling used options in a destination picker.
    pub fn used_destinations(&self) -> HashSet<&str> {
        self.rows
            .iter()
            .map(|r| r.destination_value.as_str())
            .filter(|d| !d.is_empty())
            .collect()
    }

    /// Destination values that appear on more than one row. Surfaced in the
    /// UI; free-text duplicates are flagged, not rejected.
    pub fn duplicate_destinations(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut dupes: Vec<String> = Vec::new();
        for row in &self.rows {
            let d = row.destination_value.as_str();
            if d.is_empty() {
                continue;
            }
            if !seen.insert(d) && !dupes.iter().any(|x| x == d) {
                dupes.push(d.to_string());
            }
        }
        dupes
    }

    /// Step validation: at least one row, and no row with an empty
    /// destination field.
    pub fn is_complete(&self) -> bool {
        !self.rows.is_empty()
            && self
                .rows
                .iter()
                .all(|r| !r.destination_value.trim().is_empty())
    }

    /// Ordered wire entries for the submit payload.
    pub fn data_map(&self) -> Vec<FieldMapEntry> {
        self.rows
            .iter()
            .map(|r| FieldMapEntry {
                source_field: r.source_label.clone(),
                destination_field: r.destination_value.clone(),
            })
            .collect()
    }
}

// =============================================================================
// Unit tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: &[(&str, &str)] = &[
        ("Email", "email"),
        ("Full name", "full_name"),
        ("Phone", "phone"),
        ("Address", "address"),
    ];

    #[test]
    fn seeded_rows_are_not_deletable() {
        let mapper = FieldMapper::seeded(DEFAULTS);
        assert_eq!(mapper.rows().len(), 4);
        assert!(mapper.rows().iter().all(|r| !r.deletable));
    }

    #[test]
    fn added_rows_are_deletable_with_fresh_ids() {
        let mut mapper = FieldMapper::seeded(DEFAULTS);
        let a = mapper.add_row();
        let b = mapper.add_row();
        assert_ne!(a, b, "row ids must be collision-free");
        assert!(mapper.row(a).unwrap().deletable);
        assert!(mapper.row(b).unwrap().deletable);
    }

    #[test]
    fn remove_requires_confirm() {
        let mut mapper = FieldMapper::seeded(DEFAULTS);
        let id = mapper.add_row();

        assert!(mapper.request_remove(id));
        assert_eq!(mapper.rows().len(), 5, "request alone must not remove");

        mapper.cancel_remove();
        assert_eq!(mapper.rows().len(), 5, "cancel leaves state untouched");
        assert!(mapper.pending_remove().is_none());

        assert!(mapper.request_remove(id));
        assert_eq!(mapper.confirm_remove(), Some(id));
        assert_eq!(mapper.rows().len(), 4);
    }

    #[test]
    fn default_rows_refuse_removal() {
        let mut mapper = FieldMapper::seeded(DEFAULTS);
        let default_id = mapper.rows()[0].id;
        assert!(!mapper.request_remove(default_id));
        assert!(mapper.pending_remove().is_none());
    }

    #[test]
    fn update_row_ignores_unknown_id() {
        let mut mapper = FieldMapper::seeded(DEFAULTS);
        let before = mapper.rows().to_vec();
        mapper.update_row(9999, RowField::DestinationValue, "nope");
        assert_eq!(mapper.rows(), before.as_slice(), "unmatched id is a no-op");
    }

    #[test]
    fn update_row_targets_exactly_one_row() {
        let mut mapper = FieldMapper::seeded(DEFAULTS);
        let id = mapper.add_row();
        mapper.update_row(id, RowField::SourceLabel, "Company");
        mapper.update_row(id, RowField::DestinationValue, "company_name");

        let row = mapper.row(id).unwrap();
        assert_eq!(row.source_label, "Company");
        assert_eq!(row.destination_value, "company_name");
        assert_eq!(
            mapper.rows()[0].source_label,
            "Email",
            "other rows untouched"
        );
    }

    #[test]
    fn duplicate_destinations_are_surfaced_not_rejected() {
        let mut mapper = FieldMapper::seeded(DEFAULTS);
        let id = mapper.add_row();
        mapper.update_row(id, RowField::SourceLabel, "Work email");
        mapper.update_row(id, RowField::DestinationValue, "email");

        assert_eq!(mapper.duplicate_destinations(), vec!["email".to_string()]);
        assert!(
            mapper.is_complete(),
            "duplicates do not block completion, they are only flagged"
        );
    }

    #[test]
    fn empty_destination_blocks_completion() {
        let mut mapper = FieldMapper::seeded(DEFAULTS);
        let id = mapper.add_row();
        mapper.update_row(id, RowField::SourceLabel, "Company");
        assert!(!mapper.is_complete(), "empty destination must block");
        mapper.update_row(id, RowField::DestinationValue, "company_name");
        assert!(mapper.is_complete());
    }

    #[test]
    fn data_map_preserves_order() {
        let mapper = FieldMapper::seeded(DEFAULTS);
        let map = mapper.data_map();
        assert_eq!(map.len(), 4);
        assert_eq!(map[0].source_field, "Email");
        assert_eq!(map[0].destination_field, "email");
        assert_eq!(map[3].source_field, "Address");
    }

    #[test]
    fn from_saved_keeps_default_rows_locked() {
        let entries = vec![
            FieldMapEntry {
                source_field: "Email".to_string(),
                destination_field: "email".to_string(),
            },
            FieldMapEntry {
                source_field: "Company".to_string(),
                destination_field: "company_name".to_string(),
            },
        ];
        let mapper = FieldMapper::from_saved(&entries, DEFAULTS);
        assert!(!mapper.rows()[0].deletable, "default-sourced row stays locked");
        assert!(mapper.rows()[1].deletable, "custom row stays deletable");
    }
}
