// Input validation utilities

use crate::models::responses::RemoteList;

pub const LIST_NAME_REQUIRED: &str = "List name is required";
pub const LIST_NAME_NOT_UNIQUE: &str = "List name must be unique";

/// Validate a new remote-list name against the already-fetched lists.
///
/// The duplicate check is an exact, case-sensitive match: remote services
/// treat "Newsletter" and "newsletter" as distinct names, so we do too.
pub fn validate_list_name(name: &str, existing: &[RemoteList]) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err(LIST_NAME_REQUIRED);
    }
    if existing.iter().any(|l| l.name == name) {
        return Err(LIST_NAME_NOT_UNIQUE);
    }
    Ok(())
}

/// Validate a unix-seconds date range for dashboard queries.
pub fn validate_date_range(from: i64, to: i64) -> Result<(), String> {
    if from < 0 || to < 0 {
        return Err("Dates must be unix timestamps (seconds)".to_string());
    }
    if from > to {
        return Err(format!("from_date {} is after to_date {}", from, to));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(names: &[&str]) -> Vec<RemoteList> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| RemoteList {
                id: i.to_string(),
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn empty_name_is_required_error() {
        let err = validate_list_name("", &lists(&["A"])).unwrap_err();
        assert_eq!(err, LIST_NAME_REQUIRED);
    }

    #[test]
    fn duplicate_name_is_unique_error() {
        let err = validate_list_name("Newsletter", &lists(&["Newsletter", "Other"])).unwrap_err();
        assert_eq!(err, LIST_NAME_NOT_UNIQUE);
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        // "newsletter" != "Newsletter" on the remote side, so it is allowed here.
        assert!(validate_list_name("newsletter", &lists(&["Newsletter"])).is_ok());
    }

    #[test]
    fn fresh_name_passes() {
        assert!(validate_list_name("Spring campaign", &lists(&["Newsletter"])).is_ok());
    }

    #[test]
    fn date_range_rejects_inverted_range() {
        assert!(validate_date_range(200, 100).is_err());
        assert!(validate_date_range(100, 200).is_ok());
        assert!(validate_date_range(-1, 200).is_err());
    }
}
