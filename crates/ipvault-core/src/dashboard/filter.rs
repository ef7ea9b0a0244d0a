//! Search and category filtering over the loaded record list.

use crate::record::{CategoryFilter, IpRecord};

/// Current search box contents and category selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub search: String,
    pub category: CategoryFilter,
}

impl RecordFilter {
    /// Name or description contains the search term (case-insensitive) and, for
    /// a concrete category, the description contains the category label.
    pub fn matches(&self, record: &IpRecord) -> bool {
        matches_search(record, &self.search) && matches_category(record, self.category)
    }

    pub fn apply<'a>(&self, records: &'a [IpRecord]) -> Vec<&'a IpRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.category != CategoryFilter::All
    }
}

fn matches_search(record: &IpRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record.name.to_lowercase().contains(&needle)
        || record.description.to_lowercase().contains(&needle)
}

fn matches_category(record: &IpRecord, filter: CategoryFilter) -> bool {
    match filter {
        CategoryFilter::All => true,
        CategoryFilter::Only(category) => record.description.contains(category.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Category, CiphertextHandle};

    fn record(name: &str, description: &str) -> IpRecord {
        IpRecord {
            id: format!("ip-{name}"),
            name: name.to_string(),
            encrypted_value: CiphertextHandle(format!("ip-{name}")),
            public_value1: 1,
            public_value2: 0,
            description: description.to_string(),
            creator: "0xabc".into(),
            timestamp: 0,
            is_verified: false,
            decrypted_value: 0,
        }
    }

    #[test]
    fn search_matches_name_or_description_ignoring_case() {
        let records = vec![
            record("Solar Patent", "panel design"),
            record("Logo", "brand mark for SOLAR co"),
            record("Contract", "licensing terms"),
        ];
        let filter = RecordFilter {
            search: "solar".into(),
            category: CategoryFilter::All,
        };
        let names: Vec<&str> = filter
            .apply(&records)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["Solar Patent", "Logo"]);
    }

    #[test]
    fn unmatched_search_excludes_record() {
        let filter = RecordFilter {
            search: "quantum".into(),
            category: CategoryFilter::All,
        };
        assert!(!filter.matches(&record("Solar Patent", "panel design")));
    }

    #[test]
    fn all_categories_never_exclude() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record("Anything", "")));
        assert!(!filter.is_active());
    }

    #[test]
    fn category_label_must_appear_in_description_verbatim() {
        let filter = RecordFilter {
            search: String::new(),
            category: CategoryFilter::Only(Category::Technology),
        };
        assert!(filter.matches(&record("Chip", "Technology: low-power core")));
        assert!(!filter.matches(&record("Chip", "technology: low-power core")));
        assert!(!filter.matches(&record("Song", "Creative work")));
        assert!(filter.is_active());
    }
}
