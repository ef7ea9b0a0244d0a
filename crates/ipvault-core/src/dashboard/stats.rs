use crate::record::{same_address, IpRecord};

/// Aggregates shown in the dashboard header, recomputed after every load.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub total_records: usize,
    pub verified_records: usize,
    /// Records whose creator is the connected account.
    pub user_records: usize,
    /// Mean of `public_value1`; 0 for an empty list.
    pub avg_value: f64,
}

impl Stats {
    pub fn compute(records: &[IpRecord], user: Option<&str>) -> Self {
        let total_records = records.len();
        let verified_records = records.iter().filter(|r| r.is_verified).count();
        let user_records = user
            .map(|address| {
                records
                    .iter()
                    .filter(|r| same_address(&r.creator, address))
                    .count()
            })
            .unwrap_or(0);
        let avg_value = if total_records == 0 {
            0.0
        } else {
            let sum: f64 = records.iter().map(|r| r.public_value1 as f64).sum();
            sum / total_records as f64
        };

        Self {
            total_records,
            verified_records,
            user_records,
            avg_value,
        }
    }

    /// Share of verified records in percent, rounded down.
    pub fn verified_percent(&self) -> u32 {
        if self.total_records == 0 {
            return 0;
        }
        (self.verified_records * 100 / self.total_records) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CiphertextHandle;

    fn record(creator: &str, value: u64, verified: bool) -> IpRecord {
        IpRecord {
            id: format!("ip-{value}"),
            name: "r".into(),
            encrypted_value: CiphertextHandle(format!("ip-{value}")),
            public_value1: value,
            public_value2: 0,
            description: String::new(),
            creator: creator.into(),
            timestamp: 0,
            is_verified: verified,
            decrypted_value: 0,
        }
    }

    #[test]
    fn empty_list_has_zero_average() {
        let stats = Stats::compute(&[], Some("0xabc"));
        assert_eq!(stats, Stats::default());
        assert_eq!(stats.verified_percent(), 0);
    }

    #[test]
    fn counts_and_average() {
        let records = vec![
            record("0xAbC", 10, true),
            record("0xdef", 20, false),
            record("0xabc", 33, true),
        ];
        let stats = Stats::compute(&records, Some("0xABC"));
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.verified_records, 2);
        assert_eq!(stats.user_records, 2);
        assert!((stats.avg_value - 21.0).abs() < f64::EPSILON);
        assert!(stats.verified_records <= stats.total_records);
        assert_eq!(stats.verified_percent(), 66);
    }

    #[test]
    fn no_user_means_no_user_records() {
        let records = vec![record("0xabc", 1, false)];
        assert_eq!(Stats::compute(&records, None).user_records, 0);
    }
}
