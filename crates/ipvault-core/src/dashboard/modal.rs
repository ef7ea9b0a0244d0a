use crate::record::IpRecord;

/// The one dialog currently open, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    None,
    Create,
    /// Record details plus the value revealed by a local decrypt, if any.
    Detail {
        record: IpRecord,
        local_decryption: Option<u64>,
    },
    History,
}

/// What the detail dialog shows in place of the IP value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealedValue {
    OnChain(u64),
    Local(u64),
    Locked,
}

impl Modal {
    pub fn detail(record: IpRecord) -> Self {
        Modal::Detail {
            record,
            local_decryption: None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::None)
    }

    pub fn detail_record_id(&self) -> Option<&str> {
        match self {
            Modal::Detail { record, .. } => Some(&record.id),
            _ => None,
        }
    }

    /// Attach a decrypted value to the detail dialog if it shows `record_id`.
    pub fn set_local_decryption(&mut self, record_id: &str, value: u64) {
        if let Modal::Detail {
            record,
            local_decryption,
        } = self
        {
            if record.id == record_id {
                *local_decryption = Some(value);
            }
        }
    }

    /// Swap in a freshly loaded copy of the record shown in the detail dialog.
    pub fn refresh_record(&mut self, records: &[IpRecord]) {
        if let Modal::Detail { record, .. } = self {
            if let Some(fresh) = records.iter().find(|r| r.id == record.id) {
                *record = fresh.clone();
            }
        }
    }

    pub fn revealed_value(&self) -> Option<RevealedValue> {
        match self {
            Modal::Detail {
                record,
                local_decryption,
            } => Some(match (record.verified_value(), local_decryption) {
                (Some(value), _) => RevealedValue::OnChain(value),
                (None, Some(value)) => RevealedValue::Local(*value),
                (None, None) => RevealedValue::Locked,
            }),
            _ => None,
        }
    }
}
