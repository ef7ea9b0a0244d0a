use crate::error::{IpvaultError, IpvaultResult};
use crate::record::Category;
use crate::workflow::RecordSubmission;

/// Contents of the "new IP record" dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub name: String,
    ip_value: String,
    pub description: String,
    pub category: Category,
}

impl CreateForm {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn ip_value(&self) -> &str {
        &self.ip_value
    }

    /// Store the IP value with every non-digit removed.
    pub fn set_ip_value(&mut self, raw: &str) {
        self.ip_value = raw.chars().filter(char::is_ascii_digit).collect();
    }

    /// Name and IP value are both present.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.ip_value.is_empty()
    }

    pub fn validate(&self) -> IpvaultResult<RecordSubmission> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(IpvaultError::InvalidInput("IP name is required".into()));
        }
        if self.ip_value.is_empty() {
            return Err(IpvaultError::InvalidInput("IP value is required".into()));
        }
        let value = self.ip_value.parse::<u64>().map_err(|_| {
            IpvaultError::InvalidInput(format!("IP value is too large: {}", self.ip_value))
        })?;

        Ok(RecordSubmission {
            name: name.to_string(),
            value,
            category: self.category,
            description: self.description.trim().to_string(),
        })
    }

    /// Clear every field, restoring `category` as the selection.
    pub fn reset(&mut self, category: Category) {
        *self = Self::new(category);
    }
}
