use crate::MergedRecord;

/// Narrow a merged list for delegation choice.
///
/// A record passes when its commission is at most `max_commission` and the
/// query (if any) is a substring of the vote identity or, ignoring case, of
/// the registered name. Order is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorFilter {
    pub max_commission: u8,
    pub query: String,
}

impl Default for ValidatorFilter {
    fn default() -> Self {
        Self {
            max_commission: 100,
            query: String::new(),
        }
    }
}

impl ValidatorFilter {
    pub fn matches(&self, record: &MergedRecord) -> bool {
        if record.vote.commission > self.max_commission {
            return false;
        }
        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }
        if record.vote.vote_identity.contains(query) {
            return true;
        }
        let needle = query.to_lowercase();
        record
            .display_name()
            .map(|name| name.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }

    pub fn apply(&self, records: &[MergedRecord]) -> Vec<MergedRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
