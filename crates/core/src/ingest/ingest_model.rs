use serde::Serialize;

/// Counts for one processed payload, used for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub events: usize,
    /// Events the parser rejected.
    pub dropped_events: usize,
    pub processed: usize,
    pub skipped: usize,
    pub new_owners: usize,
}
