//! Quarantine incidents.

use super::client::{ApiClient, ApiError};
use super::types::QuarantineIncident;

/// GET api/incidents/selected-for-quarantine
pub async fn get_selected_for_quarantine(
    client: &ApiClient,
) -> Result<Vec<QuarantineIncident>, ApiError> {
    client.get("api/incidents/selected-for-quarantine").await
}

/// Create or update a quarantine incident.
///
/// POST api/incidents/quarantine
pub async fn post_quarantine_incident(
    client: &ApiClient,
    incident: &QuarantineIncident,
) -> Result<QuarantineIncident, ApiError> {
    client.post("api/incidents/quarantine", incident).await
}
