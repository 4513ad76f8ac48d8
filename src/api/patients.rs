//! Patient registration and lookup.

use super::client::{encode_segment, ApiClient, ApiError};
use super::types::{CreatePatientRequest, Patient};

/// POST patients
pub async fn post_patient(
    client: &ApiClient,
    request: &CreatePatientRequest,
) -> Result<Patient, ApiError> {
    client.post("patients", request).await
}

/// GET patients
pub async fn get_patients(client: &ApiClient) -> Result<Vec<Patient>, ApiError> {
    client.get("patients").await
}

/// GET patients/{id}
///
/// An unknown id is rejected with `ApiError::Status` (404).
pub async fn get_patient(client: &ApiClient, id: &str) -> Result<Patient, ApiError> {
    client
        .get(&format!("patients/{}", encode_segment(id)))
        .await
}
