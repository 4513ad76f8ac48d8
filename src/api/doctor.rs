//! Appointments between a doctor, a laboratory and a patient.

use super::client::{ApiClient, ApiError};
use super::types::CreateAppointmentRequest;

/// POST doctor/create_appointment
///
/// The backend answers with the created appointment; its shape is not
/// fixed, so it is returned as raw JSON.
pub async fn post_doctor_create_appointment(
    client: &ApiClient,
    request: &CreateAppointmentRequest,
) -> Result<serde_json::Value, ApiError> {
    client.post("doctor/create_appointment", request).await
}
