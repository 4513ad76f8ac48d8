//! Lab test submission and status updates.

use super::client::{encode_segment, ApiClient, ApiError};
use super::types::{CreateLabTestRequest, LabTest, UpdateTestStatusRequest};

/// POST labtests
pub async fn post_lab_test(
    client: &ApiClient,
    request: &CreateLabTestRequest,
) -> Result<LabTest, ApiError> {
    client.post("labtests", request).await
}

/// Update the status of a test run by the given laboratory.
///
/// PUT labtests/{laboratoryId}
pub async fn put_lab_test(
    client: &ApiClient,
    laboratory_id: &str,
    request: &UpdateTestStatusRequest,
) -> Result<LabTest, ApiError> {
    client
        .put(&format!("labtests/{}", encode_segment(laboratory_id)), request)
        .await
}

/// GET labtest/patient/{patientId}
///
/// Note the singular `labtest` prefix, which differs from the other lab test routes.
pub async fn get_lab_test_by_patient(
    client: &ApiClient,
    patient_id: &str,
) -> Result<Vec<LabTest>, ApiError> {
    client
        .get(&format!("labtest/patient/{}", encode_segment(patient_id)))
        .await
}
