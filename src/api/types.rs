//! Request and response types for the IMIS backend API.
//!
//! All structs use camelCase serialization to match the API's JSON format.
//! Optional fields the backend may omit default to `None` / empty.

use serde::{Deserialize, Deserializer, Serialize};

/// Read a list the backend may send as `null` as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Kind of institution an account belongs to. JWT roles carry these values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstitutionType {
    TestSite,
    Laboratory,
    DoctorsOffice,
    Clinic,
    GovernmentAgency,
}

impl InstitutionType {
    pub const ALL: [InstitutionType; 5] = [
        InstitutionType::TestSite,
        InstitutionType::Laboratory,
        InstitutionType::DoctorsOffice,
        InstitutionType::Clinic,
        InstitutionType::GovernmentAgency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstitutionType::TestSite => "TEST_SITE",
            InstitutionType::Laboratory => "LABORATORY",
            InstitutionType::DoctorsOffice => "DOCTORS_OFFICE",
            InstitutionType::Clinic => "CLINIC",
            InstitutionType::GovernmentAgency => "GOVERNMENT_AGENCY",
        }
    }

    /// Parse a role claim. Accepts both `LABORATORY` and `ROLE_LABORATORY`.
    pub fn from_role(role: &str) -> Option<Self> {
        let name = role.strip_prefix("ROLE_").unwrap_or(role);
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

/// Role of a user within an institution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "USER_ROLE_ADMIN")]
    Admin,
    #[serde(rename = "USER_ROLE_REGULAR")]
    Regular,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientStatus {
    Registered,
    Suspected,
    ScheduledForTesting,
    TestSubmittedInProgress,
    TestFinishedPositive,
    TestFinishedNegative,
    TestFinishedInvalid,
    TestFinishedRecovered,
    TestFinishedNotRecovered,
    PatientDead,
    DoctorsVisit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    TestSubmitted,
    TestInProgress,
    TestPositive,
    TestNegative,
    TestInvalid,
}

// ── Auth ────────────────────────────────────────────────────────────────

/// Credentials sent to POST auth.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Response from POST auth. The token is absent on a rejected sign-in
/// that the backend still answers with 2xx.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub jwt_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Authority {
    pub authority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub user_role: Option<UserRole>,
    #[serde(default)]
    pub authorities: Option<Vec<Authority>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub institution_type: Option<InstitutionType>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub users: Option<Vec<User>>,
}

/// Body of POST auth/register: a new institution plus its first admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstitutionRequest {
    pub institution_type: InstitutionType,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub street: String,
    pub house_number: String,
    pub zip: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub username: String,
    pub password: String,
}

// ── Patients ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientEvent {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub event_type: Option<PatientStatus>,
    #[serde(default)]
    pub event_timestamp: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// ISO-8601 date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub zip: Option<i32>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub insurance_company: Option<String>,
    #[serde(default)]
    pub insurance_membership_number: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub flu_immunization: Option<bool>,
    #[serde(default)]
    pub speed_of_symptoms_outbreak: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub corona_contacts: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub risk_areas: Vec<String>,
    #[serde(default)]
    pub weakened_immune_system: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pre_illnesses: Vec<String>,
    #[serde(default)]
    pub risk_occupation: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<PatientEvent>,
    #[serde(default)]
    pub patient_status: Option<PatientStatus>,
}

/// Body of POST patients.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub last_name: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_membership_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flu_immunization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_of_symptoms_outbreak: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corona_contacts: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub risk_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weakened_immune_system: Option<bool>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pre_illnesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

// ── Lab tests ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    #[serde(default)]
    pub id: Option<i64>,
    pub test_id: String,
    #[serde(default)]
    pub test_status: Option<TestStatus>,
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Body of POST labtests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabTestRequest {
    pub laboratory_id: String,
    pub patient_id: String,
    pub test_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of PUT labtests/{laboratoryId}.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestStatusRequest {
    pub test_id: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ── Doctor / incidents ──────────────────────────────────────────────────

/// Body of POST doctor/create_appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub doctor_id: String,
    pub laboratory_id: String,
    pub patient_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineIncident {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub selected_for_quarantine: bool,
    /// ISO-8601 date the quarantine ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_institution_type_from_role() {
        assert_eq!(
            InstitutionType::from_role("LABORATORY"),
            Some(InstitutionType::Laboratory)
        );
        assert_eq!(
            InstitutionType::from_role("ROLE_GOVERNMENT_AGENCY"),
            Some(InstitutionType::GovernmentAgency)
        );
        assert_eq!(InstitutionType::from_role("ROLE_ADMIN"), None);
        assert_eq!(InstitutionType::from_role(""), None);
    }

    #[test]
    fn test_institution_type_wire_names_match_as_str() {
        for t in InstitutionType::ALL {
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
    }

    #[test]
    fn test_patient_tolerates_missing_fields() {
        let patient: Patient = serde_json::from_value(json!({
            "id": "p-1",
            "firstName": "Erika",
            "zip": 10115,
            "symptoms": ["COUGH"],
            "patientStatus": "TEST_FINISHED_NEGATIVE"
        }))
        .unwrap();

        assert_eq!(patient.id, "p-1");
        assert_eq!(patient.first_name.as_deref(), Some("Erika"));
        assert_eq!(patient.zip, Some(10115));
        assert_eq!(patient.symptoms, vec!["COUGH"]);
        assert!(patient.risk_areas.is_empty());
        assert!(!patient.confirmed);
        assert_eq!(
            patient.patient_status,
            Some(PatientStatus::TestFinishedNegative)
        );
    }

    #[test]
    fn test_patient_null_lists_are_empty() {
        let patient: Patient = serde_json::from_value(json!({
            "id": "p-1",
            "confirmed": false,
            "symptoms": null,
            "riskAreas": null,
            "preIllnesses": null,
            "events": null
        }))
        .unwrap();

        assert!(patient.symptoms.is_empty());
        assert!(patient.risk_areas.is_empty());
        assert!(patient.pre_illnesses.is_empty());
        assert!(patient.events.is_empty());

        let request: CreatePatientRequest =
            serde_json::from_value(json!({
                "lastName": "Mustermann",
                "firstName": "Erika",
                "symptoms": null
            }))
            .unwrap();
        assert!(request.symptoms.is_empty());
    }

    #[test]
    fn test_appointment_request_is_camel_case() {
        let req = CreateAppointmentRequest {
            doctor_id: "d".into(),
            laboratory_id: "l".into(),
            patient_id: "p".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "doctorId": "d", "laboratoryId": "l", "patientId": "p" })
        );
    }

    #[test]
    fn test_user_role_wire_names() {
        assert_eq!(
            serde_json::to_value(UserRole::Admin).unwrap(),
            json!("USER_ROLE_ADMIN")
        );
        let role: UserRole = serde_json::from_value(json!("USER_ROLE_REGULAR")).unwrap();
        assert_eq!(role, UserRole::Regular);
    }

    #[test]
    fn test_auth_response_without_token() {
        let resp: AuthResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.jwt_token.is_none());
    }
}
