//! Command handlers behind the CLI subcommands.
//!
//! Each handler runs against the shared [`AppState`], prints its result as
//! pretty JSON on stdout and reports failures as a message string.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::api::types::{
    CreateAppointmentRequest, CreateInstitutionRequest, CreateLabTestRequest,
    CreatePatientRequest, QuarantineIncident, UpdateTestStatusRequest,
};
use crate::api::{doctor, incidents, labtests, patients, stats};
use crate::auth::store::AuthError;
use crate::notification::Notification;
use crate::state::AppState;

const LOGIN_FAILED_DESCRIPTION: &str = "Anmeldung fehlgeschlagen";

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to render output: {}", e))?;
    println!("{}", text);
    Ok(())
}

/// Read a JSON request body from a file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Restore the stored session before an authenticated command.
pub async fn restore_session(state: &AppState) -> Result<(), String> {
    let restored = state
        .auth
        .init()
        .await
        .map_err(|e| format!("Failed to restore session: {}", e))?;
    if !restored {
        log::info!("No active session, request is sent without a bearer token");
    }
    Ok(())
}

pub async fn login(state: &AppState, username: &str, password: &str) -> Result<(), String> {
    match state.auth.login(username, password).await {
        Ok(true) => {
            let roles: Vec<&str> = state
                .auth
                .roles()
                .await
                .iter()
                .map(|r| r.as_str())
                .collect();
            print_json(&json!({ "authenticated": true, "roles": roles }))
        }
        Ok(false) => {
            state
                .notifier
                .notify(Notification::error("", LOGIN_FAILED_DESCRIPTION));
            Err("Sign-in returned no token".to_string())
        }
        Err(AuthError::Api(e)) => {
            state
                .notifier
                .notify(Notification::error("", LOGIN_FAILED_DESCRIPTION));
            Err(format!("Sign-in failed: {}", e))
        }
        Err(e) => Err(format!("Sign-in failed: {}", e)),
    }
}

pub async fn logout(state: &AppState) -> Result<(), String> {
    state
        .auth
        .logout()
        .await
        .map_err(|e| format!("Logout failed: {}", e))?;
    print_json(&json!({ "authenticated": false }))
}

pub async fn status(state: &AppState) -> Result<(), String> {
    let roles: Vec<&str> = state
        .auth
        .roles()
        .await
        .iter()
        .map(|r| r.as_str())
        .collect();
    let expires_at = state.auth.claims().await.map(|c| c.exp);
    let bearer_attached = state.auth.api().has_bearer_token().await;
    let route = state.auth.current_route().await;

    print_json(&json!({
        "apiBaseUrl": state.api.base_url(),
        "showAllViews": state.config.show_all_views,
        "authenticated": state.auth.is_authenticated().await,
        "bearerAttached": bearer_attached,
        "route": route,
        "roles": roles,
        "expiresAt": expires_at,
        "user": state.auth.user().await,
        "institution": state.auth.institution().await,
    }))
}

pub async fn routes(state: &AppState) -> Result<(), String> {
    print_json(&state.auth.routes().await)
}

pub async fn institution_users(state: &AppState) -> Result<(), String> {
    print_json(&state.auth.institution_users().await)
}

pub async fn register_institution(state: &AppState, file: &Path) -> Result<(), String> {
    let request: CreateInstitutionRequest = read_json(file)?;
    let institution = crate::api::auth::post_institution(&state.api, &request)
        .await
        .map_err(|e| format!("Registration failed: {}", e))?;
    print_json(&institution)
}

pub async fn list_patients(state: &AppState) -> Result<(), String> {
    let all = patients::get_patients(&state.api)
        .await
        .map_err(|e| format!("Patient list failed: {}", e))?;
    print_json(&all)
}

pub async fn get_patient(state: &AppState, id: &str) -> Result<(), String> {
    match patients::get_patient(&state.api, id).await {
        Ok(patient) => print_json(&patient),
        Err(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
            Err(format!("Patient {} not found", id))
        }
        Err(e) => Err(format!("Patient lookup failed: {}", e)),
    }
}

pub async fn create_patient(state: &AppState, file: &Path) -> Result<(), String> {
    let request: CreatePatientRequest = read_json(file)?;
    let patient = patients::post_patient(&state.api, &request)
        .await
        .map_err(|e| format!("Patient registration failed: {}", e))?;
    print_json(&patient)
}

pub async fn create_lab_test(state: &AppState, file: &Path) -> Result<(), String> {
    let request: CreateLabTestRequest = read_json(file)?;
    let test = labtests::post_lab_test(&state.api, &request)
        .await
        .map_err(|e| format!("Lab test submission failed: {}", e))?;
    print_json(&test)
}

pub async fn update_lab_test(
    state: &AppState,
    laboratory_id: &str,
    file: &Path,
) -> Result<(), String> {
    let request: UpdateTestStatusRequest = read_json(file)?;
    let test = labtests::put_lab_test(&state.api, laboratory_id, &request)
        .await
        .map_err(|e| format!("Lab test update failed: {}", e))?;
    print_json(&test)
}

pub async fn lab_tests_by_patient(state: &AppState, patient_id: &str) -> Result<(), String> {
    let tests = labtests::get_lab_test_by_patient(&state.api, patient_id)
        .await
        .map_err(|e| format!("Lab test lookup failed: {}", e))?;
    print_json(&tests)
}

pub async fn create_appointment(
    state: &AppState,
    request: &CreateAppointmentRequest,
) -> Result<(), String> {
    let resp = doctor::post_doctor_create_appointment(&state.api, request)
        .await
        .map_err(|e| format!("Appointment creation failed: {}", e))?;
    print_json(&resp)
}

pub async fn show_stats(state: &AppState, lower_zip: &str, upper_zip: &str) -> Result<(), String> {
    let resp = stats::get_stats(&state.api, lower_zip, upper_zip)
        .await
        .map_err(|e| format!("Statistics request failed: {}", e))?;
    print_json(&resp)
}

pub async fn selected_for_quarantine(state: &AppState) -> Result<(), String> {
    let selected = incidents::get_selected_for_quarantine(&state.api)
        .await
        .map_err(|e| format!("Quarantine lookup failed: {}", e))?;
    print_json(&selected)
}

pub async fn save_quarantine_incident(state: &AppState, file: &Path) -> Result<(), String> {
    let incident: QuarantineIncident = read_json(file)?;
    let saved = incidents::post_quarantine_incident(&state.api, &incident)
        .await
        .map_err(|e| format!("Saving quarantine incident failed: {}", e))?;
    print_json(&saved)
}
