//! Application views and which institution types may open them.

use serde::Serialize;

use crate::api::types::InstitutionType;
use InstitutionType::*;

/// Route shown to signed-out users.
pub const LOGIN_ROUTE: &str = "login";
/// Landing route after a successful sign-in.
pub const APP_ROUTE: &str = "app";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationInfo {
    pub title: &'static str,
    pub icon: &'static str,
    pub authorities: &'static [InstitutionType],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppRoute {
    pub name: &'static str,
    pub path: &'static str,
    pub navigation_info: Option<NavigationInfo>,
}

impl AppRoute {
    /// Whether any of `roles` may open this route.
    pub fn allows_any(&self, roles: &[InstitutionType]) -> bool {
        self.navigation_info
            .as_ref()
            .is_some_and(|info| roles.iter().any(|r| info.authorities.contains(r)))
    }
}

const fn nav(
    name: &'static str,
    path: &'static str,
    title: &'static str,
    icon: &'static str,
    authorities: &'static [InstitutionType],
) -> AppRoute {
    AppRoute {
        name,
        path,
        navigation_info: Some(NavigationInfo {
            title,
            icon,
            authorities,
        }),
    }
}

static NAVIGATION_ROUTES: [AppRoute; 8] = [
    nav(
        "register-patient",
        "/app/register-patient",
        "Patient registrieren",
        "user-add",
        &[TestSite, DoctorsOffice, Clinic, GovernmentAgency],
    ),
    nav(
        "patient-list",
        "/app/patient-list",
        "Patienten",
        "team",
        &[DoctorsOffice, Clinic, GovernmentAgency],
    ),
    nav(
        "request-test",
        "/app/request-test",
        "Labortest zuordnen",
        "experiment",
        &[TestSite, DoctorsOffice, Clinic],
    ),
    nav(
        "submit-test-result",
        "/app/submit-test-result",
        "Testergebnis eintragen",
        "file-done",
        &[Laboratory],
    ),
    nav(
        "send-to-quarantine",
        "/app/send-to-quarantine",
        "Quarantäne anordnen",
        "home",
        &[GovernmentAgency],
    ),
    nav(
        "statistics",
        "/app/statistics",
        "Statistiken",
        "bar-chart",
        &[GovernmentAgency],
    ),
    nav(
        "institution-users",
        "/app/institution-users",
        "Benutzerverwaltung",
        "usergroup-add",
        &[TestSite, Laboratory, DoctorsOffice, Clinic, GovernmentAgency],
    ),
    nav(
        "change-password",
        "/app/change-password",
        "Passwort ändern",
        "lock",
        &[TestSite, Laboratory, DoctorsOffice, Clinic, GovernmentAgency],
    ),
];

/// Views listed in the navigation, in display order.
pub fn navigation_routes() -> &'static [AppRoute] {
    &NAVIGATION_ROUTES
}

/// Navigation routes visible to `roles`, or all of them when `show_all` is set.
pub fn routes_for(roles: &[InstitutionType], show_all: bool) -> Vec<AppRoute> {
    navigation_routes()
        .iter()
        .filter(|r| show_all || r.allows_any(roles))
        .cloned()
        .collect()
}
