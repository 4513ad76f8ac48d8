//! Aggregated statistics for a zip code range.

use super::client::{ApiClient, ApiError};

/// Build the stats path. The upper bound parameter is `upperBoundsZips`
/// (plural), which is what the backend reads.
pub fn stats_path(lower_bounds_zip: &str, upper_bounds_zip: &str) -> String {
    format!(
        "stats?lowerBoundsZip={}&upperBoundsZips={}",
        urlencoding::encode(lower_bounds_zip),
        urlencoding::encode(upper_bounds_zip)
    )
}

/// GET stats?lowerBoundsZip=..&upperBoundsZips=..
pub async fn get_stats(
    client: &ApiClient,
    lower_bounds_zip: &str,
    upper_bounds_zip: &str,
) -> Result<serde_json::Value, ApiError> {
    client
        .get(&stats_path(lower_bounds_zip, upper_bounds_zip))
        .await
}
