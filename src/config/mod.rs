//! Configuration management for the calculation history store.
//!
//! Configuration is read from the application's settings document under the
//! `"calculationHistory"` key and merged with defaults. There is no global
//! instance: callers pass the resulting [`HistoryConfig`] to the store they
//! construct.

pub mod schema;

pub use schema::{HistoryConfig, DEFAULT_STORAGE_KEY, MAX_RECORDS};

use crate::history::HistoryError;
use serde_json::Value;

/// Key of the history section inside an application settings document.
pub const SETTINGS_SECTION: &str = "calculationHistory";

/// Loads configuration from an application settings document.
///
/// Reads the `"calculationHistory"` section, falls back to defaults for any
/// missing field, and validates the result. An unparsable section is logged
/// and replaced by the defaults.
///
/// # Arguments
///
/// * `settings_json` - Optional settings document containing the history section
///
/// # Returns
///
/// `Ok(HistoryConfig)` with the loaded configuration, or
/// `Err(HistoryError::InvalidConfig)` if validation fails.
///
/// # Example
///
/// ```
/// use calc_history::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "calculationHistory": {
///         "storageKey": "hr_calc_history",
///         "maxRecords": 50
///     }
/// });
///
/// let config = load_config(Some(&settings)).unwrap();
/// assert_eq!(config.max_records, 50);
/// ```
pub fn load_config(settings_json: Option<&Value>) -> Result<HistoryConfig, HistoryError> {
    let mut config = HistoryConfig::default();

    if let Some(section) = settings_json.and_then(|settings| settings.get(SETTINGS_SECTION)) {
        match serde_json::from_value::<HistoryConfig>(section.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => {
                log::warn!(
                    "Failed to parse {} settings: {}. Using defaults.",
                    SETTINGS_SECTION,
                    e
                );
            }
        }
    }

    config.validate().map_err(HistoryError::InvalidConfig)?;

    Ok(config)
}
