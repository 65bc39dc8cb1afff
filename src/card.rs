//! Health-card record model.

use serde::{Deserialize, Serialize};

/// Identity and display fields for one worker's health card.
///
/// All fields are plain strings rendered onto the card as-is. The generator
/// performs no schema validation; the registration backend is responsible for
/// field-level checks (including `valid_until >= issue_date`). Missing fields
/// deserialize to empty strings so partially-filled records still produce a
/// card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCardRecord {
    /// Globally unique health identifier, immutable once issued.
    pub health_id: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub blood_group: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub district: String,
    pub issue_date: String,
    pub valid_until: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_to_empty_strings() {
        let record: HealthCardRecord =
            serde_json::from_str(r#"{"health_id":"HLTH0001","full_name":"Asha Devi"}"#).unwrap();

        assert_eq!(record.health_id, "HLTH0001");
        assert_eq!(record.full_name, "Asha Devi");
        assert_eq!(record.blood_group, "");
        assert_eq!(record.district, "");
    }
}
