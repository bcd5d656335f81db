//! The JSON body posted to the advisor endpoint.

use serde::{Deserialize, Serialize};

/// Request payload for one submission.
///
/// Built from whatever text the `soil` and `region` inputs hold at submit time.
/// Empty strings are forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorRequest {
    /// Value of the `soil` input
    pub soil_type: String,
    /// Value of the `region` input
    pub region: String,
}

impl AdvisorRequest {
    pub fn new(soil_type: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            soil_type: soil_type.into(),
            region: region.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let body = serde_json::to_string(&AdvisorRequest::new("Loamy", "North")).unwrap();
        assert_eq!(body, r#"{"soil_type":"Loamy","region":"North"}"#);
    }

    #[test]
    fn test_empty_fields_are_forwarded() {
        let value = serde_json::to_value(AdvisorRequest::new("", "")).unwrap();
        assert_eq!(value, json!({"soil_type": "", "region": ""}));
    }
}
