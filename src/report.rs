//! # Advisor Reply Model
//!
//! The advisor endpoint answers with one of two JSON shapes:
//!
//! ```json
//! {"advisor_report": {
//!     "Recommended Crop": "Wheat",
//!     "Expected Yield": "3.2 t/ha",
//!     "Resource Requirements": {
//!         "Crop": "Wheat",
//!         "Fertilizer Used": "Urea",
//!         "Yield Tons": "3.2",
//!         "Water Usage": "450mm"
//!     }
//! }}
//! ```
//!
//! or
//!
//! ```json
//! {"error": "model not loaded"}
//! ```
//!
//! [`AdvisorReply`] is the tagged union of the two. Leaf fields are kept as
//! [`FieldValue`]s so a missing key renders as `undefined` instead of failing the
//! whole reply. A body that is valid JSON but not an object carries neither key and
//! classifies as an error with an `undefined` message. Structural problems (a `null`
//! body, a report without its `Resource Requirements`) are reported as
//! [`MalformedReply`] and end up on the same path as a transport failure.

use serde_json::{Map, Value};
use std::fmt;

/// Top-level key holding the advisor report
pub const REPORT_KEY: &str = "advisor_report";
/// Top-level key holding the application error message
pub const ERROR_KEY: &str = "error";

const RECOMMENDED_CROP: &str = "Recommended Crop";
const EXPECTED_YIELD: &str = "Expected Yield";
const RESOURCE_REQUIREMENTS: &str = "Resource Requirements";
const CROP: &str = "Crop";
const FERTILIZER_USED: &str = "Fertilizer Used";
const YIELD_TONS: &str = "Yield Tons";
const WATER_USAGE: &str = "Water Usage";

/// A displayable leaf value lifted out of the reply.
///
/// Displays the way a browser interpolates the value into a template string:
/// strings verbatim, integral numbers without a fractional part, objects as
/// `[object Object]`, arrays as their comma-joined elements and a missing key
/// as `undefined`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldValue(Option<Value>);

impl FieldValue {
    pub fn missing() -> Self {
        Self(None)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self(Some(Value::String(s.into())))
    }

    fn lookup(object: &Map<String, Value>, key: &str) -> Self {
        Self(object.get(key).cloned())
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("undefined"),
            Some(value) => write_template_text(f, value),
        }
    }
}

fn write_template_text(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                write!(f, "{i}")
            } else if let Some(u) = n.as_u64() {
                write!(f, "{u}")
            } else {
                // f64 Display already drops a zero fraction: 3.0 -> "3"
                write!(f, "{}", n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => f.write_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                // null elements join as empty
                if !item.is_null() {
                    write_template_text(f, item)?;
                }
            }
            Ok(())
        }
        Value::Object(_) => f.write_str("[object Object]"),
    }
}

/// Resource profile for the recommended crop
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceRequirements {
    pub crop: FieldValue,
    pub fertilizer_used: FieldValue,
    pub yield_tons: FieldValue,
    pub water_usage: FieldValue,
}

/// The success variant's payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdvisorReport {
    pub recommended_crop: FieldValue,
    pub expected_yield: FieldValue,
    pub resources: ResourceRequirements,
}

impl AdvisorReport {
    fn from_object(report: &Map<String, Value>) -> Result<Self, MalformedReply> {
        let resources = match report.get(RESOURCE_REQUIREMENTS) {
            None | Some(Value::Null) => return Err(MalformedReply::MissingResourceRequirements),
            Some(Value::Object(res)) => ResourceRequirements {
                crop: FieldValue::lookup(res, CROP),
                fertilizer_used: FieldValue::lookup(res, FERTILIZER_USED),
                yield_tons: FieldValue::lookup(res, YIELD_TONS),
                water_usage: FieldValue::lookup(res, WATER_USAGE),
            },
            // scalars and arrays have none of the named fields
            Some(_) => ResourceRequirements::default(),
        };
        Ok(Self {
            recommended_crop: FieldValue::lookup(report, RECOMMENDED_CROP),
            expected_yield: FieldValue::lookup(report, EXPECTED_YIELD),
            resources,
        })
    }
}

/// The error variant's payload: whatever the endpoint put under `error`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportedError {
    pub message: FieldValue,
}

/// A decoded advisor reply
#[derive(Debug, Clone, PartialEq)]
pub enum AdvisorReply {
    /// `advisor_report` was present and truthy
    Report(AdvisorReport),
    /// No usable `advisor_report`; carries the `error` field
    Error(ReportedError),
}

impl AdvisorReply {
    /// Classify a decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedReply`] when the body cannot be rendered at all.
    pub fn from_value(body: &Value) -> Result<Self, MalformedReply> {
        let object = match body {
            Value::Null => return Err(MalformedReply::NullBody),
            Value::Object(object) => object,
            _ => {
                return Ok(AdvisorReply::Error(ReportedError {
                    message: FieldValue::missing(),
                }))
            }
        };
        match object.get(REPORT_KEY) {
            Some(report) if is_truthy(report) => {
                let report = report.as_object().ok_or(MalformedReply::ReportNotAnObject)?;
                AdvisorReport::from_object(report).map(AdvisorReply::Report)
            }
            _ => Ok(AdvisorReply::Error(ReportedError {
                message: FieldValue::lookup(object, ERROR_KEY),
            })),
        }
    }
}

/// Loose truthiness of a JSON value: `null`, `false`, `0` and `""` are false
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A reply body that cannot be rendered as either variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReply {
    /// The body was the JSON literal `null`
    NullBody,
    /// `advisor_report` was truthy but not an object
    ReportNotAnObject,
    /// The report's `Resource Requirements` was missing or `null`
    MissingResourceRequirements,
}

impl fmt::Display for MalformedReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReply::NullBody => write!(f, "advisor reply is null"),
            MalformedReply::ReportNotAnObject => {
                write!(f, "'{REPORT_KEY}' is present but is not an object")
            }
            MalformedReply::MissingResourceRequirements => {
                write!(f, "advisor report has no '{RESOURCE_REQUIREMENTS}'")
            }
        }
    }
}

impl std::error::Error for MalformedReply {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "advisor_report": {
                "Recommended Crop": "Wheat",
                "Expected Yield": "3.2 t/ha",
                "Resource Requirements": {
                    "Crop": "Wheat",
                    "Fertilizer Used": "Urea",
                    "Yield Tons": "3.2",
                    "Water Usage": "450mm"
                }
            }
        })
    }

    #[test]
    fn test_report_variant() {
        let reply = AdvisorReply::from_value(&sample()).unwrap();
        let AdvisorReply::Report(report) = reply else {
            panic!("expected report variant");
        };
        assert_eq!(report.recommended_crop.to_string(), "Wheat");
        assert_eq!(report.expected_yield.to_string(), "3.2 t/ha");
        assert_eq!(report.resources.crop.to_string(), "Wheat");
        assert_eq!(report.resources.fertilizer_used.to_string(), "Urea");
        assert_eq!(report.resources.yield_tons.to_string(), "3.2");
        assert_eq!(report.resources.water_usage.to_string(), "450mm");
    }

    #[test]
    fn test_error_variant() {
        let reply = AdvisorReply::from_value(&json!({"error": "bad soil"})).unwrap();
        assert_eq!(
            reply,
            AdvisorReply::Error(ReportedError {
                message: FieldValue::text("bad soil")
            })
        );
    }

    #[test]
    fn test_neither_key_is_an_error_with_undefined_message() {
        let reply = AdvisorReply::from_value(&json!({})).unwrap();
        let AdvisorReply::Error(err) = reply else {
            panic!("expected error variant");
        };
        assert!(err.message.is_missing());
        assert_eq!(err.message.to_string(), "undefined");
    }

    #[test]
    fn test_falsy_report_takes_error_branch() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            let body = json!({"advisor_report": falsy, "error": "nope"});
            let reply = AdvisorReply::from_value(&body).unwrap();
            assert!(matches!(reply, AdvisorReply::Error(_)), "{body}");
        }
    }

    #[test]
    fn test_missing_leaf_displays_undefined() {
        let body = json!({
            "advisor_report": {
                "Recommended Crop": "Rice",
                "Resource Requirements": {"Crop": "Rice"}
            }
        });
        let AdvisorReply::Report(report) = AdvisorReply::from_value(&body).unwrap() else {
            panic!("expected report variant");
        };
        assert_eq!(report.expected_yield.to_string(), "undefined");
        assert_eq!(report.resources.water_usage.to_string(), "undefined");
        assert_eq!(report.resources.crop.to_string(), "Rice");
    }

    #[test]
    fn test_non_string_leaves_display_as_template_text() {
        let body = json!({
            "advisor_report": {
                "Recommended Crop": {"name": "Maize"},
                "Expected Yield": 4.5,
                "Resource Requirements": {
                    "Crop": ["Maize", null, 2],
                    "Fertilizer Used": true,
                    "Yield Tons": 3.0,
                    "Water Usage": null
                }
            }
        });
        let AdvisorReply::Report(report) = AdvisorReply::from_value(&body).unwrap() else {
            panic!("expected report variant");
        };
        assert_eq!(report.recommended_crop.to_string(), "[object Object]");
        assert_eq!(report.expected_yield.to_string(), "4.5");
        assert_eq!(report.resources.crop.to_string(), "Maize,,2");
        assert_eq!(report.resources.fertilizer_used.to_string(), "true");
        assert_eq!(report.resources.yield_tons.to_string(), "3");
        assert_eq!(report.resources.water_usage.to_string(), "null");
    }

    #[test]
    fn test_non_object_body_is_error_with_undefined_message() {
        for body in [json!("ok"), json!([1, 2]), json!(42), json!(true)] {
            let reply = AdvisorReply::from_value(&body).unwrap();
            let AdvisorReply::Error(err) = reply else {
                panic!("expected error variant for {body}");
            };
            assert_eq!(err.message.to_string(), "undefined", "{body}");
        }
    }

    #[test]
    fn test_scalar_resource_requirements_render_undefined_leaves() {
        for res in [json!("n/a"), json!([]), json!(0)] {
            let body = json!({
                "advisor_report": {
                    "Recommended Crop": "Rice",
                    "Expected Yield": "2 t/ha",
                    "Resource Requirements": res
                }
            });
            let AdvisorReply::Report(report) = AdvisorReply::from_value(&body).unwrap() else {
                panic!("expected report variant for {body}");
            };
            assert_eq!(report.recommended_crop.to_string(), "Rice");
            assert_eq!(report.resources, ResourceRequirements::default());
            assert_eq!(report.resources.crop.to_string(), "undefined");
        }
    }

    #[test]
    fn test_structural_problems_are_malformed() {
        assert_eq!(AdvisorReply::from_value(&Value::Null), Err(MalformedReply::NullBody));
        assert_eq!(
            AdvisorReply::from_value(&json!({"advisor_report": "Wheat"})),
            Err(MalformedReply::ReportNotAnObject)
        );
        assert_eq!(
            AdvisorReply::from_value(&json!({"advisor_report": {"Recommended Crop": "Wheat"}})),
            Err(MalformedReply::MissingResourceRequirements)
        );
        assert_eq!(
            AdvisorReply::from_value(&json!({
                "advisor_report": {"Recommended Crop": "Wheat", "Resource Requirements": null}
            })),
            Err(MalformedReply::MissingResourceRequirements)
        );
    }
}
