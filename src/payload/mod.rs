//! Typed schema for stored inference responses.
//!
//! A response blob is the persisted text of one transaction's inference
//! output. Current rows are JSON; early producers persisted the Python
//! display form of the same mapping instead, and those rows are still
//! accepted through [`literal`] as a deprecated-format shim. Either way
//! the text ends up as a [`serde_json::Value`] and is validated through
//! the one schema below.
//!
//! The schema is deliberately forgiving at every level: a product or
//! detection that does not match simply drops out, because the failure
//! unit of the rendering stage is one detection, never the whole blob.

pub mod literal;

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::HarvestError;
use crate::geometry::{BBox, Pixel};

/// Top-level inference response record.
#[derive(Debug, Default, Deserialize)]
pub struct InferencePayload {
    #[serde(rename = "Content", default, deserialize_with = "lenient")]
    pub content: PayloadContent,
}

/// The `Content` envelope. Producers are inconsistent about the casing of
/// the products key; the lowercase spelling wins when both are present
/// and non-empty.
#[derive(Debug, Default, Deserialize)]
pub struct PayloadContent {
    #[serde(rename = "products", default, deserialize_with = "lenient_map")]
    products_lower: BTreeMap<String, Product>,

    #[serde(rename = "Products", default, deserialize_with = "lenient_map")]
    products_upper: BTreeMap<String, Product>,
}

impl PayloadContent {
    /// Products keyed by their arbitrary identifiers, `products` falling
    /// back to `Products`.
    pub fn products(&self) -> &BTreeMap<String, Product> {
        if !self.products_lower.is_empty() {
            &self.products_lower
        } else {
            &self.products_upper
        }
    }
}

/// One product entry: the image it refers to plus the per-object
/// inference output.
#[derive(Debug, Default, Deserialize)]
pub struct Product {
    #[serde(rename = "File_Name", default, deserialize_with = "lenient")]
    pub file_name: Option<String>,

    #[serde(rename = "File_Inference_Output", default, deserialize_with = "lenient_map")]
    pub inference_output: BTreeMap<String, DetectionRecord>,
}

/// One detected object as it appears in the stored payload.
///
/// Coordinates arrive as either JSON numbers or numeric strings; all five
/// fields are optional here so that a partial record deserializes and can
/// be rejected per-detection by [`DetectionRecord::validate`].
#[derive(Debug, Default, Deserialize)]
pub struct DetectionRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub x_min: Option<CoordValue>,

    #[serde(default, deserialize_with = "lenient")]
    pub x_max: Option<CoordValue>,

    #[serde(default, deserialize_with = "lenient")]
    pub y_min: Option<CoordValue>,

    #[serde(default, deserialize_with = "lenient")]
    pub y_max: Option<CoordValue>,
}

impl DetectionRecord {
    /// Validates the five required fields.
    ///
    /// Any absent or uncoercible field rejects the record; rejection is
    /// per-detection and never fatal to the blob.
    pub fn validate(&self) -> Option<Detection> {
        Some(Detection {
            label: self.label.clone()?,
            x_min: self.x_min.as_ref()?.to_pixel()?,
            x_max: self.x_max.as_ref()?.to_pixel()?,
            y_min: self.y_min.as_ref()?.to_pixel()?,
            y_max: self.y_max.as_ref()?.to_pixel()?,
        })
    }
}

/// A coordinate that may be serialized as a number or a numeric string.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CoordValue {
    Number(f64),
    Text(String),
}

impl CoordValue {
    /// Float-parses then truncates toward zero, matching the historical
    /// producer: `"10.9"` coerces to pixel 10, not 11.
    pub fn to_pixel(&self) -> Option<i64> {
        let value = match self {
            CoordValue::Number(number) => *number,
            CoordValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value as i64)
    }
}

/// A validated detection: label plus integer pixel box corners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detection {
    pub label: String,
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl Detection {
    pub fn bbox(&self) -> BBox<Pixel> {
        BBox::from_pixels(self.x_min, self.y_min, self.x_max, self.y_max)
    }
}

/// Parses one persisted response blob.
///
/// Strict JSON is tried first. On failure the deprecated Python-literal
/// serialization is tried; acceptance through that path is logged at warn
/// level so the remaining legacy rows can be found and re-serialized. A
/// blob that fails both parsers is an error for the caller to log and
/// skip.
pub fn parse_blob(text: &str, origin: &Path) -> Result<InferencePayload, HarvestError> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(json_err) => match literal::parse(text) {
            Ok(value) => {
                warn!(
                    "{}: accepted deprecated literal serialization; re-serialize this transaction as JSON",
                    origin.display()
                );
                value
            }
            Err(literal_err) => {
                return Err(HarvestError::PayloadParse {
                    path: origin.to_path_buf(),
                    message: format!("not JSON ({json_err}); not a literal ({literal_err})"),
                });
            }
        },
    };

    serde_json::from_value(value).map_err(|source| HarvestError::PayloadParse {
        path: origin.to_path_buf(),
        message: source.to_string(),
    })
}

/// Accepts the value if it matches, otherwise falls back to `Default`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(T::deserialize(deserializer).unwrap_or_default())
}

/// Deserializes a string-keyed map entry by entry, dropping entries whose
/// values do not match `T`.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer).unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            serde_json::from_value::<T>(value)
                .ok()
                .map(|parsed| (key, parsed))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> InferencePayload {
        parse_blob(text, Path::new("test_blob.txt")).expect("parse blob")
    }

    #[test]
    fn strict_json_payload_parses() {
        let payload = parse(
            r#"{"Content": {"products": {"p1": {
                "File_Name": "a.jpg",
                "File_Inference_Output": {"d1": {
                    "label": "box", "x_min": "10", "x_max": "50",
                    "y_min": "20", "y_max": "60"
                }}
            }}}}"#,
        );

        let products = payload.content.products();
        assert_eq!(products.len(), 1);
        let product = &products["p1"];
        assert_eq!(product.file_name.as_deref(), Some("a.jpg"));

        let detection = product.inference_output["d1"].validate().expect("valid");
        assert_eq!(
            detection,
            Detection {
                label: "box".into(),
                x_min: 10,
                x_max: 50,
                y_min: 20,
                y_max: 60,
            }
        );
    }

    #[test]
    fn uppercase_products_key_is_accepted() {
        let payload = parse(r#"{"Content": {"Products": {"p1": {"File_Name": "a.jpg"}}}}"#);
        assert_eq!(payload.content.products().len(), 1);
    }

    #[test]
    fn lowercase_products_key_wins_when_both_present() {
        let payload = parse(
            r#"{"Content": {
                "products": {"lower": {"File_Name": "a.jpg"}},
                "Products": {"upper": {"File_Name": "b.jpg"}}
            }}"#,
        );
        assert!(payload.content.products().contains_key("lower"));
    }

    #[test]
    fn missing_content_yields_no_products() {
        let payload = parse(r#"{"Status": "ok"}"#);
        assert!(payload.content.products().is_empty());
    }

    #[test]
    fn mismatched_content_shape_yields_no_products() {
        let payload = parse(r#"{"Content": "just a token"}"#);
        assert!(payload.content.products().is_empty());
    }

    #[test]
    fn literal_fallback_parses_python_repr() {
        let payload = parse(
            "{'Content': {'Products': {'p1': {'File_Name': 'a.jpg', \
             'File_Inference_Output': {'d1': {'label': 'box', 'x_min': 10.9, \
             'x_max': 50, 'y_min': 20, 'y_max': 60}}}}}}",
        );
        let detection = payload.content.products()["p1"].inference_output["d1"]
            .validate()
            .expect("valid");
        assert_eq!(detection.x_min, 10);
    }

    #[test]
    fn unparseable_blob_is_an_error() {
        let err = parse_blob("not a payload at all", Path::new("bad.txt")).unwrap_err();
        assert!(matches!(err, HarvestError::PayloadParse { .. }));
    }

    #[test]
    fn coercion_truncates_instead_of_rounding() {
        assert_eq!(CoordValue::Text("10.9".into()).to_pixel(), Some(10));
        assert_eq!(CoordValue::Number(10.9).to_pixel(), Some(10));
        assert_eq!(CoordValue::Text("-10.9".into()).to_pixel(), Some(-10));
        assert_eq!(CoordValue::Text(" 42 ".into()).to_pixel(), Some(42));
        assert_eq!(CoordValue::Text("wide".into()).to_pixel(), None);
        assert_eq!(CoordValue::Number(f64::NAN).to_pixel(), None);
    }

    #[test]
    fn detection_missing_any_field_is_rejected() {
        for missing in ["label", "x_min", "x_max", "y_min", "y_max"] {
            let mut record = serde_json::json!({
                "label": "box", "x_min": 1, "x_max": 2, "y_min": 3, "y_max": 4
            });
            record.as_object_mut().expect("object").remove(missing);
            let record: DetectionRecord = serde_json::from_value(record).expect("deserialize");
            assert!(
                record.validate().is_none(),
                "record without {missing} should not validate"
            );
        }
    }

    #[test]
    fn non_string_label_is_treated_as_missing() {
        let record: DetectionRecord = serde_json::from_value(serde_json::json!({
            "label": 7, "x_min": 1, "x_max": 2, "y_min": 3, "y_max": 4
        }))
        .expect("deserialize");
        assert!(record.validate().is_none());
    }

    #[test]
    fn malformed_detection_entry_drops_without_poisoning_siblings() {
        let payload = parse(
            r#"{"Content": {"products": {"p1": {
                "File_Name": "a.jpg",
                "File_Inference_Output": {
                    "bad": "not an object",
                    "good": {"label": "box", "x_min": 1, "x_max": 2,
                             "y_min": 3, "y_max": 4}
                }
            }}}}"#,
        );
        let output = &payload.content.products()["p1"].inference_output;
        assert_eq!(output.len(), 1);
        assert!(output.contains_key("good"));
    }
}
