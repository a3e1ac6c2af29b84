//! Lenient model of ffprobe's JSON output.
//!
//! ffprobe reports most numbers as strings ("duration": "12.345000") and omits
//! fields freely on damaged files, so every field is optional and numeric
//! fields accept either a JSON number or a numeric string. Normalization into
//! the public metadata types happens in `media::probe`.

use serde::Deserialize;
use serde_json::Value;

/// Top-level `-show_format -show_streams` document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProbe {
    pub streams: Vec<RawStream>,
    pub format: Option<RawFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStream {
    pub index: Option<Value>,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<Value>,
    pub height: Option<Value>,
    pub r_frame_rate: Option<String>,
    pub bit_rate: Option<Value>,
    pub sample_rate: Option<Value>,
    pub channels: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFormat {
    pub format_name: Option<String>,
    pub duration: Option<Value>,
    pub size: Option<Value>,
    pub bit_rate: Option<Value>,
}

impl RawProbe {
    /// Parses ffprobe's stdout.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// First stream whose `codec_type` matches.
    pub fn first_stream(&self, codec_type: &str) -> Option<&RawStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }
}

/// Reads a JSON number or numeric string as `f64`.
///
/// Returns `None` for anything absent, non-numeric, or non-finite.
pub fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Reads a JSON number or numeric string as a non-negative integer.
///
/// Fractional values are truncated the way `parseInt` would read them.
pub fn value_as_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_partial_document() {
        let raw = RawProbe::from_json(br#"{"streams":[{"codec_type":"video"}]}"#).unwrap();
        assert_eq!(raw.streams.len(), 1);
        assert!(raw.format.is_none());
        assert!(raw.first_stream("video").is_some());
        assert!(raw.first_stream("audio").is_none());

        let raw = RawProbe::from_json(b"{}").unwrap();
        assert!(raw.streams.is_empty());
    }

    #[test]
    fn test_numeric_leniency() {
        assert_eq!(value_as_f64(Some(&json!("12.5"))), Some(12.5));
        assert_eq!(value_as_f64(Some(&json!(3))), Some(3.0));
        assert_eq!(value_as_f64(Some(&json!("N/A"))), None);
        assert_eq!(value_as_f64(Some(&json!(null))), None);
        assert_eq!(value_as_f64(None), None);

        assert_eq!(value_as_u64(Some(&json!("48000"))), Some(48000));
        assert_eq!(value_as_u64(Some(&json!(1920))), Some(1920));
        assert_eq!(value_as_u64(Some(&json!("1234.9"))), Some(1234));
        assert_eq!(value_as_u64(Some(&json!(-4))), None);
        assert_eq!(value_as_u64(Some(&json!(true))), None);
    }
}
