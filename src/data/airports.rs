//! Airport graph input format.
//!
//! The resource is a JSON object with a `nodes` array (one entry per airport)
//! and a `links` array of `{source, target}` pairs. Link endpoints are either
//! node indices or the string `id` of a node. Numeric fields are accepted as
//! numbers or numeric strings, and empty strings read as missing.

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::AtlasError;

/// A reference to a node inside the airport resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    /// Position in the `nodes` array.
    Index(usize),
    /// Value of a node's `id` field.
    Key(String),
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRef::Index(i) => write!(f, "{i}"),
            NodeRef::Key(key) => f.write_str(key),
        }
    }
}

/// One airport as it appears in the resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirportRecord {
    #[serde(default, deserialize_with = "lenient_key")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub passengers: Option<f64>,
    #[serde(deserialize_with = "required_f64")]
    pub longitude: f64,
    #[serde(deserialize_with = "required_f64")]
    pub latitude: f64,
}

/// One link as it appears in the resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkRecord {
    pub source: NodeRef,
    pub target: NodeRef,
}

/// The parsed airport resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AirportGraphData {
    pub nodes: Vec<AirportRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

impl AirportGraphData {
    /// Parse the airport resource.
    pub fn from_json(json: &str) -> Result<Self, AtlasError> {
        let data: Self = serde_json::from_str(json).map_err(|source| AtlasError::Json {
            resource: "airports",
            source,
        })?;
        debug!(
            nodes = data.nodes.len(),
            links = data.links.len(),
            "parsed airport graph"
        );
        Ok(data)
    }
}

/// Scalar that may arrive typed or as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

/// A finite number, or `None` for missing, empty or non-numeric values.
/// Text such as `"NaN"` or `"inf"` parses but is not a usable value.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) => Some(n),
        Some(Loose::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

fn required_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_f64(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a numeric coordinate"))
}

fn lenient_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) if n.fract() == 0.0 => Some(format!("{}", n as i64)),
        Some(Loose::Number(n)) => Some(n.to_string()),
        Some(Loose::Text(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            {"id": "ATL", "name": "Atlanta", "passengers": 100, "longitude": -84.43, "latitude": 33.64},
            {"name": "Boston", "passengers": "50", "longitude": "-71.01", "latitude": 42.36},
            {"name": "Nowhere", "passengers": "", "longitude": 0, "latitude": 0}
        ],
        "links": [
            {"source": "ATL", "target": 1},
            {"source": 1, "target": 2}
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let data = AirportGraphData::from_json(SAMPLE).unwrap();
        assert_eq!(data.nodes.len(), 3);
        assert_eq!(data.links.len(), 2);

        assert_eq!(data.nodes[0].id.as_deref(), Some("ATL"));
        assert_eq!(data.nodes[1].passengers, Some(50.0));
        assert_eq!(data.nodes[1].longitude, -71.01);
        assert_eq!(data.nodes[2].passengers, None);

        assert_eq!(data.links[0].source, NodeRef::Key("ATL".to_string()));
        assert_eq!(data.links[0].target, NodeRef::Index(1));
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        for (lon, lat) in [("\"NaN\"", "0"), ("0", "\"inf\""), ("\"-infinity\"", "1")] {
            let json = format!(r#"{{"nodes": [{{"longitude": {lon}, "latitude": {lat}}}]}}"#);
            let err = AirportGraphData::from_json(&json).unwrap_err();
            assert!(matches!(err, AtlasError::Json { resource: "airports", .. }));
        }
    }

    #[test]
    fn test_non_finite_passengers_read_as_missing() {
        let data = AirportGraphData::from_json(
            r#"{"nodes": [{"passengers": "NaN", "longitude": 1, "latitude": 2}]}"#,
        )
        .unwrap();
        assert_eq!(data.nodes[0].passengers, None);
    }

    #[test]
    fn test_numeric_id_becomes_key() {
        let data = AirportGraphData::from_json(
            r#"{"nodes": [{"id": 7, "longitude": 1, "latitude": 2}]}"#,
        )
        .unwrap();
        assert_eq!(data.nodes[0].id.as_deref(), Some("7"));
        assert!(data.links.is_empty());
    }

    #[test]
    fn test_missing_coordinate_is_error() {
        let err = AirportGraphData::from_json(r#"{"nodes": [{"name": "X", "latitude": 2}]}"#)
            .unwrap_err();
        assert!(matches!(err, AtlasError::Json { resource: "airports", .. }));
    }
}
