use log::{debug, info};
use serde::Deserialize;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::atlas::*;

const ALPHA3_PROPERTIES: &[&str] = &["ISO_A3", "iso_a3", "ADM0_A3"];
const NUMERIC_PROPERTIES: &[&str] = &["ISO_N3", "iso_n3"];
const NAME_PROPERTIES: &[&str] = &["name", "NAME", "ADMIN"];

pub fn read_geojson_regions(path: &str) -> AtlasResult<Vec<GeoRegion>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let regions = parse_regions(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let regions = regions.context(MissingFeaturesSnafu { path })?;
    info!("read_geojson_regions: {} regions from {:?}", regions.len(), path);
    Ok(regions)
}

/// Parses a GeoJSON feature collection. Returns None when the document is valid JSON but
/// holds neither features nor geometries.
fn parse_regions(contents: &str) -> Result<Option<Vec<GeoRegion>>, serde_json::Error> {
    let fc: FeatureCollection = serde_json::from_str(contents)?;
    let features = match fc.features.or(fc.geometries) {
        Some(x) => x,
        None => return Ok(None),
    };
    let regions = features.iter().map(feature_region).collect();
    Ok(Some(regions))
}

fn feature_region(feature: &Feature) -> GeoRegion {
    let empty = JSMap::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);
    let numeric_id = feature
        .id
        .as_ref()
        .and_then(value_text)
        .or_else(|| first_property(props, NUMERIC_PROPERTIES));
    let region = GeoRegion {
        alpha3: first_property(props, ALPHA3_PROPERTIES),
        numeric_id,
        name: first_property(props, NAME_PROPERTIES),
    };
    debug!("feature_region: {:?}", region);
    region
}

fn first_property(props: &JSMap<String, JSValue>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| props.get(*n).and_then(value_text))
}

// Natural Earth writes -99 for codes that do not exist.
fn value_text(v: &JSValue) -> Option<String> {
    match v {
        JSValue::String(s) if !s.trim().is_empty() && s.trim() != "-99" => {
            Some(s.trim().to_string())
        }
        JSValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<JSValue>,
    #[serde(default)]
    properties: Option<JSMap<String, JSValue>>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Option<Vec<Feature>>,
    // TopoJSON-style objects list their shapes as geometries.
    #[serde(default)]
    geometries: Option<Vec<Feature>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_earth_style_features() {
        let js = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"ADMIN": "France", "ISO_A3": "-99", "ADM0_A3": "FRA"},
                 "geometry": {"type": "Polygon", "coordinates": []}},
                {"type": "Feature", "id": "USA", "properties": {"name": "United States of America"},
                 "geometry": null},
                {"type": "Feature", "id": 36, "properties": null, "geometry": null}
            ]
        }"#;
        let regions = parse_regions(js).unwrap().unwrap();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].alpha3, Some("FRA".to_string()));
        assert_eq!(regions[0].name, Some("France".to_string()));
        assert_eq!(regions[1].numeric_id, Some("USA".to_string()));
        assert_eq!(regions[1].join_key(), Some("USA".to_string()));
        assert_eq!(regions[2].join_key(), Some("36".to_string()));
    }

    #[test]
    fn topojson_geometries() {
        let js = r#"{"type": "GeometryCollection", "geometries": [{"id": "004", "properties": {"name": "Afghanistan"}}]}"#;
        let regions = parse_regions(js).unwrap().unwrap();
        assert_eq!(regions[0].numeric_id, Some("004".to_string()));
        assert_eq!(regions[0].name, Some("Afghanistan".to_string()));
    }

    #[test]
    fn missing_features() {
        assert_eq!(parse_regions(r#"{"type": "Topology"}"#).unwrap(), None);
        assert!(parse_regions("[1, 2").is_err());
    }
}
