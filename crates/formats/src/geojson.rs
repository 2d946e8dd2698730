use foundation::math::LonLat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Other,
}

impl GeometryKind {
    pub fn is_line(self) -> bool {
        matches!(self, GeometryKind::LineString | GeometryKind::MultiLineString)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    MultiPoint(Vec<LonLat>),
    LineString(Vec<LonLat>),
    MultiLineString(Vec<Vec<LonLat>>),
    /// Any other geometry (polygons, collections). Passed through verbatim.
    Other(Value),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Other(_) => GeometryKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Kept as raw JSON so numeric and string ids round-trip unchanged.
    pub id: Option<Value>,
    pub properties: Map<String, Value>,
    /// Per-feature styling hints (`color`, `lineWidth`, ...). Not part of
    /// GeoJSON proper but carried by every dataset we render.
    pub display: Option<Value>,
    pub geometry: Geometry,
}

impl Feature {
    /// Same id, properties and display, different geometry.
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            id: self.id.clone(),
            properties: self.properties.clone(),
            display: self.display.clone(),
            geometry,
        }
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        match &self.id {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "<no id>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub metadata: Option<Value>,
    pub features: Vec<Feature>,
}

#[derive(Debug)]
pub enum GeoJsonError {
    Json(serde_json::Error),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Json(e) => write!(f, "JSON parse error: {e}"),
            GeoJsonError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            GeoJsonError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for GeoJsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoJsonError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            metadata: None,
            features,
        }
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload).map_err(GeoJsonError::Json)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feature = parse_feature(feat_val)
                .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;
            features.push(feature);
        }

        Ok(Self {
            metadata: obj.get("metadata").cloned(),
            features,
        })
    }

    /// New collection with the same metadata and only features of `kind`.
    pub fn filter_by_geometry_type(&self, kind: GeometryKind) -> Self {
        Self {
            metadata: self.metadata.clone(),
            features: self
                .features
                .iter()
                .filter(|f| f.geometry.kind() == kind)
                .cloned()
                .collect(),
        }
    }

    /// Emits a GeoJSON FeatureCollection. Property ordering may differ from
    /// the original input.
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );
        if let Some(metadata) = &self.metadata {
            root.insert("metadata".to_string(), metadata.clone());
        }
        let features = self.features.iter().map(feature_to_geojson_value).collect();
        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_geojson_value())
    }

    pub fn to_geojson_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_geojson_value())
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let properties = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let geometry_val = feat_obj
        .get("geometry")
        .ok_or("feature missing geometry".to_string())?;

    Ok(Feature {
        id: feat_obj.get("id").filter(|v| !v.is_null()).cloned(),
        properties,
        display: feat_obj.get("display").filter(|v| !v.is_null()).cloned(),
        geometry: parse_geometry(geometry_val)?,
    })
}

fn feature_to_geojson_value(feat: &Feature) -> Value {
    let mut fobj = Map::new();
    fobj.insert("type".to_string(), Value::String("Feature".to_string()));
    if let Some(id) = &feat.id {
        fobj.insert("id".to_string(), id.clone());
    }
    fobj.insert(
        "geometry".to_string(),
        geometry_to_geojson_value(&feat.geometry),
    );
    if let Some(display) = &feat.display {
        fobj.insert("display".to_string(), display.clone());
    }
    fobj.insert(
        "properties".to_string(),
        Value::Object(feat.properties.clone()),
    );
    Value::Object(fobj)
}

pub fn geometry_to_geojson_value(geom: &Geometry) -> Value {
    let (ty, coords) = match geom {
        Geometry::Point(p) => ("Point", point_coords(p)),
        Geometry::MultiPoint(ps) => ("MultiPoint", line_coords(ps)),
        Geometry::LineString(ps) => ("LineString", line_coords(ps)),
        Geometry::MultiLineString(lines) => (
            "MultiLineString",
            Value::Array(lines.iter().map(|line| line_coords(line)).collect()),
        ),
        Geometry::Other(raw) => return raw.clone(),
    };

    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String(ty.to_string()));
    obj.insert("coordinates".to_string(), coords);
    Value::Object(obj)
}

fn point_coords(p: &LonLat) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}

fn line_coords(ps: &[LonLat]) -> Value {
    Value::Array(ps.iter().map(point_coords).collect())
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = || {
        obj.get("coordinates")
            .ok_or("geometry missing coordinates".to_string())
    };

    match ty {
        "Point" => Ok(Geometry::Point(parse_point(coords()?)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_points(coords()?)?)),
        "LineString" => Ok(Geometry::LineString(parse_points(coords()?)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_lines(coords()?)?)),
        _ => Ok(Geometry::Other(value.clone())),
    }
}

fn parse_point(coords: &Value) -> Result<LonLat, String> {
    let arr = coords
        .as_array()
        .ok_or("Point coordinates must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("Point coordinates must have [lon, lat]".to_string());
    }
    let lon = arr[0]
        .as_f64()
        .ok_or("Point lon must be a number".to_string())?;
    let lat = arr[1]
        .as_f64()
        .ok_or("Point lat must be a number".to_string())?;
    Ok(LonLat::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<LonLat>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_point(item)?);
    }
    Ok(out)
}

fn parse_lines(coords: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    let arr = coords
        .as_array()
        .ok_or("MultiLineString coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for line in arr {
        out.push(parse_points(line)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{FeatureCollection, GeoJsonError, Geometry, GeometryKind};
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn journey_payload() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "metadata": { "name": "Pacific crossing" },
            "features": [
                {
                    "type": "Feature",
                    "id": 7,
                    "geometry": { "type": "Point", "coordinates": [151.2, -33.8] },
                    "properties": { "name": "Sydney" }
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[151.2, -33.8], [-157.8, 21.3]]
                    },
                    "display": { "color": "#ff0000", "lineWidth": 3 },
                    "properties": { "tlcMapUniqueId": "leg-1" }
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
                    },
                    "properties": {}
                }
            ]
        })
    }

    #[test]
    fn parses_points_lines_and_passthrough() {
        let fc = FeatureCollection::from_geojson_value(&journey_payload()).expect("parse");
        assert_eq!(fc.features.len(), 3);
        assert_eq!(fc.metadata, Some(json!({ "name": "Pacific crossing" })));
        assert_eq!(
            fc.features[0].geometry,
            Geometry::Point(LonLat::new(151.2, -33.8))
        );
        assert_eq!(fc.features[0].id, Some(json!(7)));
        assert_eq!(fc.features[1].geometry.kind(), GeometryKind::LineString);
        assert_eq!(
            fc.features[1].display,
            Some(json!({ "color": "#ff0000", "lineWidth": 3 }))
        );
        assert_eq!(fc.features[2].geometry.kind(), GeometryKind::Other);
    }

    #[test]
    fn filter_keeps_metadata() {
        let fc = FeatureCollection::from_geojson_value(&journey_payload()).expect("parse");
        let lines = fc.filter_by_geometry_type(GeometryKind::LineString);
        assert_eq!(lines.features.len(), 1);
        assert_eq!(lines.metadata, fc.metadata);
        assert_eq!(lines.features[0].properties["tlcMapUniqueId"], json!("leg-1"));
    }

    #[test]
    fn serializes_back_to_geojson() {
        let fc = FeatureCollection::from_geojson_value(&journey_payload()).expect("parse");
        let out = fc.to_geojson_value();
        assert_eq!(out["type"], json!("FeatureCollection"));
        assert_eq!(out["features"][1]["display"]["lineWidth"], json!(3));
        assert_eq!(out["features"][2]["geometry"]["type"], json!("Polygon"));

        let reparsed = FeatureCollection::from_geojson_value(&out).expect("reparse");
        assert_eq!(reparsed, fc);
    }

    #[test]
    fn rejects_non_collections_and_bad_features() {
        let err = FeatureCollection::from_geojson_value(&json!({ "type": "Feature" }))
            .expect_err("not a collection");
        assert!(matches!(err, GeoJsonError::NotAFeatureCollection));

        let err = FeatureCollection::from_geojson_value(&json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } },
                { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [["a", 2.0]] } }
            ]
        }))
        .expect_err("bad coordinates");
        assert!(matches!(err, GeoJsonError::InvalidFeature { index: 1, .. }));
        assert!(err.to_string().starts_with("invalid feature at index 1"));

        let err = FeatureCollection::from_geojson_str("{").expect_err("bad json");
        assert!(matches!(err, GeoJsonError::Json(_)));
    }
}
