//! Multi-dataset collection documents.
//!
//! A collection overlays several journey datasets on one map. Each dataset
//! carries its own inline FeatureCollection; unknown dataset fields are kept so
//! a processed document can be written back without losing them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geojson::{FeatureCollection, GeoJsonError};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub id: Value,
    pub name: String,
    pub data: FeatureCollection,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionDocument {
    pub name: Option<String>,
    pub metadata: Option<Value>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
    datasets: Vec<RawDataset>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawDataset {
    id: Value,
    name: String,
    data: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug)]
pub enum CollectionError {
    Json(serde_json::Error),
    InvalidDataset { index: usize, source: GeoJsonError },
}

impl std::fmt::Display for CollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionError::Json(e) => write!(f, "invalid collection document: {e}"),
            CollectionError::InvalidDataset { index, source } => {
                write!(f, "invalid dataset at index {index}: {source}")
            }
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Json(e) => Some(e),
            CollectionError::InvalidDataset { source, .. } => Some(source),
        }
    }
}

impl CollectionDocument {
    pub fn from_json_str(payload: &str) -> Result<Self, CollectionError> {
        let value: Value = serde_json::from_str(payload).map_err(CollectionError::Json)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, CollectionError> {
        let raw: RawCollection = serde_json::from_value(value).map_err(CollectionError::Json)?;

        let mut datasets = Vec::with_capacity(raw.datasets.len());
        for (index, ds) in raw.datasets.into_iter().enumerate() {
            let data = FeatureCollection::from_geojson_value(&ds.data)
                .map_err(|source| CollectionError::InvalidDataset { index, source })?;
            datasets.push(Dataset {
                id: ds.id,
                name: ds.name,
                data,
                extra: ds.extra,
            });
        }

        Ok(Self {
            name: raw.name,
            metadata: raw.metadata,
            datasets,
        })
    }

    pub fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        let raw = RawCollection {
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            datasets: self
                .datasets
                .iter()
                .map(|ds| RawDataset {
                    id: ds.id.clone(),
                    name: ds.name.clone(),
                    data: ds.data.to_geojson_value(),
                    extra: ds.extra.clone(),
                })
                .collect(),
        };
        serde_json::to_value(raw)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json_value()?)
    }
}
