//! I/O 支持：输入/输出文档的 JSON 与 RON 序列化接口。
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::core::{MalformedNetError, Net};
use crate::net::structure::{Delta, Weight};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialisation format of a net or unfolding document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Ron,
}

impl Format {
    /// `.ron` files are RON, everything else is JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Format::Ron,
            _ => Format::Json,
        }
    }
}

/// Input document: `matrix` (rows = places) and `initialMarking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDocument {
    pub matrix: Vec<Vec<Delta>>,
    #[serde(rename = "initialMarking")]
    pub initial_marking: Vec<i64>,
}

impl NetDocument {
    pub fn into_net(self) -> Result<Net, MalformedNetError> {
        Net::new(self.matrix, self.initial_marking)
    }
}

/// Output document handed to the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfoldingDocument {
    pub matrix: Vec<Vec<Delta>>,
    #[serde(rename = "Place")]
    pub places: Vec<String>,
    #[serde(rename = "Transition")]
    pub transitions: Vec<String>,
    #[serde(rename = "Marking")]
    pub marking: Vec<Weight>,
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn to_string<T: Serialize>(value: &T, format: Format) -> Result<String, IoError> {
    match format {
        Format::Json => to_json_string(value),
        Format::Ron => to_ron_string(value),
    }
}

pub fn from_str<T: DeserializeOwned>(s: &str, format: Format) -> Result<T, IoError> {
    match format {
        Format::Json => from_json_str(s),
        Format::Ron => from_ron_str(s),
    }
}

pub fn write_document<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
    format: Format,
) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_string(value, format)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Reads a document, picking the format from the file extension.
pub fn read_document<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    let format = Format::from_path(&path);
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    from_str(&content, format)
}
