use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a shader-visible interface variable lives.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    Uniform,
    Attribute,
    Varying,
}

impl StorageClass {
    pub const ALL: [StorageClass; 3] = [
        StorageClass::Uniform,
        StorageClass::Attribute,
        StorageClass::Varying,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Uniform => "uniform",
            StorageClass::Attribute => "attribute",
            StorageClass::Varying => "varying",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two programs generated per shader.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertex" | "vs" => Ok(Stage::Vertex),
            "fragment" | "fs" => Ok(Stage::Fragment),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}

/// A fixed-capacity section of the shared numeric buffer.
///
/// Generated code addresses regions by element index through their buffer
/// name, e.g. `temp_f32[5]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Uniform,
    Attribute,
    Varying,
    Result,
    Temp,
    Scratch,
}

impl Region {
    /// Buffer order, front to back.
    pub const ALL: [Region; 6] = [
        Region::Uniform,
        Region::Attribute,
        Region::Varying,
        Region::Result,
        Region::Temp,
        Region::Scratch,
    ];

    pub const BUFFER_SUFFIX: &'static str = "_f32";

    pub fn base_name(&self) -> &'static str {
        match self {
            Region::Uniform => "uniform",
            Region::Attribute => "attribute",
            Region::Varying => "varying",
            Region::Result => "result",
            Region::Temp => "temp",
            Region::Scratch => "scratch",
        }
    }

    /// Name used for this region in generated code.
    pub fn buffer_name(&self) -> String {
        format!("{}{}", self.base_name(), Self::BUFFER_SUFFIX)
    }

    /// Resolve a storage base (`temp`) or buffer name (`temp_f32`).
    pub fn from_name(name: &str) -> Option<Region> {
        let base = name.strip_suffix(Self::BUFFER_SUFFIX).unwrap_or(name);
        Self::ALL.into_iter().find(|r| r.base_name() == base)
    }
}

impl From<StorageClass> for Region {
    fn from(class: StorageClass) -> Self {
        match class {
            StorageClass::Uniform => Region::Uniform,
            StorageClass::Attribute => Region::Attribute,
            StorageClass::Varying => Region::Varying,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}
