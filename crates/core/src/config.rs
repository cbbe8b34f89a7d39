use scalarize_api::Region;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Element capacity of every region of the shared buffer.
///
/// Regions sit back-to-back in [`Region::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionLayout {
    pub uniform: usize,
    pub attribute: usize,
    pub varying: usize,
    pub result: usize,
    pub temp: usize,
    pub scratch: usize,
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            uniform: 128,
            attribute: 128,
            varying: 128,
            result: 128,
            temp: 128,
            scratch: 4,
        }
    }
}

impl RegionLayout {
    pub fn capacity(&self, region: Region) -> usize {
        match region {
            Region::Uniform => self.uniform,
            Region::Attribute => self.attribute,
            Region::Varying => self.varying,
            Region::Result => self.result,
            Region::Temp => self.temp,
            Region::Scratch => self.scratch,
        }
    }

    /// Element offset of `region` inside the shared buffer.
    pub fn offset_of(&self, region: Region) -> usize {
        Region::ALL
            .into_iter()
            .take_while(|r| *r != region)
            .map(|r| self.capacity(r))
            .sum()
    }

    pub fn total(&self) -> usize {
        Region::ALL.into_iter().map(|r| self.capacity(r)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramOptions {
    pub layout: RegionLayout,
    /// Echo each IR instruction as a comment line in generated code.
    pub trace_comments: bool,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            layout: RegionLayout::default(),
            trace_comments: true,
        }
    }
}

impl ProgramOptions {
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
