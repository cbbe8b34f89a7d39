use crate::config::RegionLayout;
use scalarize_api::Region;

/// The single flat buffer every stage and accessor works on.
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    layout: RegionLayout,
    data: Vec<f32>,
}

impl SharedBuffer {
    pub fn new(layout: RegionLayout) -> Self {
        Self {
            data: vec![0.0; layout.total()],
            layout,
        }
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn region(&self, region: Region) -> &[f32] {
        let start = self.layout.offset_of(region);
        &self.data[start..start + self.layout.capacity(region)]
    }

    pub fn region_mut(&mut self, region: Region) -> &mut [f32] {
        let start = self.layout.offset_of(region);
        let end = start + self.layout.capacity(region);
        &mut self.data[start..end]
    }

    /// Copy `data` into `region` at `start`, truncated to `limit` elements and
    /// to the region's end.
    pub fn write(&mut self, region: Region, start: usize, data: &[f32], limit: usize) -> usize {
        let target = self.region_mut(region);
        if start >= target.len() {
            return 0;
        }
        let count = data.len().min(limit).min(target.len() - start);
        target[start..start + count].copy_from_slice(&data[..count]);
        count
    }

    /// Copy of `size` elements from `start`, clamped to the region.
    pub fn read(&self, region: Region, start: usize, size: usize) -> Vec<f32> {
        let source = self.region(region);
        let start = start.min(source.len());
        let end = start.saturating_add(size).min(source.len());
        source[start..end].to_vec()
    }

    pub(crate) fn get(&self, index: usize) -> f32 {
        self.data[index]
    }

    pub(crate) fn set(&mut self, index: usize, value: f32) {
        self.data[index] = value;
    }
}
