/// Corner that passed the segment test, before suppression and classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerCandidate {
    pub x: usize,
    pub y: usize,
    pub score: u8,
    pub brighter: u8,
    pub darker: u8,
    pub depth: Option<f32>,
}

/// Density statistics over the coarse clusters of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterStats {
    pub clusters: usize,
    pub max_size: usize,
    /// Upper median of the sorted cluster sizes, 1 when there are no clusters
    pub median_size: usize,
    pub mean_size: f32,
}

impl Default for ClusterStats {
    fn default() -> Self {
        Self {
            clusters: 0,
            max_size: 0,
            median_size: 1,
            mean_size: 0.0,
        }
    }
}

/// Corner type classification from the circle tallies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CornerType {
    Bright,
    Dark,
    None,
}
