use std::f64::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major 8-bit luminance image
pub type Image = Vec<u8>;

/// Normalize an angle into (-π, π]
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped <= -PI { PI } else { wrapped }
}

/// Single-channel frame consumed by the pipeline
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub luma: Image,
    /// Capture time in seconds
    pub timestamp: f64,
}

impl Frame {
    pub fn new(width: usize, height: usize, luma: Image, timestamp: f64) -> Self {
        Self { width, height, luma, timestamp }
    }

    /// Flat frame of a single intensity
    pub fn filled(width: usize, height: usize, value: u8, timestamp: f64) -> Self {
        Self::new(width, height, vec![value; width * height], timestamp)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.luma[y * self.width + x]
    }

    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.luma.len() == self.width * self.height
    }
}

/// Pixel layout of a frame handed over by a frame supplier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelFormat {
    Luma8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Luminance-convertible buffer as delivered by a camera or file reader
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
    pub timestamp: f64,
}

impl RawFrame {
    pub fn new(width: usize, height: usize, format: PixelFormat, pixels: Vec<u8>, timestamp: f64) -> Self {
        Self { width, height, format, pixels, timestamp }
    }

    pub fn expected_len(&self) -> usize {
        self.width * self.height * self.format.channels()
    }
}

/// Per-pixel depth samples, same resolution as the frame
#[derive(Debug, Clone)]
pub struct DepthMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl DepthMap {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Self {
        Self { width, height, data }
    }

    /// Depth at a pixel; non-finite samples count as missing
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width {
            return None;
        }
        self.data
            .get(y * self.width + x)
            .copied()
            .filter(|d| d.is_finite())
    }
}

/// One tick of input: a frame plus the optional depth buffer
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub frame: RawFrame,
    pub depth: Option<DepthMap>,
}

impl FrameInput {
    pub fn new(frame: RawFrame) -> Self {
        Self { frame, depth: None }
    }

    pub fn with_depth(mut self, depth: DepthMap) -> Self {
        self.depth = Some(depth);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCoord {
    pub x: usize,
    pub y: usize,
}

impl PixelCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Which heuristic marked a corner as an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObstacleCue {
    /// Near-field depth sample
    Depth,
    DenseCluster,
    /// High score with balanced brighter/darker tallies
    AmbiguousContrast,
    CentralDensity,
    /// Strong corner or anomalously dense cluster
    StrongCorner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureKind {
    /// Surviving corner that no obstacle rule accepted
    Corner,
    Obstacle(ObstacleCue),
}

/// Corner detected in a single frame; carries no cross-frame identity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    pub x: usize,
    pub y: usize,
    /// max(brighter, darker)
    pub score: u8,
    pub brighter: u8,
    pub darker: u8,
    pub kind: FeatureKind,
    pub depth: Option<f32>,
}

impl Feature {
    pub fn coord(&self) -> PixelCoord {
        PixelCoord::new(self.x, self.y)
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self.kind, FeatureKind::Obstacle(_))
    }

    /// |brighter - darker|
    pub fn imbalance(&self) -> u8 {
        self.brighter.abs_diff(self.darker)
    }
}

/// Same point seen in the previous and the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Correspondence {
    pub prev: PixelCoord,
    pub curr: PixelCoord,
    /// SSD between the two patches
    pub cost: u32,
}

impl Correspondence {
    pub fn new(prev: PixelCoord, curr: PixelCoord, cost: u32) -> Self {
        Self { prev, curr, cost }
    }

    /// Image-plane flow (curr - prev) in pixels
    pub fn displacement(&self) -> (f64, f64) {
        (
            self.curr.x as f64 - self.prev.x as f64,
            self.curr.y as f64 - self.prev.y as f64,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseDelta {
    pub dx: f64,
    pub dy: f64,
    pub dheading: f64,
}

impl PoseDelta {
    pub const ZERO: PoseDelta = PoseDelta { dx: 0.0, dy: 0.0, dheading: 0.0 };

    pub fn new(dx: f64, dy: f64, dheading: f64) -> Self {
        Self { dx, dy, dheading }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.dheading == 0.0
    }
}

/// Planar pose in motion units; heading in radians, always normalized
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub const ORIGIN: Pose = Pose { x: 0.0, y: 0.0, heading: 0.0 };

    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading: normalize_angle(heading) }
    }

    /// Add a delta component-wise and renormalize the heading
    pub fn compose(&self, delta: &PoseDelta) -> Pose {
        Pose {
            x: self.x + delta.dx,
            y: self.y + delta.dy,
            heading: normalize_angle(self.heading + delta.dheading),
        }
    }

    pub fn position(&self) -> TrajectoryPoint {
        TrajectoryPoint { x: self.x, y: self.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LandmarkId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landmark {
    pub id: LandmarkId,
    pub x: f64,
    pub y: f64,
    /// Observation count, clamped to [1, max quality]
    pub quality: u8,
}

/// External position fix; only used to geo-reference the trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters
    pub accuracy: f64,
    pub timestamp: f64,
}
