use vo_core::Image;

/// Half-width of the square intensity patch
pub const PATCH_RADIUS: i64 = 3;
/// 7x7 samples
pub const DESCRIPTOR_SIZE: usize = ((2 * PATCH_RADIUS + 1) * (2 * PATCH_RADIUS + 1)) as usize;

/// Raw intensity patch used as a cheap appearance signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchDescriptor {
    samples: [u8; DESCRIPTOR_SIZE],
}

impl PatchDescriptor {
    /// Sample the patch centered on (x, y), row-major; pixels outside the
    /// image read as 0.
    pub fn extract(img: &Image, width: usize, height: usize, x: i64, y: i64) -> Self {
        let mut samples = [0u8; DESCRIPTOR_SIZE];
        let mut i = 0;
        for dy in -PATCH_RADIUS..=PATCH_RADIUS {
            for dx in -PATCH_RADIUS..=PATCH_RADIUS {
                let px = x + dx;
                let py = y + dy;
                if px >= 0 && py >= 0 && (px as usize) < width && (py as usize) < height {
                    samples[i] = img[py as usize * width + px as usize];
                }
                i += 1;
            }
        }
        Self { samples }
    }

    pub fn samples(&self) -> &[u8; DESCRIPTOR_SIZE] {
        &self.samples
    }

    /// Sum of squared differences; lower is a better match
    pub fn ssd(&self, other: &PatchDescriptor) -> u32 {
        self.samples
            .iter()
            .zip(other.samples.iter())
            .map(|(&a, &b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Image {
        (0..width * height).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_descriptor_size() {
        assert_eq!(DESCRIPTOR_SIZE, 49);
    }

    #[test]
    fn test_extract_interior_patch() {
        let img = ramp(20, 20);
        let d = PatchDescriptor::extract(&img, 20, 20, 10, 10);
        // First sample is (7, 7), center is (10, 10), last is (13, 13)
        assert_eq!(d.samples()[0], img[7 * 20 + 7]);
        assert_eq!(d.samples()[24], img[10 * 20 + 10]);
        assert_eq!(d.samples()[48], img[13 * 20 + 13]);
    }

    #[test]
    fn test_out_of_range_reads_zero() {
        let img = vec![9u8; 10 * 10];
        let d = PatchDescriptor::extract(&img, 10, 10, 0, 0);
        // Top-left 3 rows and 3 columns fall outside
        let nonzero = d.samples().iter().filter(|&&v| v != 0).count();
        assert_eq!(nonzero, 16);
        assert_eq!(d.samples()[0], 0);
        assert_eq!(d.samples()[24], 9);

        let far = PatchDescriptor::extract(&img, 10, 10, -50, 400);
        assert!(far.samples().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_no_row_wraparound() {
        let mut img = vec![0u8; 10 * 10];
        // Last column of row 4; a flat index would wrap into the patch of (0, 5)
        img[4 * 10 + 9] = 200;
        let d = PatchDescriptor::extract(&img, 10, 10, 0, 5);
        assert!(d.samples().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_ssd() {
        let img = ramp(30, 30);
        let a = PatchDescriptor::extract(&img, 30, 30, 10, 10);
        assert_eq!(a.ssd(&a), 0);

        let flat_a = PatchDescriptor::extract(&vec![10u8; 100], 10, 10, 5, 5);
        let flat_b = PatchDescriptor::extract(&vec![13u8; 100], 10, 10, 5, 5);
        assert_eq!(flat_a.ssd(&flat_b), 49 * 9);
        assert_eq!(flat_b.ssd(&flat_a), 49 * 9);
    }
}
