use std::path::{Path, PathBuf};

use image::ImageReader;
use log::{debug, warn};
use vo_core::{Frame, FrameInput, PixelFormat, RawFrame};
use vo_fast::ImagePreprocessing;
use vo_slam::FrameSource;

use crate::{CliError, CliResult};

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "pgm", "ppm", "tif"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Image files of a directory in lexical order
pub fn image_paths(dir: &Path) -> CliResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    if paths.is_empty() {
        return Err(CliError::NoImages(dir.to_path_buf()));
    }
    paths.sort();
    Ok(paths)
}

/// Decode an image file into an RGBA supplier frame
pub fn load_raw_frame(path: &Path, timestamp: f64) -> CliResult<RawFrame> {
    let rgba = ImageReader::open(path)?.with_guessed_format()?.decode()?.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok(RawFrame::new(w as usize, h as usize, PixelFormat::Rgba8, rgba.into_raw(), timestamp))
}

/// Decode an image file to luminance with the pipeline's own reduction
pub fn load_luma(path: &Path, timestamp: f64) -> CliResult<Frame> {
    Ok(ImagePreprocessing::to_luma(&load_raw_frame(path, timestamp)?)?)
}

/// Plays a directory of images as a camera at a nominal frame rate.
///
/// Unreadable files and frames whose size differs from the first frame are
/// skipped with a warning.
#[derive(Debug)]
pub struct DirectorySource {
    paths: Vec<PathBuf>,
    next: usize,
    fps: f64,
    size: Option<(usize, usize)>,
    delivered: usize,
    skipped: usize,
    released: bool,
}

impl DirectorySource {
    pub fn open(dir: &Path, fps: f64) -> CliResult<Self> {
        Ok(Self::from_paths(image_paths(dir)?, fps))
    }

    pub fn from_paths(paths: Vec<PathBuf>, fps: f64) -> Self {
        Self {
            paths,
            next: 0,
            fps: if fps.is_finite() && fps > 0.0 { fps } else { 30.0 },
            size: None,
            delivered: 0,
            skipped: 0,
            released: false,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Path of the most recently delivered frame
    pub fn current_path(&self) -> Option<&Path> {
        self.next.checked_sub(1).and_then(|i| self.paths.get(i)).map(PathBuf::as_path)
    }

    /// Dimensions of the first decodable frame
    pub fn frame_size(&mut self) -> CliResult<(usize, usize)> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let mut last_error = None;
        for path in &self.paths {
            match ImageReader::open(path)?.with_guessed_format()?.decode() {
                Ok(img) => {
                    let size = (img.width() as usize, img.height() as usize);
                    self.size = Some(size);
                    return Ok(size);
                }
                Err(e) => {
                    warn!("cannot size from {}: {}", path.display(), e);
                    last_error = Some(e);
                }
            }
        }
        Err(match last_error {
            Some(e) => e.into(),
            None => CliError::NoImages(PathBuf::new()),
        })
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Option<FrameInput> {
        while !self.released && self.next < self.paths.len() {
            let index = self.next;
            self.next += 1;
            let path = &self.paths[index];
            let timestamp = index as f64 / self.fps;

            let frame = match load_raw_frame(path, timestamp) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    self.skipped += 1;
                    continue;
                }
            };

            let size = *self.size.get_or_insert((frame.width, frame.height));
            if (frame.width, frame.height) != size {
                warn!(
                    "skipping {}: {}x{} does not match {}x{}",
                    path.display(),
                    frame.width,
                    frame.height,
                    size.0,
                    size.1
                );
                self.skipped += 1;
                continue;
            }

            debug!("frame {} from {}", index, path.display());
            self.delivered += 1;
            return Some(FrameInput::new(frame));
        }
        None
    }

    fn release(&mut self) {
        if !self.released {
            debug!(
                "released image source: {} delivered, {} skipped",
                self.delivered, self.skipped
            );
        }
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vo-cli-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_image_paths_are_sorted_and_filtered() {
        let dir = scratch_dir("paths");
        for name in ["b.png", "a.png", "c.PNG"] {
            GrayImage::from_pixel(4, 4, Luma([0])).save(dir.join(name)).unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let paths = image_paths(&dir).unwrap();
        let names: Vec<_> = paths.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.PNG"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = scratch_dir("empty");
        assert!(matches!(image_paths(&dir), Err(CliError::NoImages(_))));
    }

    #[test]
    fn test_directory_source_timestamps_and_skips() {
        let dir = scratch_dir("source");
        RgbImage::from_pixel(32, 24, Rgb([255, 0, 0])).save(dir.join("0.png")).unwrap();
        RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])).save(dir.join("1.png")).unwrap();
        std::fs::write(dir.join("2.png"), b"broken").unwrap();
        RgbImage::from_pixel(32, 24, Rgb([0, 255, 0])).save(dir.join("3.png")).unwrap();

        let mut source = DirectorySource::open(&dir, 10.0).unwrap();
        assert_eq!(source.len(), 4);
        assert_eq!(source.frame_size().unwrap(), (32, 24));

        let first = source.next_frame().unwrap();
        assert_eq!(first.frame.format, PixelFormat::Rgba8);
        assert_eq!(first.frame.timestamp, 0.0);
        assert_eq!(&first.frame.pixels[..4], &[255, 0, 0, 255]);

        let second = source.next_frame().unwrap();
        assert_eq!(second.frame.timestamp, 0.3);
        assert_eq!(source.current_path().unwrap().file_name().unwrap(), "3.png");
        assert!(source.next_frame().is_none());
        assert_eq!((source.delivered(), source.skipped()), (2, 2));

        source.release();
        assert!(source.is_released());
    }

    #[test]
    fn test_frame_size_skips_unreadable_first_file() {
        let dir = scratch_dir("size");
        std::fs::write(dir.join("0.png"), b"broken").unwrap();
        RgbImage::from_pixel(20, 12, Rgb([0, 0, 0])).save(dir.join("1.png")).unwrap();

        let mut source = DirectorySource::open(&dir, 30.0).unwrap();
        assert_eq!(source.frame_size().unwrap(), (20, 12));

        let frame = source.next_frame().unwrap();
        assert_eq!((frame.frame.width, frame.frame.height), (20, 12));
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn test_frame_size_without_decodable_frames() {
        let dir = scratch_dir("nosize");
        std::fs::write(dir.join("0.png"), b"broken").unwrap();
        let mut source = DirectorySource::open(&dir, 30.0).unwrap();
        assert!(matches!(source.frame_size(), Err(CliError::Image(_))));
    }

    #[test]
    fn test_load_luma_uses_rec601_weights() {
        let dir = scratch_dir("red");
        let path = dir.join("red.png");
        RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])).save(&path).unwrap();

        let frame = load_luma(&path, 0.0).unwrap();
        let expected = ImagePreprocessing::luma(255, 0, 0);
        assert_eq!(expected, 76);
        assert!(frame.luma.iter().all(|&v| v == expected));
    }

    #[test]
    fn test_load_luma() {
        let dir = scratch_dir("luma");
        let path = dir.join("gray.png");
        GrayImage::from_pixel(8, 6, Luma([77])).save(&path).unwrap();

        let frame = load_luma(&path, 1.5).unwrap();
        assert_eq!((frame.width, frame.height), (8, 6));
        assert!(frame.luma.iter().all(|&v| v == 77));
        assert_eq!(frame.timestamp, 1.5);
    }
}
