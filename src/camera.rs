use colored::*;
use image::RgbImage;
use log::{debug, info};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, CameraInfo, FrameFormat, RequestedFormat,
        RequestedFormatType, Resolution,
    },
    Camera,
};

use crate::error::{HueError, Result};
use crate::permission::Granted;
use crate::sampler::FrameSource;
use crate::types::FacingMode;

const REAR_KEYWORDS: &[&str] = &["back", "rear", "environment", "world"];
const FRONT_KEYWORDS: &[&str] = &["front", "user", "facetime"];

/// Constraints for the video-only stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamRequest {
    pub facing: FacingMode,
    pub ideal_width: u32,
    /// Width over height; `None` leaves the shape to the device.
    pub aspect_ratio: Option<f64>,
}

/// Handheld viewports are portrait, so the ratio is height over width
/// there and width over height everywhere else.
pub fn aspect_ratio(viewport_width: u32, viewport_height: u32, handheld: bool) -> Option<f64> {
    if viewport_width == 0 || viewport_height == 0 {
        return None;
    }
    let (w, h) = (viewport_width as f64, viewport_height as f64);
    Some(if handheld { h / w } else { w / h })
}

impl StreamRequest {
    pub fn for_viewport(
        facing: FacingMode,
        ideal_width: u32,
        viewport: (u32, u32),
        handheld: bool,
    ) -> Self {
        Self {
            facing,
            ideal_width,
            aspect_ratio: aspect_ratio(viewport.0, viewport.1, handheld),
        }
    }

    /// Resolution to ask the driver for; it picks the closest it has.
    pub fn ideal_resolution(&self) -> Resolution {
        let height = match self.aspect_ratio {
            Some(ratio) if ratio > 0.0 => (self.ideal_width as f64 / ratio).round() as u32,
            _ => self.ideal_width * 9 / 16,
        };
        Resolution::new(self.ideal_width, height.max(1))
    }
}

/// Picks the device whose name matches `facing`, or the first one.
pub fn select_device<S: AsRef<str>>(names: &[S], facing: FacingMode) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    let keywords = match facing {
        FacingMode::Environment => REAR_KEYWORDS,
        FacingMode::User => FRONT_KEYWORDS,
    };
    let matched = names.iter().position(|name| {
        let name = name.as_ref().to_lowercase();
        keywords.iter().any(|k| name.contains(k))
    });
    Some(matched.unwrap_or(0))
}

pub fn list_devices() -> Result<Vec<CameraInfo>> {
    nokhwa::query(ApiBackend::Auto).map_err(|e| HueError::Camera(format!("Query cameras: {e}")))
}

/// Resolves which camera to open: an explicit index wins, otherwise the
/// facing-mode preference decides.
pub fn resolve_index(explicit: Option<u32>, request: &StreamRequest) -> Result<CameraIndex> {
    if let Some(index) = explicit {
        return Ok(CameraIndex::Index(index));
    }
    let devices = list_devices()?;
    let names: Vec<String> = devices.iter().map(|d| d.human_name()).collect();
    let chosen = select_device(&names, request.facing)
        .ok_or_else(|| HueError::Camera("No camera found".to_string()))?;
    debug!("selected camera '{}' for {:?}", names[chosen], request.facing);
    Ok(devices[chosen].index().clone())
}

pub struct CameraSource {
    camera: Camera,
}

impl CameraSource {
    /// Opens the stream. Needs a [`Granted`] token, so a denied session
    /// never reaches the device.
    pub fn open(index: CameraIndex, request: &StreamRequest, _granted: Granted) -> Result<Self> {
        let format = CameraFormat::new(request.ideal_resolution(), FrameFormat::MJPEG, 30);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(index, requested)
            .map_err(|e| HueError::Camera(format!("Create camera: {e}")))?;
        camera
            .open_stream()
            .map_err(|e| HueError::Camera(format!("Open stream: {e}")))?;

        println!("{}", format!("Opened camera: {}", camera.info().human_name()).green());
        info!("camera format: {}", camera.camera_format());

        Ok(Self { camera })
    }

    pub fn width(&self) -> u32 {
        self.camera.resolution().width()
    }

    pub fn height(&self) -> u32 {
        self.camera.resolution().height()
    }

    pub fn name(&self) -> String {
        self.camera.info().human_name()
    }
}

impl FrameSource for CameraSource {
    fn capture(&mut self) -> Result<RgbImage> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| HueError::Camera(format!("Fetch frame: {e}")))?;
        frame
            .decode_image::<RgbFormat>()
            .map_err(|e| HueError::Camera(format!("Decode frame: {e}")))
    }

    fn stop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            debug!("stop stream: {}", e);
        }
    }
}
