use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SdkResult;

/// One seed found in an image by the inference service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `[x1, y1, x2, y2]` in pixels.
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
    #[serde(default, rename = "class")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Base64 JPEG of the detected region.
    #[serde(default)]
    pub cropped_image: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Everything the inference service returned for one image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    #[serde(default, rename = "results")]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub image_size: Option<ImageSize>,
}

/// The ML inference service. Its output is passed through, never interpreted.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn detect(&self, image: &[u8]) -> SdkResult<InferenceResult>;
}
