//! Background fill analysis
//!
//! When margin filling is enabled, the gap around each tile is painted with
//! the average color of the image's border. Every unique image is sampled
//! once, concurrently, before any page is rendered; the renderer then reads
//! colors from the [`ColorCache`] synchronously.

use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use image::RgbImage;
use tokio::task::JoinSet;

use crate::constants::BORDER_SAMPLE_PX;
use crate::layout::PageJob;
use crate::store::ImageStore;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedColor {
    digest: u64,
    color: Rgb,
}

/// Border colors keyed by image key.
///
/// Each entry remembers a digest of the bytes it was computed from, so a
/// changed image is re-sampled on the next analysis.
#[derive(Debug, Clone, Default)]
pub struct ColorCache {
    entries: HashMap<String, CachedColor>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached border color for an image
    pub fn color_of(&self, key: &str) -> Option<Rgb> {
        self.entries.get(key).map(|entry| entry.color)
    }

    /// Whether the cached entry was computed from bytes with this digest
    pub fn is_fresh(&self, key: &str, digest: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.digest == digest)
    }

    pub fn insert(&mut self, key: impl Into<String>, digest: u64, color: Rgb) {
        self.entries
            .insert(key.into(), CachedColor { digest, color });
    }

    /// Drop the entry for an image whose bytes changed
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Digest of encoded image bytes
pub fn content_digest(bytes: &[u8]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Sampling
// =============================================================================

/// Average color of the four border strips of an image.
///
/// Each strip (top, left, right, bottom, `BORDER_SAMPLE_PX` wide) is averaged
/// on its own, then the four means are averaged with equal weight and
/// rounded. Returns `None` for an empty image.
pub fn border_average(image: &RgbImage) -> Option<Rgb> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let strip_w = BORDER_SAMPLE_PX.min(width);
    let strip_h = BORDER_SAMPLE_PX.min(height);

    let strips = [
        strip_mean(image, 0, 0, width, strip_h),
        strip_mean(image, 0, 0, strip_w, height),
        strip_mean(image, width - strip_w, 0, width, height),
        strip_mean(image, 0, height - strip_h, width, height),
    ];

    let mut sum = [0.0f64; 3];
    for mean in &strips {
        for channel in 0..3 {
            sum[channel] += mean[channel];
        }
    }

    let channel = |c: usize| (sum[c] / strips.len() as f64).round().clamp(0.0, 255.0) as u8;
    Some(Rgb::new(channel(0), channel(1), channel(2)))
}

/// Mean RGB over the pixel range `[x0, x1) x [y0, y1)`
fn strip_mean(image: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> [f64; 3] {
    let mut sum = [0u64; 3];
    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = image.get_pixel(x, y);
            for channel in 0..3 {
                sum[channel] += pixel.0[channel] as u64;
            }
        }
    }

    let count = ((x1 - x0) as u64 * (y1 - y0) as u64).max(1) as f64;
    [
        sum[0] as f64 / count,
        sum[1] as f64 / count,
        sum[2] as f64 / count,
    ]
}

/// Decode encoded image bytes and compute their border color
pub fn sample_border_color(bytes: &[u8]) -> Result<Rgb> {
    let decoded = image::load_from_memory(bytes)?;
    border_average(&decoded.to_rgb8())
        .ok_or_else(|| SheetError::UnusableImage("image has no pixels".to_string()))
}

enum SampleOutcome {
    Fresh,
    Sampled { digest: u64, color: Rgb },
    Missing,
    Failed(SheetError),
}

fn sample_one(store: &dyn ImageStore, key: &str, known_digest: Option<u64>) -> SampleOutcome {
    let Some(bytes) = store.resolve(key) else {
        return SampleOutcome::Missing;
    };

    let digest = content_digest(&bytes);
    if known_digest == Some(digest) {
        return SampleOutcome::Fresh;
    }

    match sample_border_color(&bytes) {
        Ok(color) => SampleOutcome::Sampled { digest, color },
        Err(e) => SampleOutcome::Failed(e),
    }
}

/// Sample the border color of every unique image referenced by `jobs`.
///
/// Images run as independent blocking tasks and are all awaited before this
/// returns. Entries whose bytes are unchanged are kept; failures leave the
/// image without a color. Returns the number of images sampled.
pub async fn analyze_backgrounds(
    jobs: &[PageJob],
    store: Arc<dyn ImageStore>,
    cache: &mut ColorCache,
) -> usize {
    let keys: BTreeSet<String> = jobs
        .iter()
        .flat_map(|job| job.image_keys())
        .map(str::to_owned)
        .collect();

    let mut tasks = JoinSet::new();
    for key in keys {
        let known_digest = cache.entries.get(&key).map(|entry| entry.digest);
        let store = Arc::clone(&store);
        tasks.spawn_blocking(move || {
            let outcome = sample_one(store.as_ref(), &key, known_digest);
            (key, outcome)
        });
    }

    let mut sampled = 0;
    while let Some(joined) = tasks.join_next().await {
        let (key, outcome) = match joined {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Border sampling task failed: {}", e);
                continue;
            }
        };

        match outcome {
            SampleOutcome::Fresh => {
                log::debug!("Using cached border color for {}", key);
            }
            SampleOutcome::Sampled { digest, color } => {
                log::debug!("Border color for {}: {:?}", key, color);
                cache.insert(key, digest, color);
                sampled += 1;
            }
            SampleOutcome::Missing => {
                log::warn!("Image {} not found, no margin fill", key);
                cache.invalidate(&key);
            }
            SampleOutcome::Failed(e) => {
                log::warn!("Could not sample border of {}: {}", key, e);
                cache.invalidate(&key);
            }
        }
    }

    sampled
}
