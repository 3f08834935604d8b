use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb as Pixel};
use pdf_cardsheet::fill::{border_average, content_digest};
use pdf_cardsheet::*;

fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let buffer = ImageBuffer::from_pixel(width, height, Pixel(color));
    encode(buffer)
}

fn encode(buffer: ImageBuffer<Pixel<u8>, Vec<u8>>) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn one_side_cards(keys: &[&str]) -> Vec<Card> {
    keys.iter()
        .map(|key| Card::new(*key, ImageRef::new(*key)))
        .collect()
}

#[test]
fn test_uniform_image_returns_its_color() {
    let color = sample_border_color(&solid_png(32, 24, [255, 0, 0])).unwrap();
    assert_eq!(color, Rgb::new(255, 0, 0));
}

#[test]
fn test_only_border_strips_are_sampled() {
    // White 10px frame around a black center
    let buffer = ImageBuffer::from_fn(40, 40, |x, y| {
        if (10..30).contains(&x) && (10..30).contains(&y) {
            Pixel([0, 0, 0])
        } else {
            Pixel([255, 255, 255])
        }
    });
    assert_eq!(border_average(&buffer), Some(Rgb::new(255, 255, 255)));
}

#[test]
fn test_strip_means_are_weighted_equally() {
    // Top 10 rows red, everything else blue: the top strip is pure red, the
    // left and right strips are 1/4 red, the bottom strip is pure blue
    let buffer = ImageBuffer::from_fn(40, 40, |_, y| {
        if y < 10 {
            Pixel([200, 0, 0])
        } else {
            Pixel([0, 0, 200])
        }
    });
    let color = border_average(&buffer).unwrap();
    // red: (200 + 50 + 50 + 0) / 4 = 75, blue: (0 + 150 + 150 + 200) / 4 = 125
    assert_eq!(color, Rgb::new(75, 0, 125));
}

#[test]
fn test_tiny_image_uses_whole_image() {
    let color = sample_border_color(&solid_png(3, 2, [10, 20, 30])).unwrap();
    assert_eq!(color, Rgb::new(10, 20, 30));
}

#[test]
fn test_undecodable_bytes_fail() {
    assert!(sample_border_color(b"definitely not a png").is_err());
}

#[tokio::test]
async fn test_analyze_samples_each_unique_image_once() {
    let mut store = MemoryImageStore::new();
    store.insert("red.png", solid_png(16, 16, [255, 0, 0]));
    store.insert("green.png", solid_png(16, 16, [0, 255, 0]));

    let cards = one_side_cards(&["red.png", "green.png"]);
    let mut cards = cards;
    cards[0].repeat = 5;
    let jobs = plan_pages(&cards, &SheetConfig::default()).unwrap();

    let store: Arc<dyn ImageStore> = Arc::new(store);
    let mut cache = ColorCache::new();
    let sampled = analyze_backgrounds(&jobs, Arc::clone(&store), &mut cache).await;

    assert_eq!(sampled, 2);
    assert_eq!(cache.color_of("red.png"), Some(Rgb::new(255, 0, 0)));
    assert_eq!(cache.color_of("green.png"), Some(Rgb::new(0, 255, 0)));

    // Unchanged bytes are not sampled again
    let sampled = analyze_backgrounds(&jobs, store, &mut cache).await;
    assert_eq!(sampled, 0);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_changed_bytes_are_resampled() {
    let cards = one_side_cards(&["card.png"]);
    let jobs = plan_pages(&cards, &SheetConfig::default()).unwrap();
    let mut cache = ColorCache::new();

    let mut store = MemoryImageStore::new();
    store.insert("card.png", solid_png(8, 8, [0, 0, 255]));
    analyze_backgrounds(&jobs, Arc::new(store.clone()), &mut cache).await;
    assert_eq!(cache.color_of("card.png"), Some(Rgb::new(0, 0, 255)));

    let replacement = solid_png(8, 8, [255, 255, 0]);
    store.insert("card.png", replacement.clone());
    let sampled = analyze_backgrounds(&jobs, Arc::new(store), &mut cache).await;

    assert_eq!(sampled, 1);
    assert_eq!(cache.color_of("card.png"), Some(Rgb::new(255, 255, 0)));
    assert!(cache.is_fresh("card.png", content_digest(&replacement)));
}

#[tokio::test]
async fn test_failures_leave_color_unset() {
    let mut store = MemoryImageStore::new();
    store.insert("good.png", solid_png(8, 8, [1, 2, 3]));
    store.insert("broken.png", b"garbage".to_vec());

    let cards = one_side_cards(&["good.png", "broken.png", "missing.png"]);
    let jobs = plan_pages(&cards, &SheetConfig::default()).unwrap();

    let mut cache = ColorCache::new();
    let sampled = analyze_backgrounds(&jobs, Arc::new(store), &mut cache).await;

    assert_eq!(sampled, 1);
    assert_eq!(cache.color_of("good.png"), Some(Rgb::new(1, 2, 3)));
    assert_eq!(cache.color_of("broken.png"), None);
    assert_eq!(cache.color_of("missing.png"), None);
}

#[test]
fn test_cache_invalidate_and_clear() {
    let mut cache = ColorCache::new();
    cache.insert("a", 1, Rgb::BLACK);
    cache.insert("b", 2, Rgb::BLACK);

    cache.invalidate("a");
    assert_eq!(cache.color_of("a"), None);
    assert!(cache.is_fresh("b", 2));
    assert!(!cache.is_fresh("b", 3));

    cache.clear();
    assert!(cache.is_empty());
}
