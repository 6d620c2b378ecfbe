//! Generated datasets for the demo window.

use data::config::theme::{from_hsv_degrees, hex_to_color};
use data::{Dataset, DatasetError, Series};

use iced::Color;

/// 2023-01-01T00:00:00Z
const START_MS: i64 = 1_672_531_200_000;
const DAY_MS: i64 = 86_400_000;

pub struct Demo {
    pub name: &'static str,
    pub dataset: Dataset,
}

/// xorshift, so every run shows the same curves.
struct Noise(u64);

impl Noise {
    fn next(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % 10_000) as f64 / 10_000.0
    }
}

fn color(hex: &str, fallback_hue: f32) -> Color {
    hex_to_color(hex).unwrap_or_else(|| from_hsv_degrees(fallback_hue, 0.7, 0.8))
}

fn timestamps(days: usize) -> Vec<i64> {
    (0..days as i64).map(|d| START_MS + d * DAY_MS).collect()
}

fn wave(days: usize, base: f64, swing: f64, period: f64, seed: u64) -> Vec<i64> {
    let mut noise = Noise(seed);

    (0..days)
        .map(|d| {
            let t = d as f64;
            let season = (t / period * std::f64::consts::TAU).sin();
            let trend = 1.0 + t / days as f64 * 0.5;
            let jitter = 0.85 + noise.next() * 0.3;
            ((base + swing * season) * trend * jitter).max(0.0).round() as i64
        })
        .collect()
}

fn followers() -> Result<Dataset, DatasetError> {
    let days = 365;

    Dataset::new(
        timestamps(days),
        vec![
            Series::new("Joined", color("#3DC23F", 121.0), wave(days, 120.0, 40.0, 30.0, 7)),
            Series::new("Left", color("#F34C44", 3.0), wave(days, 60.0, 25.0, 45.0, 11)),
        ],
    )
}

fn traffic() -> Result<Dataset, DatasetError> {
    let days = 180;

    let series = ["Search", "Direct", "Referral", "Social"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let hue = 200.0 + i as f32 * 45.0;
            let base = 40_000.0 / (i + 1) as f64;
            Series::new(
                name,
                from_hsv_degrees(hue, 0.65, 0.85),
                wave(days, base, base * 0.3, 7.0 + i as f64 * 5.0, 31 + i as u64),
            )
        })
        .collect();

    Dataset::new(timestamps(days), series)
}

pub fn datasets() -> Vec<Demo> {
    [("Followers", followers()), ("Traffic", traffic())]
        .into_iter()
        .filter_map(|(name, dataset)| match dataset {
            Ok(dataset) => Some(Demo { name, dataset }),
            Err(e) => {
                log::error!("Demo dataset '{name}' rejected: {e}");
                None
            }
        })
        .collect()
}
