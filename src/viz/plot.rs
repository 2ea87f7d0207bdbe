use image::{Rgb, RgbImage};
use log::warn;
use std::path::Path;

use crate::error::{Result, TractError};
use crate::viz::stats::ChannelStats;

/// blue, orange, magenta, pink, darkgreen
pub const PALETTE: [[u8; 3]; 5] = [
    [0, 0, 255],
    [255, 165, 0],
    [255, 0, 255],
    [255, 192, 203],
    [0, 100, 0],
];

const BAND_ALPHA: f64 = 0.5;
const MARGIN: u32 = 40;
const LINE_WIDTH: i64 = 2;
const SWATCH: u32 = 12;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// One subject's mean curve and its error band half-width.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl Series {
    pub fn from_stats(label: impl Into<String>, stats: &ChannelStats) -> Series {
        Series { label: label.into(), means: stats.means.clone(), stds: stats.stds.clone() }
    }
}

/// Overlaid line plots with shaded bands, x running over `1..=n` channels.
#[derive(Debug, Clone)]
pub struct LinePlot {
    pub width: u32,
    pub height: u32,
    series: Vec<Series>,
}

/// Maps data coordinates to pixel coordinates.
struct Frame {
    x_max: f64,
    y_min: f64,
    y_max: f64,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Frame {
    fn px(&self, t: f64) -> f64 {
        let span = (self.x_max - 1.0).max(1.0);
        self.left + (t - 1.0) / span * (self.right - self.left)
    }

    fn py(&self, v: f64) -> f64 {
        let span = (self.y_max - self.y_min).max(f64::EPSILON);
        self.bottom - (v - self.y_min) / span * (self.bottom - self.top)
    }

    /// Data-space `t` of a pixel column.
    fn t_at(&self, px: f64) -> f64 {
        let span = (self.x_max - 1.0).max(1.0);
        1.0 + (px - self.left) / (self.right - self.left) * span
    }
}

fn blend(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3], alpha: f64) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let p = img.get_pixel_mut(x as u32, y as u32);
    for (c, &src) in p.0.iter_mut().zip(&color) {
        *c = (alpha * src as f64 + (1.0 - alpha) * *c as f64).round() as u8;
    }
}

/// Linear interpolation of `values` (indexed from t = 1) at a fractional `t`.
fn sample(values: &[f64], t: f64) -> Option<f64> {
    if values.is_empty() || t < 1.0 || t > values.len() as f64 {
        return None;
    }
    let i = (t - 1.0).floor() as usize;
    let f = t - 1.0 - i as f64;
    let a = values[i];
    let b = values.get(i + 1).copied().unwrap_or(a);
    Some(a + f * (b - a))
}

impl LinePlot {
    pub fn new(width: u32, height: u32) -> LinePlot {
        LinePlot { width, height, series: Vec::new() }
    }

    /// Adds a series; returns `false` (and drops it) once the palette is exhausted.
    pub fn add(&mut self, series: Series) -> bool {
        if self.series.len() >= PALETTE.len() {
            warn!("Only {} subjects can be plotted, skipping {}", PALETTE.len(), series.label);
            return false;
        }
        self.series.push(series);
        true
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Color assigned to each series, in insertion order.
    pub fn legend(&self) -> Vec<(&str, [u8; 3])> {
        self.series.iter().zip(PALETTE).map(|(s, c)| (s.label.as_str(), c)).collect()
    }

    fn frame(&self) -> Result<Frame> {
        if self.width <= 2 * MARGIN || self.height <= 2 * MARGIN {
            return Err(TractError::config(format!(
                "plot of {}x{} is too small for its {}px margins",
                self.width, self.height, MARGIN
            )));
        }

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        let mut x_max = 1.0f64;
        for s in &self.series {
            if s.means.len() != s.stds.len() {
                return Err(TractError::shape("LinePlot series", &[s.means.len()], &[s.stds.len()]));
            }
            x_max = x_max.max(s.means.len() as f64);
            for (m, d) in s.means.iter().zip(&s.stds) {
                y_min = y_min.min(m - d);
                y_max = y_max.max(m + d);
            }
        }
        if !y_min.is_finite() || !y_max.is_finite() {
            return Err(TractError::Empty("plot has no data points"));
        }

        let pad = ((y_max - y_min) * 0.05).max(1e-6);
        Ok(Frame {
            x_max,
            y_min: y_min - pad,
            y_max: y_max + pad,
            left: MARGIN as f64,
            right: (self.width - MARGIN) as f64,
            top: MARGIN as f64,
            bottom: (self.height - MARGIN) as f64,
        })
    }

    pub fn render(&self) -> Result<RgbImage> {
        let frame = self.frame()?;
        let mut img = RgbImage::from_pixel(self.width, self.height, WHITE);

        // Bands first so every line stays visible on top of them.
        for (s, color) in self.series.iter().zip(PALETTE) {
            let lo: Vec<f64> = s.means.iter().zip(&s.stds).map(|(m, d)| m - d).collect();
            let hi: Vec<f64> = s.means.iter().zip(&s.stds).map(|(m, d)| m + d).collect();
            for px in frame.left as i64..=frame.right as i64 {
                let t = frame.t_at(px as f64);
                let (Some(l), Some(h)) = (sample(&lo, t), sample(&hi, t)) else { continue };
                let (y0, y1) = (frame.py(h).round() as i64, frame.py(l).round() as i64);
                for py in y0..=y1 {
                    blend(&mut img, px, py, color, BAND_ALPHA);
                }
            }
        }

        for (s, color) in self.series.iter().zip(PALETTE) {
            for (i, pair) in s.means.windows(2).enumerate() {
                let (x0, y0) = (frame.px((i + 1) as f64), frame.py(pair[0]));
                let (x1, y1) = (frame.px((i + 2) as f64), frame.py(pair[1]));
                let steps = ((x1 - x0).abs().max((y1 - y0).abs()).ceil() as usize).max(1);
                for k in 0..=steps {
                    let f = k as f64 / steps as f64;
                    let (x, y) = ((x0 + f * (x1 - x0)).round() as i64, (y0 + f * (y1 - y0)).round() as i64);
                    for dy in 0..LINE_WIDTH {
                        blend(&mut img, x, y + dy, color, 1.0);
                    }
                }
            }
        }

        self.draw_axes(&mut img, &frame);
        self.draw_legend(&mut img);
        Ok(img)
    }

    fn draw_axes(&self, img: &mut RgbImage, frame: &Frame) {
        let (left, right) = (frame.left as u32, frame.right as u32);
        let (top, bottom) = (frame.top as u32, frame.bottom as u32);
        for x in left..=right {
            img.put_pixel(x, bottom, BLACK);
        }
        for y in top..=bottom {
            img.put_pixel(left, y, BLACK);
        }
    }

    fn draw_legend(&self, img: &mut RgbImage) {
        let x0 = self.width - MARGIN - SWATCH;
        for (k, (_, color)) in self.legend().into_iter().enumerate() {
            let y0 = MARGIN + 4 + k as u32 * (SWATCH + 4);
            for y in y0..y0 + SWATCH {
                for x in x0..x0 + SWATCH {
                    blend(img, x as i64, y as i64, color, 1.0);
                }
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.render()?.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str, base: f64) -> Series {
        Series {
            label: label.to_string(),
            means: (0..10).map(|i| base + i as f64).collect(),
            stds: vec![0.5; 10],
        }
    }

    #[test]
    fn caps_series_at_palette_size() {
        let mut plot = LinePlot::new(320, 240);
        for i in 0..7 {
            let added = plot.add(series(&format!("s{i}"), i as f64));
            assert_eq!(added, i < PALETTE.len());
        }
        assert_eq!(plot.series().len(), PALETTE.len());
        assert_eq!(plot.legend()[1], ("s1", [255, 165, 0]));
    }

    #[test]
    fn renders_series_colors() {
        let mut plot = LinePlot::new(320, 240);
        plot.add(series("a", 0.0));
        let img = plot.render().unwrap();

        assert_eq!(img.dimensions(), (320, 240));
        assert!(img.pixels().any(|p| p.0 == [0, 0, 255]));
        // Band pixels are blue blended over white.
        assert!(img.pixels().any(|p| p.0 == [128, 128, 255]));
    }

    #[test]
    fn empty_plot_is_an_error() {
        assert!(LinePlot::new(320, 240).render().is_err());
    }

    #[test]
    fn tiny_canvas_is_an_error() {
        let mut plot = LinePlot::new(60, 60);
        plot.add(series("a", 0.0));
        assert!(plot.render().is_err());
    }

    #[test]
    fn sample_interpolates() {
        assert_eq!(sample(&[1.0, 3.0], 1.5), Some(2.0));
        assert_eq!(sample(&[1.0, 3.0], 2.0), Some(3.0));
        assert_eq!(sample(&[1.0, 3.0], 2.5), None);
    }
}
