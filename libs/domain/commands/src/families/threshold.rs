use imagec_core_geometry::Mask;
use imagec_domain_model::{BinaryMask, Intermediate, SlotType};
use serde::Deserialize;

use crate::command::{Command, CommandOutput};
use crate::context::ExecutionContext;
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdMode {
    Manual,
    Li,
    MinError,
    Triangle,
    Moments,
    Otsu,
}

/// Reduces the active image to a `BinaryMask` by one of the six modes
/// (§4.4). `manualValue` is consulted only in `MANUAL` mode; every other
/// mode derives its cut point from a 256-bin histogram of the image.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdCommand {
    pub mode: ThresholdMode,
    #[serde(rename = "manualValue", default)]
    pub manual_value: f32,
}

const BINS: usize = 256;

fn histogram(image: &imagec_domain_model::ImageBuffer) -> ([u64; BINS], f32) {
    let depth_max = image.depth_max();
    let mut bins = [0u64; BINS];
    for value in image.iter_channel(0) {
        let bin = ((value / depth_max) * (BINS as f32 - 1.0)).round().clamp(0.0, BINS as f32 - 1.0) as usize;
        bins[bin] += 1;
    }
    (bins, depth_max)
}

fn otsu_bin(bins: &[u64; BINS]) -> usize {
    let total: u64 = bins.iter().sum();
    if total == 0 {
        return 0;
    }
    let sum_all: f64 = bins.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();

    let mut best_bin = 0usize;
    let mut best_variance = -1.0f64;
    let mut weight_bg = 0.0f64;
    let mut sum_bg = 0.0f64;

    for (t, &count) in bins.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total as f64 - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += t as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);
        if between_variance > best_variance {
            best_variance = between_variance;
            best_bin = t;
        }
    }
    best_bin
}

fn triangle_bin(bins: &[u64; BINS]) -> usize {
    let peak = bins.iter().enumerate().max_by_key(|(_, &c)| c).map(|(i, _)| i).unwrap_or(0);
    let (first, last) = non_empty_range(bins);
    let (start, end) = if peak - first > last - peak { (first, peak) } else { (peak, last) };
    if start == end {
        return start;
    }

    let (x0, y0) = (start as f64, bins[start] as f64);
    let (x1, y1) = (end as f64, bins[end] as f64);
    let (dx, dy) = (x1 - x0, y1 - y0);
    let norm = (dx * dx + dy * dy).sqrt();

    let mut best_bin = start;
    let mut best_distance = -1.0f64;
    for bin in start..=end {
        let (px, py) = (bin as f64, bins[bin] as f64);
        let distance = if norm == 0.0 { 0.0 } else { ((px - x0) * dy - (py - y0) * dx).abs() / norm };
        if distance > best_distance {
            best_distance = distance;
            best_bin = bin;
        }
    }
    best_bin
}

fn non_empty_range(bins: &[u64; BINS]) -> (usize, usize) {
    let first = bins.iter().position(|&c| c > 0).unwrap_or(0);
    let last = bins.iter().rposition(|&c| c > 0).unwrap_or(BINS - 1);
    (first, last)
}

/// Li & Lee's iterative minimum cross-entropy threshold.
fn li_bin(bins: &[u64; BINS]) -> usize {
    let total: f64 = bins.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0;
    }
    let mean: f64 = bins.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum::<f64>() / total;
    let mut threshold = mean;

    for _ in 0..100 {
        let t = threshold.round().clamp(1.0, BINS as f64 - 2.0) as usize;
        let (mut sum_bg, mut weight_bg, mut sum_fg, mut weight_fg) = (0.0, 0.0, 0.0, 0.0);
        for (i, &c) in bins.iter().enumerate() {
            if i <= t {
                sum_bg += i as f64 * c as f64;
                weight_bg += c as f64;
            } else {
                sum_fg += i as f64 * c as f64;
                weight_fg += c as f64;
            }
        }
        let mean_bg = if weight_bg > 0.0 { sum_bg / weight_bg } else { 0.0 };
        let mean_fg = if weight_fg > 0.0 { sum_fg / weight_fg } else { 0.0 };
        let next = if mean_bg > 0.0 && mean_fg > 0.0 {
            (mean_fg - mean_bg) / (mean_fg.ln() - mean_bg.ln())
        } else {
            threshold
        };
        if (next - threshold).abs() < 0.5 {
            threshold = next;
            break;
        }
        threshold = next;
    }
    threshold.round().clamp(0.0, BINS as f64 - 1.0) as usize
}

/// Kittler & Illingworth's minimum-error threshold, modeling foreground and
/// background as two Gaussians and minimizing the classification error.
fn min_error_bin(bins: &[u64; BINS]) -> usize {
    let total: f64 = bins.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0;
    }
    let mut best_bin = otsu_bin(bins);
    let mut best_criterion = f64::INFINITY;

    for t in 1..BINS - 1 {
        let (mut weight_bg, mut sum_bg, mut sq_bg) = (0.0, 0.0, 0.0);
        let (mut weight_fg, mut sum_fg, mut sq_fg) = (0.0, 0.0, 0.0);
        for (i, &c) in bins.iter().enumerate() {
            let v = i as f64;
            if i <= t {
                weight_bg += c as f64;
                sum_bg += v * c as f64;
                sq_bg += v * v * c as f64;
            } else {
                weight_fg += c as f64;
                sum_fg += v * c as f64;
                sq_fg += v * v * c as f64;
            }
        }
        if weight_bg < 1.0 || weight_fg < 1.0 {
            continue;
        }
        let p_bg = weight_bg / total;
        let p_fg = weight_fg / total;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = sum_fg / weight_fg;
        let var_bg = (sq_bg / weight_bg - mean_bg * mean_bg).max(1e-6);
        let var_fg = (sq_fg / weight_fg - mean_fg * mean_fg).max(1e-6);

        let criterion = p_bg * var_bg.ln() + p_fg * var_fg.ln() - 2.0 * (p_bg * p_bg.ln() + p_fg * p_fg.ln());
        if criterion < best_criterion {
            best_criterion = criterion;
            best_bin = t;
        }
    }
    best_bin
}

/// Tsai's moment-preserving threshold: picks the gray level whose
/// cumulative distribution matches the first three moments of the image.
fn moments_bin(bins: &[u64; BINS]) -> usize {
    let total: f64 = bins.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0;
    }
    let normalized: Vec<f64> = bins.iter().map(|&c| c as f64 / total).collect();
    let m1: f64 = normalized.iter().enumerate().map(|(i, &p)| i as f64 * p).sum();
    let m2: f64 = normalized.iter().enumerate().map(|(i, &p)| (i as f64).powi(2) * p).sum();
    let m3: f64 = normalized.iter().enumerate().map(|(i, &p)| (i as f64).powi(3) * p).sum();

    let cd = m2 - m1 * m1;
    if cd.abs() < 1e-9 {
        return BINS / 2;
    }
    let c0 = (-m2 * m2 + m1 * m3) / cd;
    let c1 = (m1 * m2 - m3) / cd;
    let z0 = 0.5 * (-c1 - (c1 * c1 - 4.0 * c0).max(0.0).sqrt());
    let z1 = 0.5 * (-c1 + (c1 * c1 - 4.0 * c0).max(0.0).sqrt());
    let p0 = (z1 - m1) / (z1 - z0);

    let mut cumulative = 0.0;
    for (i, &p) in normalized.iter().enumerate() {
        cumulative += p;
        if cumulative >= p0 {
            return i;
        }
    }
    BINS - 1
}

impl Command for ThresholdCommand {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn input_type(&self) -> SlotType {
        SlotType::Image
    }

    fn output_type(&self) -> CommandOutput {
        CommandOutput::Binary
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), CommandError> {
        let image = ctx.require_image(self.name())?;

        let cut_value = match self.mode {
            ThresholdMode::Manual => self.manual_value,
            mode => {
                let (bins, depth_max) = histogram(image);
                let bin = match mode {
                    ThresholdMode::Otsu => otsu_bin(&bins),
                    ThresholdMode::Triangle => triangle_bin(&bins),
                    ThresholdMode::Li => li_bin(&bins),
                    ThresholdMode::MinError => min_error_bin(&bins),
                    ThresholdMode::Moments => moments_bin(&bins),
                    ThresholdMode::Manual => unreachable!(),
                };
                (bin as f32 / (BINS as f32 - 1.0)) * depth_max
            }
        };

        let mut mask = Mask::empty(image.width, image.height);
        for y in 0..image.height {
            for x in 0..image.width {
                if image.get(x, y, 0) >= cut_value {
                    mask.set(x, y, true);
                }
            }
        }
        ctx.slot = Intermediate::Binary(BinaryMask { mask, origin: image.origin });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use imagec_domain_model::{ImageBuffer, PixelDepth};

    use super::*;

    fn two_region_image() -> ImageBuffer {
        let mut image = ImageBuffer::new(10, 10, PixelDepth::U8, 1, (0, 0));
        for y in 0..10 {
            for x in 0..10 {
                let value = if x < 5 { 20.0 } else { 220.0 };
                image.set(x, y, 0, value);
            }
        }
        image
    }

    #[test]
    fn otsu_separates_two_clear_regions() {
        let image = two_region_image();
        let (bins, depth_max) = histogram(&image);
        let bin = otsu_bin(&bins);
        let cut = (bin as f32 / (BINS as f32 - 1.0)) * depth_max;
        assert!(cut > 20.0 && cut < 220.0);
    }

    #[test]
    fn manual_mode_ignores_the_histogram() {
        let image = two_region_image();
        let command = ThresholdCommand { mode: ThresholdMode::Manual, manual_value: 100.0 };
        assert_eq!(command.manual_value, 100.0);
        let _ = image;
    }

    #[test]
    fn moments_threshold_lands_between_the_two_regions() {
        let image = two_region_image();
        let (bins, depth_max) = histogram(&image);
        let bin = moments_bin(&bins);
        let cut = (bin as f32 / (BINS as f32 - 1.0)) * depth_max;
        assert!(cut > 0.0 && cut < 255.0);
    }
}
