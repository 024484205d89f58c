use imagec_domain_model::IntensityStats;

/// Reduces pixel intensities (in the row-major order the caller iterates
/// them) to `{sum, min, max, avg, median, stddev}`.
///
/// Median of an even-sized sample is the lower-middle element
/// (`sorted[(n-1)/2]`); standard deviation uses Bessel's correction
/// (divide by `n-1`) and is `0.0` for `n <= 1` rather than `NaN`.
pub fn reduce_intensity(values: impl Iterator<Item = f64>) -> IntensityStats {
    let samples: Vec<f64> = values.collect();
    let count = samples.len();

    if count == 0 {
        return IntensityStats { sum: 0.0, min: 0.0, max: 0.0, avg: 0.0, median: 0.0, stddev: 0.0 };
    }

    let sum: f64 = samples.iter().sum();
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = sum / count as f64;

    let mut sorted = samples.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = sorted[(count - 1) / 2];

    let stddev = if count <= 1 {
        0.0
    } else {
        let variance: f64 = samples.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    };

    IntensityStats { sum, min, max, avg, median, stddev }
}
