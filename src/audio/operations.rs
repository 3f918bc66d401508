use itertools::izip;

#[inline]
pub fn scale_samples(buffer: &mut [f64], scale: f64) {
    for sample in buffer.iter_mut() {
        *sample *= scale;
    }
}

#[inline]
pub fn add_samples(buffer: &mut [f64], other: &[f64]) {
    assert!(buffer.len() == other.len());
    for (sample, other) in buffer.iter_mut().zip(other.iter()) {
        *sample += other;
    }
}

/// Adds the product of `a` and `b`, multiplied by `scale`, to the samples in `buffer`.
#[inline]
pub fn add_product_scaled(buffer: &mut [f64], a: &[f64], b: &[f64], scale: f64) {
    assert!(buffer.len() == a.len() && a.len() == b.len());
    for (sample, a, b) in izip!(buffer.iter_mut(), a, b) {
        *sample += a * b * scale;
    }
}

/// Returns the largest absolute sample value, or zero for an empty buffer.
pub fn peak(buffer: &[f64]) -> f64 {
    buffer.iter().fold(0.0, |peak, s| f64::max(peak, s.abs()))
}
