//! Reproducible single-channel noise field for the strand mask texture.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::config::NoiseKind;

/// Generate `size * size` samples in `[0, 1]`, deterministic in `seed`.
pub fn generate(kind: NoiseKind, seed: u64, size: u32) -> Vec<f32> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let count = size as usize * size as usize;
    let mut samples = Vec::with_capacity(count);
    match kind {
        NoiseKind::Binary => {
            for _ in 0..count {
                samples.push(if rng.random::<bool>() { 1.0 } else { 0.0 });
            }
        }
        NoiseKind::Gaussian => {
            // Box-Muller pairs, remapped to mean 0.5 / sd 0.5 and clamped.
            while samples.len() < count {
                let u1 = rng.random::<f32>().max(f32::MIN_POSITIVE);
                let u2 = rng.random::<f32>();
                let r = (-2.0 * u1.ln()).sqrt();
                let (s, c) = (std::f32::consts::TAU * u2).sin_cos();
                samples.push((0.5 + 0.5 * r * c).clamp(0.0, 1.0));
                if samples.len() < count {
                    samples.push((0.5 + 0.5 * r * s).clamp(0.0, 1.0));
                }
            }
        }
    }
    samples
}

/// Quantize `[0, 1]` samples to `R8Unorm` texels.
pub fn quantize(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .map(|s| (s.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_the_field() {
        let a = generate(NoiseKind::Binary, 7, 16);
        let b = generate(NoiseKind::Binary, 7, 16);
        assert_eq!(a, b);
        let c = generate(NoiseKind::Gaussian, 7, 16);
        let d = generate(NoiseKind::Gaussian, 7, 16);
        assert_eq!(c, d);
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate(NoiseKind::Binary, 1, 32);
        let b = generate(NoiseKind::Binary, 2, 32);
        assert_ne!(a, b);
    }

    #[test]
    fn binary_samples_are_zero_or_one() {
        let field = generate(NoiseKind::Binary, 3, 32);
        assert_eq!(field.len(), 32 * 32);
        assert!(field.iter().all(|&s| s == 0.0 || s == 1.0));
        // Both values occur in any reasonably sized field.
        assert!(field.iter().any(|&s| s == 0.0));
        assert!(field.iter().any(|&s| s == 1.0));
    }

    #[test]
    fn gaussian_samples_stay_in_range() {
        let field = generate(NoiseKind::Gaussian, 3, 32);
        assert_eq!(field.len(), 32 * 32);
        assert!(field.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn quantize_maps_endpoints() {
        assert_eq!(quantize(&[0.0, 1.0, 0.5]), vec![0, 255, 128]);
    }
}
