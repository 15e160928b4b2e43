use std::f32::consts::TAU;

/// Number of radius samples around a bubble outline
pub const SURFACE_SAMPLES: usize = 100;

/// Deepest allowed dent, as a fraction of the bubble radius
pub const MAX_DEPRESSION: f32 = 0.70;

/// Smoothing kernel: (offset, weight). Weights sum to 1.
const KERNEL: [(isize, f32); 5] = [(-2, 0.1), (-1, 0.25), (0, 0.3), (1, 0.25), (2, 0.1)];

/// Angular distance between two outline samples
pub const SAMPLE_ANGLE: f32 = TAU / SURFACE_SAMPLES as f32;

/// Smooth a closed ring of samples `fuzz` times with the 5-tap kernel.
///
/// Indexing wraps around, so the first and last samples are neighbors.
pub fn smooth_ring<const N: usize>(ring: &[f32; N], fuzz: usize) -> [f32; N] {
    let mut current = *ring;
    if N == 0 {
        return current;
    }

    for _ in 0..fuzz {
        let mut next = [0.0; N];
        for (n, out) in next.iter_mut().enumerate() {
            *out = KERNEL
                .iter()
                .map(|&(offset, weight)| {
                    let idx = (n as isize + offset).rem_euclid(N as isize) as usize;
                    current[idx] * weight
                })
                .sum();
        }
        current = next;
    }

    current
}

/// A local dent caused by an overlapping neighbor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poke {
    /// How far the neighbor reaches into this outline
    pub depth: f32,
    /// Direction of the neighbor (radians, world frame)
    pub angle: f32,
    /// Center-to-center distance
    pub distance: f32,
    /// Radius of the neighbor
    pub other_radius: f32,
}

impl Poke {
    /// Angular half-width of the overlap lens, from the law of cosines.
    ///
    /// `None` when the circles don't intersect in a lens (one contains the
    /// other, or the centers coincide).
    pub fn half_width(&self, radius: f32) -> Option<f32> {
        let d = self.distance;
        if !(d > 0.0) || !(radius > 0.0) {
            return None;
        }
        let cos_w = (d * d + radius * radius - self.other_radius * self.other_radius)
            / (2.0 * d * radius);
        let w = cos_w.acos();
        (w.is_finite() && w > 0.0).then_some(w)
    }

    /// Depression at angle `theta` for an outline of the given radius
    fn depression(&self, theta: f32, half_width: f32, radius: f32) -> f32 {
        let wx = (theta - self.angle) / half_width;
        let falloff = (1.57 * wx).cos().max(0.0);
        (falloff.powf(0.25) * self.depth).min(radius * MAX_DEPRESSION)
    }

    /// Subtract this dent from an outline ring of the given base radius
    pub fn apply(&self, ring: &mut [f32; SURFACE_SAMPLES], radius: f32) {
        if !(self.depth > 0.0) || !self.angle.is_finite() {
            return;
        }
        let Some(half_width) = self.half_width(radius) else {
            return;
        };

        let center = (self.angle / SAMPLE_ANGLE).round() as isize;
        let reach = (half_width / SAMPLE_ANGLE + 0.5).floor() as isize;

        for n in (center - reach)..=(center + reach) {
            let idx = n.rem_euclid(SURFACE_SAMPLES as isize) as usize;
            ring[idx] -= self.depression(n as f32 * SAMPLE_ANGLE, half_width, radius);
        }
    }
}

/// Index of the outline sample facing `angle`
pub fn sample_index(angle: f32) -> usize {
    if !angle.is_finite() {
        return 0;
    }
    let n = (angle / SAMPLE_ANGLE).floor() as isize;
    n.rem_euclid(SURFACE_SAMPLES as isize) as usize
}
