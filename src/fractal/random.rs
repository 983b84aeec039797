use rand::Rng;

/// Source of the uniform samples the fractal draws while growing.
pub trait RandomSource {
    /// Uniform in `[min, max]`. Returns `min` if the range is empty.
    fn range(&mut self, min: f32, max: f32) -> f32;

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f32;

    /// Uniform in `0..len`. `len` must not be zero.
    fn index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if !(min <= max) {
            return min;
        }
        // rand rejects ranges whose scaled width is not finite
        if ((max - min) * 2.0).is_finite() {
            return self.random_range(min..=max);
        }
        let t = self.random::<f32>();
        (min * (1.0 - t) + max * t).clamp(min, max)
    }

    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}
