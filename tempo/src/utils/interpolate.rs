/// Trait for mapping a normalized progress onto a numeric range.
pub trait Interpolate {
    /// Linearly interpolates from `self` to `target`.
    ///
    /// This is the mapping of an eased (0 - 1) value onto an arbitrary range:
    /// `self + (target - self) * progress`. Integer results are truncated.
    ///
    /// # Parameters
    /// * `self`:  the initial value (returned for progress 0)
    /// * `target`:  the target value (returned for progress 1)
    /// * `progress`:  the normalized progress, usually the eased value of an animation frame
    ///
    /// # Example
    /// ```
    /// use tempo::utils::Interpolate;
    /// assert_eq!(0u8.interpolate(200, 0.5), 100);
    /// assert_eq!(10.0f64.interpolate(20.0, 0.25), 12.5);
    /// ```
    fn interpolate(self, target: Self, progress: f64) -> Self;
}

macro_rules! impl_interpolate {
    ($($variant:ty),*) => {
        $(
            impl Interpolate for $variant {
                fn interpolate(self, target: Self, progress: f64) -> Self {
                    (self as f64 + (target as f64 - self as f64) * progress) as Self
                }
            }
        )*
    };
}

// Implement trait for all number types.
impl_interpolate!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
