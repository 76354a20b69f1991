//! Pixel value transformations: modality rescale and window level.
use tracing::debug;

/// Linear transformation from stored pixel values to modality values:
/// `y = slope * x + intercept`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RescaleSlopeAndIntercept {
    pub slope: f64,
    pub intercept: f64,
}

impl Default for RescaleSlopeAndIntercept {
    fn default() -> Self {
        RescaleSlopeAndIntercept::IDENTITY
    }
}

impl RescaleSlopeAndIntercept {
    pub const IDENTITY: RescaleSlopeAndIntercept = RescaleSlopeAndIntercept {
        slope: 1.,
        intercept: 0.,
    };

    #[inline]
    pub fn new(slope: f64, intercept: f64) -> Self {
        RescaleSlopeAndIntercept { slope, intercept }
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.slope + self.intercept
    }

    pub fn is_identity(&self) -> bool {
        self.slope == 1. && self.intercept == 0.
    }

    /// A hashable identity of the transformation,
    /// equal for bitwise equal parameters.
    pub fn key(&self) -> (u64, u64) {
        (self.slope.to_bits(), self.intercept.to_bits())
    }
}

/// A window level in modality value space,
/// mapped linearly onto the output range `[ymin, ymax]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowCenterAndWidth {
    center: f64,
    width: f64,
    /// added to the center before evaluation, used for signed data
    signed_offset: f64,
    ymin: f64,
    ymax: f64,
}

impl WindowCenterAndWidth {
    /// Create a window level with the default output range `[0, 255]`.
    ///
    /// A width below 1 is replaced with 1.
    pub fn new(center: f64, width: f64) -> Self {
        let width = if width < 1. {
            debug!("Window width {} is below 1, using 1", width);
            1.
        } else {
            width
        };
        WindowCenterAndWidth {
            center,
            width,
            signed_offset: 0.,
            ymin: 0.,
            ymax: 255.,
        }
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn signed_offset(&self) -> f64 {
        self.signed_offset
    }

    pub fn range(&self) -> (f64, f64) {
        (self.ymin, self.ymax)
    }

    pub fn with_signed_offset(mut self, offset: f64) -> Self {
        self.signed_offset = offset;
        self
    }

    pub fn with_range(mut self, ymin: f64, ymax: f64) -> Self {
        self.ymin = ymin;
        self.ymax = ymax;
        self
    }

    /// The lowest input value mapped above `ymin`.
    pub fn lower_bound(&self) -> f64 {
        self.center + self.signed_offset - 0.5 - (self.width - 1.) / 2.
    }

    /// The highest input value mapped below `ymax`.
    pub fn upper_bound(&self) -> f64 {
        self.center + self.signed_offset - 0.5 + (self.width - 1.) / 2.
    }

    pub fn apply(&self, value: f64) -> f64 {
        let center = self.center + self.signed_offset;
        if value <= self.lower_bound() {
            self.ymin
        } else if value > self.upper_bound() {
            self.ymax
        } else {
            ((value - (center - 0.5)) / (self.width - 1.) + 0.5) * (self.ymax - self.ymin)
                + self.ymin
        }
    }

    /// Whether both windows have the same center and width.
    pub fn same_level(&self, other: &WindowCenterAndWidth) -> bool {
        self.center == other.center && self.width == other.width
    }

    pub(crate) fn key(&self) -> [u64; 5] {
        [
            self.center.to_bits(),
            self.width.to_bits(),
            self.signed_offset.to_bits(),
            self.ymin.to_bits(),
            self.ymax.to_bits(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn rescale_identity() {
        let rsi = RescaleSlopeAndIntercept::default();
        assert!(rsi.is_identity());
        for v in [-1024., -1., 0., 0.5, 1., 4095., 1e9] {
            assert_eq!(rsi.apply(v), v);
        }
        let ct = RescaleSlopeAndIntercept::new(1., -1024.);
        assert!(!ct.is_identity());
        assert_eq!(ct.apply(1024.), 0.);
        assert_ne!(ct.key(), rsi.key());
    }

    #[test]
    fn window_128_256() {
        let window = WindowCenterAndWidth::new(128., 256.);
        assert_eq!(window.apply(0.), 0.);
        assert_eq!(window.apply(255.), 255.);
        assert!((window.apply(128.) - 128.).abs() < 1.);
    }

    #[rstest]
    #[case(128., 256.)]
    #[case(40., 400.)]
    #[case(-600., 1500.)]
    #[case(10., 1.)]
    #[case(0.5, 2.)]
    fn boundary_law(#[case] center: f64, #[case] width: f64) {
        let window = WindowCenterAndWidth::new(center, width);
        let low = center - 0.5 - (width - 1.) / 2.;
        let high = center - 0.5 + (width - 1.) / 2.;
        for x in [low, low - 0.25, low - 1., low - 1000.] {
            assert_eq!(window.apply(x), 0., "x = {}", x);
        }
        for x in [high + 0.25, high + 1., high + 1000.] {
            assert_eq!(window.apply(x), 255., "x = {}", x);
        }
    }

    #[rstest]
    #[case(0.)]
    #[case(-5.)]
    fn degenerate_width_is_one(#[case] width: f64) {
        let window = WindowCenterAndWidth::new(100., width);
        assert_eq!(window.width(), 1.);
        assert_eq!(window.apply(99.5), 0.);
        assert_eq!(window.apply(100.), 255.);
    }

    #[test]
    fn signed_offset_shifts_window() {
        let window = WindowCenterAndWidth::new(0., 100.).with_signed_offset(50.);
        assert_eq!(window.lower_bound(), 0.);
        assert_eq!(window.apply(0.), 0.);
        assert_eq!(window.apply(100.), 255.);
    }

    #[test]
    fn custom_range() {
        let window = WindowCenterAndWidth::new(128., 256.).with_range(10., 20.);
        assert_eq!(window.apply(-1.), 10.);
        assert_eq!(window.apply(1000.), 20.);
    }
}
