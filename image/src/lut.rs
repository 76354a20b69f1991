//! Look-up tables of the pixel value pipeline.
//!
//! A [`RescaleLut`] maps stored sample values to modality values,
//! a [`WindowLut`] maps them further to display values.
//! Both tables are pure functions of their parameters:
//! a table is rebuilt whenever its parameters change
//! and never read while stale.

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::trace;

use crate::transform::{RescaleSlopeAndIntercept, WindowCenterAndWidth};

/// Tables are only built for sample values of at most this many bits,
/// larger values are transformed on the fly.
pub const MAX_TABLE_BITS: u16 = 16;

/// Fill a table of `size` entries with the outputs of `f`.
/// The function may be called concurrently.
fn build_table(size: usize, f: impl Fn(usize) -> f64 + Sync + Send) -> Vec<f64> {
    #[cfg(feature = "rayon")]
    let iter = (0..size).into_par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = 0..size;

    iter.map(f).collect()
}

/// The identity of a window table:
/// rescale, window level, bits stored and signedness.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct LutKey {
    rsi: (u64, u64),
    window: [u64; 5],
    bits_stored: u16,
    signed: bool,
}

impl LutKey {
    pub fn new(
        rsi: &RescaleSlopeAndIntercept,
        window: &WindowCenterAndWidth,
        bits_stored: u16,
        signed: bool,
    ) -> Self {
        LutKey {
            rsi: rsi.key(),
            window: window.key(),
            bits_stored,
            signed,
        }
    }
}

/// Rescale look-up table of length `2^bits_stored`,
/// where `table[i] = slope * i + intercept`.
#[derive(Debug, Clone)]
pub struct RescaleLut {
    rsi: RescaleSlopeAndIntercept,
    bits_stored: u16,
    table: Option<Vec<f64>>,
}

impl RescaleLut {
    pub fn new(rsi: RescaleSlopeAndIntercept, bits_stored: u16) -> Self {
        RescaleLut {
            rsi,
            bits_stored,
            table: None,
        }
    }

    pub fn rsi(&self) -> &RescaleSlopeAndIntercept {
        &self.rsi
    }

    pub fn bits_stored(&self) -> u16 {
        self.bits_stored
    }

    /// The number of entries of the table, `2^bits_stored`.
    pub fn len(&self) -> usize {
        1_usize << u32::from(self.bits_stored.min(63))
    }

    /// Whether no table entry is stored yet,
    /// either before [`initialise`](Self::initialise)
    /// or because the table would be too large to build.
    pub fn is_empty(&self) -> bool {
        self.table.as_ref().map_or(true, Vec::is_empty)
    }

    pub fn is_ready(&self) -> bool {
        self.table.is_some()
    }

    /// Build the table. Calling this more than once is harmless.
    pub fn initialise(&mut self) {
        if self.table.is_some() || self.bits_stored > MAX_TABLE_BITS {
            return;
        }
        let rsi = self.rsi;
        trace!("Building rescale table of {} entries", self.len());
        self.table = Some(build_table(self.len(), move |i| rsi.apply(i as f64)));
    }

    /// The rescaled value of a table offset.
    /// Offsets outside the table are computed directly.
    pub fn value(&self, offset: usize) -> f64 {
        match self.table.as_ref().and_then(|t| t.get(offset)) {
            Some(v) => *v,
            None => self.rsi.apply(offset as f64),
        }
    }
}

/// Window look-up table, from stored sample values to display values,
/// composing a rescale with a window level.
///
/// For signed data the table is indexed from the most negative
/// representable value, and the window is shifted accordingly.
#[derive(Debug, Clone)]
pub struct WindowLut {
    rescale: RescaleLut,
    signed: bool,
    window: Option<WindowCenterAndWidth>,
    table: Option<Vec<f64>>,
    built_for: Option<LutKey>,
}

impl WindowLut {
    pub fn new(rescale: RescaleLut, signed: bool) -> Self {
        WindowLut {
            rescale,
            signed,
            window: None,
            table: None,
            built_for: None,
        }
    }

    pub fn rescale(&self) -> &RescaleLut {
        &self.rescale
    }

    pub fn rsi(&self) -> &RescaleSlopeAndIntercept {
        self.rescale.rsi()
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The window level as given, without the signed offset.
    pub fn window_level(&self) -> Option<&WindowCenterAndWidth> {
        self.window.as_ref()
    }

    /// Change the window level. The table is rebuilt on the next update.
    pub fn set_window_level(&mut self, window: WindowCenterAndWidth) {
        self.window = Some(window);
    }

    fn signed_shift(&self) -> usize {
        if self.signed {
            self.rescale.len() / 2
        } else {
            0
        }
    }

    /// The window level the table evaluates, shifted for signed data.
    fn effective_window(&self) -> Option<WindowCenterAndWidth> {
        let shift = self.signed_shift() as f64;
        self.window
            .map(|w| w.with_signed_offset(self.rescale.rsi().slope * shift))
    }

    fn key(&self) -> Option<LutKey> {
        self.effective_window().map(|w| {
            LutKey::new(
                self.rescale.rsi(),
                &w,
                self.rescale.bits_stored(),
                self.signed,
            )
        })
    }

    /// Whether the table matches the current parameters.
    pub fn is_ready(&self) -> bool {
        self.table.is_some() && self.built_for.is_some() && self.built_for == self.key()
    }

    /// Rebuild the table if its parameters changed.
    pub fn update(&mut self) {
        if self.is_ready() || self.rescale.bits_stored() > MAX_TABLE_BITS {
            return;
        }
        let Some(window) = self.effective_window() else {
            return;
        };
        self.rescale.initialise();
        let rescale = &self.rescale;
        trace!(
            "Building window table for center {} width {}",
            window.center(),
            window.width()
        );
        self.table = Some(build_table(rescale.len(), |i| window.apply(rescale.value(i))));
        self.built_for = self.key();
    }

    /// The display value of a stored sample value.
    ///
    /// The table is used when it is up to date,
    /// otherwise the value is computed directly.
    pub fn value(&self, sample: f64) -> f64 {
        let shift = self.signed_shift();
        if self.is_ready() && sample.fract() == 0. {
            let offset = sample + shift as f64;
            if offset >= 0. {
                if let Some(v) = self.table.as_ref().and_then(|t| t.get(offset as usize)) {
                    return *v;
                }
            }
        }
        match self.window {
            Some(window) => window.apply(self.rescale.rsi().apply(sample)),
            None => self.rescale.rsi().apply(sample),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_table() {
        let mut lut = RescaleLut::new(RescaleSlopeAndIntercept::new(2., -10.), 8);
        assert!(!lut.is_ready());
        assert!(lut.is_empty());
        assert_eq!(lut.len(), 256);
        lut.initialise();
        assert!(lut.is_ready());
        assert!(!lut.is_empty());
        assert_eq!(lut.value(0), -10.);
        assert_eq!(lut.value(255), 500.);
    }

    #[test]
    fn oversized_rescale_table_stays_empty() {
        let mut lut = RescaleLut::new(RescaleSlopeAndIntercept::new(2., 1.), MAX_TABLE_BITS + 1);
        lut.initialise();
        assert!(lut.is_empty());
        assert!(!lut.is_ready());
        assert_eq!(lut.value(3), 7.);
    }

    #[test]
    fn window_table_is_rebuilt_on_change() {
        let rescale = RescaleLut::new(RescaleSlopeAndIntercept::IDENTITY, 8);
        let mut lut = WindowLut::new(rescale, false);
        lut.set_window_level(WindowCenterAndWidth::new(128., 256.));
        assert!(!lut.is_ready());
        lut.update();
        assert!(lut.is_ready());
        assert_eq!(lut.value(0.), 0.);
        assert_eq!(lut.value(255.), 255.);

        lut.set_window_level(WindowCenterAndWidth::new(50., 1.));
        assert!(!lut.is_ready());
        // stale table is not used
        assert_eq!(lut.value(100.), 255.);
        assert_eq!(lut.value(10.), 0.);
        lut.update();
        assert!(lut.is_ready());
        assert_eq!(lut.value(100.), 255.);
        assert_eq!(lut.value(10.), 0.);
    }

    #[test]
    fn signed_table_matches_direct_values() {
        let rsi = RescaleSlopeAndIntercept::new(1., -1024.);
        let window = WindowCenterAndWidth::new(40., 400.);
        let mut lut = WindowLut::new(RescaleLut::new(rsi, 12), true);
        lut.set_window_level(window);
        lut.update();
        assert!(lut.is_ready());
        for sample in [-2048., -500., 0., 1000., 1064., 1200., 2047.] {
            let expected = window.apply(rsi.apply(sample));
            assert!(
                (lut.value(sample) - expected).abs() < 1e-9,
                "sample {}: {} vs {}",
                sample,
                lut.value(sample),
                expected
            );
        }
    }

    #[test]
    fn wide_samples_are_computed_directly() {
        let mut lut = WindowLut::new(RescaleLut::new(RescaleSlopeAndIntercept::IDENTITY, 32), false);
        lut.set_window_level(WindowCenterAndWidth::new(128., 256.));
        lut.update();
        assert!(!lut.is_ready());
        assert_eq!(lut.value(1e6), 255.);
    }
}
