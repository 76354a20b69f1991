//! A view over an image: position, window level, colour map and alpha.
//!
//! Several views may share one [`Image`].
//! State changes are announced to listeners as [`ViewEvent`]s,
//! except for the operations called with `silent` set.
use crate::colour_map::ColourMap;
use crate::error::{Result, UnknownPresetSnafu};
use crate::image::{Image, WindowPreset};
use crate::lut::{RescaleLut, WindowLut};
use crate::math::{Index, Point3D};
use crate::transform::WindowCenterAndWidth;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The name of the preset computed from the rescaled data range.
pub const MINMAX_PRESET: &str = "minmax";

/// The name given to window levels set without a preset.
pub const MANUAL_PRESET: &str = "manual";

/// A change of view state.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    WindowLevelChange {
        center: f64,
        width: f64,
        preset: String,
    },
    PositionChange {
        index: Index,
        position: Option<Point3D>,
    },
    ColourMapChange {
        colour_map: ColourMap,
    },
    AlphaFuncChange,
}

/// Handle of a registered listener.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct ListenerId(u64);

/// Opacity of a pixel, from its display value and buffer offset.
pub type AlphaFunction = Box<dyn Fn(f64, usize) -> u8 + Send + Sync>;

type Listener = Box<dyn FnMut(&ViewEvent) + Send>;

pub struct View {
    image: Arc<Image>,
    current_index: Index,
    window: WindowCenterAndWidth,
    preset_name: String,
    presets: Vec<WindowPreset>,
    colour_map: ColourMap,
    alpha: AlphaFunction,
    /// window tables, one per distinct rescale
    luts: HashMap<(u64, u64), WindowLut>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("View")
            .field("current_index", &self.current_index)
            .field("window", &self.window)
            .field("preset_name", &self.preset_name)
            .field("colour_map", &self.colour_map)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl View {
    /// Create a view at the first position of the image,
    /// with the first window preset of the image.
    pub fn new(image: Arc<Image>) -> Self {
        let mut presets = image.meta().window_presets.clone();
        if let Some(range) = image.rescaled_data_range() {
            let width = match range.max - range.min {
                w if w <= 0. => 1.,
                w => w,
            };
            presets.push(WindowPreset {
                name: MINMAX_PRESET.to_string(),
                wl: WindowCenterAndWidth::new(range.min + width / 2., width),
            });
        }
        let (window, preset_name) = match presets.first() {
            Some(preset) => (preset.wl, preset.name.clone()),
            None => (WindowCenterAndWidth::new(128., 256.), MANUAL_PRESET.to_string()),
        };
        let colour_map = if image.photometric_interpretation() == "MONOCHROME1" {
            ColourMap::InvPlain
        } else {
            ColourMap::Plain
        };
        let dimensions = image.geometry().size().len();
        View {
            current_index: Index::zeros(dimensions),
            image,
            window,
            preset_name,
            presets,
            colour_map,
            alpha: Box::new(|_, _| 255),
            luts: HashMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn image(&self) -> &Arc<Image> {
        &self.image
    }

    pub fn current_index(&self) -> &Index {
        &self.current_index
    }

    /// The world position of the current index.
    pub fn current_position(&self) -> Option<Point3D> {
        self.image.geometry().index_to_world(&self.current_index)
    }

    pub fn window_level(&self) -> &WindowCenterAndWidth {
        &self.window
    }

    pub fn current_preset_name(&self) -> &str {
        &self.preset_name
    }

    pub fn presets(&self) -> &[WindowPreset] {
        &self.presets
    }

    pub fn colour_map(&self) -> ColourMap {
        self.colour_map
    }

    /// Register a listener of view events.
    pub fn add_listener(&mut self, listener: impl FnMut(&ViewEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener, returning whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(i, _)| *i != id);
        self.listeners.len() != before
    }

    fn fire(&mut self, event: ViewEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Move to an index. Out of bounds indices are refused.
    pub fn set_current_index(&mut self, index: Index, silent: bool) -> bool {
        let geometry = self.image.geometry();
        if !geometry.is_in_bounds(&index) || self.image.slice_of_index(&index).is_none() {
            debug!("Refusing out of bounds index {}", index);
            return false;
        }
        let time = geometry.time_at(index.get(3));
        if time.map_or(true, |t| index.get(2) >= geometry.number_of_slices(t)) {
            return false;
        }
        if index == self.current_index {
            return true;
        }
        self.current_index = index;
        if !silent {
            let event = ViewEvent::PositionChange {
                index: self.current_index.clone(),
                position: self.current_position(),
            };
            self.fire(event);
        }
        true
    }

    /// Step one position forward along a dimension.
    pub fn increment_index(&mut self, dimension: usize, silent: bool) -> bool {
        let index = self
            .current_index
            .with(dimension, self.current_index.get(dimension) + 1);
        self.set_current_index(index, silent)
    }

    /// Step one position back along a dimension.
    pub fn decrement_index(&mut self, dimension: usize, silent: bool) -> bool {
        match self.current_index.get(dimension).checked_sub(1) {
            Some(value) => {
                let index = self.current_index.with(dimension, value);
                self.set_current_index(index, silent)
            }
            None => false,
        }
    }

    /// The dimension scrolled by default: slices, else time points.
    pub fn scroll_dimension(&self) -> usize {
        if !self.image.can_scroll(2) && self.image.can_scroll(3) {
            3
        } else {
            2
        }
    }

    pub fn increment_scroll_index(&mut self, silent: bool) -> bool {
        self.increment_index(self.scroll_dimension(), silent)
    }

    pub fn decrement_scroll_index(&mut self, silent: bool) -> bool {
        self.decrement_index(self.scroll_dimension(), silent)
    }

    /// Set the window level, leaving presets aside.
    pub fn set_window_level(&mut self, window: WindowCenterAndWidth, silent: bool) {
        self.apply_window_level(window, MANUAL_PRESET.to_string(), silent);
    }

    fn apply_window_level(&mut self, window: WindowCenterAndWidth, name: String, silent: bool) {
        let changed = !self.window.same_level(&window) || self.preset_name != name;
        self.window = window;
        self.preset_name = name;
        if changed && !silent {
            let event = ViewEvent::WindowLevelChange {
                center: window.center(),
                width: window.width(),
                preset: self.preset_name.clone(),
            };
            self.fire(event);
        }
    }

    /// Use the window level of a named preset.
    pub fn set_window_level_preset(&mut self, name: &str, silent: bool) -> Result<()> {
        let preset = self
            .presets
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| UnknownPresetSnafu { name }.build())?;
        self.apply_window_level(preset.wl, preset.name, silent);
        Ok(())
    }

    /// Use the window level of a preset given by its position.
    pub fn set_window_level_preset_by_id(&mut self, id: usize, silent: bool) -> Result<()> {
        let preset = self
            .presets
            .get(id)
            .cloned()
            .ok_or_else(|| UnknownPresetSnafu { name: format!("#{}", id) }.build())?;
        self.apply_window_level(preset.wl, preset.name, silent);
        Ok(())
    }

    /// Add a preset, or replace the one of the same name.
    pub fn add_window_level_preset(&mut self, preset: WindowPreset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    pub fn set_colour_map(&mut self, colour_map: ColourMap, silent: bool) {
        let changed = self.colour_map != colour_map;
        self.colour_map = colour_map;
        if changed && !silent {
            self.fire(ViewEvent::ColourMapChange { colour_map });
        }
    }

    pub fn set_alpha_function(
        &mut self,
        alpha: impl Fn(f64, usize) -> u8 + Send + Sync + 'static,
        silent: bool,
    ) {
        self.alpha = Box::new(alpha);
        if !silent {
            self.fire(ViewEvent::AlphaFuncChange);
        }
    }

    /// Render the current plane as RGBA bytes, row by row.
    pub fn generate_image_data(&mut self) -> Vec<u8> {
        let image = Arc::clone(&self.image);
        let size = image.geometry().size();
        let plane = size.plane_size();
        let mut out = Vec::with_capacity(plane * 4);
        let Some(slice) = image.slice_of_index(&self.current_index) else {
            return out;
        };
        let components = image.number_of_components();
        let base = slice * plane * components;

        if components == 3 {
            let planar = image.planar_configuration() == 1;
            for i in 0..plane {
                let rgb = if planar {
                    [base + i, base + plane + i, base + 2 * plane + i]
                } else {
                    [base + 3 * i, base + 3 * i + 1, base + 3 * i + 2]
                };
                for offset in rgb {
                    out.push(image.value_at_offset(offset).clamp(0., 255.) as u8);
                }
                out.push((self.alpha)(image.value_at_offset(rgb[0]), rgb[0]));
            }
            return out;
        }

        let lut = if image.can_window_level() {
            let rsi = image.rsi(slice);
            let meta = image.meta();
            let (bits_stored, signed) = (meta.bits_stored, meta.is_signed());
            let lut = self
                .luts
                .entry(rsi.key())
                .or_insert_with(|| WindowLut::new(RescaleLut::new(rsi, bits_stored), signed));
            lut.set_window_level(self.window);
            lut.update();
            Some(&*lut)
        } else {
            None
        };
        for offset in base..base + plane {
            let sample = image.value_at_offset(offset);
            let value = match lut {
                Some(lut) => lut.value(sample),
                None => sample,
            };
            let display = value.round().clamp(0., 255.) as u8;
            out.extend(self.colour_map.get(display));
            out.push((self.alpha)(value, offset));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::geometry::{Geometry, Size, Spacing};
    use crate::math::Matrix33;
    use std::sync::Mutex;

    fn image() -> Arc<Image> {
        let mut image = Image::new(
            Geometry::new(
                Point3D::new(0., 0., 1.),
                Size::new(vec![2, 2, 1]),
                Spacing::default(),
                Matrix33::IDENTITY,
                0,
            ),
            PixelBuffer::U8(vec![0, 100, 200, 255]),
            1,
        )
        .unwrap();
        let next = Image::new(
            Geometry::new(
                Point3D::new(0., 0., 0.),
                Size::new(vec![2, 2, 1]),
                Spacing::default(),
                Matrix33::IDENTITY,
                0,
            ),
            PixelBuffer::U8(vec![10, 10, 10, 10]),
            1,
        )
        .unwrap();
        image.append_slice(&next).unwrap();
        Arc::new(image)
    }

    #[test]
    fn minmax_preset() {
        let view = View::new(image());
        assert_eq!(view.current_preset_name(), MINMAX_PRESET);
        assert_eq!(view.window_level().width(), 255.);
        assert_eq!(view.window_level().center(), 127.5);
        assert_eq!(view.colour_map(), ColourMap::Plain);
    }

    #[test]
    fn index_bounds_are_never_clamped() {
        let mut view = View::new(image());
        assert!(!view.decrement_scroll_index(false));
        assert!(view.increment_scroll_index(false));
        assert_eq!(view.current_index(), &Index::new(vec![0, 0, 1]));
        assert!(!view.increment_scroll_index(false));
        assert_eq!(view.current_index(), &Index::new(vec![0, 0, 1]));
        assert!(!view.set_current_index(Index::new(vec![2, 0, 0]), false));
        assert!(!view.increment_index(3, false));
    }

    #[test]
    fn listeners_and_silent_operations() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut view = View::new(image());
        let sink = Arc::clone(&events);
        let id = view.add_listener(move |e| sink.lock().unwrap().push(e.clone()));

        view.set_window_level(WindowCenterAndWidth::new(50., 10.), true);
        view.increment_scroll_index(true);
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(view.current_preset_name(), MANUAL_PRESET);

        view.set_window_level_preset(MINMAX_PRESET, false).unwrap();
        view.set_colour_map(ColourMap::Hot, false);
        view.decrement_scroll_index(false);
        {
            let events = events.lock().unwrap();
            assert_eq!(events.len(), 3);
            assert!(matches!(events[0], ViewEvent::WindowLevelChange { ref preset, .. } if preset == MINMAX_PRESET));
            assert_eq!(events[1], ViewEvent::ColourMapChange { colour_map: ColourMap::Hot });
            assert!(matches!(events[2], ViewEvent::PositionChange { .. }));
        }
        assert!(view.set_window_level_preset("lung", false).is_err());
        assert!(view.set_window_level_preset_by_id(5, false).is_err());

        assert!(view.remove_listener(id));
        assert!(!view.remove_listener(id));
        view.set_colour_map(ColourMap::Plain, false);
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[test]
    fn image_data() {
        let mut view = View::new(image());
        view.set_window_level(WindowCenterAndWidth::new(128., 256.), true);
        let data = view.generate_image_data();
        assert_eq!(data.len(), 16);
        assert_eq!(&data[0..4], &[0, 0, 0, 255]);
        assert_eq!(&data[12..16], &[255, 255, 255, 255]);

        view.set_alpha_function(|v, _| if v > 0. { 255 } else { 0 }, true);
        view.set_colour_map(ColourMap::InvPlain, true);
        let data = view.generate_image_data();
        assert_eq!(&data[0..4], &[255, 255, 255, 0]);
    }
}
