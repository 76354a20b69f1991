//! Colour maps from display values to RGB.
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

/// A 256-entry RGB table.
pub type ColourTable = [[u8; 3]; 256];

/// The control points of one channel: (input, output) pairs
/// with increasing inputs, from 0 to 255.
type Ramp = &'static [(u8, u8)];

/// Linear interpolation between the control points of a channel.
fn interpolate(ramp: Ramp, x: u8) -> u8 {
    let x = f64::from(x);
    for w in ramp.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        let (x0, y0, x1, y1) = (f64::from(x0), f64::from(y0), f64::from(x1), f64::from(y1));
        if x <= x1 {
            if x1 == x0 {
                return y1 as u8;
            }
            return (y0 + (x - x0) * (y1 - y0) / (x1 - x0)).round() as u8;
        }
    }
    ramp.last().map(|p| p.1).unwrap_or(0)
}

fn build(red: Ramp, green: Ramp, blue: Ramp) -> ColourTable {
    let mut table = [[0; 3]; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let x = i as u8;
        *entry = [interpolate(red, x), interpolate(green, x), interpolate(blue, x)];
    }
    table
}

const UP: Ramp = &[(0, 0), (255, 255)];
const DOWN: Ramp = &[(0, 255), (255, 0)];

static PLAIN: Lazy<ColourTable> = Lazy::new(|| build(UP, UP, UP));
static INV_PLAIN: Lazy<ColourTable> = Lazy::new(|| build(DOWN, DOWN, DOWN));
static RAINBOW: Lazy<ColourTable> = Lazy::new(|| {
    build(
        &[(0, 0), (128, 0), (192, 255), (255, 255)],
        &[(0, 0), (64, 255), (192, 255), (255, 0)],
        &[(0, 255), (64, 255), (128, 0), (255, 0)],
    )
});
static HOT: Lazy<ColourTable> = Lazy::new(|| {
    build(
        &[(0, 0), (85, 255), (255, 255)],
        &[(0, 0), (85, 0), (170, 255), (255, 255)],
        &[(0, 0), (170, 0), (255, 255)],
    )
});
static HOT_IRON: Lazy<ColourTable> = Lazy::new(|| {
    build(
        &[(0, 0), (127, 254), (128, 255), (255, 255)],
        &[(0, 0), (127, 0), (255, 254)],
        &[(0, 0), (191, 0), (255, 252)],
    )
});
static PET: Lazy<ColourTable> = Lazy::new(|| {
    build(
        &[(0, 0), (64, 0), (128, 255), (255, 255)],
        &[(0, 0), (128, 0), (255, 255)],
        &[(0, 0), (64, 255), (128, 0), (192, 0), (255, 255)],
    )
});
static HOT_METAL_BLUE: Lazy<ColourTable> = Lazy::new(|| {
    build(
        &[(0, 0), (85, 0), (170, 255), (255, 255)],
        &[(0, 0), (170, 0), (255, 255)],
        &[(0, 0), (42, 85), (85, 170), (128, 85), (170, 0), (213, 0), (255, 255)],
    )
});

/// The colours of the 20 step PET map, from low to high values.
const PET_STEPS: [[u8; 3]; 20] = [
    [0, 0, 0],
    [0, 0, 85],
    [0, 0, 170],
    [0, 0, 255],
    [0, 85, 255],
    [0, 170, 255],
    [0, 255, 255],
    [0, 255, 170],
    [0, 255, 85],
    [0, 255, 0],
    [85, 255, 0],
    [170, 255, 0],
    [255, 255, 0],
    [255, 212, 0],
    [255, 170, 0],
    [255, 127, 0],
    [255, 85, 0],
    [255, 0, 0],
    [255, 127, 127],
    [255, 255, 255],
];

static PET_20_STEP: Lazy<ColourTable> = Lazy::new(|| {
    let mut table = [[0; 3]; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = PET_STEPS[i * PET_STEPS.len() / 256];
    }
    table
});

/// The available colour maps.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ColourMap {
    /// Grey levels, black to white.
    #[default]
    Plain,
    /// Grey levels, white to black.
    InvPlain,
    Rainbow,
    Hot,
    HotIron,
    Pet,
    HotMetalBlue,
    Pet20Step,
}

impl ColourMap {
    pub const ALL: [ColourMap; 8] = [
        ColourMap::Plain,
        ColourMap::InvPlain,
        ColourMap::Rainbow,
        ColourMap::Hot,
        ColourMap::HotIron,
        ColourMap::Pet,
        ColourMap::HotMetalBlue,
        ColourMap::Pet20Step,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColourMap::Plain => "plain",
            ColourMap::InvPlain => "invPlain",
            ColourMap::Rainbow => "rainbow",
            ColourMap::Hot => "hot",
            ColourMap::HotIron => "hot_iron",
            ColourMap::Pet => "pet",
            ColourMap::HotMetalBlue => "hot_metal_blue",
            ColourMap::Pet20Step => "pet_20step",
        }
    }

    pub fn table(self) -> &'static ColourTable {
        match self {
            ColourMap::Plain => &PLAIN,
            ColourMap::InvPlain => &INV_PLAIN,
            ColourMap::Rainbow => &RAINBOW,
            ColourMap::Hot => &HOT,
            ColourMap::HotIron => &HOT_IRON,
            ColourMap::Pet => &PET,
            ColourMap::HotMetalBlue => &HOT_METAL_BLUE,
            ColourMap::Pet20Step => &PET_20_STEP,
        }
    }

    #[inline]
    pub fn get(self, value: u8) -> [u8; 3] {
        self.table()[usize::from(value)]
    }
}

impl fmt::Display for ColourMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColourMap {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColourMap::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grey_maps() {
        assert_eq!(ColourMap::Plain.get(0), [0, 0, 0]);
        assert_eq!(ColourMap::Plain.get(200), [200, 200, 200]);
        assert_eq!(ColourMap::InvPlain.get(0), [255, 255, 255]);
        assert_eq!(ColourMap::InvPlain.get(255), [0, 0, 0]);
    }

    #[test]
    fn colour_ends() {
        assert_eq!(ColourMap::Hot.get(0), [0, 0, 0]);
        assert_eq!(ColourMap::Hot.get(255), [255, 255, 255]);
        assert_eq!(ColourMap::Rainbow.get(0), [0, 0, 255]);
        assert_eq!(ColourMap::Rainbow.get(255), [255, 0, 0]);
        assert_eq!(ColourMap::Pet20Step.get(0), [0, 0, 0]);
        assert_eq!(ColourMap::Pet20Step.get(255), [255, 255, 255]);
    }

    #[test]
    fn names() {
        for map in ColourMap::ALL {
            assert_eq!(map.name().parse::<ColourMap>(), Ok(map));
        }
        assert!("viridis".parse::<ColourMap>().is_err());
    }
}
