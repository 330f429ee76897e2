//! Conversion of raw channel counts into color quantities.
//!
//! Every conversion is total: degenerate inputs (division by zero, non-finite powers) produce
//! `None` rather than a NaN or a panic.

/// Full scale of a 16-bit channel count.
const FULL_SCALE: f32 = 65535.0;

/// Correlated color temperature from the `(R - B) / G` ratio.
///
/// Returns `None` when green is zero or when the power law has no finite result, i.e. when
/// the ratio plus `offset` is zero or negative.
pub fn cct_from_ratio(red: u16, green: u16, blue: u16, offset: f32) -> Option<f32> {
    if green == 0 {
        return None;
    }

    let ccti = (red as f32 - blue as f32) / green as f32 + offset;
    finite(4278.6 * libm::powf(ccti, -1.2455))
}

/// Correlated color temperature using McCamy's approximation.
///
/// The channels are first projected into XYZ tristimulus space using the sensor specific
/// correlation matrix. Returns `None` if any step is not finite, for example when the
/// chromaticity `y` sits exactly at the epicenter.
pub fn cct_mccamy(red: u16, green: u16, blue: u16) -> Option<f32> {
    let (x, y) = chromaticity(red, green, blue)?;
    let n = (x - 0.3320) / (0.1858 - y);
    finite(449.0 * n * n * n + 3525.0 * n * n + 6823.3 * n + 5520.33)
}

/// CIE 1931 chromaticity coordinates `(x, y)`, or `None` if the tristimulus sum is zero.
pub fn chromaticity(red: u16, green: u16, blue: u16) -> Option<(f32, f32)> {
    let (x, y, z) = tristimulus(red, green, blue);
    let total = x + y + z;
    if total == 0.0 {
        return None;
    }

    Some((x / total, y / total))
}

pub(crate) fn tristimulus(red: u16, green: u16, blue: u16) -> (f32, f32, f32) {
    let (r, g, b) = (red as f32, green as f32, blue as f32);
    let x = -0.023249 * r + 0.291014 * g - 0.364880 * b;
    let y = -0.042799 * r + 0.272148 * g - 0.279591 * b;
    let z = -0.155901 * r + 0.251534 * g - 0.076240 * b;
    (x, y, z)
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

/// Hue, saturation, value triple.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`. Achromatic colors report a hue of 0.
    pub hue: f32,
    /// Saturation, `[0, 1]`.
    pub sat: f32,
    /// Value, `[0, 1]`.
    pub val: f32,
}

impl Hsv {
    /// Convert full-scale 16-bit channel counts.
    pub fn from_rgb(red: u16, green: u16, blue: u16) -> Self {
        let r = red as f32 / FULL_SCALE;
        let g = green as f32 / FULL_SCALE;
        let b = blue as f32 / FULL_SCALE;

        let high = r.max(g).max(b);
        let low = r.min(g).min(b);
        let delta = high - low;

        let sat = if high == 0.0 { 0.0 } else { delta / high };

        let sector = if delta == 0.0 {
            0.0
        } else if high == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if high == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };

        Self {
            hue: wrap_degrees(sector * 60.0),
            sat,
            val: high,
        }
    }
}

/// Wrap an angle into `[0, 360)`.
pub(crate) fn wrap_degrees(degrees: f32) -> f32 {
    let mut wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped += 360.0;
    }

    // A tiny negative input can round up to exactly 360 after the correction above.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Coarse hue names, one per 60° sector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum HueName {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
}

impl HueName {
    const ALL: [HueName; 6] = [
        HueName::Red,
        HueName::Yellow,
        HueName::Green,
        HueName::Cyan,
        HueName::Blue,
        HueName::Magenta,
    ];

    /// The name whose anchor hue is circularly closest to `hue` (degrees).
    ///
    /// On a tie the anchor that comes first in the red, yellow, green, cyan, blue, magenta
    /// order wins.
    pub fn closest(hue: f32) -> Self {
        let mut best = Self::ALL[0];
        let mut best_distance = circular_distance(hue, best.anchor());

        for name in Self::ALL.into_iter().skip(1) {
            let distance = circular_distance(hue, name.anchor());
            if distance < best_distance {
                best = name;
                best_distance = distance;
            }
        }

        best
    }

    /// Anchor hue of this name in degrees.
    pub fn anchor(self) -> f32 {
        match self {
            HueName::Red => 0.0,
            HueName::Yellow => 60.0,
            HueName::Green => 120.0,
            HueName::Cyan => 180.0,
            HueName::Blue => 240.0,
            HueName::Magenta => 300.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HueName::Red => "red",
            HueName::Yellow => "yellow",
            HueName::Green => "green",
            HueName::Cyan => "cyan",
            HueName::Blue => "blue",
            HueName::Magenta => "magenta",
        }
    }
}

impl core::fmt::Display for HueName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn circular_distance(a: f32, b: f32) -> f32 {
    let d = libm::fabsf(a - b);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_primary_hues() {
        let red = Hsv::from_rgb(65535, 0, 0);
        assert!(approx(red.hue, 0.0, 1e-3));
        assert_eq!(red.sat, 1.0);
        assert_eq!(red.val, 1.0);

        let green = Hsv::from_rgb(0, 65535, 0);
        assert!(approx(green.hue, 120.0, 1e-3));

        let blue = Hsv::from_rgb(0, 0, 65535);
        assert!(approx(blue.hue, 240.0, 1e-3));
    }

    #[test]
    fn test_achromatic() {
        let gray = Hsv::from_rgb(32768, 32768, 32768);
        assert_eq!(gray.sat, 0.0);
        assert_eq!(gray.hue, 0.0);
        assert!(approx(gray.val, 32768.0 / 65535.0, 1e-6));

        let black = Hsv::from_rgb(0, 0, 0);
        assert_eq!(black, Hsv { hue: 0.0, sat: 0.0, val: 0.0 });
    }

    #[test]
    fn test_hue_range() {
        let samples = [0u16, 1, 100, 12000, 32768, 40000, 65534, 65535];
        for r in samples {
            for g in samples {
                for b in samples {
                    let hsv = Hsv::from_rgb(r, g, b);
                    assert!(hsv.hue >= 0.0 && hsv.hue < 360.0, "hue {} out of range", hsv.hue);
                    assert!((0.0..=1.0).contains(&hsv.sat));
                    assert!((0.0..=1.0).contains(&hsv.val));
                }
            }
        }
    }

    #[test]
    fn test_magenta_side_of_red() {
        // Blue slightly above green puts the hue just below 360.
        let hsv = Hsv::from_rgb(65535, 0, 1000);
        assert!(hsv.hue > 350.0 && hsv.hue < 360.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(-30.0), 330.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
        assert_eq!(wrap_degrees(-725.0), 355.0);
        assert!(wrap_degrees(-1e-9) < 360.0);
    }

    #[test]
    fn test_closest_hue_name() {
        assert_eq!(HueName::closest(59.0), HueName::Yellow);
        assert_eq!(HueName::closest(0.0), HueName::Red);
        assert_eq!(HueName::closest(350.0), HueName::Red);
        assert_eq!(HueName::closest(200.0), HueName::Cyan);
        assert_eq!(HueName::closest(245.0), HueName::Blue);
        assert_eq!(HueName::closest(290.0), HueName::Magenta);

        // Equidistant between red and yellow: the earlier anchor wins.
        assert_eq!(HueName::closest(30.0), HueName::Red);
        assert_eq!(HueName::closest(330.0), HueName::Red);
    }

    #[test]
    fn test_hue_name_strings() {
        assert_eq!(HueName::Yellow.as_str(), "yellow");
        assert_eq!(HueName::Magenta.anchor(), 300.0);
    }

    #[test]
    fn test_cct_from_ratio() {
        let cct = cct_from_ratio(3000, 1000, 1000, 0.0).unwrap();
        assert!(approx(cct, 1804.55, 0.5));

        // The offset shifts the ratio before the power law.
        let shifted = cct_from_ratio(2000, 1000, 2000, 1.0).unwrap();
        assert!(approx(shifted, 4278.6, 0.5));
    }

    #[test]
    fn test_cct_from_ratio_degenerate() {
        assert_eq!(cct_from_ratio(3000, 0, 1000, 0.0), None);
        assert_eq!(cct_from_ratio(0, 0, 0, 0.0), None);

        // Zero ratio overflows, negative ratio has no real power.
        assert_eq!(cct_from_ratio(1000, 1000, 1000, 0.0), None);
        assert_eq!(cct_from_ratio(500, 1000, 1000, 0.0), None);
    }

    #[test]
    fn test_mccamy() {
        let (x, y) = chromaticity(3000, 1000, 1000).unwrap();
        assert!(approx(x, 0.25113, 1e-3));
        assert!(approx(y, 0.23754, 1e-3));

        let cct = cct_mccamy(3000, 1000, 1000).unwrap();
        assert!(approx(cct, 26510.4, 30.0));
    }

    #[test]
    fn test_mccamy_epicenter() {
        let (_, y) = chromaticity(434, 12321, 10210).unwrap();
        assert_eq!(y, 0.1858);
        assert_eq!(cct_mccamy(434, 12321, 10210), None);
    }

    #[test]
    fn test_mccamy_zero_light() {
        assert_eq!(chromaticity(0, 0, 0), None);
        assert_eq!(cct_mccamy(0, 0, 0), None);
    }
}
