use std::fmt;

use serde::{Deserialize, Serialize};

/// Unsigned EXIF rational.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub const fn whole(value: u32) -> Self {
        Self::new(value, 1)
    }

    pub fn to_f64(self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Degrees, minutes and seconds of an angle, as stored in the GPS IFD.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Dms {
    pub degrees: Rational,
    pub minutes: Rational,
    pub seconds: Rational,
}

impl Dms {
    pub fn to_decimal(self) -> f64 {
        self.degrees.to_f64() + self.minutes.to_f64() / 60.0 + self.seconds.to_f64() / 3600.0
    }

    pub fn as_array(self) -> [Rational; 3] {
        [self.degrees, self.minutes, self.seconds]
    }
}

/// Hemisphere letters for one axis: the first applies to negative values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RefPair {
    pub negative: char,
    pub positive: char,
}

impl RefPair {
    pub const LATITUDE: Self = Self {
        negative: 'S',
        positive: 'N',
    };
    pub const LONGITUDE: Self = Self {
        negative: 'W',
        positive: 'E',
    };

    pub fn for_value(self, value: f64) -> char {
        if value < 0.0 {
            self.negative
        } else {
            self.positive
        }
    }
}

pub const GPS_VERSION: [u8; 4] = [2, 0, 0, 0];

/// Altitude reference 0: above sea level.
pub const ALTITUDE_ABOVE_SEA_LEVEL: u8 = 0;

/// The full GPS IFD as this tool writes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsGroup {
    pub version: [u8; 4],
    pub altitude_ref: u8,
    pub altitude: Rational,
    pub latitude: Dms,
    pub latitude_ref: char,
    pub longitude: Dms,
    pub longitude_ref: char,
}

impl GpsGroup {
    pub fn latitude_decimal(&self) -> f64 {
        signed(self.latitude.to_decimal(), self.latitude_ref, RefPair::LATITUDE)
    }

    pub fn longitude_decimal(&self) -> f64 {
        signed(self.longitude.to_decimal(), self.longitude_ref, RefPair::LONGITUDE)
    }

    pub fn altitude_meters(&self) -> f64 {
        let magnitude = self.altitude.to_f64();
        if self.altitude_ref == 1 {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// The Exif sub-IFD fields this tool reads or overlays.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExifGroup {
    pub date_time_original: Option<String>,
}

pub(crate) fn signed(magnitude: f64, letter: char, refs: RefPair) -> f64 {
    if letter.eq_ignore_ascii_case(&refs.negative) {
        -magnitude
    } else {
        magnitude
    }
}
