//! Decimal degrees to the rational degrees/minutes/seconds triple used by the
//! GPS IFD, and back.

use crate::models::{signed, Dms, Rational, RefPair};

/// Converts a signed decimal-degree value into a DMS triple and the
/// hemisphere letter matching its sign.
///
/// Every component is truncated toward zero, so the triple never overshoots
/// the input: degrees and minutes are whole numbers and seconds are whole
/// seconds with denominator 1. A value of exactly `0.0` takes the positive
/// letter. The range is not checked here; callers validate real-world bounds.
pub fn to_dms(value: f64, refs: RefPair) -> (Dms, char) {
    let letter = refs.for_value(value);
    let abs_value = value.abs();

    let degrees = abs_value.trunc();
    let minutes_full = (abs_value - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let remainder = abs_value - degrees - minutes / 60.0;
    let seconds = (remainder * 3600.0).trunc().clamp(0.0, 59.0);

    let dms = Dms {
        degrees: Rational::whole(degrees as u32),
        minutes: Rational::whole(minutes as u32),
        seconds: Rational::whole(seconds as u32),
    };

    (dms, letter)
}

/// Reconstructs signed decimal degrees from a DMS triple and its letter.
pub fn from_dms(dms: Dms, letter: char, refs: RefPair) -> f64 {
    signed(dms.to_decimal(), letter, refs)
}

pub fn latitude_to_dms(latitude: f64) -> (Dms, char) {
    to_dms(latitude, RefPair::LATITUDE)
}

pub fn longitude_to_dms(longitude: f64) -> (Dms, char) {
    to_dms(longitude, RefPair::LONGITUDE)
}
