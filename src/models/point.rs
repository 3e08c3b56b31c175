use std::fmt;

use serde::{Deserialize, Serialize};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

#[derive(Clone, Debug, PartialEq)]
pub enum CoordinateError {
    NotANumber(String),
    OutOfRange { axis: &'static str, value: f64 },
    MalformedClick(String),
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber(raw) => write!(f, "not a decimal coordinate: {raw:?}"),
            Self::OutOfRange { axis, value } => write!(f, "{axis} out of range: {value}"),
            Self::MalformedClick(raw) => write!(f, "malformed map click message: {raw:?}"),
        }
    }
}

impl std::error::Error for CoordinateError {}

/// A location picked on the map. Replaced wholesale on every click.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        check_range("latitude", latitude, LATITUDE_RANGE)?;
        check_range("longitude", longitude, LONGITUDE_RANGE)?;

        Ok(Self {
            latitude,
            longitude,
            elevation: None,
        })
    }

    /// Parses the decimal strings the map emits.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        Self::new(parse_decimal(latitude)?, parse_decimal(longitude)?)
    }

    pub fn with_elevation(mut self, elevation: Option<f64>) -> Self {
        self.elevation = elevation;
        self
    }

    /// Elevation to record, falling back to sea level when the lookup failed.
    pub fn elevation_or_zero(&self) -> f64 {
        self.elevation.unwrap_or(0.0)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.elevation {
            Some(elevation) => write!(
                f,
                "{:.6}, {:.6} @ {elevation:.2}m",
                self.latitude, self.longitude
            ),
            None => write!(f, "{:.6}, {:.6}", self.latitude, self.longitude),
        }
    }
}

/// Coordinates carried by a map click event, e.g. `Point clicked: 61.2 7.05`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MapClick {
    pub latitude: String,
    pub longitude: String,
}

impl MapClick {
    const PREFIX: &'static str = "Point clicked:";

    pub fn parse(message: &str) -> Result<Self, CoordinateError> {
        let malformed = || CoordinateError::MalformedClick(message.to_string());

        let (_, rest) = message.split_once(Self::PREFIX).ok_or_else(malformed)?;
        let mut parts = rest.split_whitespace();
        let (Some(latitude), Some(longitude), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        Ok(Self {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        })
    }

    pub fn to_point(&self) -> Result<GeoPoint, CoordinateError> {
        GeoPoint::parse(&self.latitude, &self.longitude)
    }
}

fn parse_decimal(raw: &str) -> Result<f64, CoordinateError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CoordinateError::NotANumber(raw.to_string()))
}

fn check_range(axis: &'static str, value: f64, (low, high): (f64, f64)) -> Result<(), CoordinateError> {
    if !value.is_finite() || value < low || value > high {
        return Err(CoordinateError::OutOfRange { axis, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_trimmed_decimal_strings() {
        let point = GeoPoint::parse(" 61.123 ", "-7.5").expect("valid point");
        assert_eq!(point.latitude, 61.123);
        assert_eq!(point.longitude, -7.5);
        assert_eq!(point.elevation, None);
        assert_eq!(point.elevation_or_zero(), 0.0);
    }

    #[test]
    fn parse_rejects_out_of_range_and_garbage() {
        assert!(matches!(
            GeoPoint::parse("91", "0"),
            Err(CoordinateError::OutOfRange { axis: "latitude", .. })
        ));
        assert!(matches!(
            GeoPoint::parse("0", "-180.5"),
            Err(CoordinateError::OutOfRange { axis: "longitude", .. })
        ));
        assert!(matches!(
            GeoPoint::parse("north", "0"),
            Err(CoordinateError::NotANumber(_))
        ));
        assert!(matches!(
            GeoPoint::parse("NaN", "0"),
            Err(CoordinateError::NotANumber(_))
        ));
    }

    #[test]
    fn map_click_message_is_split_into_coordinates() {
        let click = MapClick::parse("Point clicked: 61.0421 7.1123").expect("valid click");
        assert_eq!(click.latitude, "61.0421");
        assert_eq!(click.longitude, "7.1123");

        let point = click.to_point().expect("in range");
        assert_eq!(point.latitude, 61.0421);
    }

    #[test]
    fn map_click_without_two_values_is_malformed() {
        assert!(MapClick::parse("Point clicked: 61.0").is_err());
        assert!(MapClick::parse("zoom changed 5").is_err());
        assert!(MapClick::parse("Point clicked: 1 2 3").is_err());
    }
}
