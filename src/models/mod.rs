mod operation;
mod photo;
mod point;
mod tag;

pub use operation::{BatchReport, Operation, OperationResult, OperationSummary, ProgressEvent};
pub use photo::{ImageFormat, ImageRecord};
pub use point::{CoordinateError, GeoPoint, MapClick, LATITUDE_RANGE, LONGITUDE_RANGE};
pub use tag::{
    Dms, ExifGroup, GpsGroup, Rational, RefPair, ALTITUDE_ABOVE_SEA_LEVEL, GPS_VERSION,
};

pub(crate) use tag::signed;
