use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use tracing::{debug, info, warn};

use crate::core::bulk::BulkProcessor;
use crate::core::elevation::ElevationSource;
use crate::core::metadata::{self, MetadataError};
use crate::core::selection::{Classification, SelectionError};
use crate::models::{BatchReport, CoordinateError, GeoPoint, MapClick, ProgressEvent};

pub const WARN_NO_POINT: &str = "Please select a point on the map first.";
pub const WARN_NO_FILES: &str = "No files selected.";
pub const WARN_NOTHING_TO_DATE: &str = "All selected images already have a capture date.";

#[derive(Debug)]
pub enum SessionError {
    NoPointSelected,
    NoFilesSelected,
    InvalidCoordinate(CoordinateError),
    InvalidDate(String),
    Metadata(MetadataError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPointSelected => write!(f, "no point selected on the map"),
            Self::NoFilesSelected => write!(f, "no files selected"),
            Self::InvalidCoordinate(err) => write!(f, "invalid coordinate: {err}"),
            Self::InvalidDate(raw) => {
                write!(f, "invalid date {raw:?}, expected YYYY:MM:DD HH:MM:SS")
            }
            Self::Metadata(err) => write!(f, "metadata error: {err}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CoordinateError> for SessionError {
    fn from(value: CoordinateError) -> Self {
        Self::InvalidCoordinate(value)
    }
}

impl From<SelectionError> for SessionError {
    fn from(value: SelectionError) -> Self {
        match value {
            SelectionError::NoFilesSelected => Self::NoFilesSelected,
        }
    }
}

impl From<MetadataError> for SessionError {
    fn from(value: MetadataError) -> Self {
        match value {
            MetadataError::InvalidDate(raw) => Self::InvalidDate(raw),
            other => Self::Metadata(other),
        }
    }
}

/// Everything one user session holds: the picked point and the picked files.
/// Each new click or file selection replaces the previous value wholesale.
pub struct Session<E> {
    elevation: E,
    point: Option<GeoPoint>,
    selection: Classification,
    status: String,
    warnings: Vec<String>,
    progress_tx: Option<Sender<ProgressEvent>>,
}

impl<E: ElevationSource> Session<E> {
    pub fn new(elevation: E) -> Self {
        Self {
            elevation,
            point: None,
            selection: Classification::default(),
            status: String::from("Latitude: Not selected  Longitude: Not selected"),
            warnings: Vec::new(),
            progress_tx: None,
        }
    }

    pub fn with_progress(mut self, progress_tx: Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub fn point(&self) -> Option<&GeoPoint> {
        self.point.as_ref()
    }

    pub fn selection(&self) -> &Classification {
        &self.selection
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// GPS writing needs both a point and at least one file.
    pub fn write_enabled(&self) -> bool {
        self.point.is_some() && !self.selection.is_empty()
    }

    pub fn date_enabled(&self) -> bool {
        !self.selection.without_date().is_empty()
    }

    /// Handles a map click. The elevation is looked up once; an unknown
    /// height is kept as `None` and written as 0.
    pub fn set_point(&mut self, latitude: &str, longitude: &str) -> Result<GeoPoint, SessionError> {
        let point = GeoPoint::parse(latitude, longitude)?;
        let elevation = self.elevation.lookup(point.latitude, point.longitude);
        if elevation.is_none() {
            debug!(latitude = point.latitude, longitude = point.longitude, "elevation unknown, using 0");
        }

        let point = point.with_elevation(elevation);
        self.status = format!(
            "Latitude: {}  Longitude: {}  Elevation: {:.1} m",
            latitude.trim(),
            longitude.trim(),
            point.elevation_or_zero()
        );
        info!(%point, "point selected");
        self.point = Some(point);
        Ok(point)
    }

    pub fn handle_map_message(&mut self, message: &str) -> Result<GeoPoint, SessionError> {
        let click = MapClick::parse(message)?;
        self.set_point(&click.latitude, &click.longitude)
    }

    /// Handles a file-picker result and classifies the files.
    pub fn select_files<I, P>(&mut self, paths: I) -> &Classification
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.selection = Classification::classify(paths);

        if self.selection.is_empty() {
            self.warn(WARN_NO_FILES);
        } else if self.point.is_none() {
            self.warn(WARN_NO_POINT);
        }

        self.status = format!(
            "{} selected, {} already geotagged, {} missing capture date",
            self.selection.len(),
            self.selection.with_gps().len(),
            self.selection.without_date().len()
        );
        &self.selection
    }

    /// Writes the current point into the selected files.
    ///
    /// `confirm_overwrite` is asked only when some files are already
    /// geotagged; declining limits the batch to the untagged ones.
    pub fn write_gps<F>(&mut self, confirm_overwrite: F) -> Result<BatchReport, SessionError>
    where
        F: FnOnce(&[PathBuf]) -> bool,
    {
        let Some(point) = self.point else {
            self.warn(WARN_NO_POINT);
            return Err(SessionError::NoPointSelected);
        };

        let targets = match self.selection.resolve(confirm_overwrite) {
            Ok(result) => result.to_write,
            Err(err) => {
                self.warn(WARN_NO_FILES);
                return Err(err.into());
            }
        };

        let report = BulkProcessor::write_gps(&targets, &point, self.progress_tx.as_ref());
        self.status = format!(
            "EXIF data written to {} of {} selected images.",
            report.summary.succeeded,
            self.selection.len()
        );
        self.record_failures(&report);
        self.refresh();
        Ok(report)
    }

    /// Sets the capture date on the selected files that have none.
    /// The date is validated before any file is touched.
    pub fn write_date(&mut self, date: &str) -> Result<BatchReport, SessionError> {
        let date = match metadata::validate_exif_date(date) {
            Ok(date) => date,
            Err(err) => {
                self.warn(&err.to_string());
                return Err(err.into());
            }
        };

        if self.selection.is_empty() {
            self.warn(WARN_NO_FILES);
            return Err(SessionError::NoFilesSelected);
        }

        let targets = self.selection.without_date();
        if targets.is_empty() {
            self.warn(WARN_NOTHING_TO_DATE);
            return Err(SessionError::NoFilesSelected);
        }

        let report = BulkProcessor::write_date(&targets, &date, self.progress_tx.as_ref())?;
        self.status = format!(
            "Capture date {date} written to {} images.",
            report.summary.succeeded
        );
        self.record_failures(&report);
        self.refresh();
        Ok(report)
    }

    fn refresh(&mut self) {
        let paths = self.selection.all_paths();
        self.selection = Classification::classify(paths);
    }

    fn record_failures(&mut self, report: &BatchReport) {
        let messages: Vec<String> = report
            .failures()
            .map(|failure| {
                format!(
                    "{}: {}",
                    failure.path.display(),
                    failure.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect();
        self.warnings.extend(messages);
    }

    fn warn(&mut self, message: &str) {
        warn!("{message}");
        self.warnings.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::elevation::{FixedElevation, NoElevation};

    #[test]
    fn set_point_substitutes_zero_for_unknown_elevation() {
        let mut session = Session::new(NoElevation);
        let point = session.set_point("61.2", "7.1").expect("valid point");

        assert_eq!(point.elevation, None);
        assert_eq!(point.elevation_or_zero(), 0.0);
        assert!(session.status().contains("Latitude: 61.2"));
    }

    #[test]
    fn set_point_keeps_looked_up_elevation() {
        let mut session = Session::new(FixedElevation(812.25));
        let point = session
            .handle_map_message("Point clicked: 61.2 7.1")
            .expect("valid click");
        assert_eq!(point.elevation, Some(812.25));
        assert_eq!(session.point(), Some(&point));
    }

    #[test]
    fn invalid_point_leaves_previous_point_in_place() {
        let mut session = Session::new(NoElevation);
        session.set_point("10", "10").expect("valid");
        assert!(matches!(
            session.set_point("100", "10"),
            Err(SessionError::InvalidCoordinate(_))
        ));
        assert_eq!(session.point().map(|p| p.latitude), Some(10.0));
    }

    #[test]
    fn empty_selection_warns_and_disables_writing() {
        let mut session = Session::new(NoElevation);
        session.set_point("10", "10").expect("valid");
        session.select_files(Vec::<PathBuf>::new());

        assert!(!session.write_enabled());
        assert_eq!(session.warnings(), [WARN_NO_FILES.to_string()]);
        assert!(matches!(
            session.write_gps(|_| true),
            Err(SessionError::NoFilesSelected)
        ));
    }

    #[test]
    fn writing_without_point_is_blocked() {
        let mut session = Session::new(NoElevation);
        assert!(matches!(
            session.write_gps(|_| true),
            Err(SessionError::NoPointSelected)
        ));
        assert_eq!(session.take_warnings(), vec![WARN_NO_POINT.to_string()]);
        assert!(session.warnings().is_empty());
    }

    #[test]
    fn invalid_date_is_rejected_before_selection_checks() {
        let mut session = Session::new(NoElevation);
        assert!(matches!(
            session.write_date("14.07.2023 18:05"),
            Err(SessionError::InvalidDate(_))
        ));
    }
}
