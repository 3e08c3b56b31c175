pub mod bulk;
pub mod coords;
pub mod elevation;
pub mod formats;
pub mod metadata;
pub mod selection;
