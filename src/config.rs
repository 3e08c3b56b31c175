use std::path::PathBuf;

/// Height service used when no endpoint is given on the command line.
pub const DEFAULT_ELEVATION_ENDPOINT: &str = "https://ws.geonorge.no/hoydedata/v1/punkt";

/// ETRS89 geographic coordinates, the system the map reports clicks in.
pub const DEFAULT_COORDINATE_SYSTEM: u32 = 4258;

pub const DEFAULT_USER_AGENT: &str = concat!("photo-geotag/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElevationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub coordinate_system: u32,
    pub user_agent: String,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: String::from(DEFAULT_ELEVATION_ENDPOINT),
            coordinate_system: DEFAULT_COORDINATE_SYSTEM,
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

/// What to do with files that already carry GPS tags.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OverwritePolicy {
    #[default]
    Ask,
    Always,
    Never,
}

impl OverwritePolicy {
    pub fn decide<F>(self, already_tagged: &[PathBuf], ask: F) -> bool
    where
        F: FnOnce(&[PathBuf]) -> bool,
    {
        match self {
            Self::Ask => ask(already_tagged),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeotagConfig {
    pub elevation: ElevationConfig,
    pub overwrite: OverwritePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_etrs89_height_service() {
        let config = GeotagConfig::default();
        assert!(config.elevation.enabled);
        assert_eq!(config.elevation.coordinate_system, 4258);
        assert_eq!(config.elevation.endpoint, DEFAULT_ELEVATION_ENDPOINT);
        assert_eq!(config.overwrite, OverwritePolicy::Ask);
    }

    #[test]
    fn only_ask_policy_consults_the_prompt() {
        let tagged = vec![PathBuf::from("a.jpg")];
        let mut asked = false;
        assert!(OverwritePolicy::Ask.decide(&tagged, |_| {
            asked = true;
            true
        }));
        assert!(asked);

        assert!(OverwritePolicy::Always.decide(&tagged, |_| panic!("must not ask")));
        assert!(!OverwritePolicy::Never.decide(&tagged, |_| panic!("must not ask")));
    }
}
