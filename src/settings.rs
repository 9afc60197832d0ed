use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defuser::DefuserConfig;

/// Settings file surface for the CLI tool: a `[defuser]` table of overrides
/// merged over the built-in tuning.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub defuser: DefuserConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::splitter::TimestampPolicy;

    #[test]
    fn defaults_without_a_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.defuser, DefuserConfig::default());
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let toml = r#"
            [defuser]
            oversize_ratio = 1.8
            timestamp_policy = "shift_first_back"

            [defuser.window]
            lo = 0.25
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.defuser.oversize_ratio, 1.8);
        assert_eq!(
            settings.defuser.timestamp_policy,
            TimestampPolicy::ShiftFirstBack
        );
        assert_eq!(settings.defuser.window.lo, 0.25);
        // untouched fields keep their defaults
        assert_eq!(settings.defuser.window.hi, 0.75);
        assert_eq!(settings.defuser.default_expected_size, 250_000);
    }
}
