//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{ChannelDistribution, RrGraphConfig};
use std::path::Path;

/// The file name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "rrgraph.toml";

/// Loads and validates an `rrgraph.toml` configuration from a directory.
pub fn load_config(dir: &Path) -> Result<RrGraphConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates an `rrgraph.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RrGraphConfig, ConfigError> {
    let config: RrGraphConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that a width was requested and every value is in range.
fn validate_config(config: &RrGraphConfig) -> Result<(), ConfigError> {
    let channel = &config.channel;
    if channel.width == 0 && (channel.x_width.is_none() || channel.y_width.is_none()) {
        return Err(ConfigError::MissingField("channel.width".to_string()));
    }
    for (name, value) in [("channel.x_width", channel.x_width), ("channel.y_width", channel.y_width)] {
        if value == Some(0) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be at least 1"
            )));
        }
    }
    for (name, dist) in [("channel.x_dist", &channel.x_dist), ("channel.y_dist", &channel.y_dist)] {
        validate_distribution(name, dist)?;
    }
    if config.build.custom_3d_sb_fanin_fanout == 0 {
        return Err(ConfigError::ValidationError(
            "build.custom_3d_sb_fanin_fanout must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_distribution(name: &str, dist: &ChannelDistribution) -> Result<(), ConfigError> {
    let (peak, dc) = match *dist {
        ChannelDistribution::Uniform { peak } => (peak, 0.0),
        ChannelDistribution::Pulse { peak, dc, .. }
        | ChannelDistribution::Gaussian { peak, dc, .. }
        | ChannelDistribution::Delta { peak, dc, .. } => (peak, dc),
    };
    if !(0.0..=1.0).contains(&peak) || !(0.0..=1.0).contains(&dc) {
        return Err(ConfigError::ValidationError(format!(
            "{name}: peak and dc must lie in [0, 1]"
        )));
    }
    if let ChannelDistribution::Gaussian { width, .. } = *dist {
        if width <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{name}: gaussian width must be positive"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClockModeling, GraphType};

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str("[channel]\nwidth = 12\n").unwrap();
        assert_eq!(config.channel.width, 12);
        assert_eq!(config.build.seed, 1);
        assert_eq!(config.channel.x_dist, ChannelDistribution::Uniform { peak: 1.0 });
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[channel]
width = 20
x_width = 16
use_full_seg_groups = true

[channel.y_dist]
kind = "pulse"
peak = 1.0
width = 0.5
xpeak = 0.5
dc = 0.5

[build]
graph_type = "unidir"
seed = 7
custom_3d_sb_fanin_fanout = 4
clock_modeling = "dedicated_network"
verbosity = 2
check_unreachable_tracks = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.channel.x_width, Some(16));
        assert!(config.channel.use_full_seg_groups);
        assert!(matches!(
            config.channel.y_dist,
            ChannelDistribution::Pulse { .. }
        ));
        assert_eq!(config.build.graph_type, Some(GraphType::Unidir));
        assert_eq!(config.build.seed, 7);
        assert_eq!(config.build.custom_3d_sb_fanin_fanout, 4);
        assert_eq!(config.build.clock_modeling, ClockModeling::DedicatedNetwork);
        assert!(config.build.check_unreachable_tracks);
    }

    #[test]
    fn per_axis_widths_replace_width() {
        let config = load_config_from_str("[channel]\nx_width = 4\ny_width = 6\n").unwrap();
        assert_eq!(config.channel.width, 0);
    }

    #[test]
    fn missing_width() {
        let err = load_config_from_str("[build]\nseed = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "channel.width"));
    }

    #[test]
    fn zero_fanin_fanout_rejected() {
        let err = load_config_from_str(
            "[channel]\nwidth = 4\n[build]\ncustom_3d_sb_fanin_fanout = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn out_of_range_distribution_rejected() {
        let toml = "[channel]\nwidth = 4\n[channel.x_dist]\nkind = \"uniform\"\npeak = 1.5\n";
        assert!(matches!(
            load_config_from_str(toml).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn invalid_toml() {
        let err = load_config_from_str("[channel\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = std::env::temp_dir().join(format!("aion_config_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), "[channel]\nwidth = 8\n").unwrap();
        let config = load_config(&dir).unwrap();
        assert_eq!(config.channel.width, 8);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = std::env::temp_dir().join("aion_config_definitely_missing_dir");
        assert!(matches!(load_config(&dir).unwrap_err(), ConfigError::IoError(_)));
    }
}
