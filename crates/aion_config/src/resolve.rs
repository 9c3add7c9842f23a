//! Channel width resolution: applying the configured width distributions to a grid.

use crate::error::ConfigError;
use crate::types::{ChannelConfig, ChannelDistribution};

/// Resolved channel widths for one device grid.
///
/// `x_list[y]` is the width of the horizontal channel above row `y`;
/// `y_list[x]` is the width of the vertical channel right of column `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelWidths {
    /// Largest width over both axes.
    pub max: usize,
    /// Largest horizontal channel width.
    pub x_max: usize,
    /// Largest vertical channel width.
    pub y_max: usize,
    /// Horizontal channel widths, one per grid row.
    pub x_list: Vec<usize>,
    /// Vertical channel widths, one per grid column.
    pub y_list: Vec<usize>,
}

impl ChannelWidths {
    /// Builds uniform widths for a `grid_width` x `grid_height` device.
    pub fn uniform(x_width: usize, y_width: usize, grid_width: usize, grid_height: usize) -> Self {
        Self {
            max: x_width.max(y_width),
            x_max: x_width,
            y_max: y_width,
            x_list: vec![x_width; grid_height],
            y_list: vec![y_width; grid_width],
        }
    }

    /// Recomputes `max` after an axis maximum changed.
    pub fn refresh_max(&mut self) {
        self.max = self.x_max.max(self.y_max);
    }
}

/// Applies the channel configuration to a grid of the given size.
pub fn resolve_channel_widths(
    channel: &ChannelConfig,
    grid_width: usize,
    grid_height: usize,
) -> Result<ChannelWidths, ConfigError> {
    if grid_width == 0 || grid_height == 0 {
        return Err(ConfigError::ValidationError(format!(
            "cannot resolve channel widths for a {grid_width}x{grid_height} grid"
        )));
    }
    let x_width = channel.x_width.unwrap_or(channel.width) as usize;
    let y_width = channel.y_width.unwrap_or(channel.width) as usize;
    let x_list = distribute(x_width, &channel.x_dist, grid_height);
    let y_list = distribute(y_width, &channel.y_dist, grid_width);
    let x_max = x_list.iter().copied().max().unwrap_or(0);
    let y_max = y_list.iter().copied().max().unwrap_or(0);
    Ok(ChannelWidths {
        max: x_max.max(y_max),
        x_max,
        y_max,
        x_list,
        y_list,
    })
}

/// Width of each of `count` channels; never below one track.
fn distribute(width: usize, dist: &ChannelDistribution, count: usize) -> Vec<usize> {
    let span = count.saturating_sub(1).max(1) as f32;
    (0..count)
        .map(|i| {
            let fraction = dist.fraction_at(i as f32 / span);
            ((width as f32 * fraction + 0.5).floor() as usize).max(1)
        })
        .collect()
}
