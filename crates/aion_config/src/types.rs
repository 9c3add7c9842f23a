//! Configuration types deserialized from `rrgraph.toml`.

use serde::Deserialize;

/// The top-level build configuration parsed from `rrgraph.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RrGraphConfig {
    /// Channel width request and distribution.
    #[serde(default)]
    pub channel: ChannelConfig,
    /// Graph construction options.
    #[serde(default)]
    pub build: BuildOptions,
}

/// Requested routing channel widths.
///
/// `width` applies to both axes unless `x_width`/`y_width` override it. The
/// per-axis distributions scale the width of individual rows and columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelConfig {
    /// Maximum channel width in tracks.
    #[serde(default)]
    pub width: u32,
    /// Width of horizontal (CHANX) channels, if different from `width`.
    #[serde(default)]
    pub x_width: Option<u32>,
    /// Width of vertical (CHANY) channels, if different from `width`.
    #[serde(default)]
    pub y_width: Option<u32>,
    /// Round per-segment track counts to whole wire-length groups.
    #[serde(default)]
    pub use_full_seg_groups: bool,
    /// Distribution of widths across horizontal channels (indexed by row).
    #[serde(default)]
    pub x_dist: ChannelDistribution,
    /// Distribution of widths across vertical channels (indexed by column).
    #[serde(default)]
    pub y_dist: ChannelDistribution,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            width: 0,
            x_width: None,
            y_width: None,
            use_full_seg_groups: false,
            x_dist: ChannelDistribution::default(),
            y_dist: ChannelDistribution::default(),
        }
    }
}

/// How channel width varies across the rows or columns of the device.
///
/// `peak` and `dc` are fractions of the axis width; positions are normalized
/// to `[0, 1]` across the device.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelDistribution {
    /// Every channel gets `peak` of the width.
    Uniform {
        /// Fraction of the width.
        #[serde(default = "one")]
        peak: f32,
    },
    /// `peak` inside a window of `width` around `xpeak`, `dc` elsewhere.
    Pulse {
        /// Fraction of the width inside the window.
        peak: f32,
        /// Window width.
        width: f32,
        /// Window centre.
        xpeak: f32,
        /// Fraction of the width outside the window.
        dc: f32,
    },
    /// Gaussian bump of standard deviation `width` centred at `xpeak`.
    Gaussian {
        /// Fraction of the width at the centre.
        peak: f32,
        /// Standard deviation.
        width: f32,
        /// Centre position.
        xpeak: f32,
        /// Baseline fraction of the width.
        dc: f32,
    },
    /// `dc` everywhere except `peak` at exactly `xpeak`.
    Delta {
        /// Fraction of the width at `xpeak`.
        peak: f32,
        /// Position of the spike.
        xpeak: f32,
        /// Baseline fraction of the width.
        dc: f32,
    },
}

fn one() -> f32 {
    1.0
}

impl Default for ChannelDistribution {
    fn default() -> Self {
        ChannelDistribution::Uniform { peak: 1.0 }
    }
}

impl ChannelDistribution {
    /// Evaluates the width fraction at normalized position `x`.
    pub fn fraction_at(&self, x: f32) -> f32 {
        match *self {
            ChannelDistribution::Uniform { peak } => peak,
            ChannelDistribution::Pulse {
                peak,
                width,
                xpeak,
                dc,
            } => {
                if (x - xpeak).abs() <= width / 2.0 {
                    peak
                } else {
                    dc
                }
            }
            ChannelDistribution::Gaussian {
                peak,
                width,
                xpeak,
                dc,
            } => {
                let d = x - xpeak;
                (peak - dc) * (-(d * d) / (2.0 * width * width)).exp() + dc
            }
            ChannelDistribution::Delta { peak, xpeak, dc } => {
                if (x - xpeak).abs() < 1e-5 {
                    peak
                } else {
                    dc
                }
            }
        }
    }
}

/// The kind of routing graph to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    /// One track per channel, used for global routing estimates.
    Global,
    /// Bidirectional wires.
    Bidir,
    /// Unidirectional wires driven by multiplexers.
    Unidir,
}

/// How clock nets are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockModeling {
    /// Clocks are ideal and not routed.
    #[default]
    Ideal,
    /// Clocks are routed on general routing.
    Route,
    /// A dedicated clock network is appended by an external builder.
    DedicatedNetwork,
}

/// Options controlling graph construction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildOptions {
    /// Force a graph type; `None` follows the architecture's directionality.
    #[serde(default)]
    pub graph_type: Option<GraphType>,
    /// Seed of the switchpoint RNG shared by custom switch blocks and scatter-gather.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Connections sharing one inter-die bridge node before another is opened.
    #[serde(default = "default_fanin_fanout")]
    pub custom_3d_sb_fanin_fanout: u32,
    /// Clock modelling mode.
    #[serde(default)]
    pub clock_modeling: ClockModeling,
    /// Verbosity of stage statistics in the log.
    #[serde(default = "default_verbosity")]
    pub verbosity: u32,
    /// Report tracks no pin can reach.
    #[serde(default)]
    pub check_unreachable_tracks: bool,
}

fn default_seed() -> u64 {
    1
}

fn default_fanin_fanout() -> u32 {
    1
}

fn default_verbosity() -> u32 {
    1
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            graph_type: None,
            seed: default_seed(),
            custom_3d_sb_fanin_fanout: default_fanin_fanout(),
            clock_modeling: ClockModeling::Ideal,
            verbosity: default_verbosity(),
            check_unreachable_tracks: false,
        }
    }
}
