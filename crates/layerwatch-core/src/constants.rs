//! Default values for every overridable LayerWatch setting.

/// Printable bed width along X in millimeters.
pub const DEFAULT_BED_WIDTH_MM: f64 = 245.0;

/// Pixels per millimeter used when rasterizing silhouettes.
pub const DEFAULT_SCALE_PX_PER_MM: f64 = 8.0;

/// Layer height used when neither metadata nor Z deltas yield one.
pub const DEFAULT_LAYER_HEIGHT_MM: f64 = 0.20;

/// Z of the first printed layer.
pub const DEFAULT_FIRST_LAYER_HEIGHT_MM: f64 = 0.20;

/// Slack applied when testing a segment against the layer window top.
pub const WINDOW_EPSILON_MM: f64 = 1e-6;

/// Z jumps at or below this size are ignored when inferring layer height.
pub const Z_DELTA_EPSILON_MM: f64 = 1e-4;

/// Match window around each milestone height.
pub const DEFAULT_MILESTONE_TOLERANCE_MM: f64 = 0.05;

/// Median filter kernel edge length (must be odd).
pub const DEFAULT_MEDIAN_KERNEL: u32 = 15;

/// Largest accepted median kernel.
pub const MAX_MEDIAN_KERNEL: u32 = 255;

/// Edge detector hysteresis thresholds.
pub const DEFAULT_CANNY_LOW: f32 = 15.0;
pub const DEFAULT_CANNY_HIGH: f32 = 50.0;

/// Moonraker listens here unless configured otherwise.
pub const DEFAULT_MOONRAKER_PORT: u16 = 7125;

/// Status request timeout.
pub const DEFAULT_STATUS_TIMEOUT_MS: u64 = 2000;

/// Interval between monitor ticks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
