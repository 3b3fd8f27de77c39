//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default place categories appended to every search
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Food", "Hotel", "Pizza", "Coffee Shop", "Bar or Pub"];

/// Default maximum number of results per search
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Buffer around cached places when deriving a result envelope, in degrees
pub const DEFAULT_ENVELOPE_BUFFER: f64 = 0.0007;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7879;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "nearby";
