//! Environment variable source: SWITCHBOARD__* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// Uses SWITCHBOARD prefix and __ as separator for nested keys,
/// e.g. `SWITCHBOARD__CACHE__TTL_MS=5000`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("SWITCHBOARD")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
