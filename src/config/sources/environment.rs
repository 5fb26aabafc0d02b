//! Environment source: DRAFTLINE__SECTION__KEY=value

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const PREFIX: &str = "DRAFTLINE";
pub const SEPARATOR: &str = "__";

/// Add environment overrides, e.g. `DRAFTLINE__DELIVERY__INTERVAL_MS=20`.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator(SEPARATOR)
            .separator(SEPARATOR)
            .try_parsing(true),
    )
}
