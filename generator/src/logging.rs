use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

#[cfg(debug_assertions)]
const DEFAULT_LEVEL: &str = "debug";
#[cfg(not(debug_assertions))]
const DEFAULT_LEVEL: &str = "info";

/// Initialises `env_logger` once for the binary crate `bin_crate`.
/// `RUST_LOG` overrides the default filter.
pub fn init(bin_crate: &str) {
    use env_logger::{
        Env, Builder,
    };
    INIT_LOGGING.call_once(|| {
        let default_filter = format!(
            "{}={},{}={}",
            bin_crate,
            DEFAULT_LEVEL,
            env!("CARGO_CRATE_NAME"),
            DEFAULT_LEVEL,
        );
        let cfg = Env::default()
            .default_filter_or(default_filter);
        Builder::from_env(cfg).init();
    });
}
