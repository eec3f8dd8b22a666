use std::sync::OnceLock;

pub const DEFAULT_MAX_DENOMINATOR: u64 = 1_000_000;
pub const DEFAULT_COFACTOR_WARN_ORDER: usize = 9;

const MAX_DENOMINATOR_VAR: &str = "UMATRIX_MAX_DENOMINATOR";
const COFACTOR_WARN_ORDER_VAR: &str = "UMATRIX_COFACTOR_WARN_ORDER";

/// Process-wide knobs. Nothing here changes the value of a computation except
/// `max_denominator`, which bounds the fraction view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Largest denominator allowed when rendering floats as fractions.
    pub max_denominator: u64,
    /// Matrix order from which the cofactor determinant logs a warning.
    pub cofactor_warn_order: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_denominator: DEFAULT_MAX_DENOMINATOR,
            cofactor_warn_order: DEFAULT_COFACTOR_WARN_ORDER,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(value) = parse_var::<u64>(&lookup, MAX_DENOMINATOR_VAR) {
            if value == 0 {
                log::warn!("{MAX_DENOMINATOR_VAR} must be at least 1, keeping {DEFAULT_MAX_DENOMINATOR}");
            } else {
                config.max_denominator = value;
            }
        }
        if let Some(value) = parse_var::<usize>(&lookup, COFACTOR_WARN_ORDER_VAR) {
            config.cofactor_warn_order = value;
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}

/// Configuration read once from the environment.
pub fn config() -> &'static Config {
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(Config::from_env)
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
