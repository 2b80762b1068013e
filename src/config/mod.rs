//! Compaction tunables: where they come from and how they resolve.

/// Errors raised while reading configuration values.
pub mod error;
/// Key names understood by the policy config.
pub mod keys;
/// Resolved, per-store compaction configuration.
pub mod policy;
/// Ordered default-resolution pipeline.
pub mod resolve;
/// Configuration sources.
pub mod source;

pub use error::{ConfigError, ValueKind};
pub use policy::{CompactionPolicyConfig, DateTieredConfig, StoreFacts};
pub use resolve::{ConfigValue, Origin, ResolvedSetting};
pub use source::{Configuration, ConfigurationSource};

/// Reduce a configured strategy name to its lookup form.
///
/// Accepts short names (`exploring`, `date_tiered`) as well as fully qualified
/// class names from existing site configuration
/// (`...compactions.ExponentialCompactionWindowFactory` becomes `exponential`).
pub(crate) fn normalize_strategy_name(raw: &str) -> String {
    let short = raw.trim().rsplit('.').next().unwrap_or_default();
    let mut name: String = short
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase();
    for suffix in [
        "compactionwindowfactory",
        "windowfactory",
        "compactionpolicy",
        "policy",
    ] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            if !stripped.is_empty() {
                name = stripped.to_owned();
                break;
            }
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::normalize_strategy_name;

    #[test]
    fn strategy_names_normalize() {
        assert_eq!(normalize_strategy_name("exponential"), "exponential");
        assert_eq!(
            normalize_strategy_name(
                "org.apache.hadoop.hbase.regionserver.compactions.ExponentialCompactionWindowFactory"
            ),
            "exponential"
        );
        assert_eq!(
            normalize_strategy_name("ExploringCompactionPolicy"),
            "exploring"
        );
        assert_eq!(normalize_strategy_name(" Date_Tiered "), "datetiered");
        assert_eq!(normalize_strategy_name("ratio-based"), "ratiobased");
        assert_eq!(normalize_strategy_name("policy"), "policy");
    }
}
