//! Metric naming rules.
//!
//! Statistic names arrive camel-cased from TeamCity (`buildDuration`,
//! `successRate`) and become snake_case metric names under a fixed
//! namespace prefix.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix applied to every exported metric.
pub const NAMESPACE: &str = "teamcity";

/// Fixed per-instance gauges maintained by the exporter itself.
pub const INSTANCE_STATUS: &str = "teamcity_instance_status";
pub const INSTANCE_LAST_SCRAPE_FINISH_TIME: &str = "teamcity_instance_last_scrape_finish_time";
pub const INSTANCE_LAST_SCRAPE_DURATION: &str = "teamcity_instance_last_scrape_duration";

static FIRST_CAP: LazyLock<Regex> = LazyLock::new(|| Regex::new("(.)([A-Z][a-z]+)").unwrap());
static ALL_CAP: LazyLock<Regex> = LazyLock::new(|| Regex::new("([a-z0-9])([A-Z])").unwrap());

/// Convert a camel-cased statistic name to snake_case.
pub fn snake_case(raw: &str) -> String {
    let pass = FIRST_CAP.replace_all(raw, "${1}_${2}");
    let pass = ALL_CAP.replace_all(&pass, "${1}_${2}");
    pass.to_lowercase()
}

/// Namespaced metric name for a statistic base name.
pub fn metric_name(base: &str) -> String {
    format!("{NAMESPACE}_{}", snake_case(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_splits() {
        assert_eq!(snake_case("successRate"), "success_rate");
        assert_eq!(snake_case("buildStageDuration"), "build_stage_duration");
    }

    #[test]
    fn leading_capital() {
        assert_eq!(snake_case("BuildDuration"), "build_duration");
        assert_eq!(snake_case("BuildDurationNetTime"), "build_duration_net_time");
    }

    #[test]
    fn digits_break_words() {
        assert_eq!(snake_case("queuedTime1"), "queued_time1");
        assert_eq!(snake_case("stage2Duration"), "stage2_duration");
    }

    #[test]
    fn already_snake_is_untouched() {
        assert_eq!(snake_case("build_duration"), "build_duration");
        assert_eq!(snake_case("simple"), "simple");
    }

    #[test]
    fn namespaced_name() {
        assert_eq!(metric_name("successRate"), "teamcity_success_rate");
        assert_eq!(metric_name("TotalTestCount"), "teamcity_total_test_count");
    }
}
