use super::config::InsightConfig;

/// Validate insight configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_insight_config(config: &InsightConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(cost) = config.job_cost_usd {
        if !cost.is_finite() || cost <= 0.0 {
            errors.push(format!("insight.job_cost_usd: must be positive, got {}", cost));
        }
    }

    if let Some(size) = config.avg_household_size {
        if !size.is_finite() || size <= 0.0 {
            errors.push(format!(
                "insight.avg_household_size: must be positive, got {}",
                size
            ));
        }
    }

    if let Some(ref window) = config.stale_after {
        if let Err(e) = humantime::parse_duration(window.trim()) {
            errors.push(format!(
                "insight.stale_after: invalid duration '{}' - {}",
                window, e
            ));
        }
    }

    if let Some(ref examples) = config.examples {
        for (i, example) in examples.iter().enumerate() {
            if example.label.trim().is_empty() {
                errors.push(format!("insight.examples[{}].label: must not be empty", i));
            }
            if !example.usd_per_unit.is_finite() || example.usd_per_unit <= 0.0 {
                errors.push(format!(
                    "insight.examples[{}].usd_per_unit: must be positive, got {}",
                    i, example.usd_per_unit
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
