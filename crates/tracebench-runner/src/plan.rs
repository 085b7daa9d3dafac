//! Expansion of a selection into the ordered list of test cases.

use crate::config::SweepConfig;
use crate::error::{Axis, SweepError};
use tracebench_types::TestCase;
use tracing::warn;

/// Cartesian product in config → mode → task → run order.
///
/// Subsets are taken as given; values outside the known sets only produce a
/// warning so ad-hoc configs can still be swept.
pub fn sweep_cases(
    config: &SweepConfig,
    configs: &[String],
    modes: &[String],
    tasks: &[String],
    runs: u32,
) -> Vec<TestCase> {
    warn_unknown(Axis::Config, configs, &config.configs);
    warn_unknown(Axis::Mode, modes, &config.modes);
    warn_unknown(Axis::Task, tasks, &config.tasks);

    let mut cases = Vec::with_capacity(configs.len() * modes.len() * tasks.len() * runs as usize);
    for c in configs {
        for m in modes {
            for t in tasks {
                for run in 1..=runs {
                    cases.push(TestCase::new(c.clone(), m.clone(), t.clone(), run));
                }
            }
        }
    }
    cases
}

fn warn_unknown(axis: Axis, selected: &[String], known: &[String]) {
    for value in selected.iter().filter(|v| !known.contains(v)) {
        warn!(%axis, value = %value, "Selected value is not in the known set");
    }
}

/// Split and validate an addressed `config:mode:task` id.
pub fn parse_test_id(
    test_id: &str,
    config: &SweepConfig,
) -> Result<(String, String, String), SweepError> {
    let parts: Vec<&str> = test_id.split(':').collect();
    let [c, m, t] = parts.as_slice() else {
        return Err(SweepError::MalformedTestId {
            test_id: test_id.to_string(),
        });
    };

    for (axis, value, valid) in [
        (Axis::Config, c, &config.configs),
        (Axis::Mode, m, &config.modes),
        (Axis::Task, t, &config.tasks),
    ] {
        if !valid.iter().any(|v| v == value) {
            return Err(SweepError::unknown_axis_value(axis, *value, valid));
        }
    }

    Ok((c.to_string(), m.to_string(), t.to_string()))
}

/// Cases for a single addressed id, repeated `runs` times.
pub fn addressed_cases(
    test_id: &str,
    config: &SweepConfig,
    runs: u32,
) -> Result<Vec<TestCase>, SweepError> {
    let (c, m, t) = parse_test_id(test_id, config)?;
    Ok((1..=runs)
        .map(|run| TestCase::new(c.clone(), m.clone(), t.clone(), run))
        .collect())
}

/// Every addressable `config:mode:task` id, in sweep order.
pub fn list_available_tests(config: &SweepConfig) -> Vec<String> {
    config
        .configs
        .iter()
        .flat_map(|c| {
            config.modes.iter().flat_map(move |m| {
                config
                    .tasks
                    .iter()
                    .map(move |t| format!("{c}:{m}:{t}"))
            })
        })
        .collect()
}
