//! Per-age frequency, severity and premium series for the explorer charts

use serde::Serialize;

use super::PremiumSource;
use crate::config::DashboardConfig;
use crate::data::Level;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCurvePoint {
    pub level: Level,
    /// Frequency expressed in percent
    pub frequency_pct: f64,
    pub severity: f64,
    pub annual_premium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeCurvePoint {
    pub age: u8,
    pub levels: Vec<LevelCurvePoint>,
}

/// One point per configured age; cells missing from the catalog plot as zero
pub fn age_curves<S>(catalog: &S, config: &DashboardConfig) -> Vec<AgeCurvePoint>
where
    S: PremiumSource + ?Sized,
{
    config
        .ages()
        .map(|age| AgeCurvePoint {
            age,
            levels: config
                .level_order()
                .into_iter()
                .map(|level| match catalog.lookup(level, age) {
                    Some(row) => LevelCurvePoint {
                        level,
                        frequency_pct: row.frequency * 100.0,
                        severity: row.severity,
                        annual_premium: row.annual_premium,
                    },
                    None => LevelCurvePoint {
                        level,
                        frequency_pct: 0.0,
                        severity: 0.0,
                        annual_premium: 0.0,
                    },
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PremiumByLevelAge;
    use approx::assert_relative_eq;

    #[test]
    fn test_curves_fill_gaps_with_zero() {
        let rows = vec![PremiumByLevelAge {
            level: Level::HighSpecialty,
            age: 30,
            frequency: 0.0147,
            severity: 300_000.0,
            annual_premium: 4_410.0,
            monthly_premium: 367.5,
            description: "Alta Especialidad".to_string(),
        }];
        let curves = age_curves(&rows, &DashboardConfig::default());
        assert_eq!(curves.len(), 46);

        let at_30 = &curves[5];
        assert_eq!(at_30.age, 30);
        assert_eq!(at_30.levels[0].frequency_pct, 0.0);
        assert_relative_eq!(at_30.levels[2].frequency_pct, 1.47, max_relative = 1e-12);
        assert_eq!(at_30.levels[2].annual_premium, 4_410.0);
    }
}
