/// One row of the region table: a lowercase substring pattern matched
/// against bone names and the fraction of the overall stature scale the
/// matching region receives. Ratio 0 keeps the region rigid under height
/// changes, 1 scales it fully.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub pattern: String,
    pub ratio: f32,
}

/// Ordered body-region table.
///
/// Classification scans the whole table: when several patterns match the
/// same bone name, the last matching entry wins. Table order is part of
/// the contract; reordering entries changes classification.
pub struct GrowthTable {
    regions: Vec<Region>,
}

// Legs and spine carry most of a stature change; extremities stay close
// to rigid so hands and feet do not stretch with height.
const BUILTIN: &[(&str, f32)] = &[
    ("spine", 0.9),
    ("neck", 0.3),
    ("head", 0.1),
    ("shoulder", 0.25),
    ("upperarm", 0.4),
    ("lowerarm", 0.4),
    ("hand", 0.05),
    ("upperleg", 1.0),
    ("lowerleg", 1.0),
    ("foot", 0.05),
];

impl GrowthTable {
    pub fn builtin() -> Self {
        GrowthTable::from_regions(
            BUILTIN
                .iter()
                .map(|&(pattern, ratio)| Region {
                    pattern: pattern.to_owned(),
                    ratio,
                })
                .collect(),
        )
    }

    /// Builds a table from explicit rows, normalizing patterns to
    /// lowercase. Ratios outside [0, 1] are clamped.
    pub fn from_regions(regions: Vec<Region>) -> Self {
        let regions = regions
            .into_iter()
            .map(|region| {
                if region.ratio < 0.0 || region.ratio > 1.0 {
                    tracing::warn!(
                        "growth ratio {} for `{}` clamped to [0, 1]",
                        region.ratio,
                        region.pattern
                    );
                }
                Region {
                    pattern: region.pattern.to_lowercase(),
                    ratio: region.ratio.max(0.0).min(1.0),
                }
            })
            .collect();

        GrowthTable { regions }
    }

    /// Returns the growth ratio for a bone name, or `None` when no region
    /// matches and the bone must keep its identity scale.
    pub fn classify(&self, bone_name: &str) -> Option<f32> {
        let name = bone_name.to_lowercase();

        let mut ratio = None;
        for region in &self.regions {
            if name.contains(&region.pattern) {
                ratio = Some(region.ratio);
            }
        }
        ratio
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl Default for GrowthTable {
    fn default() -> Self {
        GrowthTable::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive() {
        let table = GrowthTable::builtin();

        assert_eq!(table.classify("UpperArm_L"), Some(0.4));
        assert_eq!(table.classify("UPPERLEG_R"), Some(1.0));
        assert_eq!(table.classify("mixamorig:Head"), Some(0.1));
    }

    #[test]
    fn unmatched_names_return_none() {
        let table = GrowthTable::builtin();

        assert_eq!(table.classify("Hips"), None);
        assert_eq!(table.classify(""), None);
        assert_eq!(table.classify("Prop_Sword"), None);
    }

    #[test]
    fn last_matching_entry_wins() {
        let table = GrowthTable::from_regions(vec![
            Region {
                pattern: "arm".to_owned(),
                ratio: 0.2,
            },
            Region {
                pattern: "upperarm".to_owned(),
                ratio: 0.4,
            },
        ]);

        // Both rows match; the later row decides.
        assert_eq!(table.classify("UpperArm_L"), Some(0.4));

        let reversed = GrowthTable::from_regions(vec![
            Region {
                pattern: "upperarm".to_owned(),
                ratio: 0.4,
            },
            Region {
                pattern: "arm".to_owned(),
                ratio: 0.2,
            },
        ]);

        assert_eq!(reversed.classify("UpperArm_L"), Some(0.2));
    }

    #[test]
    fn custom_patterns_are_lowercased() {
        let table = GrowthTable::from_regions(vec![Region {
            pattern: "Tail".to_owned(),
            ratio: 0.5,
        }]);

        assert_eq!(table.classify("TAIL_03"), Some(0.5));
    }

    #[test]
    fn out_of_range_ratios_are_clamped() {
        let table = GrowthTable::from_regions(vec![
            Region {
                pattern: "spine".to_owned(),
                ratio: 1.7,
            },
            Region {
                pattern: "head".to_owned(),
                ratio: -0.3,
            },
        ]);

        assert_eq!(table.classify("Spine1"), Some(1.0));
        assert_eq!(table.classify("Head"), Some(0.0));
    }
}
