use serde::{Deserialize, Serialize};
use std::fmt;

/// The four RICE factors as entered on the scoring section.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiceInputs {
    pub reach: f64,
    pub impact: f64,
    pub confidence: f64,
    pub effort: f64,
}

impl RiceInputs {
    pub const fn new(reach: f64, impact: f64, confidence: f64, effort: f64) -> Self {
        Self {
            reach,
            impact,
            confidence,
            effort,
        }
    }

    pub fn score(&self) -> f64 {
        rice_score(self.reach, self.impact, self.confidence, self.effort)
    }
}

/// Reach × Impact × Confidence ÷ Effort, with zero effort yielding zero.
///
/// Inputs are not range checked; negative values propagate through the arithmetic.
pub fn rice_score(reach: f64, impact: f64, confidence: f64, effort: f64) -> f64 {
    if effort == 0.0 {
        return 0.0;
    }
    (reach * impact * confidence) / effort
}

/// Coarse classification of a non-zero score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Low,
    Medium,
    High,
}

impl PriorityTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub const fn guidance(self) -> &'static str {
        match self {
            Self::High => "High priority: strong candidate for the next planning cycle.",
            Self::Medium => "Medium priority: worth scheduling once high-priority work is covered.",
            Self::Low => "Low priority: revisit if reach or confidence improves.",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier boundaries on the canonical weighted scale.
pub fn tier(score: f64) -> PriorityTier {
    TierThresholds::WEIGHTED.classify(score)
}

/// Lower bounds (inclusive) for the high and medium tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub high: f64,
    pub medium: f64,
}

impl TierThresholds {
    pub const WEIGHTED: Self = Self {
        high: 8.0,
        medium: 4.0,
    };

    pub const SLIDER: Self = Self {
        high: 125.0,
        medium: 25.0,
    };

    pub fn classify(&self, score: f64) -> PriorityTier {
        if score >= self.high {
            PriorityTier::High
        } else if score >= self.medium {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }
}

/// A labelled choice offered for an enumerated factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorOption {
    pub value: f64,
    pub label: &'static str,
}

const IMPACT_OPTIONS: [FactorOption; 5] = [
    FactorOption {
        value: 3.0,
        label: "Massive",
    },
    FactorOption {
        value: 2.0,
        label: "High",
    },
    FactorOption {
        value: 1.0,
        label: "Medium",
    },
    FactorOption {
        value: 0.5,
        label: "Low",
    },
    FactorOption {
        value: 0.25,
        label: "Minimal",
    },
];

const CONFIDENCE_OPTIONS: [FactorOption; 4] = [
    FactorOption {
        value: 1.0,
        label: "High",
    },
    FactorOption {
        value: 0.8,
        label: "Medium",
    },
    FactorOption {
        value: 0.5,
        label: "Low",
    },
    FactorOption {
        value: 0.3,
        label: "Moonshot",
    },
];

/// Which input affordances and tier thresholds apply to the scoring section.
///
/// `Weighted` is the canonical RICE scale with enumerated impact and confidence. `Slider` takes a
/// free 1-10 value for every factor; its scores live on a different magnitude and therefore use
/// their own thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    #[default]
    Weighted,
    Slider,
}

impl ScoreScale {
    pub const SLIDER_RANGE: (f64, f64) = (1.0, 10.0);

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weighted" | "rice" | "enumerated" => Some(Self::Weighted),
            "slider" | "sliders" | "1-10" => Some(Self::Slider),
            _ => None,
        }
    }

    pub const fn thresholds(self) -> TierThresholds {
        match self {
            Self::Weighted => TierThresholds::WEIGHTED,
            Self::Slider => TierThresholds::SLIDER,
        }
    }

    pub fn impact_options(self) -> &'static [FactorOption] {
        match self {
            Self::Weighted => &IMPACT_OPTIONS,
            Self::Slider => &[],
        }
    }

    pub fn confidence_options(self) -> &'static [FactorOption] {
        match self {
            Self::Weighted => &CONFIDENCE_OPTIONS,
            Self::Slider => &[],
        }
    }

    /// Whether the UI would offer `value` for impact. The engine never enforces this.
    pub fn offers_impact(self, value: f64) -> bool {
        match self {
            Self::Weighted => IMPACT_OPTIONS.iter().any(|option| option.value == value),
            Self::Slider => within_slider_range(value),
        }
    }

    /// Whether the UI would offer `value` for confidence. The engine never enforces this.
    pub fn offers_confidence(self, value: f64) -> bool {
        match self {
            Self::Weighted => CONFIDENCE_OPTIONS.iter().any(|option| option.value == value),
            Self::Slider => within_slider_range(value),
        }
    }

    pub fn assess(self, inputs: RiceInputs) -> ScoreAssessment {
        ScoreAssessment::from_score(inputs.score(), self.thresholds())
    }
}

fn within_slider_range(value: f64) -> bool {
    let (min, max) = ScoreScale::SLIDER_RANGE;
    value.fract() == 0.0 && (min..=max).contains(&value)
}

/// Display-facing classification that keeps "not scored yet" apart from a genuinely low score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScoreAssessment {
    Unscored,
    Scored { score: f64, tier: PriorityTier },
}

impl ScoreAssessment {
    pub fn from_score(score: f64, thresholds: TierThresholds) -> Self {
        if score == 0.0 {
            Self::Unscored
        } else {
            Self::Scored {
                score,
                tier: thresholds.classify(score),
            }
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Self::Unscored => 0.0,
            Self::Scored { score, .. } => *score,
        }
    }

    pub fn tier(&self) -> Option<PriorityTier> {
        match self {
            Self::Unscored => None,
            Self::Scored { tier, .. } => Some(*tier),
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Unscored => {
                "Not scored yet: fill in reach, impact, confidence and effort to calculate priority."
            }
            Self::Scored { tier, .. } => tier.guidance(),
        }
    }

    /// Two-decimal rendering used by summaries.
    pub fn display_score(&self) -> String {
        format!("{:.2}", self.score())
    }
}
