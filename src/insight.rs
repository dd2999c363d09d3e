//! Insight classification
//!
//! Selects one of four fixed narratives from aggregate mood statistics. The
//! rules are evaluated in priority order and the first match wins.

use crate::types::{Insight, InsightEvidence, InsightKind, MoodStats, VolatilityTier};

struct Narrative {
    title: &'static str,
    body: &'static str,
    suggestion: &'static str,
}

static MIXED: Narrative = Narrative {
    title: "Mixed Month",
    body: "Your mood swung quite a bit this month. Look at which tags show up most often on the harder days.",
    suggestion: "Keep logging and compare the tags of your best and worst days.",
};

static POSITIVE: Narrative = Narrative {
    title: "Positive Month",
    body: "This month had more positive days than negative ones. Keep reinforcing the habits that worked!",
    suggestion: "You are making progress! Try to keep the habits that did you good this month.",
};

static CHALLENGING: Narrative = Narrative {
    title: "Challenging Month",
    body: "This was an emotionally intense month. Be kind to yourself. Taking care of small things already helps a lot.",
    suggestion: "Pick just one small goal to focus on next week.",
};

static BALANCED: Narrative = Narrative {
    title: "Balanced Month",
    body: "Your month was balanced. Small adjustments can add more positive moments.",
    suggestion: "Keep logging: consistency brings emotional clarity.",
};

impl InsightKind {
    fn narrative(&self) -> &'static Narrative {
        match self {
            InsightKind::Mixed => &MIXED,
            InsightKind::Positive => &POSITIVE,
            InsightKind::Challenging => &CHALLENGING,
            InsightKind::Balanced => &BALANCED,
        }
    }

    pub fn title(&self) -> &'static str {
        self.narrative().title
    }
}

/// Rule-based narrative selector
pub struct InsightClassifier;

impl InsightClassifier {
    /// Pick the narrative for a period.
    ///
    /// 1. high volatility -> Mixed
    /// 2. more positive than negative entries -> Positive
    /// 3. more negative than positive entries -> Challenging
    /// 4. otherwise -> Balanced
    pub fn classify(
        stats: &MoodStats,
        completed_count: u32,
        negative_count: u32,
        positive_count: u32,
    ) -> Insight {
        let kind = Self::kind(stats.volatility_tier, negative_count, positive_count);
        let narrative = kind.narrative();

        Insight {
            kind,
            title: narrative.title.to_string(),
            body: narrative.body.to_string(),
            suggestion: narrative.suggestion.to_string(),
            evidence: InsightEvidence {
                volatility_tier: stats.volatility_tier,
                completed_count,
                positive_count,
                negative_count,
            },
        }
    }

    pub fn kind(tier: VolatilityTier, negative_count: u32, positive_count: u32) -> InsightKind {
        if tier == VolatilityTier::High {
            InsightKind::Mixed
        } else if positive_count > negative_count {
            InsightKind::Positive
        } else if negative_count > positive_count {
            InsightKind::Challenging
        } else {
            InsightKind::Balanced
        }
    }
}
