use std::collections::HashSet;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "surge", "gain", "gains", "profit", "growth", "beat", "beats",
    "upgrade", "outperform", "strong", "positive", "rise", "rises", "increase",
    "breakthrough", "innovation", "success", "exceed", "exceeds", "momentum",
    "buy", "recommend", "optimistic", "record", "high", "advance",
    "dividend", "buyback", "repurchase", "accretive", "upside",
    "recovery", "rebound", "expansion", "robust", "accelerating",
    "overweight", "raised", "upgraded", "outpacing", "tailwind",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "declines", "loss", "losses", "fall", "falls", "plunge", "crash", "miss",
    "downgrade", "underperform", "weak", "negative", "drop", "drops", "decrease",
    "concern", "concerns", "risk", "fail", "disappoint", "slump", "sell",
    "warning", "pessimistic", "low", "retreat", "fear", "trouble",
    "dilution", "dilutive", "headwind", "lawsuit", "litigation",
    "recall", "investigation", "probe", "default", "bankruptcy",
    "restructuring", "layoff", "layoffs", "downside", "overvalued", "bubble",
    "underweight", "lowered", "suspended",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

/// A negation flips any sentiment word up to this many words after it.
const NEGATION_WINDOW: usize = 3;

/// Lexicon scorer for headlines and summaries.
///
/// Scores lie in `[-1, 1]`: the net count of positive minus negative hits
/// divided by the number of hits, or 0 when no sentiment word occurs.
pub struct SentimentScorer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negation: HashSet<&'static str>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negation: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    pub fn score(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        let words: Vec<&str> = text_lower
            .split(|c: char| {
                c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')')
            })
            .filter(|w| !w.is_empty())
            .collect();

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negation.contains(*w))
            .map(|(i, _)| i)
            .collect();

        let mut net: i32 = 0;
        let mut hits: i32 = 0;

        for (i, word) in words.iter().enumerate() {
            let is_positive = self.positive.contains(*word);
            let is_negative = self.negative.contains(*word);
            if !is_positive && !is_negative {
                continue;
            }

            let negated = negation_positions
                .iter()
                .any(|&neg_pos| neg_pos < i && (i - neg_pos) <= NEGATION_WINDOW);

            let polarity = if is_positive { 1 } else { -1 };
            net += if negated { -polarity } else { polarity };
            hits += 1;
        }

        if hits == 0 {
            0.0
        } else {
            net as f64 / hits as f64
        }
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}
