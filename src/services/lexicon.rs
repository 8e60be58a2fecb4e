//! # Lexicon Scorer
//!
//! Rule-based compound polarity scoring for news headlines and summaries.
//!
//! Each known word carries a valence on a -4..=4 scale. Valences are adjusted
//! for the surrounding context (negations, boosters, ALL-CAPS emphasis, a
//! contrastive "but", exclamation marks), summed, and squashed into [-1, 1]
//! with `x / sqrt(x² + ALPHA)`.

use std::collections::HashMap;

use crate::external::provider::TextScorer;

/// Normalisation constant for the compound score
const ALPHA: f64 = 15.0;
/// Added to a valence (away from zero) for each booster word
const BOOSTER_INCREMENT: f64 = 0.293;
/// Added to a valence (away from zero) when the word is shouted
const CAPS_INCREMENT: f64 = 0.733;
/// Multiplier applied to a negated valence
const NEGATION_SCALAR: f64 = -0.74;
/// Added to the raw sum (away from zero) per exclamation mark
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
/// How many preceding tokens can negate or boost a word
const CONTEXT_WINDOW: usize = 3;

const VALENCES: &[(&str, f64)] = &[
    // general positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("best", 3.2),
    ("better", 1.9),
    ("positive", 2.6),
    ("optimistic", 1.3),
    ("confident", 2.2),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("wins", 2.7),
    ("winning", 2.4),
    ("strong", 2.3),
    ("stronger", 1.7),
    ("strength", 2.2),
    ("robust", 1.4),
    ("solid", 1.3),
    ("impressive", 2.3),
    ("happy", 2.7),
    ("love", 3.2),
    ("like", 1.5),
    ("benefit", 2.0),
    ("benefits", 1.6),
    ("opportunity", 1.8),
    ("opportunities", 1.6),
    ("improve", 1.9),
    ("improved", 2.1),
    ("improves", 1.8),
    ("improvement", 2.0),
    ("innovative", 2.2),
    ("innovation", 1.6),
    ("praise", 2.6),
    ("upbeat", 2.0),
    ("favorable", 2.1),
    ("reward", 2.1),
    ("safe", 1.9),
    // financial positive
    ("beat", 1.6),
    ("beats", 1.6),
    ("bullish", 2.0),
    ("buy", 0.9),
    ("upgrade", 1.8),
    ("upgraded", 1.8),
    ("upgrades", 1.7),
    ("outperform", 1.9),
    ("outperforms", 1.9),
    ("outperformed", 1.9),
    ("surge", 1.9),
    ("surges", 1.9),
    ("surged", 1.9),
    ("soar", 2.2),
    ("soars", 2.2),
    ("soared", 2.2),
    ("rally", 1.8),
    ("rallies", 1.8),
    ("rallied", 1.8),
    ("jump", 1.2),
    ("jumps", 1.2),
    ("jumped", 1.2),
    ("gain", 2.0),
    ("gains", 1.8),
    ("gained", 1.6),
    ("growth", 1.6),
    ("grow", 1.3),
    ("grows", 1.3),
    ("profit", 1.9),
    ("profits", 1.9),
    ("profitable", 1.9),
    ("record", 1.1),
    ("rise", 1.2),
    ("rises", 1.2),
    ("rising", 1.0),
    ("rebound", 1.4),
    ("rebounds", 1.4),
    ("recovery", 1.5),
    ("exceed", 1.6),
    ("exceeds", 1.6),
    ("exceeded", 1.6),
    ("dividend", 0.8),
    ("breakthrough", 2.3),
    ("approval", 2.0),
    ("approved", 1.8),
    ("expansion", 1.1),
    ("momentum", 0.9),
    // general negative
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("poor", -2.1),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("negative", -2.7),
    ("pessimistic", -1.5),
    ("fail", -2.5),
    ("fails", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("weak", -1.9),
    ("weaker", -1.9),
    ("weakness", -1.6),
    ("problem", -1.7),
    ("problems", -1.7),
    ("trouble", -1.7),
    ("troubled", -2.0),
    ("concern", -1.4),
    ("concerns", -1.4),
    ("worry", -1.9),
    ("worries", -1.8),
    ("fear", -2.2),
    ("fears", -2.0),
    ("risk", -1.1),
    ("risks", -1.1),
    ("risky", -1.4),
    ("uncertainty", -1.4),
    ("crisis", -3.1),
    ("warning", -1.4),
    ("warns", -1.4),
    ("threat", -2.4),
    ("angry", -2.3),
    ("hate", -2.7),
    ("scandal", -1.9),
    ("disappoint", -2.3),
    ("disappoints", -2.3),
    ("disappointing", -2.2),
    ("disappointed", -1.9),
    ("hurt", -2.4),
    ("damage", -2.2),
    ("struggle", -2.0),
    ("struggles", -1.9),
    // financial negative
    ("miss", -1.3),
    ("misses", -1.3),
    ("missed", -1.2),
    ("bearish", -1.8),
    ("sell", -0.8),
    ("selloff", -1.8),
    ("downgrade", -1.8),
    ("downgraded", -1.8),
    ("downgrades", -1.7),
    ("underperform", -1.8),
    ("underperforms", -1.8),
    ("plunge", -2.1),
    ("plunges", -2.1),
    ("plunged", -2.1),
    ("crash", -2.7),
    ("crashes", -2.7),
    ("tumble", -1.8),
    ("tumbles", -1.8),
    ("slump", -1.9),
    ("slumps", -1.9),
    ("drop", -1.1),
    ("drops", -1.1),
    ("dropped", -1.1),
    ("fall", -1.2),
    ("falls", -1.2),
    ("fell", -1.2),
    ("decline", -1.4),
    ("declines", -1.4),
    ("declined", -1.4),
    ("loss", -1.3),
    ("losses", -1.3),
    ("lose", -1.7),
    ("loses", -1.7),
    ("lawsuit", -1.6),
    ("sued", -1.8),
    ("fraud", -2.9),
    ("investigation", -1.2),
    ("probe", -1.1),
    ("recall", -1.4),
    ("layoffs", -1.9),
    ("cut", -1.1),
    ("cuts", -1.1),
    ("bankruptcy", -2.9),
    ("default", -1.7),
    ("volatile", -0.9),
    ("volatility", -0.8),
    ("shortfall", -1.6),
    ("penalty", -1.7),
    ("fine", -0.6),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "nowhere",
    "cannot", "cant", "can't", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't",
    "wont", "won't", "wouldnt", "wouldn't", "shouldnt", "shouldn't", "couldnt", "couldn't",
    "isnt", "isn't", "arent", "aren't", "wasnt", "wasn't", "werent", "weren't",
    "without", "hardly", "barely", "rarely",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("very", BOOSTER_INCREMENT),
    ("extremely", BOOSTER_INCREMENT),
    ("highly", BOOSTER_INCREMENT),
    ("hugely", BOOSTER_INCREMENT),
    ("incredibly", BOOSTER_INCREMENT),
    ("significantly", BOOSTER_INCREMENT),
    ("substantially", BOOSTER_INCREMENT),
    ("sharply", BOOSTER_INCREMENT),
    ("dramatically", BOOSTER_INCREMENT),
    ("massively", BOOSTER_INCREMENT),
    ("most", BOOSTER_INCREMENT),
    ("more", BOOSTER_INCREMENT),
    ("really", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT),
    ("totally", BOOSTER_INCREMENT),
    ("slightly", -BOOSTER_INCREMENT),
    ("somewhat", -BOOSTER_INCREMENT),
    ("marginally", -BOOSTER_INCREMENT),
    ("barely", -BOOSTER_INCREMENT),
    ("partly", -BOOSTER_INCREMENT),
    ("less", -BOOSTER_INCREMENT),
    ("little", -BOOSTER_INCREMENT),
];

struct Token {
    lower: String,
    shouted: bool,
}

/// Deterministic, stateless lexicon scorer.
pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
        }
    }

    fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    fn is_negation(word: &str) -> bool {
        NEGATIONS.contains(&word) || word.ends_with("n't")
    }

    fn tokenize(text: &str) -> Vec<Token> {
        let raw: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .map(|w| w.trim_matches('\''))
            .filter(|w| !w.is_empty())
            .collect();

        let is_caps = |w: &str| {
            w.chars().count() > 1
                && w.chars().any(char::is_alphabetic)
                && !w.chars().any(char::is_lowercase)
        };

        // Emphasis only means something when the rest of the text is not shouted too.
        let mixed_case = raw.iter().any(|w| is_caps(w)) && raw.iter().any(|w| !is_caps(w));

        raw.into_iter()
            .map(|w| Token {
                lower: w.to_lowercase(),
                shouted: mixed_case && is_caps(w),
            })
            .collect()
    }

    fn contextual_valence(&self, tokens: &[Token], index: usize, base: f64) -> f64 {
        let mut valence = base;

        if tokens[index].shouted {
            valence += CAPS_INCREMENT * valence.signum();
        }

        let window_start = index.saturating_sub(CONTEXT_WINDOW);
        for (distance, prior) in tokens[window_start..index].iter().rev().enumerate() {
            if let Some(increment) = self.boosters.get(prior.lower.as_str()) {
                let damping = 1.0 - 0.05 * distance as f64;
                let mut scalar = increment * damping;
                if prior.shouted {
                    scalar += CAPS_INCREMENT * scalar.signum();
                }
                valence += scalar * valence.signum();
            }
        }

        if tokens[window_start..index]
            .iter()
            .any(|prior| Self::is_negation(&prior.lower))
        {
            valence *= NEGATION_SCALAR;
        }

        valence
    }

    /// Raw (unnormalised) sum of contextual valences.
    fn raw_sum(&self, text: &str) -> f64 {
        let tokens = Self::tokenize(text);
        let but_index = tokens.iter().position(|t| t.lower == "but");

        let mut sum = 0.0;
        for (index, token) in tokens.iter().enumerate() {
            // A negator or booster carries no valence of its own.
            if self.boosters.contains_key(token.lower.as_str()) {
                continue;
            }
            let Some(base) = self.valence(&token.lower) else {
                continue;
            };

            let mut valence = self.contextual_valence(&tokens, index, base);
            match but_index {
                Some(b) if index < b => valence *= 0.5,
                Some(b) if index > b => valence *= 1.5,
                _ => {}
            }
            sum += valence;
        }

        if sum != 0.0 {
            let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += EXCLAMATION_INCREMENT * exclamations as f64 * sum.signum();
        }

        sum
    }
}

impl TextScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let sum = self.raw_sum(text);
        if sum == 0.0 {
            return 0.0;
        }
        let compound = sum / (sum * sum + ALPHA).sqrt();
        compound.clamp(-1.0, 1.0)
    }
}
