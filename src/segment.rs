//! Text segmentation for cell-limited braille displays
//!
//! Splits arbitrary text into ordered chunks whose estimated braille
//! footprint fits the display's cell count. Three interchangeable strategies
//! control where boundaries fall: whitespace words, sentences, or "smart"
//! units that keep formula-like spans and idiomatic Korean predicates whole.
//!
//! The footprint estimate is a heuristic weight sum, not the true translated
//! cell count (translation is an external service). It only has to be stable
//! and monotonic, since it merely drives boundary decisions.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Chunk boundary policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Greedy whitespace-word accumulation
    Word,
    /// Sentence units first, word-level fallback for oversized sentences
    Sentence,
    /// Formula spans and idiomatic phrases kept whole where possible
    #[default]
    Smart,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" => Ok(Strategy::Word),
            "sentence" => Ok(Strategy::Sentence),
            "smart" => Ok(Strategy::Smart),
            other => Err(format!("unknown strategy '{other}' (word, sentence, smart)")),
        }
    }
}

/// Per-script footprint weights, summed per character and rounded up.
///
/// These are a tunable policy, not ground truth: a Hangul syllable usually
/// translates to two cells, Latin letters and digits to one, and whitespace
/// costs a separator roughly half the time. Replace the weights if the
/// downstream translation table disagrees.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CellWeights {
    pub hangul: f32,
    pub alphanumeric: f32,
    pub whitespace: f32,
    pub other: f32,
}

impl Default for CellWeights {
    fn default() -> Self {
        Self {
            hangul: 2.0,
            alphanumeric: 1.0,
            whitespace: 0.5,
            other: 1.0,
        }
    }
}

impl CellWeights {
    /// Estimated cell footprint of `text` on a braille display
    pub fn estimate(&self, text: &str) -> usize {
        let total: f32 = text
            .chars()
            .map(|ch| {
                if ('\u{AC00}'..='\u{D7A3}').contains(&ch) {
                    self.hangul
                } else if ch.is_ascii_alphanumeric() {
                    self.alphanumeric
                } else if ch.is_whitespace() {
                    self.whitespace
                } else {
                    self.other
                }
            })
            .sum();
        total.ceil() as usize
    }
}

/// Options controlling segmentation
#[derive(Debug, Clone)]
pub struct SegmentOptions {
    /// Display capacity in cells; values below 1 are clamped to 1
    pub max_cells: usize,
    pub strategy: Strategy,
    pub weights: CellWeights,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            max_cells: 3,
            strategy: Strategy::default(),
            weights: CellWeights::default(),
        }
    }
}

impl SegmentOptions {
    fn limit(&self) -> usize {
        self.max_cells.max(1)
    }
}

/// The ordered chunks for one source text, together with the options that
/// produced them. Regenerated wholesale whenever text or options change.
#[derive(Debug, Clone, Default)]
pub struct ChunkSet {
    chunks: Vec<String>,
    options: Option<SegmentOptions>,
}

impl ChunkSet {
    pub fn new(text: &str, options: SegmentOptions) -> Self {
        let chunks = segment(text, &options);
        Self {
            chunks,
            options: Some(options),
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<String> {
        self.chunks
    }

    pub fn options(&self) -> Option<&SegmentOptions> {
        self.options.as_ref()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Split `text` into ordered display-sized chunks.
///
/// Total over its input domain: empty or whitespace-only text yields an empty
/// vec, and a single atom whose own footprint exceeds the limit is subdivided
/// down to individual characters, so the function always terminates. A lone
/// character that still exceeds the limit is emitted by itself as the minimal
/// possible unit.
pub fn segment(text: &str, options: &SegmentOptions) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match options.strategy {
        Strategy::Word => segment_words(text, options),
        Strategy::Sentence => greedy(sentence_units(text), options, segment_words),
        Strategy::Smart => greedy(smart_units(text), options, segment_words),
    }
}

fn segment_words(text: &str, options: &SegmentOptions) -> Vec<String> {
    let words = text.split_whitespace().map(str::to_string).collect();
    greedy(words, options, split_chars)
}

/// Greedy accumulation of units into chunks. A unit that alone exceeds the
/// limit is handed to `fallback` for finer subdivision.
fn greedy(
    units: Vec<String>,
    options: &SegmentOptions,
    fallback: fn(&str, &SegmentOptions) -> Vec<String>,
) -> Vec<String> {
    let limit = options.limit();
    let mut chunks = Vec::new();
    let mut current = String::new();

    for unit in units {
        let candidate = if current.is_empty() {
            unit.clone()
        } else {
            format!("{current} {unit}")
        };

        if options.weights.estimate(&candidate) <= limit {
            current = candidate;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if options.weights.estimate(&unit) > limit {
                chunks.extend(fallback(&unit, options));
            } else {
                current = unit;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Character-level subdivision for a word that alone exceeds the limit
fn split_chars(word: &str, options: &SegmentOptions) -> Vec<String> {
    let limit = options.limit();
    let mut chunks = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);

        if options.weights.estimate(&candidate) <= limit {
            current = candidate;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            // A single character may exceed the limit; it is emitted alone as
            // the minimal possible unit.
            current.push(ch);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split text into sentence units on terminal punctuation, keeping the
/// terminator with its sentence
fn sentence_units(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            // Boundary only when the terminator run ends (handles "..." and "?!")
            let at_end = chars
                .peek()
                .map(|&next| next.is_whitespace())
                .unwrap_or(true);
            if at_end {
                let unit = current.trim().to_string();
                if !unit.is_empty() {
                    units.push(unit);
                }
                current.clear();
            }
        }
    }

    let tail = current.trim().to_string();
    if !tail.is_empty() {
        units.push(tail);
    }
    units
}

/// Formula-like run: an alphanumeric adjacent to a mathematical symbol
const FORMULA_PATTERN: &str =
    "[A-Za-z0-9]\\s*[²³⁴⁵⁶⁷⁸⁹⁰⁺⁻⁼⁽⁾∫∑∏√∞±×÷≤≥≠≈]";

/// Korean idiomatic predicate suffix (이다/하다/되다/있다/없다)
const PHRASE_PATTERN: &str = "[가-힣]+(?:이다|하다|되다|있다|없다)";

/// Split text into smart units: atomic spans (formulas, idiomatic phrases)
/// interleaved with ordinary words from the gaps between them
fn smart_units(text: &str) -> Vec<String> {
    let (Ok(formula), Ok(phrase)) = (Regex::new(FORMULA_PATTERN), Regex::new(PHRASE_PATTERN))
    else {
        return text.split_whitespace().map(str::to_string).collect();
    };

    let mut spans: Vec<(usize, usize)> = formula
        .find_iter(text)
        .chain(phrase.find_iter(text))
        .map(|m| (m.start(), m.end()))
        .collect();
    spans.sort_unstable();

    let mut units = Vec::new();
    let mut cursor = 0;
    for (start, end) in spans {
        // Overlapping matches keep the earlier span whole
        if start < cursor {
            continue;
        }
        units.extend(text[cursor..start].split_whitespace().map(str::to_string));
        let span = text[start..end].trim();
        if !span.is_empty() {
            units.push(span.to_string());
        }
        cursor = end;
    }
    units.extend(text[cursor..].split_whitespace().map(str::to_string));
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_cells: usize, strategy: Strategy) -> SegmentOptions {
        SegmentOptions {
            max_cells,
            strategy,
            weights: CellWeights::default(),
        }
    }

    /// Concatenation ignoring whitespace must reproduce the input's content
    fn assert_content_preserved(text: &str, chunks: &[String]) {
        let joined: String = chunks
            .join(" ")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(joined, original);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        for strategy in [Strategy::Word, Strategy::Sentence, Strategy::Smart] {
            assert!(segment("", &options(3, strategy)).is_empty());
            assert!(segment("   ", &options(3, strategy)).is_empty());
            assert!(segment("\t\n", &options(3, strategy)).is_empty());
        }
    }

    #[test]
    fn test_estimate_weights() {
        let w = CellWeights::default();
        assert_eq!(w.estimate(""), 0);
        assert_eq!(w.estimate("abc"), 3);
        assert_eq!(w.estimate("안녕"), 4);
        // "a b" = 1 + 0.5 + 1 = 2.5, rounded up
        assert_eq!(w.estimate("a b"), 3);
    }

    #[test]
    fn test_estimate_monotonic() {
        let w = CellWeights::default();
        let text = "안녕하세요 braille 123!";
        let mut prev = 0;
        for (idx, _) in text.char_indices() {
            let est = w.estimate(&text[..idx]);
            assert!(est >= prev);
            prev = est;
        }
    }

    #[test]
    fn test_word_strategy_korean_scenario() {
        let text = "안녕하세요 반갑습니다";
        let opts = options(3, Strategy::Word);
        let chunks = segment(text, &opts);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            // Single-syllable chunks are the minimal unit; everything the
            // greedy pass produced must fit the display.
            assert!(
                opts.weights.estimate(chunk) <= 3 || chunk.chars().count() == 1,
                "chunk {chunk:?} exceeds limit"
            );
        }
        assert_content_preserved(text, &chunks);
    }

    #[test]
    fn test_word_strategy_greedy_packing() {
        // 6-cell display fits three Latin words of footprint ~2 each
        let chunks = segment("ab cd ef gh", &options(6, Strategy::Word));
        assert_eq!(chunks, vec!["ab cd".to_string(), "ef gh".to_string()]);
    }

    #[test]
    fn test_oversized_word_subdivided() {
        let chunks = segment("abcdefghij", &options(3, Strategy::Word));
        assert_eq!(chunks, vec!["abc", "def", "ghi", "j"]);
        assert_content_preserved("abcdefghij", &chunks);
    }

    #[test]
    fn test_single_oversized_character_terminates() {
        // A Hangul syllable estimates at 2 cells; a 1-cell display still
        // yields exactly one chunk rather than looping.
        let chunks = segment("한", &options(1, Strategy::Word));
        assert_eq!(chunks, vec!["한".to_string()]);
    }

    #[test]
    fn test_max_cells_zero_clamped() {
        let chunks = segment("ab cd", &options(0, Strategy::Word));
        assert!(!chunks.is_empty());
        assert_content_preserved("ab cd", &chunks);
    }

    #[test]
    fn test_no_empty_chunks() {
        for strategy in [Strategy::Word, Strategy::Sentence, Strategy::Smart] {
            for max_cells in 1..=8 {
                let chunks = segment(
                    "The quick brown fox. 점자 디스플레이! x² = 4?",
                    &options(max_cells, strategy),
                );
                assert!(chunks.iter().all(|c| !c.trim().is_empty()));
            }
        }
    }

    #[test]
    fn test_sentence_units() {
        let units = sentence_units("First one. Second two! Third... Tail");
        assert_eq!(units, vec!["First one.", "Second two!", "Third...", "Tail"]);
    }

    #[test]
    fn test_sentence_strategy_accumulates() {
        let chunks = segment("Hi. Ok.", &options(10, Strategy::Sentence));
        assert_eq!(chunks, vec!["Hi. Ok.".to_string()]);
    }

    #[test]
    fn test_sentence_strategy_falls_back_to_words() {
        let text = "This sentence is far too long for the display.";
        let opts = options(5, Strategy::Sentence);
        let chunks = segment(text, &opts);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(opts.weights.estimate(chunk) <= 5);
        }
        assert_content_preserved(text, &chunks);
    }

    #[test]
    fn test_smart_units_formula_kept_whole() {
        let units = smart_units("solve x² now");
        assert!(units.contains(&"x²".to_string()));
        assert_eq!(units, vec!["solve", "x²", "now"]);
    }

    #[test]
    fn test_smart_units_korean_phrase() {
        let units = smart_units("이것은 중요하다 맞다");
        assert!(units.contains(&"중요하다".to_string()));
    }

    #[test]
    fn test_smart_strategy_atomic_span_fits() {
        let opts = options(4, Strategy::Smart);
        let chunks = segment("value x² equals four", &opts);
        // The formula span must not be split across chunk boundaries
        assert!(chunks.iter().any(|c| c.contains("x²")));
        assert_content_preserved("value x² equals four", &chunks);
    }

    #[test]
    fn test_smart_without_spans_matches_word_split() {
        let text = "plain words only here";
        let opts_smart = options(4, Strategy::Smart);
        let opts_word = options(4, Strategy::Word);
        assert_eq!(segment(text, &opts_smart), segment(text, &opts_word));
    }

    #[test]
    fn test_chunk_set_lifecycle() {
        let set = ChunkSet::new("안녕하세요 반갑습니다", SegmentOptions::default());
        assert!(!set.is_empty());
        assert_eq!(set.len(), set.chunks().len());

        let empty = ChunkSet::new("  ", SegmentOptions::default());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("word".parse::<Strategy>().unwrap(), Strategy::Word);
        assert_eq!("SMART".parse::<Strategy>().unwrap(), Strategy::Smart);
        assert!("phrase".parse::<Strategy>().is_err());
    }
}
