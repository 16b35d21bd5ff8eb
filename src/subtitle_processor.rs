use std::collections::HashMap;
use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use log::debug;

// @module: Subtitle segmentation and reassembly

// @const: Timing separator between the two timestamps of a cue
const TIMING_ARROW: &str = "-->";

// @const: Musical note symbols used for song and music cues
const MUSIC_NOTES: &[char] = &['♪', '♫', '♬', '♩', '🎵', '🎶'];

// @const: Sequence number line
static SEQUENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").unwrap()
});

// @const: One line fully wrapped in a single pair of brackets
static BRACKETED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\[[^\[\]]*\]|\([^()]*\)|（[^（）]*）|【[^【】]*】)$").unwrap()
});

/// One dialogue block waiting for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Index into the skeleton line array
    pub position: usize,

    /// Dialogue text, one trimmed line per subtitle line
    pub source_text: String,
}

/// A slot in the document skeleton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkeletonLine {
    /// Kept exactly as read: sequence numbers, timings, blanks and non-dialogue blocks
    Fixed(String),

    /// Placeholder for a translated dialogue block
    Reserved {
        /// Original block, lines joined with `\n`
        raw: String,
        /// Whether the original lines ended with `\r`
        crlf: bool,
    },
}

impl SkeletonLine {
    fn original(&self) -> &str {
        match self {
            Self::Fixed(line) => line,
            Self::Reserved { raw, .. } => raw,
        }
    }
}

/// A subtitle document split into its structural skeleton and dialogue units
#[derive(Debug, Clone, Default)]
pub struct SegmentedDocument {
    pub lines: Vec<SkeletonLine>,
    pub units: Vec<TranslationUnit>,
}

// @classifies: Trimmed form of a line, ignoring a leading BOM
fn classification_key(line: &str) -> &str {
    line.trim_start_matches('\u{feff}').trim()
}

fn is_sequence_line(line: &str) -> bool {
    SEQUENCE_REGEX.is_match(classification_key(line))
}

fn is_timing_line(line: &str) -> bool {
    line.contains(TIMING_ARROW)
}

fn is_blank_line(line: &str) -> bool {
    classification_key(line).is_empty()
}

fn is_structural(line: &str) -> bool {
    is_blank_line(line) || is_sequence_line(line) || is_timing_line(line)
}

/// Whether a dialogue block carries nothing worth translating
///
/// Music cues (`♪ ♪`, `♪ la la ♪`), sound-effect annotations (`[door closes]`,
/// `(laughs)`) and lines made only of punctuation such as `---` are kept as-is.
pub fn is_non_dialogue(block: &str) -> bool {
    let text = classification_key(block);
    if text.is_empty() {
        return true;
    }

    let is_note = |c: char| MUSIC_NOTES.contains(&c);
    if text.chars().all(|c| is_note(c) || c.is_whitespace()) {
        return true;
    }
    let first = text.chars().next();
    let last = text.chars().last();
    if first.is_some_and(is_note) && last.is_some_and(is_note) {
        return true;
    }

    // Every line an annotation on its own, e.g. `[door closes]`, but not `[John] Hi [waves]`
    if text.lines().all(|line| BRACKETED_REGEX.is_match(line.trim())) {
        return true;
    }

    // Dashes, ellipses and other bare punctuation
    !text.chars().any(|c| c.is_alphanumeric())
}

impl SegmentedDocument {
    // @parses: Raw subtitle text into skeleton and dialogue units
    pub fn segment(raw: &str) -> Self {
        let source_lines: Vec<&str> = raw.split('\n').collect();
        let document_crlf = raw.contains("\r\n");
        let mut lines = Vec::with_capacity(source_lines.len());
        let mut units = Vec::new();

        let mut i = 0;
        while i < source_lines.len() {
            let line = source_lines[i];
            if is_structural(line) {
                lines.push(SkeletonLine::Fixed(line.to_string()));
                i += 1;
                continue;
            }

            // Coalesce the dialogue block
            let mut j = i + 1;
            while j < source_lines.len() && !is_structural(source_lines[j]) {
                j += 1;
            }
            let block = &source_lines[i..j];
            let raw_block = block.join("\n");
            let source_text = block.iter()
                .map(|l| classification_key(l))
                .collect::<Vec<_>>()
                .join("\n");

            if is_non_dialogue(&source_text) {
                debug!("Skipping non-dialogue block: {}", source_text);
                lines.push(SkeletonLine::Fixed(raw_block));
            } else {
                // A final cue without a trailing newline has no `\r` on its last line
                let crlf = block[0].ends_with('\r') || document_crlf;
                units.push(TranslationUnit { position: lines.len(), source_text });
                lines.push(SkeletonLine::Reserved { raw: raw_block, crlf });
            }
            i = j;
        }

        Self { lines, units }
    }

    /// Source texts of all units, in document order
    pub fn source_texts(&self) -> Vec<String> {
        self.units.iter().map(|u| u.source_text.clone()).collect()
    }

    // @returns: Document with translations inserted at reserved slots
    pub fn reassemble(&self, translated_by_position: &HashMap<usize, String>) -> String {
        self.lines.iter()
            .enumerate()
            .map(|(position, line)| match (line, translated_by_position.get(&position)) {
                (SkeletonLine::Reserved { raw, crlf }, Some(translated)) => {
                    if *crlf {
                        let last_has_cr = raw.ends_with('\r');
                        let translated_lines: Vec<&str> = translated.split('\n').collect();
                        let last = translated_lines.len() - 1;
                        translated_lines.iter()
                            .enumerate()
                            .map(|(k, l)| {
                                let l = l.trim_end_matches('\r');
                                if k < last || last_has_cr { format!("{}\r", l) } else { l.to_string() }
                            })
                            .collect::<Vec<_>>()
                            .join("\n")
                    } else {
                        translated.clone()
                    }
                }
                _ => line.original().to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Reassemble from translations given in unit order
    pub fn reassemble_in_order(&self, translations: &[String]) -> String {
        let by_position = self.units.iter()
            .zip(translations.iter())
            .map(|(unit, text)| (unit.position, text.clone()))
            .collect::<HashMap<_, _>>();
        self.reassemble(&by_position)
    }
}

impl fmt::Display for SegmentedDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.reassemble(&HashMap::new()))
    }
}
