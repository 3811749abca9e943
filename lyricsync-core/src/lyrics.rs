//! Lyric tokenizer: raw pasted text to lines and words.

/// Tokenized lyric text ready for a sync session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricSheet {
    lines: Vec<LyricLine>,
}

/// One non-empty lyric line and its words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    pub text: String,
    pub words: Vec<String>,
}

impl LyricSheet {
    /// Split raw text into trimmed, non-empty lines, and each line into words.
    ///
    /// Words are separated by spaces; runs of spaces collapse. An input with no
    /// non-empty line yields an empty sheet, which callers must reject.
    #[must_use]
    pub fn tokenize(text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| LyricLine {
                text: line.to_string(),
                words: line
                    .split(' ')
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
            .collect();

        Self { lines }
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of words across all lines.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }
}

impl LyricLine {
    /// Words re-joined with single spaces.
    ///
    /// Equal to `text` unless the line contained runs of spaces or tabs.
    #[must_use]
    pub fn joined_words(&self) -> String {
        self.words.join(" ")
    }
}
