//! Fixed-Size Text Chunking
//!
//! Splits page text into windows of `chunk_size` characters where each window
//! starts `chunk_size - chunk_overlap` characters after the previous one, so
//! neighbouring chunks share exactly `chunk_overlap` characters. Positions are
//! counted in `char`s, never bytes, so multi-byte scripts are never split
//! inside a character.
//!
//! # Usage
//!
//! ```ignore
//! use docqa_rag::chunker::{ChunkConfig, TextChunker};
//!
//! let chunker = TextChunker::new(ChunkConfig::default())?;
//! let chunks = chunker.split_documents(&documents);
//! ```

use serde::{Deserialize, Serialize};

use docqa_core::{Document, DocumentSource};

use crate::RagError;

/// Configuration for chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: docqa_config::constants::rag::DEFAULT_CHUNK_SIZE,
            chunk_overlap: docqa_config::constants::rag::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl From<&docqa_config::RagConfig> for ChunkConfig {
    fn from(config: &docqa_config::RagConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Distance between the starts of consecutive chunks
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// A window of text with its `[start_char, end_char)` character span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub start_char: usize,
    pub end_char: usize,
}

/// A chunk of a source document, the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Page the chunk was cut from
    pub source: DocumentSource,
    /// Position of this chunk within its document
    pub index: usize,
    /// Start character position in the document
    pub start_char: usize,
    /// End character position in the document (exclusive)
    pub end_char: usize,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.end_char - self.start_char
    }
}

/// Fixed-size overlapping chunker
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    pub fn new(config: ChunkConfig) -> Result<Self, RagError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split raw text; blank text yields no chunks
    pub fn chunk(&self, text: &str) -> Vec<TextSpan> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // byte offset of every char boundary, including the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total_chars = boundaries.len() - 1;

        let mut spans = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.config.chunk_size).min(total_chars);
            spans.push(TextSpan {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                start_char: start,
                end_char: end,
            });
            if end == total_chars {
                break;
            }
            start += self.config.stride();
        }
        spans
    }

    /// Split a sequence of documents, preserving document order
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| {
                self.chunk(&doc.text)
                    .into_iter()
                    .enumerate()
                    .map(move |(index, span)| Chunk {
                        text: span.text,
                        source: doc.source.clone(),
                        index,
                        start_char: span.start_char,
                        end_char: span.end_char,
                    })
            })
            .collect();

        tracing::debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "Split documents into chunks"
        );

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkConfig::new(size, overlap)).unwrap()
    }

    fn text_of_len(n: usize) -> String {
        (0..n)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn test_2500_chars_gives_three_chunks() {
        let text = text_of_len(2500);
        let spans = chunker(1000, 200).chunk(&text);

        let bounds: Vec<(usize, usize)> =
            spans.iter().map(|s| (s.start_char, s.end_char)).collect();
        assert_eq!(bounds, vec![(0, 1000), (800, 1800), (1600, 2500)]);
        assert_eq!(spans[2].text.chars().count(), 900);
        assert_eq!(spans[0].text, text[..1000]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let spans = chunker(1000, 200).chunk("A short page.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "A short page.");
        assert_eq!((spans[0].start_char, spans[0].end_char), (0, 13));
    }

    #[test]
    fn test_exact_and_one_over() {
        assert_eq!(chunker(1000, 200).chunk(&text_of_len(1000)).len(), 1);

        let spans = chunker(1000, 200).chunk(&text_of_len(1001));
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[1].start_char, spans[1].end_char), (800, 1001));
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        assert!(chunker(10, 2).chunk("").is_empty());
        assert!(chunker(10, 2).chunk(" \n\t ").is_empty());
    }

    #[test]
    fn test_multibyte_text() {
        let text = "नमस्ते दुनिया, यह एक परीक्षण है";
        let spans = chunker(10, 3).chunk(text);
        assert!(spans.len() > 1);
        for span in &spans {
            assert!(span.text.chars().count() <= 10);
        }
        let last = spans.last().unwrap();
        assert_eq!(last.end_char, text.chars().count());
    }

    #[test]
    fn test_invalid_config() {
        assert!(TextChunker::new(ChunkConfig::new(0, 0)).is_err());
        assert!(TextChunker::new(ChunkConfig::new(100, 100)).is_err());
        assert!(TextChunker::new(ChunkConfig::new(100, 99)).is_ok());
    }

    #[test]
    fn test_split_documents_keeps_order_and_source() {
        let docs = vec![
            Document::new(DocumentSource::new("a.pdf", 1), text_of_len(25)),
            Document::new(DocumentSource::new("a.pdf", 2), "   "),
            Document::new(DocumentSource::new("b.pdf", 1), text_of_len(5)),
        ];
        let chunks = chunker(10, 2).split_documents(&docs);

        let origins: Vec<(String, u32, usize)> = chunks
            .iter()
            .map(|c| (c.source.path.display().to_string(), c.source.page, c.index))
            .collect();
        assert_eq!(
            origins,
            vec![
                ("a.pdf".to_string(), 1, 0),
                ("a.pdf".to_string(), 1, 1),
                ("a.pdf".to_string(), 1, 2),
                ("b.pdf".to_string(), 1, 0),
            ]
        );
        assert_eq!(chunks[2].char_len(), 9);
    }

    proptest! {
        #[test]
        fn consecutive_chunks_share_overlap(
            text in "[a-zA-Z0-9 .,\u{0900}-\u{097F}]{1,400}",
            size in 2usize..60,
            overlap_seed in 0usize..60,
        ) {
            prop_assume!(!text.trim().is_empty());
            let overlap = overlap_seed % size;
            let spans = chunker(size, overlap).chunk(&text);
            let total = text.chars().count();

            prop_assert_eq!(spans[0].start_char, 0);
            prop_assert_eq!(spans.last().unwrap().end_char, total);

            for pair in spans.windows(2) {
                let prev: Vec<char> = pair[0].text.chars().collect();
                let next: Vec<char> = pair[1].text.chars().collect();
                prop_assert_eq!(prev.len(), size);
                prop_assert_eq!(&prev[prev.len() - overlap..], &next[..overlap]);
            }

            // Every character is covered by some chunk
            let rebuilt: String = spans
                .iter()
                .enumerate()
                .flat_map(|(i, s)| s.text.chars().skip(if i == 0 { 0 } else { overlap }))
                .collect();
            prop_assert_eq!(rebuilt, text);
        }
    }
}
