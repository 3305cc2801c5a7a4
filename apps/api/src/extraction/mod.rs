// Text normalization, skill vocabulary and entity extraction.
// Pure, synchronous, no I/O beyond loading the vocabulary file at startup.

pub mod extractor;
pub mod normalizer;
pub mod vocabulary;
