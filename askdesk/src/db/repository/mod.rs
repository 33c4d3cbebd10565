mod transcripts;

pub use transcripts::{LibSqlTranscripts, TranscriptStore};
