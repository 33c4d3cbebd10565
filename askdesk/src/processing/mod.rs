mod pii;
mod reformat;
mod tagger;

pub use pii::{mask_input_text, PiiMasker};
pub use reformat::data_reformat;
pub use tagger::{tag_input_text, MetadataTagger, METADATA_TAG_LABELS};
