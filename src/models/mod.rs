pub mod posting;

pub use posting::{
    ExtractedCard, PostingRecord, PostingStore, Snapshot, NOT_AVAILABLE, NO_DESCRIPTION,
};
