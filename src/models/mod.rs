pub mod loaders;
pub mod order;
pub mod outcome;
pub mod upload;

pub use loaders::{accept_pdfs, load_selected_files};
pub use order::{OrderRecord, Platform, NOT_AVAILABLE};
pub use outcome::{BatchPhase, BatchState, FileOutcome, OutcomeStatus};
pub use upload::UploadedFile;
