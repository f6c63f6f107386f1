pub mod file_loader;

pub use file_loader::{accept_pdfs, load_file, load_selected_files};
