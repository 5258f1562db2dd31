//! File actions module.
//!
//! Discarded duplicates leave the dataset through the [`delete`] module,
//! either permanently or via the system trash.
//!
//! ```no_run
//! use imgdedup::actions::{DeleteMethod, Remover};
//! use std::path::Path;
//!
//! let result = DeleteMethod::Permanent.remove(Path::new("/data/cat/copy.png"));
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_to_trash, permanent_delete, DeleteError, DeleteMethod, DeleteResult, Remover,
};
