//! Identifier normalization for warehouse loads.
//!
//! Source systems name tables and columns in whatever convention they like
//! (`orderDetails`, `product-lines`, `orderdetails`). The warehouse staging
//! schema uses upper snake case. This crate converts between the two.

#![deny(unsafe_code)]

pub mod error;
pub mod exceptions;
pub mod frame;
pub mod identifier;
pub mod normalizer;
pub mod passes;

pub use error::{NamingError, Result};
pub use exceptions::{DEFAULT_EXCEPTIONS, ExceptionMap, load_entries};
pub use frame::{ColumnRename, plan_column_renames, rename_frame_columns};
pub use identifier::{CanonicalIdentifier, is_canonical};
pub use normalizer::{IdentifierNormalizer, normalize};
