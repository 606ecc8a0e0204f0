//! T3 Image Loader
//!
//! This crate reads compiled T3 virtual machine image files: it validates the
//! fixed file header, then walks the tagged data blocks that follow and
//! collects entry point, constant pools, static objects, metaclass and
//! function-set dependencies, and static initializers into an [`Image`]
//! ready to hand to an interpreter.
//!
//! ```ignore
//! let bytes = std::fs::read("game.t3")?;
//! let image = t3_image::load_image(&bytes)?;
//! println!("{} objects", image.objects.len());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod block;
pub mod cursor;
pub mod entry;
pub mod error;
pub mod fnset;
pub mod header;
pub mod holder;
pub mod image;
pub mod loader;
pub mod metaclass;
pub mod object;
pub mod options;
pub mod pool;
pub mod static_init;
pub mod writer;

pub use block::{BlockHeader, BlockOutcome, BlockSummary, BlockTag};
pub use cursor::ByteCursor;
pub use entry::EntryPoint;
pub use error::{DecodeError, ErrorKind, LoadError};
pub use fnset::{FunctionSetDep, FunctionSetTable};
pub use header::{ImageHeader, IMAGE_VERSION, SIGNATURE};
pub use holder::DataHolder;
pub use image::Image;
pub use loader::{load_image, load_image_with, Loader};
pub use metaclass::{MetaclassRecord, MetaclassTable};
pub use object::{ObjectRecord, ObjectStore};
pub use options::{LoadOptions, OptionsError};
pub use pool::{ConstantPool, PoolPage, PoolTable};
pub use static_init::StaticInitializers;
pub use writer::{ImageWriter, PayloadWriter};
