pub mod capacity;
pub mod data;
pub mod document;
pub mod format;
pub mod generate;
pub mod geometry;
pub mod io;
pub mod paginate;
pub mod pdf;
pub mod render;
pub mod serial;
mod spec;
mod stats;
pub mod template;
mod types;

pub use data::{field_names, load_records, remove_duplicates};
pub use document::SheetDocument;
pub use format::{DateFormat, LEAVE_AS_IS, apply_format};
pub use generate::{LabelSource, build_document, generate_labels, load_source, plan_labels};
pub use geometry::{Arrangement, PageShape, PartialRange, SheetGeometry};
pub use io::{output_file_path, save_document, unique_path};
pub use paginate::{Pagination, paginate};
pub use serial::{SerialSeed, is_valid_serial_format, parse_seed};
pub use spec::*;
pub use template::{LabelTemplate, TemplateRegistry};
pub use types::*;
