//! Frame file collection
//!
//! - `parser.rs`: one `<frame>.txt` file into a header and a data record
//! - `table.rs`: records into an ordered table and the intermediate CSV file

pub mod parser;
pub mod table;

pub use parser::{list_frame_files, parse_frame_file, parse_frame_text, FrameFile, FrameRecord};
pub use table::{FrameTable, FRAME_COLUMN};
