pub mod constants;
pub mod impose;
pub mod layout;
pub mod marks;
mod options;
pub mod render;
mod stats;
mod types;
pub mod units;

pub use impose::{
    Impositor, Settings, impose, impose_files, impose_pages, load_multiple_pdfs, load_pdf,
    save_pdf,
};
pub use options::*;
pub use stats::{calculate_statistics, statistics_for};
pub use types::*;
pub use units::{Creep, parse_length, parse_signature};
