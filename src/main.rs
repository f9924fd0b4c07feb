//! # photo-groups CLI
//!
//! Command-line interface for the duplicate and burst detection engine.
//!
//! ## Usage
//! ```bash
//! photo-groups detect records.json --mode threshold --threshold 8
//! photo-groups select records.json --min-score 80 --output json
//! ```

mod cli;

use photo_dedup_engine::Result;

fn main() -> Result<()> {
    cli::run()
}
