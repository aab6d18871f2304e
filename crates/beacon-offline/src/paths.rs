//! Default location of the offline queue file.

use std::path::PathBuf;

/// Product namespace under the platform data directory.
const PRODUCT_DIR: &str = "beacon";
/// Queue subfolder under the product namespace.
const QUEUE_DIR: &str = "offline-queue";
/// Queue filename.
const QUEUE_FILE: &str = "queue.json";

/// Default queue file path: platform per-user data root + product
/// namespace + queue subfolder + filename.
///
/// Falls back to the current directory when the platform reports no data
/// directory, so queue construction itself can never fail.
pub fn default_queue_file() -> PathBuf {
    let root = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    root.join(PRODUCT_DIR).join(QUEUE_DIR).join(QUEUE_FILE)
}
