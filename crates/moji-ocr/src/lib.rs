mod loader;
mod preprocess;
mod recognizer;

pub use loader::{encode_png, load_image};
pub use preprocess::clean_text;
pub use recognizer::{TesseractRecognizer, TextRecognizer};
