pub mod gemini;

pub use gemini::GeminiSession;
