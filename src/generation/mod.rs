// src/generation/mod.rs

pub mod client;
pub mod gemini;

pub use client::{ChunkStream, Generated, GenerationBackend, GenerationError, generate_with_fallback};
pub use gemini::GeminiClient;
