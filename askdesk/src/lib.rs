pub mod api;
pub mod chat;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod models;
pub mod processing;
pub mod search;
