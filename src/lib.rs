pub mod accession;
pub mod app;
pub mod article;
pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod markup;
pub mod ncbi;
pub mod output;
pub mod patterns;
pub mod score;
pub mod signals;
pub mod sra;
pub mod tokenize;
