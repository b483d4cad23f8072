pub mod code_links;
pub mod databases;
pub mod methods;
pub mod primers;

use serde::Serialize;

use crate::article::NormalizedArticle;
use crate::tokenize::Tokenizer;

use code_links::{CodeLinkConfidence, CodeLinkDetector};
use databases::detect_non_insdc_database;
use methods::{MethodHistogram, MethodWeights};
use primers::find_primers;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReport {
    pub methods: MethodHistogram,
    pub method_weights: Option<MethodWeights>,
    pub primers: Vec<String>,
    pub non_insdc_database: Option<&'static str>,
    pub code_link: CodeLinkConfidence,
}

pub fn detect_signals(
    article: &NormalizedArticle,
    tokenizer: &dyn Tokenizer,
    code_links: &CodeLinkDetector,
) -> SignalReport {
    let text = article.core_text();
    let sentences = tokenizer.sentences(text);
    let tokenized: Vec<Vec<String>> = sentences
        .iter()
        .map(|sentence| tokenizer.lowercase_words(sentence))
        .collect();

    let methods = MethodHistogram::from_sentences(&tokenized);
    SignalReport {
        methods,
        method_weights: methods.weights(),
        primers: find_primers(text),
        non_insdc_database: detect_non_insdc_database(&sentences),
        code_link: code_links.detect(text, &tokenized),
    }
}
