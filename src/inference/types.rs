use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct TranslationRequest<'a> {
    pub inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<TranslationParameters<'a>>,
}

/// Parameters for many-to-many models. `tgt_lang` becomes the forced
/// beginning-of-sequence token.
#[derive(Debug, Serialize)]
pub struct TranslationParameters<'a> {
    pub src_lang: &'a str,
    pub tgt_lang: &'a str,
    pub generate_parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
pub struct GenerateParameters {
    pub max_new_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct TranslationOutput {
    pub translation_text: String,
}

#[derive(Debug, Serialize)]
pub struct FeatureExtractionRequest<'a> {
    pub inputs: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: Option<String>,
}
