//! Remote leaf disease classifier backed by the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use leafcheck_core::{Classifier, ClassifyError, Crop, EncodedImage, Language, PredictionResult};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

/// Public Gemini REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Classifier that sends the photo and a structured prompt to Gemini.
#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClassifier {
    /// Creates a classifier for the given key, model and endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Full `generateContent` URL for the configured model.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn classify(
        &self,
        image: &EncodedImage,
        crop: &Crop,
        language: Language,
    ) -> Result<PredictionResult, ClassifyError> {
        let body = build_request(image, crop, language);
        info!("Classifying {} as {} with {}", image.name, crop.name, self.model);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                error!("Classifier request failed: {e}");
                ClassifyError::Request(e.without_url().to_string())
            })?;

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::Malformed(e.without_url().to_string()))?;

        parse_response(&payload)
    }
}

/// Builds the text prompt for a crop and response language.
#[must_use]
pub fn build_prompt(crop: &Crop, language: Language) -> String {
    let auto_detect = crop.is_auto_detect();
    let lang = language.english_name();

    let crop_context = if auto_detect {
        "First, identify what kind of crop or plant this is likely to be (e.g. Rice, Wheat, Mango, etc). Then,".to_string()
    } else {
        format!("The user indicated this is a {} leaf.", crop.name)
    };
    let name_hint = if auto_detect {
        " Include the identified crop name in the disease name (e.g. 'Tomato Early Blight')."
    } else {
        ""
    };

    format!(
        "Analyze this image of a plant leaf.\n\
         {crop_context}\n\
         Identify if it is healthy or has a specific disease common in Bangladesh agriculture.\n\
         Respond in {response_lang}.\n\
         Return a JSON object.\n\
         \n\
         Rules:\n\
         1. 'diseaseName': The name of the disease or 'Healthy' (in {lang}).{name_hint}\n\
         2. 'isHealthy': boolean true if healthy, false otherwise.\n\
         3. 'confidence': number between 0 and 100 representing your certainty.\n\
         4. 'description': A simple, non-technical explanation of the visual symptoms (max 2 sentences) in {lang}.\n\
         5. 'recommendations': An array of 3-4 strings containing general agronomic advice \
         (e.g., crop rotation, drainage, sanitation) in {lang}. \
         DO NOT recommend specific chemical pesticides or brand names.\n",
        response_lang = response_language(language),
    )
}

fn response_language(language: Language) -> &'static str {
    match language {
        Language::En => "English",
        Language::Bn => "Bengali (Bangla)",
    }
}

/// Builds the `generateContent` request body: inline image, prompt and the
/// JSON response schema.
#[must_use]
pub fn build_request(image: &EncodedImage, crop: &Crop, language: Language) -> Value {
    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": image.media_type,
                        "data": STANDARD.encode(image.bytes()),
                    }
                },
                { "text": build_prompt(crop, language) }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "diseaseName": { "type": "STRING" },
            "isHealthy": { "type": "BOOLEAN" },
            "confidence": { "type": "NUMBER" },
            "description": { "type": "STRING" },
            "recommendations": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["diseaseName", "isHealthy", "confidence", "description", "recommendations"]
    })
}

/// `generateContent` response, reduced to the fields we read.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Extracts and validates the prediction from a response.
///
/// # Errors
///
/// Returns an error if the response has no text, the text is not a
/// prediction object, or the prediction is out of range.
pub fn parse_response(response: &GenerateResponse) -> Result<PredictionResult, ClassifyError> {
    let text = response
        .text()
        .filter(|t| !t.trim().is_empty())
        .ok_or(ClassifyError::EmptyResponse)?;

    let prediction: PredictionResult = serde_json::from_str(extract_json(text))
        .map_err(|e| ClassifyError::Malformed(e.to_string()))?;
    prediction.validate()?;

    debug!(
        "Prediction: {} ({}%)",
        prediction.disease_name,
        prediction.confidence_percent()
    );
    Ok(prediction)
}

/// Strips a Markdown code fence or surrounding prose from a JSON answer.
fn extract_json(text: &str) -> &str {
    let text = text.trim();
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafcheck_core::find_crop;

    fn crop(id: &str) -> &'static Crop {
        find_crop(id).unwrap_or_else(|| panic!("{id} is in the catalog"))
    }

    fn response_with_text(text: &str) -> GenerateResponse {
        serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
        .unwrap_or_else(|e| panic!("valid response json: {e}"))
    }

    const PREDICTION: &str = r#"{
        "diseaseName": "Rice Blast",
        "isHealthy": false,
        "confidence": 87,
        "description": "Diamond-shaped lesions with grey centers.",
        "recommendations": ["Avoid excess nitrogen.", "Improve drainage.", "Remove infected stubble."]
    }"#;

    #[test]
    fn test_prompt_for_named_crop() {
        let prompt = build_prompt(crop("rice"), Language::En);
        assert!(prompt.contains("The user indicated this is a Rice leaf."));
        assert!(prompt.contains("Respond in English."));
        assert!(prompt.contains("DO NOT recommend specific chemical pesticides"));
        assert!(!prompt.contains("Include the identified crop name"));
    }

    #[test]
    fn test_prompt_for_auto_detect_in_bangla() {
        let prompt = build_prompt(crop("other"), Language::Bn);
        assert!(prompt.starts_with("Analyze this image of a plant leaf."));
        assert!(prompt.contains("First, identify what kind of crop"));
        assert!(prompt.contains("Include the identified crop name"));
        assert!(prompt.contains("Respond in Bengali (Bangla)."));
        assert!(prompt.contains("(in Bengali)"));
    }

    #[test]
    fn test_request_inlines_image_and_schema() {
        let image = EncodedImage::new("leaf.png", "image/png", vec![1u8, 2, 3]);
        let body = build_request(&image, crop("wheat"), Language::En);

        let inline = &body["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "image/png");
        assert_eq!(inline["data"], "AQID");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"]
                .as_array()
                .map(Vec::len),
            Some(5)
        );
    }

    #[test]
    fn test_parse_valid_response() {
        let prediction = parse_response(&response_with_text(PREDICTION))
            .unwrap_or_else(|e| panic!("should parse: {e}"));
        assert_eq!(prediction.disease_name, "Rice Blast");
        assert!(!prediction.is_healthy);
        assert_eq!(prediction.recommendations.len(), 3);
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{PREDICTION}\n```");
        assert!(parse_response(&response_with_text(&fenced)).is_ok());
    }

    #[test]
    fn test_parse_empty_response() {
        let empty = GenerateResponse::default();
        assert!(matches!(
            parse_response(&empty),
            Err(ClassifyError::EmptyResponse)
        ));
        assert!(matches!(
            parse_response(&response_with_text("  ")),
            Err(ClassifyError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(matches!(
            parse_response(&response_with_text(r#"{"diseaseName": "x"}"#)),
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_out_of_range_confidence() {
        let text = PREDICTION.replace("87", "187");
        assert!(matches!(
            parse_response(&response_with_text(&text)),
            Err(ClassifyError::Invalid(_))
        ));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let classifier = GeminiClassifier::new(
            "key",
            DEFAULT_MODEL,
            "http://localhost:8080/v1beta/",
            DEFAULT_TIMEOUT,
        )
        .unwrap_or_else(|e| panic!("client builds: {e}"));
        assert_eq!(
            classifier.url(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
