/// Gemini generative-language client
///
/// Backs both the title-suggestion step of recommendations and the detail-page
/// insights. Every failure is logged and turned into an empty answer; callers
/// fall back to plain catalog search.
use crate::{
    error::{AppError, AppResult},
    models::{GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse},
    services::providers::{InsightGenerator, SuggestionGenerator},
};
use regex::Regex;
use reqwest::Client as HttpClient;
use std::sync::LazyLock;

/// Cap on titles recovered from free text when the model skips the JSON array
const MAX_FALLBACK_TITLES: usize = 8;

/// Known age ratings, upper-cased
const KNOWN_RATINGS: [&str; 12] = [
    "R",
    "PG-13",
    "PG",
    "G",
    "NC-17",
    "TV-MA",
    "TV-14",
    "TV-PG",
    "18+",
    "16+",
    "12+",
    "NOT RATED",
];

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\n]+)""#).expect("quoted-string pattern is valid"));

static RATING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z0-9+\-]+").expect("rating token pattern is valid"));

/// Sampling settings for one kind of request
#[derive(Debug, Clone, Copy)]
struct Generation {
    temperature: f32,
    max_output_tokens: u32,
}

const SUGGESTIONS: Generation = Generation {
    temperature: 0.7,
    max_output_tokens: 256,
};

const STORYLINE: Generation = Generation {
    temperature: 0.7,
    max_output_tokens: 200,
};

const AGE_RATING: Generation = Generation {
    temperature: 0.3,
    max_output_tokens: 50,
};

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        http_client: HttpClient,
        api_key: Option<String>,
        api_url: String,
        model: String,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_url,
            model,
        }
    }

    /// Whether an API key was provided
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one prompt and returns the first candidate's text
    ///
    /// `Ok(None)` when no key is configured or the model answered with nothing.
    async fn generate(&self, prompt: String, generation: Generation) -> AppResult<Option<String>> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("Gemini API key not set");
            return Ok(None);
        };

        let url = format!(
            "{}/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: generation.temperature,
                max_output_tokens: generation.max_output_tokens,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let body: GeminiResponse = response.json().await?;
        let text = body.first_text().map(str::to_string);

        tracing::debug!(model = %self.model, text = ?text, "Gemini response received");

        Ok(text)
    }
}

#[async_trait::async_trait]
impl SuggestionGenerator for GeminiClient {
    async fn suggest(&self, prompt: &str) -> Vec<String> {
        match self.generate(suggestion_prompt(prompt), SUGGESTIONS).await {
            Ok(Some(text)) => {
                let titles = parse_title_list(&text);
                if titles.is_empty() {
                    tracing::warn!(text = %text, "Could not extract movie titles from Gemini response");
                }
                tracing::info!(
                    prompt = %prompt,
                    suggestions = titles.len(),
                    provider = "gemini",
                    "Suggestions generated"
                );
                titles
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, prompt = %prompt, "Gemini suggestion request failed");
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl InsightGenerator for GeminiClient {
    async fn storyline(&self, title: &str) -> Option<String> {
        match self.generate(storyline_prompt(title), STORYLINE).await {
            Ok(text) => text.as_deref().and_then(clean_storyline),
            Err(e) => {
                tracing::warn!(error = %e, title = %title, "Gemini storyline request failed");
                None
            }
        }
    }

    async fn age_rating(&self, title: &str) -> Option<String> {
        match self.generate(age_rating_prompt(title), AGE_RATING).await {
            Ok(text) => text.as_deref().and_then(normalize_age_rating),
            Err(e) => {
                tracing::warn!(error = %e, title = %title, "Gemini age rating request failed");
                None
            }
        }
    }
}

fn suggestion_prompt(user_prompt: &str) -> String {
    format!(
        r#"You are a movie expert with access to the IMDb database. The user asked: "{user_prompt}"

Return ONLY titles of real, well-known movies that exist in IMDb.

Rules:
1. Return 5 to 8 specific movie titles, not keywords or genres.
2. Use the exact official English title as listed on IMDb.
3. For regional cinema (Telugu, Hindi, Tamil, ...), use the official IMDb English title.
4. Prefer popular movies that are certainly listed on IMDb.
5. Output ONLY a JSON array of strings, with no explanation and no markdown.

Examples:
- "Telugu movies" -> ["Baahubali: The Beginning", "RRR", "Pushpa: The Rise", "Magadheera"]
- "dark sci-fi" -> ["Blade Runner 2049", "Ex Machina", "Arrival", "Annihilation"]

Output format: ["Movie Title 1", "Movie Title 2", ...]"#
    )
}

fn storyline_prompt(title: &str) -> String {
    format!(
        "Provide a brief, engaging storyline for the movie \"{title}\". \
         Keep it to 2-3 sentences and spoiler-free. \
         Reply with the storyline text only, no explanations or markdown."
    )
}

fn age_rating_prompt(title: &str) -> String {
    format!(
        "What is the age rating of the movie \"{title}\"? \
         Reply with ONLY the rating (for example R, PG-13, PG, 18+, NC-17, TV-MA) \
         or \"Not Rated\" if unknown."
    )
}

/// Extracts movie titles from a model answer
///
/// Prefers the outermost JSON array (code fences and surrounding prose are
/// ignored). When that does not parse, falls back to every double-quoted
/// string in the text, capped at [`MAX_FALLBACK_TITLES`]. Unquoted prose is
/// never read as titles, so a refusal yields an empty list and the caller
/// searches the prompt itself.
pub fn parse_title_list(text: &str) -> Vec<String> {
    let unfenced = text.replace("```json", "").replace("```", "");

    if let (Some(start), Some(end)) = (unfenced.find('['), unfenced.rfind(']')) {
        if start < end {
            if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(&unfenced[start..=end])
            {
                return items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::trim)
                    .filter(|title| !title.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
    }

    QUOTED
        .captures_iter(&unfenced)
        .filter_map(|capture| capture.get(1))
        .map(|m| m.as_str().trim())
        .filter(|title| title.len() > 1)
        .take(MAX_FALLBACK_TITLES)
        .map(str::to_string)
        .collect()
}

/// Trims the storyline and drops one pair of wrapping quotes
pub fn clean_storyline(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix(['"', '\''])
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(['"', '\'']).unwrap_or(trimmed).trim();

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reduces a model answer to a single age rating
///
/// "Not Rated"/"Unrated" win outright. Otherwise the first whole token that is
/// a known rating is returned, so "PG-13" is never misread as "PG". Answers
/// with no known rating are cut to their first line and first sentence.
pub fn normalize_age_rating(text: &str) -> Option<String> {
    let cleaned = text.trim().trim_matches(['"', '\'']).to_uppercase();

    if cleaned.contains("NOT RATED") || cleaned.contains("UNRATED") {
        return Some("NOT RATED".to_string());
    }

    let known = RATING_TOKEN
        .find_iter(&cleaned)
        .map(|m| m.as_str().trim_end_matches('-'))
        .find(|token| KNOWN_RATINGS.contains(token));

    if let Some(rating) = known {
        return Some(rating.to_string());
    }

    let first = cleaned
        .lines()
        .next()
        .unwrap_or_default()
        .split('.')
        .next()
        .unwrap_or_default()
        .trim();

    (!first.is_empty()).then(|| first.to_string())
}
