use crate::types::{NicheRecord, ScanError, ScanRequest};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::instrument;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, timeout_ms: u64, max_retries: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            api_key,
            model,
            max_retries,
        }
    }

    fn extract_text_content(response_body: &serde_json::Value) -> Result<&str, ScanError> {
        let content_arr = response_body
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| ScanError::ApiError("Missing or invalid 'content' field".into()))?;

        content_arr
            .iter()
            .find(|item| item["type"] == "text")
            .and_then(|item| item["text"].as_str())
            .ok_or_else(|| ScanError::ApiError("Missing 'text' content".into()))
    }

    /// Slices the outermost JSON array out of a text block. The prompt asks
    /// for JSON only, but this stays defensive against prose wrappers. When
    /// the brackets are missing or inverted the text passes through whole
    /// and the parser reports the error.
    fn extract_json_array(text: &str) -> &str {
        match (text.find('['), text.rfind(']')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => text,
        }
    }

    fn parse_batch(text: &str) -> Result<Vec<serde_json::Value>, ScanError> {
        let records: Vec<serde_json::Value> =
            serde_json::from_str(Self::extract_json_array(text))?;
        if records.is_empty() {
            return Err(ScanError::EmptyBatch);
        }
        Ok(records)
    }

    /// Asks the generator for a batch of raw niche records. Records are
    /// returned untyped; normalization happens downstream.
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn scan(&self, request: ScanRequest) -> Result<Vec<serde_json::Value>, ScanError> {
        let schemars_schema = schemars::schema_for!(NicheRecord);
        let schema_json =
            serde_json::to_string_pretty(&schemars_schema).map_err(ScanError::JsonError)?;

        let system_prompt = format!(
            r#"You are a market-research assistant for a freelance-services opportunity scanner.
Your goal is to identify specialized, high-growth service niches and produce a complete launch blueprint for each.
You must output a JSON array whose elements conform to the schema below.
Do NOT output any markdown blocks or conversational text. JUST the JSON array.

Element JSON Schema:
{}
"#,
            schema_json
        );

        let user_prompt = json!({
            "task": "scan_service_niches",
            "niche_count": request.niche_count,
            "focus": &request.focus,
            "guidance": [
                "Titles must use transformation and ROI hooks",
                "FAQs must pair compelling questions with objection-handling answers",
                "Identify three buyer pain points and three marketing channels per niche",
                "Battle plan must exploit a specific gap in top-seller delivery",
                "Descriptions follow the problem-agitate-solution framework"
            ],
            "current_time_ms": request.as_of_ts_ms
        });

        let payload = json!({
            "model": self.model,
            "max_tokens": 4096,
            "system": system_prompt,
            "messages": [
                {
                    "role": "user",
                    "content": serde_json::to_string(&user_prompt)?
                }
            ]
        });

        let mut attempt = 0u32;
        loop {
            let send_result = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&payload)
                .send()
                .await;

            match send_result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        if status.as_u16() == 429 && attempt < self.max_retries {
                            attempt += 1;
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        return Err(ScanError::HttpStatus {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    let response_body: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| ScanError::ApiError(e.to_string()))?;
                    let text_content = Self::extract_text_content(&response_body)?;
                    return Self::parse_batch(text_content);
                }
                Err(e) => {
                    if e.is_timeout() {
                        if attempt < self.max_retries {
                            attempt += 1;
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        return Err(ScanError::Timeout);
                    }
                    if attempt < self.max_retries {
                        attempt += 1;
                        sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                        continue;
                    }
                    return Err(ScanError::ApiError(e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_text_block_from_message_body() {
        let body = json!({
            "content": [
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "[{\"niche\": \"a\"}]"}
            ]
        });
        let text = LlmClient::extract_text_content(&body).unwrap();
        assert_eq!(text, "[{\"niche\": \"a\"}]");
    }

    #[test]
    fn missing_content_is_an_api_error() {
        let body = json!({"type": "error"});
        assert!(matches!(
            LlmClient::extract_text_content(&body),
            Err(ScanError::ApiError(_))
        ));
    }

    #[test]
    fn array_is_sliced_out_of_prose_wrapper() {
        let text = "Here are your niches:\n[{\"niche\": \"a\"}, {\"niche\": \"b\"}]\nEnjoy!";
        let records = LlmClient::parse_batch(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["niche"], "a");
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(
            LlmClient::parse_batch("[]"),
            Err(ScanError::EmptyBatch)
        ));
    }

    #[test]
    fn garbage_text_is_a_json_error() {
        assert!(matches!(
            LlmClient::parse_batch("no json here"),
            Err(ScanError::JsonError(_))
        ));
    }

    #[test]
    fn inverted_bracket_order_is_an_error_not_a_panic() {
        // A closing bracket before the first opening one must not slice
        // out of bounds; the whole text falls through to the parser.
        for text in ["done] now the data: [", "]", "][", "tail ] then [ head"] {
            assert!(matches!(
                LlmClient::parse_batch(text),
                Err(ScanError::JsonError(_))
            ));
        }
    }
}
