use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;

/// Most tweets the audio folder will show.
pub const AUDIO_FOLDER_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(default)]
    pub media_url: String,
    #[serde(default)]
    pub media_id: String,
    #[serde(default)]
    pub content: String,
}

/// Client for the decorative tweet feed.
#[derive(Clone)]
pub struct TweetService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TweetService {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn get_tweets(&self) -> Result<Vec<Tweet>> {
        let url = format!("{}/tweets", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "tweet feed request failed");
            return Err(anyhow!("Failed to fetch tweets"));
        }

        let tweets: Vec<Tweet> = response.json().await?;
        Ok(tweets)
    }

    /// Tweets carrying a media clip, as many as the audio folder holds.
    pub async fn audio_tweets(&self) -> Result<Vec<Tweet>> {
        Ok(audio_only(self.get_tweets().await?))
    }
}

pub fn audio_only(tweets: Vec<Tweet>) -> Vec<Tweet> {
    tweets
        .into_iter()
        .filter(|tweet| !tweet.media_url.is_empty())
        .take(AUDIO_FOLDER_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_wire_format() {
        let tweets: Vec<Tweet> = serde_json::from_str(
            r#"[{"mediaUrl":"https://cdn/a.mp3","mediaId":"7","content":"watching"},{"content":"no media"}]"#,
        )
        .unwrap();

        assert_eq!(tweets[0].media_url, "https://cdn/a.mp3");
        assert_eq!(tweets[0].media_id, "7");
        assert_eq!(tweets[1].media_url, "");
    }

    #[test]
    fn test_audio_only_filters_and_caps() {
        let mut tweets = vec![Tweet {
            media_url: String::new(),
            media_id: "none".to_string(),
            content: "text only".to_string(),
        }];
        for i in 0..30 {
            tweets.push(Tweet {
                media_url: format!("https://cdn/{i}.mp3"),
                media_id: i.to_string(),
                content: format!("clip {i}"),
            });
        }

        let audio = audio_only(tweets);
        assert_eq!(audio.len(), AUDIO_FOLDER_LIMIT);
        assert_eq!(audio[0].media_id, "0");
        assert!(audio.iter().all(|t| !t.media_url.is_empty()));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let service = TweetService::new("https://feed.example/", "k");
        assert_eq!(service.base_url, "https://feed.example");
    }
}
