//! Report domain model shared by the pipeline, the server, and the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Per-review sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parse an engine label, ignoring case and surrounding whitespace.
    ///
    /// Labels outside the three known values return `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Some(Sentiment::Positive),
            "NEGATIVE" => Some(Sentiment::Negative),
            "NEUTRAL" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lenient_sentiment<'de, D>(deserializer: D) -> Result<Option<Sentiment>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    let Some(label) = label else {
        return Ok(None);
    };
    let sentiment = Sentiment::from_label(&label);
    if sentiment.is_none() {
        tracing::warn!(label = %label, "dropping sentiment label outside POSITIVE/NEGATIVE/NEUTRAL");
    }
    Ok(sentiment)
}

/// One customer review.
///
/// `sentiment`, `confidence`, and `keywords` stay empty until the analysis
/// engine has scored the review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub user: String,
    pub rating: u8,
    pub review: String,
    #[serde(
        default,
        deserialize_with = "lenient_sentiment",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub is_fake: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_reason: Option<String>,
}

impl ReviewItem {
    /// Build an unscored review. `rating` is clamped to `1..=5`.
    #[must_use]
    pub fn new(user: impl Into<String>, rating: u8, review: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            rating: rating.clamp(1, 5),
            review: review.into(),
            sentiment: None,
            confidence: None,
            keywords: Vec::new(),
            is_fake: false,
            fake_reason: None,
        }
    }
}

/// Percentage split of review sentiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub positive: f64,
}

impl SentimentDistribution {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.negative + self.neutral + self.positive
    }

    /// `true` when the percentages sum to 100 (within rounding) or are all zero.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let total = self.total();
        total.abs() < f64::EPSILON || (total - 100.0).abs() <= 1.0
    }
}

/// Report content as produced by the analysis engine, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContent {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sentiment_distribution: SentimentDistribution,
    #[serde(default)]
    pub analyzed_reviews: Vec<ReviewItem>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub success: bool,
}

impl ReportContent {
    /// Reviews whose sentiment matches `sentiment`, in their original order.
    pub fn reviews_with(&self, sentiment: Sentiment) -> impl Iterator<Item = &ReviewItem> {
        self.analyzed_reviews
            .iter()
            .filter(move |r| r.sentiment == Some(sentiment))
    }
}

/// A persisted report. Content never changes after the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: Uuid,
    #[serde(flatten)]
    pub content: ReportContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_from_label_accepts_known_values() {
        assert_eq!(Sentiment::from_label("POSITIVE"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label(" negative "), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("Neutral"), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("UNKNOWN"), None);
        assert_eq!(Sentiment::from_label(""), None);
    }

    #[test]
    fn review_item_new_clamps_rating() {
        assert_eq!(ReviewItem::new("a", 0, "x").rating, 1);
        assert_eq!(ReviewItem::new("a", 9, "x").rating, 5);
        assert_eq!(ReviewItem::new("a", 3, "x").rating, 3);
    }

    #[test]
    fn unscored_review_omits_sentiment_fields() {
        let json = serde_json::to_value(ReviewItem::new("ana", 4, "solid app")).expect("json");
        assert_eq!(json["user"], "ana");
        assert_eq!(json["rating"], 4);
        assert!(json.get("sentiment").is_none());
        assert!(json.get("confidence").is_none());
        assert_eq!(json["keywords"], serde_json::json!([]));
    }

    #[test]
    fn unknown_engine_label_becomes_unset_sentiment() {
        let review: ReviewItem = serde_json::from_value(serde_json::json!({
            "user": "bot123456",
            "rating": 5,
            "review": "best best best best",
            "sentiment": "UNKNOWN",
            "confidence": 0.0,
            "keywords": [],
            "is_fake": true,
            "fake_reason": "Word repetition"
        }))
        .expect("deserialize");
        assert_eq!(review.sentiment, None);
        assert!(review.is_fake);
        assert_eq!(review.fake_reason.as_deref(), Some("Word repetition"));
    }

    #[test]
    fn unrecognised_engine_labels_are_unset_and_null_stays_unset() {
        for label in [serde_json::json!("MIXED"), serde_json::json!(""), serde_json::Value::Null] {
            let review: ReviewItem = serde_json::from_value(serde_json::json!({
                "user": "ana",
                "rating": 3,
                "review": "fine I guess",
                "sentiment": label.clone()
            }))
            .expect("deserialize");
            assert_eq!(review.sentiment, None, "label {label}");
        }
        let review: ReviewItem = serde_json::from_value(serde_json::json!({
            "user": "ana",
            "rating": 3,
            "review": "fine",
            "sentiment": "neutral"
        }))
        .expect("deserialize");
        assert_eq!(review.sentiment, Some(Sentiment::Neutral));
    }

    #[test]
    fn distribution_consistency() {
        let ok = SentimentDistribution {
            negative: 33.33,
            neutral: 33.33,
            positive: 33.33,
        };
        assert!(ok.is_consistent());
        assert!(SentimentDistribution::default().is_consistent());
        let off = SentimentDistribution {
            negative: 80.0,
            neutral: 10.0,
            positive: 40.0,
        };
        assert!(!off.is_consistent());
    }

    #[test]
    fn stored_report_flattens_content() {
        let report = StoredReport {
            id: Uuid::nil(),
            content: ReportContent {
                owner_id: "owner-1".to_string(),
                title: "Spotify".to_string(),
                description: "Music.".to_string(),
                icon: "https://cdn.example.com/icon.png".to_string(),
                keywords: vec!["music".to_string()],
                sentiment_distribution: SentimentDistribution::default(),
                analyzed_reviews: vec![],
                suggestions: vec![],
                success: true,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["owner_id"], "owner-1");
        assert_eq!(json["title"], "Spotify");
        assert!(json.get("content").is_none());

        let back: StoredReport = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, report);
    }

    #[test]
    fn reviews_with_filters_by_sentiment() {
        let mut pos = ReviewItem::new("a", 5, "love it");
        pos.sentiment = Some(Sentiment::Positive);
        let mut neg = ReviewItem::new("b", 1, "crashes");
        neg.sentiment = Some(Sentiment::Negative);
        let content = ReportContent {
            owner_id: "o".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            icon: "i".to_string(),
            keywords: vec![],
            sentiment_distribution: SentimentDistribution::default(),
            analyzed_reviews: vec![pos, neg, ReviewItem::new("c", 3, "meh")],
            suggestions: vec![],
            success: true,
        };
        let negatives: Vec<_> = content.reviews_with(Sentiment::Negative).collect();
        assert_eq!(negatives.len(), 1);
        assert_eq!(negatives[0].user, "b");
        assert_eq!(content.reviews_with(Sentiment::Neutral).count(), 0);
    }
}
