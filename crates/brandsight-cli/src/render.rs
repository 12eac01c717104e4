//! Plain-text rendering of a report for the terminal.

use brandsight_core::{ReviewItem, SentimentDistribution, StoredReport};

use crate::view::ExpandFilter;

/// Date format used wherever a report's creation time is shown.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Render the overview, suggestions, and the reviews in the expanded group.
///
/// No reviews are listed when `filter` is [`ExpandFilter::None`].
#[must_use]
pub fn render_report(report: &StoredReport, filter: ExpandFilter) -> Vec<String> {
    let content = &report.content;
    let mut lines = vec![
        content.title.clone(),
        format!("Analyzed {}", report.created_at.format(DATE_FORMAT)),
    ];
    if !content.icon.is_empty() {
        lines.push(format!("Icon: {}", content.icon));
    }
    if !content.success {
        lines.push("Analysis incomplete: the engine reported a failure.".to_string());
    }

    if !content.description.is_empty() {
        lines.push(String::new());
        lines.push("Description".to_string());
        lines.push(content.description.clone());
    }

    lines.push(String::new());
    lines.push("Sentiment Distribution".to_string());
    lines.extend(distribution_lines(&content.sentiment_distribution));

    if !content.keywords.is_empty() {
        lines.push(String::new());
        lines.push(format!("Keywords: {}", content.keywords.join(", ")));
    }

    if !content.suggestions.is_empty() {
        lines.push(String::new());
        lines.push("AI Suggestions".to_string());
        for (i, text) in content.suggestions.iter().enumerate() {
            let suggestion = parse_suggestion(text);
            lines.push(format!("  {}. {}", i + 1, suggestion.heading_line()));
            lines.extend(suggestion.points.iter().map(|p| format!("     - {p}")));
        }
    }

    if let Some(sentiment) = filter.sentiment() {
        let matching: Vec<&ReviewItem> = content.reviews_with(sentiment).collect();
        lines.push(String::new());
        lines.push(format!("{} reviews ({})", filter.label(), matching.len()));
        if matching.is_empty() {
            lines.push("  (none)".to_string());
        }
        for review in matching {
            lines.push(review_line(review));
        }
    }

    lines
}

/// Table of stored reports, one row each, in the order given.
#[must_use]
pub fn history_lines(reports: &[StoredReport]) -> Vec<String> {
    if reports.is_empty() {
        return vec!["No reports yet. Run `brandsight analyze <URL>` first.".to_string()];
    }
    let mut lines = vec![format!(
        "{:<4}{:<38}{:<22}{:<9}TITLE",
        "#", "ID", "CREATED", "REVIEWS"
    )];
    lines.extend(reports.iter().enumerate().map(|(i, report)| {
        format!(
            "{:<4}{:<38}{:<22}{:<9}{}",
            i + 1,
            report.id,
            report.created_at.format("%Y-%m-%d %H:%M"),
            report.content.analyzed_reviews.len(),
            report.content.title
        )
    }));
    lines
}

/// A suggestion split into its heading and bullet points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub heading: String,
    pub points: Vec<String>,
}

impl Suggestion {
    /// The heading, with a trailing colon when points follow.
    #[must_use]
    pub fn heading_line(&self) -> String {
        if self.points.is_empty() {
            self.heading.clone()
        } else {
            format!("{}:", self.heading)
        }
    }
}

/// Split engine suggestion text of the form `"Heading:\n- point\n- point"`.
///
/// The heading runs to the first `:`; the rest splits on line-leading `-`.
/// Text without a colon is all heading.
#[must_use]
pub fn parse_suggestion(text: &str) -> Suggestion {
    let Some((heading, body)) = text.split_once(':') else {
        return Suggestion {
            heading: text.trim().to_string(),
            points: Vec::new(),
        };
    };
    let points = body
        .split("\n-")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    Suggestion {
        heading: heading.trim().to_string(),
        points,
    }
}

pub(crate) fn distribution_lines(distribution: &SentimentDistribution) -> [String; 3] {
    [
        format!("  Positive: {}%", format_percent(distribution.positive)),
        format!("  Neutral: {}%", format_percent(distribution.neutral)),
        format!("  Negative: {}%", format_percent(distribution.negative)),
    ]
}

/// Whole numbers print without decimals; anything else with two.
pub(crate) fn format_percent(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn review_line(review: &ReviewItem) -> String {
    let mut line = format!("  - {} ({}/5): {}", review.user, review.rating, review.review);
    if let Some(confidence) = review.confidence {
        line.push_str(&format!(" [confidence {confidence:.2}]"));
    }
    if review.is_fake {
        line.push_str(" [flagged");
        if let Some(reason) = &review.fake_reason {
            line.push_str(": ");
            line.push_str(reason);
        }
        line.push(']');
    }
    line
}

#[cfg(test)]
mod tests {
    use brandsight_core::{ReportContent, Sentiment};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn scored(user: &str, sentiment: Sentiment, text: &str) -> ReviewItem {
        let mut review = ReviewItem::new(user, 3, text);
        review.sentiment = Some(sentiment);
        review
    }

    fn report() -> StoredReport {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        StoredReport {
            id: Uuid::nil(),
            content: ReportContent {
                owner_id: "owner-1".to_string(),
                title: "Spotify".to_string(),
                description: "Music for everyone.".to_string(),
                icon: "https://cdn.example.com/spotify.png".to_string(),
                keywords: vec!["music".to_string(), "ads".to_string()],
                sentiment_distribution: SentimentDistribution {
                    negative: 33.33,
                    neutral: 33.33,
                    positive: 33.34,
                },
                analyzed_reviews: vec![
                    scored("ana", Sentiment::Positive, "love it"),
                    scored("ben", Sentiment::Negative, "too many ads"),
                    scored("cy", Sentiment::Neutral, "it plays music"),
                    scored("dee", Sentiment::Negative, "crashes"),
                ],
                suggestions: vec!["Reduce ad frequency.".to_string()],
                success: true,
            },
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn no_filter_lists_no_reviews() {
        let lines = render_report(&report(), ExpandFilter::None);
        assert_eq!(lines[0], "Spotify");
        assert_eq!(lines[1], "Analyzed 2025-06-01 12:30 UTC");
        assert!(lines.iter().any(|l| l == "  Positive: 33.34%"));
        assert!(lines.iter().any(|l| l == "  1. Reduce ad frequency."));
        assert!(!lines.iter().any(|l| l.starts_with("  - ")));
    }

    #[test]
    fn filter_lists_only_matching_reviews() {
        let lines = render_report(&report(), ExpandFilter::Negative);
        let reviews: Vec<&String> = lines.iter().filter(|l| l.starts_with("  - ")).collect();
        assert_eq!(reviews.len(), 2);
        assert!(reviews[0].contains("ben"));
        assert!(reviews[1].contains("dee"));
        assert!(lines.iter().any(|l| l == "Negative reviews (2)"));
    }

    #[test]
    fn unsuccessful_report_is_marked() {
        let mut report = report();
        report.content.success = false;
        let lines = render_report(&report, ExpandFilter::None);
        assert!(lines.iter().any(|l| l.starts_with("Analysis incomplete")));
    }

    #[test]
    fn parse_suggestion_splits_heading_and_points() {
        let parsed = parse_suggestion("Reduce ads:\n- fewer interstitials\n-   cap audio ads ");
        assert_eq!(parsed.heading, "Reduce ads");
        assert_eq!(parsed.points, vec!["fewer interstitials", "cap audio ads"]);
        assert_eq!(parsed.heading_line(), "Reduce ads:");
    }

    #[test]
    fn parse_suggestion_keeps_later_colons_in_points() {
        let parsed = parse_suggestion("Stability:\n- fix crash: on launch");
        assert_eq!(parsed.heading, "Stability");
        assert_eq!(parsed.points, vec!["fix crash: on launch"]);
    }

    #[test]
    fn parse_suggestion_without_colon_is_heading_only() {
        let parsed = parse_suggestion(" Reduce ad frequency. ");
        assert_eq!(parsed.heading, "Reduce ad frequency.");
        assert!(parsed.points.is_empty());
        assert_eq!(parsed.heading_line(), "Reduce ad frequency.");
    }

    #[test]
    fn structured_suggestion_renders_as_bullets() {
        let mut report = report();
        report.content.suggestions = vec!["Ads:\n- fewer\n- shorter".to_string()];
        let lines = render_report(&report, ExpandFilter::None);
        let at = lines
            .iter()
            .position(|l| l == "  1. Ads:")
            .expect("suggestion heading");
        assert_eq!(lines[at + 1], "     - fewer");
        assert_eq!(lines[at + 2], "     - shorter");
    }

    #[test]
    fn history_lines_number_rows_from_one() {
        let lines = history_lines(&[report(), report()]);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#   ID"));
        assert!(lines[1].starts_with("1   00000000-0000-0000-0000-000000000000"));
        assert!(lines[2].starts_with("2   "));
        assert!(lines[1].ends_with("Spotify"));
        assert!(history_lines(&[])[0].starts_with("No reports yet"));
    }

    #[test]
    fn format_percent_trims_whole_numbers() {
        assert_eq!(format_percent(100.0), "100");
        assert_eq!(format_percent(33.333), "33.33");
        assert_eq!(format_percent(0.0), "0");
    }
}
