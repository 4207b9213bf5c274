use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ArticleCard, Recommendations, Subject, WeeklyTopArticle};

/// Query string of the home feed. `assunto` may repeat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub assunto: Vec<String>,
    pub periodo: Option<String>,
    pub sort: Option<String>,
}

/// Recency window accepted by `periodo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "24h" => Some(Period::Day),
            "7d" => Some(Period::Week),
            "30d" => Some(Period::Month),
            _ => None,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Recent,
    Popular,
}

impl SortOrder {
    /// Anything other than `populares` sorts by recency
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("populares") => SortOrder::Popular,
            _ => SortOrder::Recent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Recent => "recentes",
            SortOrder::Popular => "populares",
        }
    }
}

/// Storage-level listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    pub subject_slugs: Vec<String>,
    pub since: Option<DateTime<Utc>>,
    pub sort: SortOrder,
}

impl ArticleFilter {
    pub fn from_query(query: &FeedQuery, now: DateTime<Utc>) -> Self {
        Self {
            subject_slugs: query
                .assunto
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            since: query
                .periodo
                .as_deref()
                .and_then(Period::parse)
                .map(|p| p.since(now)),
            sort: SortOrder::parse(query.sort.as_deref()),
        }
    }
}

/// The home page payload
#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    pub noticias: Vec<ArticleCard>,
    pub assuntos: Vec<Subject>,
    pub selecionados: Vec<String>,
    pub periodo: String,
    pub sort: String,
    pub top3: Vec<WeeklyTopArticle>,
    pub recomendadas: Recommendations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse("24h"), Some(Period::Day));
        assert_eq!(Period::parse("7d"), Some(Period::Week));
        assert_eq!(Period::parse("30d"), Some(Period::Month));
        assert_eq!(Period::parse("1y"), None);
    }

    #[test]
    fn test_period_since() {
        let now = Utc::now();
        assert_eq!(Period::Week.since(now), now - Duration::days(7));
    }

    #[test]
    fn test_sort_parse_defaults_to_recent() {
        assert_eq!(SortOrder::parse(None), SortOrder::Recent);
        assert_eq!(SortOrder::parse(Some("populares")), SortOrder::Popular);
        assert_eq!(SortOrder::parse(Some("qualquer")), SortOrder::Recent);
    }

    #[test]
    fn test_filter_from_query() {
        let now = Utc::now();
        let query = FeedQuery {
            assunto: vec!["tecnologia".to_string(), " ".to_string()],
            periodo: Some("24h".to_string()),
            sort: Some("populares".to_string()),
        };

        let filter = ArticleFilter::from_query(&query, now);
        assert_eq!(filter.subject_slugs, vec!["tecnologia".to_string()]);
        assert_eq!(filter.since, Some(now - Duration::days(1)));
        assert_eq!(filter.sort, SortOrder::Popular);
    }

    #[test]
    fn test_unknown_period_is_ignored() {
        let query = FeedQuery {
            periodo: Some("sempre".to_string()),
            ..Default::default()
        };
        assert_eq!(ArticleFilter::from_query(&query, Utc::now()).since, None);
    }
}
