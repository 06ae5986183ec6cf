//! In-process search and people directories backing the prompt autocomplete.
//!
//! Both lookups answer after a short artificial delay so the UI exercises its
//! loading path the same way it would against a remote service.

use crate::timer;
use crate::types::{Person, SearchResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_LIMIT: usize = 10;
pub const SEARCH_LATENCY: Duration = Duration::from_millis(200);
pub const PEOPLE_LATENCY: Duration = Duration::from_millis(150);

const ROSTER_SEED: u64 = 0x6e63_6861_7421;
const ROSTER_DRAWS: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PeopleQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Directory: Send + Sync {
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>, LookupError>;
    async fn people(&self, query: PeopleQuery) -> Result<Vec<Person>, LookupError>;
}

const ARTICLES: [(&str, &str); 5] = [
    (
        "React Query Best Practices",
        "Learn how to use React Query effectively in your Next.js applications",
    ),
    (
        "Next.js 14 App Router Guide",
        "Complete guide to building applications with Next.js 14 App Router",
    ),
    (
        "TypeScript Advanced Patterns",
        "Advanced TypeScript patterns for modern web development",
    ),
    (
        "Tailwind CSS Customization",
        "How to customize Tailwind CSS for your design system",
    ),
    (
        "shadcn/ui Components",
        "Building beautiful UI with shadcn/ui components library",
    ),
];

const FIRST_NAMES: [&str; 40] = [
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Christopher", "Nancy", "Daniel", "Lisa", "Matthew", "Betty", "Anthony",
    "Margaret", "Mark", "Sandra", "Donald", "Ashley", "Steven", "Kimberly", "Paul", "Emily",
    "Andrew", "Donna", "Joshua", "Michelle",
];

const LAST_NAMES: [&str; 40] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Thomas", "Taylor", "Moore",
    "Jackson", "Martin", "Lee", "Thompson", "White", "Harris", "Sanchez", "Clark", "Ramirez",
    "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright", "Scott", "Torres",
    "Nguyen", "Hill", "Flores", "Green", "Adams",
];

/// Unique names in draw order. Same seed, same roster.
static ROSTER: Lazy<Vec<Person>> = Lazy::new(|| build_roster(ROSTER_SEED, ROSTER_DRAWS));

fn build_roster(seed: u64, draws: usize) -> Vec<Person> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut roster = Vec::new();

    for _ in 0..draws {
        let (Some(first), Some(last)) = (FIRST_NAMES.choose(&mut rng), LAST_NAMES.choose(&mut rng))
        else {
            break;
        };
        let name = format!("{first} {last}");
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        roster.push(Person {
            id: format!("person-{}", roster.len()),
            email: Some(format!(
                "{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            )),
            name,
        });
    }
    roster
}

pub fn search_articles(query: &str, limit: usize) -> Vec<SearchResult> {
    let needle = query.to_lowercase();
    ARTICLES
        .iter()
        .enumerate()
        .filter(|(_, (title, description))| {
            needle.is_empty()
                || title.to_lowercase().contains(&needle)
                || description.to_lowercase().contains(&needle)
        })
        .take(limit)
        .map(|(i, (title, description))| SearchResult {
            id: (i + 1).to_string(),
            title: title.to_string(),
            description: description.to_string(),
            matched_text: Some(query.to_string()),
        })
        .collect()
}

/// Matching people in roster order. Ids number the matches of this answer,
/// `person-0` upwards.
pub fn find_people(query: &str, limit: usize) -> Vec<Person> {
    let needle = query.to_lowercase();
    ROSTER
        .iter()
        .filter(|person| needle.is_empty() || person.name.to_lowercase().contains(&needle))
        .take(limit)
        .enumerate()
        .map(|(i, person)| Person {
            id: format!("person-{i}"),
            ..person.clone()
        })
        .collect()
}

/// Fixture-backed [`Directory`] with configurable latency.
#[derive(Clone, Debug)]
pub struct MockDirectory {
    search_latency: Duration,
    people_latency: Duration,
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self {
            search_latency: SEARCH_LATENCY,
            people_latency: PEOPLE_LATENCY,
        }
    }
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers immediately. Used by tests.
    pub fn instant() -> Self {
        Self {
            search_latency: Duration::ZERO,
            people_latency: Duration::ZERO,
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Directory for MockDirectory {
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>, LookupError> {
        timer::sleep(self.search_latency).await;
        let results = search_articles(&query.q, query.limit);
        tracing::debug!(q = %query.q, hits = results.len(), "search lookup");
        Ok(results)
    }

    async fn people(&self, query: PeopleQuery) -> Result<Vec<Person>, LookupError> {
        timer::sleep(self.people_latency).await;
        let people = find_people(&query.q, query.limit);
        tracing::debug!(q = %query.q, hits = people.len(), "people lookup");
        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_search_returns_every_article() {
        let results = search_articles("", DEFAULT_LIMIT);
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].id, "1");
        assert_eq!(results[0].matched_text.as_deref(), Some(""));
    }

    #[test]
    fn test_search_matches_title_or_description_ignoring_case() {
        let titles: Vec<String> = search_articles("tailwind", 10)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Tailwind CSS Customization"]);

        let by_description = search_articles("NEXT.JS", 10);
        assert_eq!(by_description.len(), 2);
        assert_eq!(by_description[0].matched_text.as_deref(), Some("NEXT.JS"));
    }

    #[test]
    fn test_search_respects_limit() {
        assert_eq!(search_articles("", 2).len(), 2);
        assert!(search_articles("", 0).is_empty());
    }

    #[test]
    fn test_roster_is_deterministic_and_unique() {
        let a = build_roster(7, 500);
        let b = build_roster(7, 500);
        assert_eq!(a, b);

        let names: HashSet<String> = a.iter().map(|p| p.name.to_lowercase()).collect();
        assert_eq!(names.len(), a.len());
        assert!(a.len() <= FIRST_NAMES.len() * LAST_NAMES.len());
    }

    #[test]
    fn test_roster_ids_follow_draw_order() {
        let roster = build_roster(1, 50);
        for (i, person) in roster.iter().enumerate() {
            assert_eq!(person.id, format!("person-{i}"));
        }
    }

    #[test]
    fn test_people_ids_number_each_answer() {
        let people = find_people("smith", 5);
        assert!(!people.is_empty());
        for (i, person) in people.iter().enumerate() {
            assert_eq!(person.id, format!("person-{i}"));
        }
    }

    #[test]
    fn test_people_filter_by_substring() {
        let people = find_people("jo", 10);
        assert!(!people.is_empty());
        assert!(people.len() <= 10);
        assert!(people.iter().all(|p| p.name.to_lowercase().contains("jo")));
    }

    #[test]
    fn test_people_email_is_derived_from_name() {
        let person = &find_people("", 1)[0];
        let expected = format!("{}@example.com", person.name.to_lowercase().replace(' ', "."));
        assert_eq!(person.email.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_query_defaults_limit() {
        let query: PeopleQuery = serde_json::from_str(r#"{"q":"ann"}"#).unwrap();
        assert_eq!(query.limit, DEFAULT_LIMIT);
        let empty: SearchQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SearchQuery::new(""));
    }

    #[tokio::test]
    async fn test_mock_directory_answers_queries() {
        let directory = MockDirectory::instant();
        let results = directory.search(SearchQuery::new("typescript")).await.unwrap();
        assert_eq!(results.len(), 1);
        let people = directory.people(PeopleQuery::new("smith")).await.unwrap();
        assert!(people.iter().all(|p| p.name.ends_with("Smith")));
    }
}
