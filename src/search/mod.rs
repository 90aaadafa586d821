//! Search backend contract
//!
//! Tools only see course material through [`SearchBackend`]. A backend never
//! fails a search outright: problems come back inside [`SearchResult`] so the
//! calling tool can hand the message to the model as plain text.

mod memory;

pub use memory::{Course, InMemoryBackend, Lesson};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a passage came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: String,
    pub lesson_number: Option<u32>,
}

impl ChunkMetadata {
    pub fn new(course_title: impl Into<String>, lesson_number: Option<u32>) -> Self {
        Self {
            course_title: course_title.into(),
            lesson_number,
        }
    }
}

/// Passages, their metadata and distances as parallel sequences, best match first.
///
/// The sequences always have equal length; an errored result has all three empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    documents: Vec<String>,
    metadata: Vec<ChunkMetadata>,
    distances: Vec<f32>,
    error: Option<String>,
}

impl SearchResult {
    /// No passages, no error
    pub fn empty() -> Self {
        Self::default()
    }

    /// A failed search carrying only its message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Append one passage; ignored on an errored result
    pub fn push(&mut self, document: impl Into<String>, metadata: ChunkMetadata, distance: f32) {
        if self.error.is_some() {
            return;
        }
        self.documents.push(document.into());
        self.metadata.push(metadata);
        self.distances.push(distance);
    }

    pub fn with(mut self, document: impl Into<String>, metadata: ChunkMetadata, distance: f32) -> Self {
        self.push(document, metadata, distance);
        self
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn metadata(&self) -> &[ChunkMetadata] {
        &self.metadata
    }

    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Passages paired with their metadata, in backend order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ChunkMetadata)> {
        self.documents.iter().map(String::as_str).zip(self.metadata.iter())
    }
}

/// A content search with optional filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub course_name: Option<String>,
    pub lesson_number: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_course(mut self, course_name: impl Into<String>) -> Self {
        self.course_name = Some(course_name.into());
        self
    }

    pub fn with_lesson(mut self, lesson_number: u32) -> Self {
        self.lesson_number = Some(lesson_number);
        self
    }
}

/// Lesson entry of a course outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSummary {
    pub number: u32,
    pub title: String,
    pub link: Option<String>,
}

/// Course title, link and numbered lesson list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub title: String,
    pub link: Option<String>,
    pub instructor: Option<String>,
    pub lessons: Vec<LessonSummary>,
}

/// Read-only view over indexed course material
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Ranked passages for a query, or an errored result
    async fn search(&self, query: &SearchQuery) -> SearchResult;

    /// Link of one lesson, when the catalog has one
    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String>;

    /// Outline of the course best matching `course_name`
    async fn course_outline(&self, course_name: &str) -> Option<CourseOutline>;

    /// Titles of every indexed course
    async fn course_titles(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_sequences_parallel() {
        let result = SearchResult::empty()
            .with("a", ChunkMetadata::new("Intro to RAG", Some(1)), 0.1)
            .with("b", ChunkMetadata::new("Intro to RAG", None), 0.3);

        assert_eq!(result.len(), 2);
        assert_eq!(result.metadata().len(), 2);
        assert_eq!(result.distances(), &[0.1, 0.3]);
        assert!(result.error_message().is_none());
    }

    #[test]
    fn test_error_result_stays_empty() {
        let mut result = SearchResult::error("Search error: n_results must be a positive integer");
        result.push("ignored", ChunkMetadata::new("X", None), 0.0);

        assert!(result.is_empty());
        assert!(result.metadata().is_empty());
        assert!(result.distances().is_empty());
        assert_eq!(
            result.error_message(),
            Some("Search error: n_results must be a positive integer")
        );
    }

    #[test]
    fn test_entries_in_backend_order() {
        let result = SearchResult::empty()
            .with("first", ChunkMetadata::new("A", Some(2)), 0.2)
            .with("second", ChunkMetadata::new("B", Some(1)), 0.4);

        let docs: Vec<&str> = result.entries().map(|(doc, _)| doc).collect();
        assert_eq!(docs, vec!["first", "second"]);
    }

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("vectors").with_course("Intro to RAG").with_lesson(3);
        assert_eq!(query.query, "vectors");
        assert_eq!(query.course_name.as_deref(), Some("Intro to RAG"));
        assert_eq!(query.lesson_number, Some(3));
    }
}
