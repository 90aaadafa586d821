//! In-memory lexical backend over a JSON course catalog.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{ChunkMetadata, CourseOutline, LessonSummary, SearchBackend, SearchQuery, SearchResult};
use crate::error::{CoursemateError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub content: String,
}

pub struct InMemoryBackend {
    courses: Vec<Course>,
    max_results: usize,
}

impl InMemoryBackend {
    pub fn new(courses: Vec<Course>, max_results: usize) -> Self {
        Self { courses, max_results }
    }

    /// Load a JSON array of courses
    pub fn from_file(path: impl AsRef<Path>, max_results: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CoursemateError::Search(format!("Failed to read catalog {}: {}", path.display(), e)))?;
        let courses: Vec<Course> = serde_json::from_str(&content)?;
        debug!("Loaded {} courses from {}", courses.len(), path.display());
        Ok(Self::new(courses, max_results))
    }

    /// Exact title (case-insensitive) first, then substring
    fn resolve_course(&self, name: &str) -> Option<&Course> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.courses
            .iter()
            .find(|c| c.title.to_lowercase() == needle)
            .or_else(|| self.courses.iter().find(|c| c.title.to_lowercase().contains(&needle)))
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Blank-line separated paragraphs of a lesson
fn passages(content: &str) -> impl Iterator<Item = &str> {
    content.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn search(&self, query: &SearchQuery) -> SearchResult {
        if self.max_results == 0 {
            return SearchResult::error("Search error: n_results must be a positive integer");
        }

        let courses: Vec<&Course> = match &query.course_name {
            Some(name) => match self.resolve_course(name) {
                Some(course) => vec![course],
                None => return SearchResult::error(format!("No course found matching '{}'", name)),
            },
            None => self.courses.iter().collect(),
        };

        let wanted = terms(&query.query);
        if wanted.is_empty() {
            return SearchResult::empty();
        }

        let mut scored: Vec<(f32, &str, ChunkMetadata)> = Vec::new();
        for course in courses {
            for lesson in &course.lessons {
                if query.lesson_number.is_some_and(|n| n != lesson.number) {
                    continue;
                }
                for passage in passages(&lesson.content) {
                    let found = terms(passage);
                    let matched = wanted.iter().filter(|t| found.contains(*t)).count();
                    if matched == 0 {
                        continue;
                    }
                    let distance = 1.0 - matched as f32 / wanted.len() as f32;
                    scored.push((distance, passage, ChunkMetadata::new(&course.title, Some(lesson.number))));
                }
            }
        }

        // Stable sort keeps catalog order among equal distances
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut result = SearchResult::empty();
        for (distance, passage, metadata) in scored.into_iter().take(self.max_results) {
            result.push(passage, metadata, distance);
        }
        debug!("search '{}' -> {} passages", query.query, result.len());
        result
    }

    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        self.courses
            .iter()
            .find(|c| c.title == course_title)?
            .lessons
            .iter()
            .find(|l| l.number == lesson_number)?
            .link
            .clone()
    }

    async fn course_outline(&self, course_name: &str) -> Option<CourseOutline> {
        let course = self.resolve_course(course_name)?;
        Some(CourseOutline {
            title: course.title.clone(),
            link: course.link.clone(),
            instructor: course.instructor.clone(),
            lessons: course
                .lessons
                .iter()
                .map(|l| LessonSummary {
                    number: l.number,
                    title: l.title.clone(),
                    link: l.link.clone(),
                })
                .collect(),
        })
    }

    async fn course_titles(&self) -> Vec<String> {
        self.courses.iter().map(|c| c.title.clone()).collect()
    }
}
