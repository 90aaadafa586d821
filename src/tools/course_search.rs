//! search_course_content tool - passage lookup over course material

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Source, Tool, ToolContext, ToolError};
use crate::search::{SearchBackend, SearchQuery};

pub struct CourseSearchTool {
    backend: Arc<dyn SearchBackend>,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    lesson_number: Option<u32>,
}

impl CourseSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

/// Message for a search that matched nothing, naming the filters used
fn no_content_message(query: &SearchQuery) -> String {
    let mut filters = String::new();
    if let Some(course) = &query.course_name {
        filters.push_str(&format!(" in course '{}'", course));
    }
    if let Some(lesson) = query.lesson_number {
        filters.push_str(&format!(" in lesson {}", lesson));
    }
    format!("No relevant content found{}.", filters)
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &'static str {
        "search_course_content"
    }

    fn description(&self) -> &'static str {
        "Search course materials with smart course name matching and lesson filtering"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for in the course content"
                },
                "course_name": {
                    "type": "string",
                    "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                },
                "lesson_number": {
                    "type": "integer",
                    "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let input: SearchInput = serde_json::from_value(input)?;
        let query = SearchQuery {
            query: input.query,
            course_name: input.course_name,
            lesson_number: input.lesson_number,
        };

        let result = self.backend.search(&query).await;

        // Errors and empty results leave the recorded sources untouched
        if let Some(error) = result.error_message() {
            return Ok(error.to_string());
        }
        if result.is_empty() {
            return Ok(no_content_message(&query));
        }

        let mut blocks = Vec::with_capacity(result.len());
        let mut sources = Vec::with_capacity(result.len());

        for (document, meta) in result.entries() {
            let header = match meta.lesson_number {
                Some(lesson) => format!("[{} - Lesson {}]", meta.course_title, lesson),
                None => format!("[{}]", meta.course_title),
            };
            blocks.push(format!("{}\n{}", header, document));

            let url = match meta.lesson_number {
                Some(lesson) => self.backend.lesson_link(&meta.course_title, lesson).await,
                None => None,
            };
            sources.push(Source::new(&meta.course_title, meta.lesson_number, url));
        }

        ctx.record_sources(self.name(), sources);
        Ok(blocks.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{ChunkMetadata, CourseOutline, SearchResult};
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a canned result and remembers the queries it saw
    struct CannedBackend {
        result: SearchResult,
        link: Option<String>,
        seen: Mutex<Vec<SearchQuery>>,
    }

    impl CannedBackend {
        fn new(result: SearchResult, link: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                result,
                link: link.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for CannedBackend {
        async fn search(&self, query: &SearchQuery) -> SearchResult {
            self.seen.lock().unwrap().push(query.clone());
            self.result.clone()
        }

        async fn lesson_link(&self, _course_title: &str, _lesson_number: u32) -> Option<String> {
            self.link.clone()
        }

        async fn course_outline(&self, _course_name: &str) -> Option<CourseOutline> {
            None
        }

        async fn course_titles(&self) -> Vec<String> {
            Vec::new()
        }
    }

    fn two_passages() -> SearchResult {
        SearchResult::empty()
            .with(
                "Lesson content about RAG systems.",
                ChunkMetadata::new("Intro to RAG", Some(1)),
                0.1,
            )
            .with(
                "More content about embeddings.",
                ChunkMetadata::new("Intro to RAG", Some(2)),
                0.3,
            )
    }

    #[tokio::test]
    async fn test_formats_blocks_and_records_sources() {
        let backend = CannedBackend::new(two_passages(), Some("https://example.com/lesson"));
        let tool = CourseSearchTool::new(backend);
        let ctx = ToolContext::new();

        let output = tool.execute(json!({"query": "RAG basics"}), &ctx).await.unwrap();

        assert_eq!(
            output,
            "[Intro to RAG - Lesson 1]\nLesson content about RAG systems.\n\n\
             [Intro to RAG - Lesson 2]\nMore content about embeddings."
        );
        assert_eq!(output.split("\n\n").count(), 2);

        let sources = ctx.sources_for("search_course_content");
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Intro to RAG");
        assert_eq!(sources[0].lesson_number, Some(1));
        assert_eq!(sources[0].url.as_deref(), Some("https://example.com/lesson"));
        assert_eq!(sources[1].lesson_number, Some(2));
    }

    #[tokio::test]
    async fn test_header_without_lesson() {
        let result = SearchResult::empty().with("Overview text.", ChunkMetadata::new("MCP Course", None), 0.2);
        let tool = CourseSearchTool::new(CannedBackend::new(result, Some("ignored")));
        let ctx = ToolContext::new();

        let output = tool.execute(json!({"query": "overview"}), &ctx).await.unwrap();

        assert_eq!(output, "[MCP Course]\nOverview text.");
        assert_eq!(ctx.sources_for("search_course_content")[0].url, None);
    }

    #[tokio::test]
    async fn test_empty_result_names_filters() {
        let tool = CourseSearchTool::new(CannedBackend::new(SearchResult::empty(), None));
        let ctx = ToolContext::new();

        let output = tool
            .execute(json!({"query": "topic", "course_name": "Intro to RAG", "lesson_number": 3}), &ctx)
            .await
            .unwrap();

        assert_eq!(output, "No relevant content found in course 'Intro to RAG' in lesson 3.");
        assert!(!ctx.has_sources());
    }

    #[tokio::test]
    async fn test_empty_result_without_filters() {
        let tool = CourseSearchTool::new(CannedBackend::new(SearchResult::empty(), None));
        let ctx = ToolContext::new();

        let output = tool.execute(json!({"query": "something obscure"}), &ctx).await.unwrap();
        assert_eq!(output, "No relevant content found.");
    }

    #[tokio::test]
    async fn test_error_result_returned_verbatim() {
        let error = SearchResult::error("Search error: n_results must be a positive integer");
        let tool = CourseSearchTool::new(CannedBackend::new(error, None));
        let ctx = ToolContext::new();

        let output = tool.execute(json!({"query": "anything"}), &ctx).await.unwrap();

        assert_eq!(output, "Search error: n_results must be a positive integer");
        assert!(ctx.sources_for("search_course_content").is_empty());
    }

    #[tokio::test]
    async fn test_filters_forwarded_to_backend() {
        let backend = CannedBackend::new(SearchResult::empty(), None);
        let tool = CourseSearchTool::new(backend.clone());
        let ctx = ToolContext::new();

        tool.execute(json!({"query": "content", "course_name": "MCP Course", "lesson_number": 3}), &ctx)
            .await
            .unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], SearchQuery::new("content").with_course("MCP Course").with_lesson(3));
    }

    #[tokio::test]
    async fn test_second_search_replaces_sources() {
        let backend = CannedBackend::new(two_passages(), None);
        let tool = CourseSearchTool::new(backend);
        let ctx = ToolContext::new();
        ctx.record_sources("search_course_content", vec![Source::new("Stale", None, None)]);

        tool.execute(json!({"query": "RAG"}), &ctx).await.unwrap();

        let titles: Vec<String> = ctx.sources_for("search_course_content").into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Intro to RAG", "Intro to RAG"]);
    }

    #[tokio::test]
    async fn test_missing_query_is_invalid_input() {
        let tool = CourseSearchTool::new(CannedBackend::new(SearchResult::empty(), None));
        let ctx = ToolContext::new();

        let result = tool.execute(json!({"course_name": "MCP"}), &ctx).await;
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }
}
