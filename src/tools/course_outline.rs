//! get_course_outline tool - course title, link and lesson list

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Source, Tool, ToolContext, ToolError};
use crate::search::{CourseOutline, SearchBackend};

pub struct CourseOutlineTool {
    backend: Arc<dyn SearchBackend>,
}

#[derive(Debug, Deserialize)]
struct OutlineInput {
    course_name: String,
}

impl CourseOutlineTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

fn render(outline: &CourseOutline) -> String {
    let mut lines = vec![format!("Course: {}", outline.title)];
    if let Some(link) = &outline.link {
        lines.push(format!("Link: {}", link));
    }
    if let Some(instructor) = &outline.instructor {
        lines.push(format!("Instructor: {}", instructor));
    }
    lines.push("Lessons:".to_string());
    for lesson in &outline.lessons {
        lines.push(format!("  Lesson {}: {}", lesson.number, lesson.title));
    }
    lines.join("\n")
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn name(&self) -> &'static str {
        "get_course_outline"
    }

    fn description(&self) -> &'static str {
        "Get a course's title, link and complete numbered lesson list"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "course_name": {
                    "type": "string",
                    "description": "Course title (partial matches work, e.g. 'MCP', 'RAG')"
                }
            },
            "required": ["course_name"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let input: OutlineInput = serde_json::from_value(input)?;

        let Some(outline) = self.backend.course_outline(&input.course_name).await else {
            return Ok(format!("No course found matching '{}'.", input.course_name));
        };

        ctx.record_sources(
            self.name(),
            vec![Source::new(&outline.title, None, outline.link.clone())],
        );
        Ok(render(&outline))
    }
}
