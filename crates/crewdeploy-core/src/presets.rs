//! Built-in configuration for the family legacy crew and its processing
//! workflow (hardcoded, no files needed).

use serde_json::json;

use crate::builder::CrewBuilder;
use crate::error::Result;
use crate::models::{Agent, Crew, Embedder, Task};
use crate::workflow::{InputStage, OutputStage, Pipeline, WorkflowGraph};

pub const CREW_NAME: &str = "the-big-family-legacy-crew";
pub const WORKFLOW_NAME: &str = "family-legacy-processing";

pub const FAMILY_HISTORIAN: &str = "Family Historian";
pub const STORY_WEAVER: &str = "Story Weaver";
pub const MEMORY_ANALYZER: &str = "Memory Analyzer";

pub fn agents() -> Vec<Agent> {
    vec![
        Agent::new(
            FAMILY_HISTORIAN,
            "genealogy_expert",
            "Extract family relationships and genealogy data from memories",
            "Expert genealogist with decades of experience in family tree research \
             and historical document analysis",
        )
        .with_tools([
            "vision_analysis",
            "text_extraction",
            "date_parser",
            "relationship_mapper",
        ]),
        Agent::new(
            STORY_WEAVER,
            "narrative_writer",
            "Create compelling and emotionally resonant family stories from memories",
            "Creative writer specializing in family history narratives with deep \
             understanding of cultural contexts",
        )
        .with_tools([
            "llm_generator",
            "memory_search",
            "timeline_builder",
            "sentiment_analyzer",
        ]),
        Agent::new(
            MEMORY_ANALYZER,
            "vision_specialist",
            "Analyze photos, videos, and documents to extract rich contextual metadata",
            "Computer vision expert specializing in historical photo analysis and \
             OCR of old documents",
        )
        .with_tools(["vision_model", "ocr", "face_recognition", "date_estimator"]),
    ]
}

pub fn tasks() -> Vec<Task> {
    vec![
        Task::new(
            "Analyze uploaded memory (photo, video, or document) and extract all visible \
             metadata including dates, locations, people, and events",
            "Structured JSON with metadata: {dates: [], locations: [], people: [], \
             events: [], sentiment: string}",
            MEMORY_ANALYZER,
        )
        .named("analyze_memory"),
        Task::new(
            "Extract and map family relationships from the analyzed memory, identifying \
             parent-child, sibling, and spouse connections",
            "List of family relationships: [{person1: string, person2: string, \
             relationship_type: string, confidence: float}]",
            FAMILY_HISTORIAN,
        )
        .named("extract_relationships")
        .with_context(["analyze_memory"]),
        Task::new(
            "Generate a compelling narrative story that connects the memory to broader \
             family history with emotional depth",
            "Rich narrative text (300-500 words) with historical context and family connections",
            STORY_WEAVER,
        )
        .named("generate_story")
        .with_context(["analyze_memory", "extract_relationships"]),
    ]
}

/// The family legacy crew: three agents, three sequential tasks.
pub fn build_crew() -> Result<Crew> {
    let builder = CrewBuilder::new(CREW_NAME)
        .description("AI crew for processing family memories and generating legacy stories")
        .max_rpm(10)
        .embedder(Embedder::new("openai", "text-embedding-3-small").with_dimensions(1536));

    let builder = agents().into_iter().fold(builder, |b, a| b.agent(a));
    tasks().into_iter().fold(builder, |b, t| b.task(t)).build()
}

/// The memory processing workflow:
/// memory_upload → analyze_memory → extract_relationships → generate_story → output
pub fn build_workflow() -> Result<WorkflowGraph> {
    let input = InputStage {
        id: "memory_upload".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "file_url": { "type": "string" },
                "file_type": { "type": "string", "enum": ["photo", "video", "document", "audio"] },
                "uploader_id": { "type": "string" },
                "description": { "type": "string" }
            }
        }),
    };
    let output = OutputStage {
        id: "output".to_string(),
        format: "json".to_string(),
        schema: json!({
            "metadata": "object",
            "relationships": "array",
            "story": "string",
            "timeline_events": "array"
        }),
    };

    Pipeline::new(
        WORKFLOW_NAME,
        "Multi-agent workflow for processing family memories",
        input,
        output,
    )
    .then(
        "analyze_memory",
        MEMORY_ANALYZER,
        "Analyze uploaded memory and extract metadata",
    )
    .then(
        "extract_relationships",
        FAMILY_HISTORIAN,
        "Identify family members and relationships in the memory",
    )
    .then(
        "generate_story",
        STORY_WEAVER,
        "Create narrative from memory and relationships",
    )
    .to_graph()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{validate, validate_bindings};

    #[test]
    fn test_preset_crew() {
        let crew = build_crew().unwrap();
        assert_eq!(crew.agents.len(), 3);
        assert_eq!(crew.tasks.len(), 3);
        for task in &crew.tasks {
            assert!(crew.agent(&task.agent).is_some());
        }
        let json = crew.to_json().unwrap();
        assert_eq!(json["embedder"]["config"]["dimensions"], 1536);
        assert_eq!(json["tasks"][2]["context"][1], "extract_relationships");
    }

    #[test]
    fn test_preset_workflow_is_a_valid_bound_pipeline() {
        let crew = build_crew().unwrap();
        let graph = build_workflow().unwrap();
        assert!(validate(&graph).is_valid());
        assert!(validate_bindings(&graph, &crew).is_valid());

        let pipeline = graph.to_pipeline().unwrap();
        assert_eq!(pipeline.input.id, "memory_upload");
        assert_eq!(pipeline.stages.len(), 3);
        assert_eq!(pipeline.output.id, "output");
        assert_eq!(pipeline.to_graph().unwrap(), graph);
    }

    #[test]
    fn test_preset_workflow_edges_follow_stage_order() {
        let graph = build_workflow().unwrap();
        let edges: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("memory_upload", "analyze_memory"),
                ("analyze_memory", "extract_relationships"),
                ("extract_relationships", "generate_story"),
                ("generate_story", "output"),
            ]
        );
    }

    #[test]
    fn test_presets_are_deterministic() {
        assert_eq!(build_crew().unwrap(), build_crew().unwrap());
        assert_eq!(build_workflow().unwrap(), build_workflow().unwrap());
    }
}
