pub mod job_search;
pub mod skill_gap;
pub mod timeline;
pub mod traits;

pub use job_search::{JobListing, JobSearchTool, JobSource, StaticJobCatalog};
pub use skill_gap::SkillGapTool;
pub use timeline::TimelineTool;
pub use traits::{ParamSpec, ParamType, Tool, ToolDescriptor, ToolError};

use crate::types::ToolResult;
use anyhow::{bail, Result};
use futures_util::FutureExt;
use serde_json::{json, Value};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default time budget for a single tool run.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Named set of tools the model may call.
///
/// The registry owns argument validation and turns every failure into a
/// tool result, so nothing a tool does can abort the surrounding request.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, used for stable schema listing.
    order: Vec<String>,
    timeout: Duration,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Standard career registry: job search, skill gap, learning timeline.
    pub fn career_tools(jobs: Arc<dyn JobSource>, hours_per_week: f64) -> Self {
        let mut registry = Self::new();
        // Names are distinct constants; registration cannot collide.
        let _ = registry.register(Arc::new(JobSearchTool::new(jobs)));
        let _ = registry.register(Arc::new(SkillGapTool));
        let _ = registry.register(Arc::new(TimelineTool::new(hours_per_week)));
        registry
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.descriptor().name;
        if self.tools.contains_key(&name) {
            bail!("Tool '{}' is already registered", name);
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    pub fn list_schemas(&self) -> Vec<ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.descriptor())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve, validate and run a tool, returning its JSON payload.
    pub async fn try_invoke(&self, name: &str, args: &Value) -> Result<Value, ToolError> {
        let tool = self.resolve(name)?;
        tool.descriptor().validate(args)?;

        let run = tokio::time::timeout(self.timeout, tool.execute(args));
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ToolError::Timeout(self.timeout.as_secs())),
            Err(panic) => Err(ToolError::Execution(format!(
                "tool panicked: {}",
                panic_message(panic.as_ref())
            ))),
        }
    }

    /// Run a tool and render the outcome as text for the model. Never fails.
    pub async fn invoke(&self, name: &str, args: &Value) -> ToolResult {
        match self.try_invoke(name, args).await {
            Ok(value) => {
                debug!("Tool {} succeeded", name);
                ToolResult {
                    tool_call_id: String::new(), // Set by caller
                    output: render(&value),
                    success: true,
                }
            }
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolResult {
                    tool_call_id: String::new(),
                    output: render(&error_payload(&e)),
                    success: false,
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Error-shaped payload the model sees in place of a tool result.
pub fn error_payload(err: &ToolError) -> Value {
    json!({
        "status": "error",
        "kind": err.kind(),
        "error": err.to_string(),
    })
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("slow", "never finishes in time")
        }

        async fn execute(&self, _args: &Value) -> Result<Value, ToolError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(json!({}))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("broken", "always fails")
        }

        async fn execute(&self, _args: &Value) -> Result<Value, ToolError> {
            Err(anyhow::anyhow!("upstream returned 503").into())
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("panics", "fails with a panic")
        }

        async fn execute(&self, _args: &Value) -> Result<Value, ToolError> {
            panic!("index out of range")
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::career_tools(Arc::new(StaticJobCatalog::sample()), 10.0)
    }

    #[test]
    fn schemas_follow_registration_order() {
        let names: Vec<String> = registry()
            .list_schemas()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["search_jobs", "analyze_skill_gap", "estimate_learning_timeline"]
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut reg = registry();
        assert!(reg.register(Arc::new(SkillGapTool)).is_err());
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn resolve_unknown_tool() {
        let err = registry().resolve("fly").err().unwrap();
        assert_eq!(err, ToolError::NotFound("fly".into()));
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_result() {
        let result = registry().invoke("fly", &json!({})).await;
        assert!(!result.success);
        let payload: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(payload["kind"], "not_found");
    }

    #[tokio::test]
    async fn invalid_arguments_become_error_result() {
        let result = registry()
            .invoke(skill_gap::NAME, &json!({ "current_skills": ["Python"] }))
            .await;
        assert!(!result.success);
        let payload: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["kind"], "invalid_arguments");
    }

    #[tokio::test]
    async fn execution_failure_becomes_error_result() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(BrokenTool)).unwrap();
        let result = reg.invoke("broken", &json!({})).await;
        assert!(!result.success);
        assert!(result.output.contains("upstream returned 503"));
        assert!(result.output.contains("execution_failure"));
    }

    #[tokio::test]
    async fn panicking_tool_becomes_error_result() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(PanickingTool)).unwrap();
        let result = reg.invoke("panics", &json!({})).await;
        assert!(!result.success);
        let payload: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(payload["kind"], "execution_failure");
        let message = payload["error"].as_str().unwrap();
        assert!(message.contains("tool panicked: index out of range"), "{message}");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out() {
        let mut reg = ToolRegistry::new().with_timeout(Duration::from_secs(2));
        reg.register(Arc::new(SlowTool)).unwrap();
        let err = reg.try_invoke("slow", &json!({})).await.unwrap_err();
        assert_eq!(err, ToolError::Timeout(2));
    }
}
