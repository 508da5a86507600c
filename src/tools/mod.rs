//! Callable tools declared to the model.
//!
//! A [`Tool`] pairs a manifest entry (name, description, parameter schema)
//! with the local function the model's tool calls dispatch to. The
//! [`ToolRegistry`] is the name-to-function mapping the dispatcher resolves
//! against.

pub mod tempo;

use std::collections::HashMap;
use std::sync::Arc;

use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::transcript::ToolCallRecord;

pub use tempo::{GetSongTempo, SetSongTempo, register_tempo_tools};

/// A local function callable by the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as declared in the manifest.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON-schema parameter declaration, `None` for parameterless tools.
    fn parameters(&self) -> Option<serde_json::Value>;

    /// Invokes the tool with already-parsed arguments.
    async fn invoke(&self, arguments: serde_json::Value) -> Result<serde_json::Value>;
}

/// Name-to-function mapping for tool dispatch.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use baton::osc::{BridgeConfig, OscBridge};
/// use baton::tools::{ToolRegistry, register_tempo_tools};
///
/// # async fn demo() -> baton::Result<()> {
/// let bridge = Arc::new(OscBridge::connect(&BridgeConfig::default()).await?);
/// let mut registry = ToolRegistry::new();
/// register_tempo_tools(&mut registry, &bridge);
/// assert_eq!(registry.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its declared name.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Checks whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Checks whether `name` has a local mapping.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Renders every registered tool into the completion API's
    /// tool-declaration type.
    #[must_use]
    pub fn manifest(&self) -> Vec<ChatCompletionTool> {
        let mut entries: Vec<ChatCompletionTool> = self
            .tools
            .values()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.name().to_string(),
                    description: Some(tool.description().to_string()),
                    parameters: tool.parameters(),
                    strict: None,
                },
            })
            .collect();
        // HashMap iteration order is arbitrary; keep the manifest stable.
        entries.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        entries
    }

    /// Resolves and invokes one tool call, returning the serialized result.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for a name with no local mapping
    /// and [`ToolError::InvalidArguments`] for a payload that fails to
    /// parse; both terminate the run, there is no fallback.
    pub async fn dispatch(&self, call: &ToolCallRecord) -> Result<String> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: call.name.clone(),
            })?;

        // The API emits an empty string for parameterless calls.
        let arguments: serde_json::Value = if call.arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&call.arguments).map_err(|e| ToolError::InvalidArguments {
                name: call.name.clone(),
                reason: e.to_string(),
            })?
        };

        debug!(tool = %call.name, id = %call.id, "dispatching tool call");
        let result = tool.invoke(arguments).await?;
        serde_json::to_string(&result).map_err(|e| {
            ToolError::UnserializableResult {
                name: call.name.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::error::Error;

    struct EchoBpm {
        invocations: AtomicUsize,
    }

    impl EchoBpm {
        fn new() -> Self {
            Self {
                invocations: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoBpm {
        fn name(&self) -> &str {
            "echo_bpm"
        }

        fn description(&self) -> &str {
            "Echoes the bpm argument back"
        }

        fn parameters(&self) -> Option<serde_json::Value> {
            Some(json!({
                "type": "object",
                "properties": { "bpm": { "type": "number" } },
                "required": ["bpm"]
            }))
        }

        async fn invoke(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            let bpm = arguments.get("bpm").and_then(serde_json::Value::as_f64);
            match bpm {
                Some(bpm) => Ok(json!({ "bpm": bpm })),
                None => Err(ToolError::InvalidArguments {
                    name: self.name().to_string(),
                    reason: "bpm is required".to_string(),
                }
                .into()),
            }
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCallRecord {
        ToolCallRecord {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_invokes_matching_tool() {
        let tool = Arc::new(EchoBpm::new());
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone());

        let result = registry
            .dispatch(&call("echo_bpm", "{\"bpm\":120}"))
            .await
            .unwrap();
        assert_eq!(result, "{\"bpm\":120.0}");
        assert_eq!(tool.invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.dispatch(&call("echo_bpm", "{}")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Tool(ToolError::UnknownTool { ref name }) if name == "echo_bpm"
        ));
    }

    #[tokio::test]
    async fn test_dispatch_malformed_arguments() {
        let tool = Arc::new(EchoBpm::new());
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone());

        let err = registry
            .dispatch(&call("echo_bpm", "{not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidArguments { .. })));
        // The tool itself must not run on a malformed payload.
        assert_eq!(tool.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_empty_arguments_as_object() {
        let tool = Arc::new(EchoBpm::new());
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone());

        // Parses to an empty object, then fails the tool's own validation.
        let err = registry.dispatch(&call("echo_bpm", "")).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidArguments { .. })));
        assert_eq!(tool.invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manifest_is_sorted_and_complete() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoBpm::new()));
        assert!(registry.contains("echo_bpm"));
        assert_eq!(registry.len(), 1);

        let manifest = registry.manifest();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest[0].function.name, "echo_bpm");
        assert_eq!(
            manifest[0].function.description.as_deref(),
            Some("Echoes the bpm argument back")
        );
        assert!(manifest[0].function.parameters.is_some());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.manifest().is_empty());
    }
}
