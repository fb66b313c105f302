//! Tool registry and dispatch.
//!
//! A [`ToolRegistry`] maps tool names to [`ToolHandler`]s. The loop asks the
//! registry for the declarations it sends with each request and dispatches
//! every call the service makes back through it, so adding a tool never
//! touches the loop itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::api::ToolDefinition;
use crate::core::error::ChatError;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Invalid parameter schema for tool {tool}: {reason}")]
    InvalidSchema { tool: String, reason: String },

    #[error("Tool {tool} failed: {reason}")]
    Failed { tool: String, reason: String },
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Declaration sent to the service for this tool.
    fn definition(&self) -> &ToolDefinition;

    /// Run the tool with the raw JSON argument text from the tool call.
    async fn call(&self, arguments: &str) -> Result<Value, ToolError>;

    fn name(&self) -> &str {
        self.definition().name()
    }
}

type ToolFn = dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync;

/// Handler built from a declaration and a plain function.
///
/// Tools built with [`FunctionTool::new`] parse their arguments as a JSON
/// object and check them against the declared parameter schema before the
/// function runs. [`FunctionTool::unchecked`] hands the function whatever the
/// service sent. Either way an empty argument string is treated as `{}`.
pub struct FunctionTool {
    definition: ToolDefinition,
    validator: Option<jsonschema::Validator>,
    handler: Box<ToolFn>,
}

impl FunctionTool {
    pub fn new<F>(definition: ToolDefinition, handler: F) -> Result<Self, ToolError>
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        let validator = jsonschema::validator_for(&definition.function.parameters).map_err(
            |err| ToolError::InvalidSchema {
                tool: definition.function.name.clone(),
                reason: err.to_string(),
            },
        )?;

        Ok(Self {
            definition,
            validator: Some(validator),
            handler: Box::new(handler),
        })
    }

    /// Build a tool that never rejects its arguments.
    ///
    /// Text that is not JSON reaches the function as a JSON string.
    pub fn unchecked<F>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            definition,
            validator: None,
            handler: Box::new(handler),
        }
    }

    fn parse_arguments(&self, raw: &str) -> Result<Value, ToolError> {
        if raw.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        let Some(validator) = self.validator.as_ref() else {
            return Ok(serde_json::from_str(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string())));
        };

        let invalid = |reason: String| ToolError::InvalidArguments {
            tool: self.definition.function.name.clone(),
            reason,
        };
        let arguments =
            serde_json::from_str::<Value>(raw).map_err(|err| invalid(err.to_string()))?;
        if !arguments.is_object() {
            return Err(invalid(format!("expected a JSON object, got {arguments}")));
        }

        if !validator.is_valid(&arguments) {
            let reasons: Vec<String> = validator
                .iter_errors(&arguments)
                .take(3)
                .map(|err| err.to_string())
                .collect();
            return Err(invalid(reasons.join("; ")));
        }

        Ok(arguments)
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.definition.function.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolHandler for FunctionTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, arguments: &str) -> Result<Value, ToolError> {
        let arguments = self.parse_arguments(arguments)?;
        (self.handler)(arguments)
    }
}

/// Name-keyed set of tool handlers, kept in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ToolHandler>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. A handler registered under an existing name replaces
    /// the earlier one in place.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) -> &mut Self {
        self.register_arc(Arc::new(handler))
    }

    pub fn register_arc(&mut self, handler: Arc<dyn ToolHandler>) -> &mut Self {
        let name = handler.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => self.tools[slot] = handler,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(handler);
            }
        }
        self
    }

    /// Register a [`FunctionTool`] built from `definition` and `handler`.
    pub fn register_fn<F>(
        &mut self,
        definition: ToolDefinition,
        handler: F,
    ) -> Result<&mut Self, ToolError>
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Ok(self.register(FunctionTool::new(definition, handler)?))
    }

    /// Register a [`FunctionTool::unchecked`] handler.
    pub fn register_fn_unchecked<F>(
        &mut self,
        definition: ToolDefinition,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register(FunctionTool::unchecked(definition, handler))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.name())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| tool.definition().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the handler registered under `name`.
    ///
    /// Fails with [`ChatError::UnsupportedTool`] when nothing is registered
    /// under that name; handler failures surface as [`ChatError::Tool`].
    pub async fn dispatch(&self, name: &str, arguments: &str) -> Result<Value, ChatError> {
        let handler = self.get(name).ok_or_else(|| ChatError::UnsupportedTool {
            name: name.to_string(),
        })?;
        debug!(tool = name, arguments, "Dispatching tool call");
        Ok(handler.call(arguments).await?)
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
