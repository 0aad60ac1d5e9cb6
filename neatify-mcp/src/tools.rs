//! MCP Tool implementations for Neatify.
//!
//! This module defines the tools that are exposed via MCP, allowing LLMs
//! to run Neatify's refactoring rules on JavaScript/TypeScript code.

use neatify::config::Config;
use neatify::engine::Engine;
use neatify::host::{MemoryHost, Session};
use neatify::rules::RuleId;
use rmcp::{
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Serialize;

/// Request parameters for the `run_rule` tool.
#[derive(Debug, serde::Deserialize, JsonSchema)]
pub struct RunRuleRequest {
    /// Rule id to run.
    #[schemars(
        description = "Rule id: remove-unused-imports, remove-unused-variables, normalize-casing or modernize-bindings"
    )]
    pub rule: String,
    /// The source code to rewrite.
    #[schemars(description = "The JavaScript or TypeScript source code to rewrite")]
    pub code: String,
    /// Virtual filename for the code (default: "snippet.ts").
    #[schemars(description = "Virtual filename; its extension selects the grammar")]
    #[serde(default = "default_filename")]
    pub filename: String,
}

/// Request parameters for tools that take only code.
#[derive(Debug, serde::Deserialize, JsonSchema)]
pub struct CodeRequest {
    /// The source code to process.
    #[schemars(description = "The JavaScript or TypeScript source code")]
    pub code: String,
    /// Virtual filename for the code (default: "snippet.ts").
    #[schemars(description = "Virtual filename; its extension selects the grammar")]
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "snippet.ts".to_owned()
}

/// Tool response for rewriting tools.
#[derive(Debug, Serialize)]
struct RewriteResponse<'a> {
    updated_text: &'a str,
    changed: bool,
    results: &'a [neatify::rules::RuleResult],
    notices: &'a [String],
}

/// The main MCP server struct for Neatify.
#[derive(Debug, Clone)]
pub struct NeatifyServer {
    engine: Engine,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl NeatifyServer {
    /// Creates a server with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(Engine::default())
    }

    /// Creates a server using the configuration found from the working directory.
    ///
    /// Falls back to defaults when the configuration is rejected.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_engine(Engine::new(config).unwrap_or_default())
    }

    fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for NeatifyServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
#[allow(clippy::unnecessary_wraps)]
impl NeatifyServer {
    /// Run one refactoring rule on a code snippet.
    ///
    /// # Errors
    ///
    /// Tool failures are reported as error results, not protocol errors.
    #[tool(
        description = "Run one Neatify rule on JavaScript/TypeScript code and return the rewritten code.\n\
        Rules:\n\
        • remove-unused-imports - drop import bindings that are never referenced\n\
        • remove-unused-variables - drop variable declarations that are never referenced\n\
        • normalize-casing - rename variables and functions to camelCase (scope-aware)\n\
        • modernize-bindings - replace 'var' with 'let' where it is safe"
    )]
    pub fn run_rule(&self, params: Parameters<RunRuleRequest>) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let rule = match req.rule.parse::<RuleId>() {
            Ok(rule) => rule,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        };
        let mut host = MemoryHost::new(req.code, req.filename);
        let outcome = Session::new(&self.engine).run_rule(&mut host, rule);
        Ok(rewrite_result(outcome, &host))
    }

    /// Run every rule in pipeline order on a code snippet.
    ///
    /// # Errors
    ///
    /// Tool failures are reported as error results, not protocol errors.
    #[tool(
        description = "Optimize JavaScript/TypeScript code with every Neatify rule in order:\n\
        remove-unused-imports, remove-unused-variables, normalize-casing, modernize-bindings.\n\
        Each stage runs on the output of the previous one. If a stage fails nothing is changed\n\
        and the failing stage is reported."
    )]
    pub fn run_all(&self, params: Parameters<CodeRequest>) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let mut host = MemoryHost::new(req.code, req.filename);
        let outcome = Session::new(&self.engine).run_all(&mut host);
        Ok(rewrite_result(outcome, &host))
    }

    /// List the variables and functions a snippet declares.
    ///
    /// # Errors
    ///
    /// Tool failures are reported as error results, not protocol errors.
    #[tool(
        description = "List the variable and function names declared in JavaScript/TypeScript code.\n\
        Read-only: the code is not modified."
    )]
    pub fn summarize_declarations(
        &self,
        params: Parameters<CodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        match self.engine.summarize_declarations(&req.code, &req.filename) {
            Ok(summary) => {
                let json = serde_json::json!({
                    "variable_names": summary.variable_names,
                    "function_names": summary.function_names,
                    "summary": summary.to_string(),
                });
                Ok(CallToolResult::success(vec![Content::text(
                    serde_json::to_string_pretty(&json)
                        .unwrap_or_else(|e| format!(r#"{{"error": "Serialization error: {e}"}}"#)),
                )]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Analysis error: {e}"
            ))])),
        }
    }

    /// List the available rules.
    ///
    /// # Errors
    ///
    /// Never fails.
    #[tool(description = "List Neatify's rule ids with a one-line description of each.")]
    pub fn list_rules(&self) -> Result<CallToolResult, McpError> {
        let rules: Vec<_> = RuleId::ALL
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "id": rule,
                    "description": rule.description(),
                    "in_pipeline": self.engine.pipeline().contains(rule),
                })
            })
            .collect();
        let json = serde_json::to_string_pretty(&rules)
            .unwrap_or_else(|e| format!(r#"{{"error": "Serialization error: {e}"}}"#));
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

fn rewrite_result(
    outcome: neatify::error::Result<Option<neatify::RunReport>>,
    host: &MemoryHost,
) -> CallToolResult {
    match outcome {
        Ok(Some(report)) => {
            let response = RewriteResponse {
                updated_text: &report.updated_text,
                changed: report.changed(),
                results: &report.results,
                notices: host.notices(),
            };
            let json = serde_json::to_string_pretty(&response)
                .unwrap_or_else(|e| format!(r#"{{"error": "Serialization error: {e}"}}"#));
            CallToolResult::success(vec![Content::text(json)])
        }
        Ok(None) => CallToolResult::error(vec![Content::text(host.notices().join("\n"))]),
        Err(e) => CallToolResult::error(vec![Content::text(format!("Rewrite error: {e}"))]),
    }
}

#[rmcp::tool_handler]
impl ServerHandler for NeatifyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Neatify rewrites JavaScript/TypeScript code with minimal, safe edits.\n\n\
                 TOOLS AVAILABLE:\n\
                 • run_rule - Run one rule (remove-unused-imports, remove-unused-variables, normalize-casing, modernize-bindings)\n\
                 • run_all - Run every rule in order\n\
                 • summarize_declarations - List declared variables and functions\n\
                 • list_rules - Show rule ids\n\n\
                 COMMON TASKS:\n\
                 • 'Clean up this file' → run_all\n\
                 • 'Remove unused imports' → run_rule with remove-unused-imports\n\
                 • 'What does this module declare?' → summarize_declarations"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub use rmcp::model::Content;
