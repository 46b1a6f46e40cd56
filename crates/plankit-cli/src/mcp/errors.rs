//! Error handling utilities for MCP server

use plankit_core::PlanKitError;
use rmcp::ErrorData;

/// Converts a core error into an MCP error, prefixed with `message`.
///
/// Missing files and bad input are the caller's fault and map to
/// `invalid_params`; everything else is an internal error.
pub fn to_mcp_error(message: &str, error: &PlanKitError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        PlanKitError::FileSystem { .. } | PlanKitError::InvalidInput { .. } => {
            ErrorData::invalid_params(text, None)
        }
        _ => ErrorData::internal_error(text, None),
    }
}
