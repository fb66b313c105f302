//! Stub car tools used by the `cars` and `demo` commands.
//!
//! The handlers ignore their arguments and return fixed data, so they are
//! registered without schema checks: a model that names the argument
//! `company` instead of `companyName` still gets an answer.

use serde_json::json;

use crate::api::ToolDefinition;
use crate::core::tools::ToolRegistry;

pub const MOST_POPULAR_CAR_TOOL: &str = "get_most_popular_car_by_company";
pub const CAR_SALES_TOOL: &str = "get_car_sales_this_year";

pub const CAR_TOOLS_SYSTEM_PROMPT: &str = "You can use only 1 tool at the time.";
pub const DEFAULT_COMPANY: &str = "Toyota";

pub fn car_question(company: &str) -> String {
    format!("Tell me about the most popular car from {company} and its sales this year.")
}

pub fn most_popular_car_definition() -> ToolDefinition {
    ToolDefinition::function(
        MOST_POPULAR_CAR_TOOL,
        "Return the most popular car model for a given company name.",
        json!({
            "type": "object",
            "properties": {
                "companyName": {
                    "type": "string",
                    "description": "Car company name, e.g., `Toyota`, `Ford`"
                }
            },
            "required": ["companyName"]
        }),
    )
}

pub fn car_sales_definition() -> ToolDefinition {
    ToolDefinition::function(
        CAR_SALES_TOOL,
        "Return total sales for the given car company for the current calendar year.",
        json!({
            "type": "object",
            "properties": {
                "companyNameAndCarName": {
                    "type": "string",
                    "description": "Car company name and car name concatenated, e.g., `Toyota - Corolla`"
                }
            },
            "required": ["companyNameAndCarName"]
        }),
    )
}

pub fn car_tools() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register_fn_unchecked(most_popular_car_definition(), |_| {
            Ok(json!({ "carName": "Corolla" }))
        })
        .register_fn_unchecked(car_sales_definition(), |_| {
            Ok(json!({ "salesThisYear": 250000 }))
        });
    registry
}
