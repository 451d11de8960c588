//! The AI chat widget backend.
//!
//! A visitor message flows through three stages:
//!
//! 1. [`intent`] - a cheap deterministic model call labels the latest user
//!    turn (`quick_product_inquiry`, `formulation_advice`, `sales_inquiry`);
//!    anything unrecognized, and any classifier failure, routes to sales.
//! 2. [`service`] - the labeled intent picks a handler: its system prompt,
//!    its tool set, and the bounded tool-use loop.
//! 3. [`executor`] - tool calls the model makes are executed against the
//!    catalog, policies, business config, and the invoice table.
//!
//! The formulation handler ([`formulation`]) is the exception: instead of a
//! tool loop it extracts the animal type, scores catalog ingredients against
//! that animal's nutrient requirements, and has the model write advice
//! around the ranked list.

mod executor;
mod formulation;
mod intent;
mod prompts;
mod service;
mod tools;

pub use executor::ToolExecutor;
pub use formulation::FormulationOutcome;
pub use intent::classify;
pub use service::{ChatError, ChatReply, ChatService};
pub use tools::{product_tools, sales_tools, tools_for_intent};
