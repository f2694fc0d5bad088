pub mod agent_loop;
pub mod dispatch;
pub mod streaming;

pub use agent_loop::{SessionOutcome, run_agent_loop};
pub use dispatch::dispatch_tool_call;
pub use streaming::{TurnOutput, consume_turn_stream};
