pub mod component;
pub mod dependency;
pub mod planner;
pub mod prompts;
pub mod turn;

pub use component::ComponentAgent;
pub use dependency::{DependencyAgent, InstallKind};
pub use planner::PlannerAgent;
pub use turn::{AgentTurn, ChatAgent, UNAVAILABLE_TEXT};
