pub mod reviewer;
pub mod scheduler;
pub mod step_runner;
pub mod time_resolver;

pub use reviewer::ReviewerService;
pub use scheduler::AssignmentScheduler;
pub use step_runner::StepRunner;
