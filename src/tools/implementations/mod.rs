mod artifacts_cleanup;
mod command;
mod help;
mod process_cleanup;
mod variables_report;

pub use artifacts_cleanup::ArtifactsCleanupTool;
pub use command::CommandTool;
pub use help::HelpTool;
pub use process_cleanup::ProcessCleanupTool;
pub use variables_report::VariablesReportTool;
