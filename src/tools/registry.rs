//! Tool registry
//!
//! Holds every tool with its priority and `run_always` flag and hands them to
//! the executor in priority order.

use std::sync::Arc;

use super::implementations::{
    ArtifactsCleanupTool, CommandTool, HelpTool, ProcessCleanupTool, VariablesReportTool,
};
use super::trait_def::BuildTool;

/// Well-known priorities. Lower runs first.
pub struct ToolPriority;

impl ToolPriority {
    pub const FIRST: i32 = i32::MIN;
    pub const REPORT: i32 = -100;
    pub const CLEANUP: i32 = 50;
    pub const RESTORE: i32 = 90;
    pub const COMPILE: i32 = 100;
    pub const TEST: i32 = 300;
    pub const PACKAGE: i32 = 800;
    /// Tools without a declared priority run last
    pub const UNSPECIFIED: i32 = i32::MAX;
}

#[derive(Clone)]
pub struct ToolRegistration {
    pub tool: Arc<dyn BuildTool>,
    pub priority: i32,
    pub run_always: bool,
}

impl ToolRegistration {
    pub fn new(tool: Arc<dyn BuildTool>) -> Self {
        Self {
            tool,
            priority: ToolPriority::UNSPECIFIED,
            run_always: false,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn run_always(mut self) -> Self {
        self.run_always = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.tool.name()
    }
}

impl std::fmt::Debug for ToolRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistration")
            .field("tool", &self.tool.name())
            .field("priority", &self.priority)
            .field("run_always", &self.run_always)
            .finish()
    }
}

/// Registry of all tools taking part in a run
#[derive(Clone, Default)]
pub struct ToolRegistry {
    registrations: Vec<ToolRegistration>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard tools
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(ToolRegistration::new(Arc::new(HelpTool)).with_priority(ToolPriority::FIRST));
        registry.register(
            ToolRegistration::new(Arc::new(VariablesReportTool)).with_priority(ToolPriority::REPORT),
        );
        registry.register(
            ToolRegistration::new(Arc::new(ArtifactsCleanupTool::default()))
                .with_priority(ToolPriority::CLEANUP),
        );
        registry.register(
            ToolRegistration::new(Arc::new(CommandTool::restore())).with_priority(ToolPriority::RESTORE),
        );
        registry.register(
            ToolRegistration::new(Arc::new(CommandTool::compile())).with_priority(ToolPriority::COMPILE),
        );
        registry.register(
            ToolRegistration::new(Arc::new(CommandTool::test())).with_priority(ToolPriority::TEST),
        );
        registry.register(
            ToolRegistration::new(Arc::new(CommandTool::package())).with_priority(ToolPriority::PACKAGE),
        );
        registry.register(ToolRegistration::new(Arc::new(ProcessCleanupTool)).run_always());

        registry
    }

    pub fn register(&mut self, registration: ToolRegistration) {
        self.registrations.push(registration);
    }

    /// Registrations sorted by ascending priority; equal priorities keep
    /// registration order
    pub fn ordered(&self) -> Vec<ToolRegistration> {
        let mut ordered = self.registrations.clone();
        ordered.sort_by_key(|registration| registration.priority);
        ordered
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
