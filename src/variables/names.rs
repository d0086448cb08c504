//! Well-known variable keys

pub const SOURCE_ROOT: &str = "Arbor.Build.SourceRoot";
pub const ARTIFACTS: &str = "Arbor.Build.Artifacts";
pub const ARTIFACTS_PACKAGES: &str = "Arbor.Build.Artifacts.Packages";
pub const ARTIFACTS_TEST_REPORTS: &str = "Arbor.Build.Artifacts.TestReports";
pub const ARTIFACTS_CLEANUP_ENABLED: &str = "Arbor.Build.Artifacts.CleanupBeforeBuild.Enabled";

pub const AGENT_TYPE: &str = "Arbor.Build.Agent.Type";
pub const IS_RUNNING_ON_BUILD_AGENT: &str = "Arbor.Build.IsRunningOnBuildAgent";

pub const BRANCH_NAME: &str = "Arbor.Build.Vcs.Branch.Name";
pub const BRANCH_IS_MAIN: &str = "Arbor.Build.Vcs.Branch.IsMain";

pub const CONFIGURATION: &str = "Arbor.Build.Configuration";

pub const VERSION: &str = "Arbor.Build.Version";
pub const VERSION_MAJOR: &str = "Arbor.Build.Version.Major";
pub const VERSION_MINOR: &str = "Arbor.Build.Version.Minor";
pub const VERSION_PATCH: &str = "Arbor.Build.Version.Patch";
pub const VERSION_BUILD: &str = "Arbor.Build.Version.Build";

pub const BUILD_SYSTEM: &str = "Arbor.Build.BuildSystem";
pub const RESTORE_COMMAND: &str = "Arbor.Build.Tools.Restore.Command";
pub const RESTORE_ENABLED: &str = "Arbor.Build.Tools.Restore.Enabled";
pub const COMPILE_COMMAND: &str = "Arbor.Build.Tools.Compile.Command";
pub const COMPILE_ENABLED: &str = "Arbor.Build.Tools.Compile.Enabled";
pub const TEST_COMMAND: &str = "Arbor.Build.Tools.Test.Command";
pub const TEST_ENABLED: &str = "Arbor.Build.Tools.Test.Enabled";
pub const PACKAGE_COMMAND: &str = "Arbor.Build.Tools.Package.Command";
pub const PACKAGE_ENABLED: &str = "Arbor.Build.Tools.Package.Enabled";

pub const BUILD_ID: &str = "Arbor.Build.Id";
pub const START_TIME: &str = "Arbor.Build.StartTime";

pub const LOG_VARIABLES: &str = "Arbor.Build.Log.Variables";

pub const KILL_PROCESSES: &str = "Arbor.Build.Cleanup.KillProcesses";
pub const KILL_PROCESSES_ENABLED: &str = "Arbor.Build.Cleanup.KillProcesses.Enabled";

/// Every well-known key with a one-line description, for help output
pub const DESCRIPTIONS: &[(&str, &str)] = &[
    (SOURCE_ROOT, "Root directory of the repository being built"),
    (ARTIFACTS, "Directory receiving build outputs"),
    (ARTIFACTS_PACKAGES, "Directory receiving packages"),
    (ARTIFACTS_TEST_REPORTS, "Directory receiving test reports"),
    (
        ARTIFACTS_CLEANUP_ENABLED,
        "Delete the artifacts directory before building",
    ),
    (AGENT_TYPE, "Detected CI agent, unset when running locally"),
    (IS_RUNNING_ON_BUILD_AGENT, "True when a CI agent was detected"),
    (BRANCH_NAME, "Version control branch being built"),
    (BRANCH_IS_MAIN, "True for main and master branches"),
    (CONFIGURATION, "Build configuration, Debug or Release"),
    (VERSION, "Full version, major.minor.patch.build"),
    (VERSION_MAJOR, "Major version"),
    (VERSION_MINOR, "Minor version"),
    (VERSION_PATCH, "Patch version"),
    (VERSION_BUILD, "Build number from the CI agent"),
    (BUILD_SYSTEM, "Detected build system"),
    (RESTORE_COMMAND, "Command restoring dependencies"),
    (RESTORE_ENABLED, "Set to false to skip restore"),
    (COMPILE_COMMAND, "Command compiling the sources"),
    (COMPILE_ENABLED, "Set to false to skip compile"),
    (TEST_COMMAND, "Command running the tests"),
    (TEST_ENABLED, "Set to false to skip tests"),
    (PACKAGE_COMMAND, "Command producing packages"),
    (PACKAGE_ENABLED, "Set to false to skip packaging"),
    (BUILD_ID, "Identity of this build"),
    (START_TIME, "RFC 3339 timestamp of the run start"),
    (LOG_VARIABLES, "Log every resolved variable before tools run"),
    (KILL_PROCESSES, "Comma separated process names killed after the build"),
    (KILL_PROCESSES_ENABLED, "Enable killing stray processes after the build"),
];
