//! Tests for the install lifecycle

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serial_test::serial;
use tempfile::TempDir;

use super::*;
use crate::builder::Definitions;
use crate::diagnose::{Classification, InstallSource};

type EventLog = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone)]
struct BuildCall {
    definition: String,
    prefix: PathBuf,
    config: BuildConfiguration,
}

struct FakeBuilder {
    status: i32,
    definitions: Vec<String>,
    calls: Rc<RefCell<Vec<BuildCall>>>,
    events: EventLog,
}

impl Builder for FakeBuilder {
    fn build(&self, config: &BuildConfiguration, definition: &str, prefix: &Path) -> Result<i32> {
        self.events.borrow_mut().push("build".to_string());
        self.calls.borrow_mut().push(BuildCall {
            definition: definition.to_string(),
            prefix: prefix.to_path_buf(),
            config: config.clone(),
        });
        // Like a real build, the prefix exists whether or not the build succeeds
        fs::create_dir_all(prefix.join("lib")).unwrap();
        if self.status == 0 {
            fs::create_dir_all(prefix.join("bin")).unwrap();
            fs::write(prefix.join("bin/runtime"), definition).unwrap();
        }
        Ok(self.status)
    }

    fn definitions(&self) -> Result<Definitions> {
        Ok(Box::new(self.definitions.clone().into_iter()))
    }

    fn version(&self) -> Result<i32> {
        Ok(0)
    }

    fn install_source(&self) -> InstallSource {
        InstallSource::Unknown
    }
}

struct FakeVersions {
    global: Option<String>,
}

impl VersionLookup for FakeVersions {
    fn local(&self) -> Option<String> {
        None
    }

    fn global(&self) -> Option<String> {
        self.global.clone()
    }
}

struct FakeRehash {
    events: EventLog,
}

impl Rehasher for FakeRehash {
    fn rehash(&self) {
        self.events.borrow_mut().push("rehash".to_string());
    }
}

struct FakeConfirmation {
    answer: bool,
    asked: Rc<Cell<bool>>,
}

impl Confirmation for FakeConfirmation {
    fn confirm(&self, _message: &str) -> Result<bool> {
        self.asked.set(true);
        Ok(self.answer)
    }
}

/// Records hook runs into the shared event log
struct RecordingHooks {
    events: EventLog,
    version_name: Option<&'static str>,
}

impl HookContributor for RecordingHooks {
    fn name(&self) -> &str {
        "recording"
    }

    fn register(&self, registry: &mut HookRegistry, _request: &InstallRequest) -> Result<()> {
        if let Some(name) = self.version_name {
            registry.set_version_name(name);
        }
        let events = Rc::clone(&self.events);
        registry.before_install("recording", move |ctx| {
            events
                .borrow_mut()
                .push(format!("before:{}", ctx.version_name));
            Ok(())
        });
        let events = Rc::clone(&self.events);
        registry.after_install("recording", move |ctx| {
            events
                .borrow_mut()
                .push(format!("after:{}", ctx.status.unwrap_or(-1)));
            Ok(())
        });
        Ok(())
    }
}

struct FailingHook;

impl HookContributor for FailingHook {
    fn name(&self) -> &str {
        "failing"
    }

    fn register(&self, registry: &mut HookRegistry, _request: &InstallRequest) -> Result<()> {
        registry.before_install("failing", |ctx| {
            fs::create_dir_all(&ctx.prefix).unwrap();
            Err(crate::error::hook::failed("failing", "exited with status 1"))
        });
        Ok(())
    }
}

struct Harness {
    temp: TempDir,
    settings: Settings,
    collaborators: Collaborators,
    calls: Rc<RefCell<Vec<BuildCall>>>,
    events: EventLog,
    asked: Rc<Cell<bool>>,
}

impl Harness {
    fn new(status: i32) -> Self {
        Self::with(status, true, &[])
    }

    fn with(status: i32, answer: bool, definitions: &[&str]) -> Self {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            root: temp.path().join("root"),
            build_root: None,
            build_path: None,
            cache_path: None,
            hook_path: Vec::new(),
            dir: temp.path().to_path_buf(),
            builder: None,
            rehash: None,
            debug: false,
        };
        let calls = Rc::new(RefCell::new(Vec::new()));
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let asked = Rc::new(Cell::new(false));
        let collaborators = Collaborators {
            builder: Box::new(FakeBuilder {
                status,
                definitions: definitions.iter().map(|d| (*d).to_string()).collect(),
                calls: Rc::clone(&calls),
                events: Rc::clone(&events),
            }),
            versions: Box::new(FakeVersions {
                global: Some("3.1.4".to_string()),
            }),
            rehasher: Box::new(FakeRehash {
                events: Rc::clone(&events),
            }),
            confirmation: Box::new(FakeConfirmation {
                answer,
                asked: Rc::clone(&asked),
            }),
        };
        Self {
            temp,
            settings,
            collaborators,
            calls,
            events,
            asked,
        }
    }

    fn recording(&self, version_name: Option<&'static str>) -> Vec<Box<dyn HookContributor>> {
        vec![Box::new(RecordingHooks {
            events: Rc::clone(&self.events),
            version_name,
        })]
    }

    fn prefix(&self, name: &str) -> PathBuf {
        self.settings.versions_dir().join(name)
    }

    /// Simulate a complete earlier install
    fn install_existing(&self, name: &str) -> PathBuf {
        let prefix = self.prefix(name);
        fs::create_dir_all(prefix.join("bin")).unwrap();
        fs::write(prefix.join("bin/runtime"), "old").unwrap();
        prefix
    }

    fn run(&self, request: &InstallRequest) -> Result<Completion> {
        self.run_with(request, self.recording(None))
    }

    fn run_with(
        &self,
        request: &InstallRequest,
        contributors: Vec<Box<dyn HookContributor>>,
    ) -> Result<Completion> {
        InstallOperation::new(&self.settings, &self.collaborators)
            .with_contributors(contributors)
            .execute(request)
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn build_calls(&self) -> Vec<BuildCall> {
        self.calls.borrow().clone()
    }
}

#[test]
#[serial]
fn test_successful_install() {
    let harness = Harness::new(0);
    let completion = harness.run(&InstallRequest::new("2.0")).unwrap();

    assert_eq!(completion.exit_code(), 0);
    let Completion::Finished(outcome) = completion else {
        panic!("Expected the builder to run");
    };
    assert_eq!(outcome.classified, Classification::Success);
    assert!(harness.prefix("2.0").join("bin/runtime").exists());
    assert_eq!(
        harness.events(),
        vec!["before:2.0", "build", "after:0", "rehash"]
    );

    let calls = harness.build_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].definition, "2.0");
    assert_eq!(calls[0].prefix, harness.prefix("2.0"));
    assert_eq!(calls[0].config.active_version, "3.1.4");
}

#[test]
#[serial]
fn test_skip_existing_is_a_silent_no_op() {
    let harness = Harness::new(0);
    let prefix = harness.install_existing("1.9");
    let request = InstallRequest {
        skip_existing: true,
        force: true,
        ..InstallRequest::new("1.9")
    };

    let completion = harness.run(&request).unwrap();

    assert_eq!(completion, Completion::Skipped);
    assert_eq!(completion.exit_code(), 0);
    assert!(harness.build_calls().is_empty());
    assert!(harness.events().is_empty());
    assert!(!harness.asked.get());
    assert_eq!(fs::read_to_string(prefix.join("bin/runtime")).unwrap(), "old");
}

#[test]
#[serial]
fn test_declined_prompt_leaves_prefix_untouched() {
    let harness = Harness::with(0, false, &[]);
    let prefix = harness.install_existing("1.9");

    let err = harness.run(&InstallRequest::new("1.9")).unwrap_err();

    assert!(matches!(err, VersoError::ConflictDeclined { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(harness.asked.get());
    assert!(harness.build_calls().is_empty());
    assert!(harness.events().is_empty());
    assert_eq!(fs::read_to_string(prefix.join("bin/runtime")).unwrap(), "old");
}

#[test]
#[serial]
fn test_accepted_prompt_reinstalls() {
    let harness = Harness::with(0, true, &[]);
    let prefix = harness.install_existing("1.9");

    let completion = harness.run(&InstallRequest::new("1.9")).unwrap();

    assert_eq!(completion.exit_code(), 0);
    assert!(harness.asked.get());
    assert_eq!(fs::read_to_string(prefix.join("bin/runtime")).unwrap(), "1.9");
}

#[test]
#[serial]
fn test_force_skips_prompt() {
    let harness = Harness::with(0, false, &[]);
    harness.install_existing("1.9");
    let request = InstallRequest {
        force: true,
        ..InstallRequest::new("1.9")
    };

    let completion = harness.run(&request).unwrap();

    assert_eq!(completion.exit_code(), 0);
    assert!(!harness.asked.get());
    assert_eq!(harness.build_calls().len(), 1);
}

#[test]
#[serial]
fn test_partial_install_is_not_prompted() {
    let harness = Harness::with(0, false, &[]);
    fs::create_dir_all(harness.prefix("1.9").join("lib")).unwrap();

    let completion = harness.run(&InstallRequest::new("1.9")).unwrap();

    assert_eq!(completion.exit_code(), 0);
    assert!(!harness.asked.get());
}

#[test]
#[serial]
fn test_failed_build_removes_new_prefix() {
    let harness = Harness::new(1);

    let completion = harness.run(&InstallRequest::new("2.0")).unwrap();

    let Completion::Finished(outcome) = completion else {
        panic!("Expected the builder to run");
    };
    assert_eq!(outcome.status, 1);
    assert_eq!(outcome.classified, Classification::OtherFailure);
    assert!(!harness.prefix("2.0").exists());
    assert_eq!(harness.events(), vec!["before:2.0", "build", "after:1"]);
}

#[test]
#[serial]
fn test_failed_build_keeps_preexisting_prefix() {
    let harness = Harness::new(1);
    let prefix = harness.prefix("2.0");
    fs::create_dir_all(&prefix).unwrap();
    fs::write(prefix.join("notes"), "kept").unwrap();

    let completion = harness.run(&InstallRequest::new("2.0")).unwrap();

    assert_eq!(completion.exit_code(), 1);
    assert!(prefix.join("notes").exists());
    assert!(prefix.join("lib").exists());
}

#[test]
#[serial]
fn test_failed_forced_reinstall_keeps_prefix() {
    let harness = Harness::new(1);
    let prefix = harness.install_existing("1.9");
    let request = InstallRequest {
        force: true,
        ..InstallRequest::new("1.9")
    };

    assert_eq!(harness.run(&request).unwrap().exit_code(), 1);
    assert!(prefix.join("bin/runtime").exists());
}

#[test]
#[serial]
fn test_missing_definition() {
    let harness = Harness::with(2, true, &["2.0.0", "3.3.0"]);

    let completion = harness.run(&InstallRequest::new("missing-def")).unwrap();

    let Completion::Finished(outcome) = completion else {
        panic!("Expected the builder to run");
    };
    assert_eq!(outcome.status, 2);
    assert_eq!(outcome.classified, Classification::DefinitionNotFound);
    assert!(!harness.prefix("missing-def").exists());
    assert!(!harness.events().contains(&"rehash".to_string()));
}

#[test]
#[serial]
fn test_hook_version_name_wins() {
    let harness = Harness::new(0);
    let contributors = harness.recording(Some("custom"));

    harness
        .run_with(&InstallRequest::new("./defs/2.0"), contributors)
        .unwrap();

    let calls = harness.build_calls();
    assert_eq!(calls[0].definition, "./defs/2.0");
    assert_eq!(calls[0].prefix, harness.prefix("custom"));
    assert!(harness.prefix("custom/bin").exists());
    assert_eq!(harness.events()[0], "before:custom");
}

#[test]
#[serial]
fn test_definition_path_uses_last_segment() {
    let harness = Harness::new(0);
    harness.run(&InstallRequest::new("./defs/2.0")).unwrap();
    assert_eq!(harness.build_calls()[0].prefix, harness.prefix("2.0"));
}

#[test]
#[serial]
fn test_before_hook_failure_aborts() {
    let harness = Harness::new(0);

    let err = harness
        .run_with(&InstallRequest::new("2.0"), vec![Box::new(FailingHook)])
        .unwrap_err();

    assert!(matches!(err, VersoError::HookFailed { .. }));
    assert!(harness.build_calls().is_empty());
    assert!(!harness.prefix("2.0").exists());
}

#[test]
#[serial]
fn test_keep_flag_reaches_builder() {
    let harness = Harness::new(0);
    let request = InstallRequest {
        keep: true,
        ..InstallRequest::new("2.0")
    };

    harness.run(&request).unwrap();

    let config = &harness.build_calls()[0].config;
    assert!(config.keep);
    assert_eq!(
        config.build_path,
        Some(harness.settings.root.join("sources/2.0"))
    );
}

#[test]
#[serial]
fn test_build_root_keeps_without_flag() {
    let mut harness = Harness::new(0);
    harness.settings.build_root = Some(harness.temp.path().join("builds"));

    harness.run(&InstallRequest::new("2.0")).unwrap();

    let config = &harness.build_calls()[0].config;
    assert!(config.keep);
    assert_eq!(config.flags(), vec!["-k"]);
    assert_eq!(
        config.build_path,
        Some(harness.temp.path().join("builds/2.0"))
    );
}

#[test]
#[serial]
fn test_forced_install_is_idempotent() {
    let harness = Harness::new(0);
    let request = InstallRequest {
        force: true,
        ..InstallRequest::new("2.0")
    };

    harness.run(&request).unwrap();
    let mut first: Vec<_> = fs::read_dir(harness.prefix("2.0"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    harness.run(&request).unwrap();
    let mut second: Vec<_> = fs::read_dir(harness.prefix("2.0"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    first.sort();
    second.sort();
    assert_eq!(first, second);
    assert_eq!(
        fs::read_to_string(harness.prefix("2.0/bin/runtime")).unwrap(),
        "2.0"
    );
}
