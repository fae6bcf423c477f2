//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use git2::Repository;

use graphe::config::{Config, GenerationParams};
use graphe::error::ModelError;
use graphe::git::StagedDiff;
use graphe::message::CommitMessage;
use graphe::model::TextGenerator;
use graphe::pipeline::{ReviewDecision, Reviewer};

/// A config that never touches the environment.
pub fn test_config() -> Config {
    Config {
        api_key: "test-key".into(),
        model: "gemini-2.0-flash-exp".into(),
        base_url: "http://127.0.0.1:9".into(),
        generation: GenerationParams::default(),
        max_subject_length: 50,
        max_attempts: 3,
        max_regenerates: 3,
        request_timeout: Duration::from_secs(5),
    }
}

/// Initialize a repository with committer identity configured.
pub fn init_repo(dir: &Path) -> Repository {
    let repo = Repository::init(dir).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@test.com").unwrap();
    repo
}

/// Write a file and stage it.
pub fn stage_file(repo: &Repository, dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
}

/// Number of commits reachable from HEAD, 0 for an unborn branch.
pub fn commit_count(repo: &Repository) -> usize {
    match repo.head() {
        Ok(head) => {
            let mut revwalk = repo.revwalk().unwrap();
            revwalk.push(head.target().unwrap()).unwrap();
            revwalk.count()
        }
        Err(_) => 0,
    }
}

/// Generator that pops scripted outcomes and records the prompts it saw.
pub struct ScriptedGenerator {
    outcomes: Mutex<Vec<Result<String, ModelError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(outcomes: Vec<Result<String, ModelError>>) -> Self {
        let mut outcomes = outcomes;
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| panic!("scripted generator called too many times"))
    }
}

/// Reviewer that replays scripted decisions and records shown candidates.
pub struct ScriptedReviewer {
    decisions: Vec<ReviewDecision>,
    pub seen: Vec<String>,
}

impl ScriptedReviewer {
    pub fn new(decisions: Vec<ReviewDecision>) -> Self {
        let mut decisions = decisions;
        decisions.reverse();
        Self {
            decisions,
            seen: Vec::new(),
        }
    }
}

impl Reviewer for ScriptedReviewer {
    fn review(&mut self, message: &CommitMessage, _diff: &StagedDiff) -> ReviewDecision {
        self.seen.push(message.render());
        self.decisions
            .pop()
            .expect("scripted reviewer asked too many times")
    }
}
