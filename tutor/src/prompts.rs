//! Prompt templates loaded once from the prompts directory.

use std::path::{Path, PathBuf};

use ai_llm_service::ImageData;
use tracing::{info, warn};

use crate::error::TutorError;

/// Every template the tutor can send. Required files fail the load; optional
/// ones are `None` and the corresponding branch degrades gracefully.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    pub find_topic: String,
    pub controller: String,
    pub initial: String,
    pub explain: String,
    pub check_work: [String; 3],
    pub concepts: String,
    pub practice_problems: String,
    pub clarify: Option<String>,
    /// Seed practice problem, used for demos before any problem was generated.
    pub seed_practice_problem: Option<String>,
    /// Worked examples shown to the model before the student's image.
    pub example_solutions: Vec<ImageData>,
}

const EXAMPLE_IMAGES: [&str; 2] = ["ex_solution.png", "ex_solution_2.png"];

impl PromptLibrary {
    /// Loads all templates from `dir`.
    ///
    /// # Errors
    /// [`TutorError::MissingPrompt`] for an absent required file,
    /// [`TutorError::Io`] for unreadable ones.
    pub fn load(dir: &Path) -> Result<Self, TutorError> {
        let lib = Self {
            find_topic: required(dir, "findTopic.txt")?,
            controller: required(dir, "controller.txt")?,
            initial: required(dir, "initial.txt")?,
            explain: required(dir, "learnBST.txt")?,
            check_work: [
                required(dir, "checkWork1.txt")?,
                required(dir, "checkWork2.txt")?,
                required(dir, "checkWork3.txt")?,
            ],
            concepts: required(dir, "pp2.txt")?,
            practice_problems: required(dir, "practiceProblems.txt")?,
            clarify: optional(dir, "clarify.txt")?,
            seed_practice_problem: optional(dir, "testingPraciceProblem.txt")?,
            example_solutions: example_images(dir)?,
        };

        info!(
            dir = %dir.display(),
            examples = lib.example_solutions.len(),
            has_clarify = lib.clarify.is_some(),
            has_seed_problem = lib.seed_practice_problem.is_some(),
            "prompt library loaded"
        );
        Ok(lib)
    }
}

/// Fills a template: instruction block first, then each variable on its own line.
///
/// ```
/// assert_eq!(tutor::fill(&["Find the topic.", "I want trees"]), "Find the topic.\nI want trees");
/// ```
pub fn fill(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn required(dir: &Path, name: &str) -> Result<String, TutorError> {
    optional(dir, name)?.ok_or_else(|| TutorError::MissingPrompt(dir.join(name)))
}

fn optional(dir: &Path, name: &str) -> Result<Option<String>, TutorError> {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(TutorError::Io { path, source }),
    }
}

fn example_images(dir: &Path) -> Result<Vec<ImageData>, TutorError> {
    let mut out = Vec::with_capacity(EXAMPLE_IMAGES.len());
    for name in EXAMPLE_IMAGES {
        let path: PathBuf = dir.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => out.push(ImageData::from_bytes("image/png", &bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "example solution image missing; check work runs without it");
            }
            Err(source) => return Err(TutorError::Io { path, source }),
        }
    }
    Ok(out)
}
