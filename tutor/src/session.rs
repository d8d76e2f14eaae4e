//! Tutor engine and per-conversation state.

use std::sync::Arc;

use ai_llm_service::{ChatMessage, ImageData, LlmServiceProfiles};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    cfg::TutorConfig,
    error::TutorError,
    intent::Intent,
    mermaid::parse_mermaid,
    prompts::{PromptLibrary, fill},
};

pub(crate) const NO_PROBLEM_REPLY: &str = "There is no practice problem to check yet. Ask me for some practice problems first, then submit your work.";
pub(crate) const NO_TOPIC_REPLY: &str = "I couldn't tell which topic you want to study. Tell me the data structure or algorithm you'd like to learn about.";
pub(crate) const NO_WORK_REPLY: &str = "I couldn't find your work. Draw or upload your solution, then ask me to check it again.";

/// State of one tutoring conversation.
#[derive(Debug, Clone)]
pub struct TutorSession {
    topic: Option<String>,
    transcript: String,
    practice_problem: Option<String>,
    turns: u64,
}

impl TutorSession {
    pub fn new(prompts: &PromptLibrary) -> Self {
        Self {
            topic: None,
            transcript: format!("{}\n", prompts.initial.trim_end()),
            practice_problem: prompts.seed_practice_problem.clone(),
            turns: 0,
        }
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn practice_problem(&self) -> Option<&str> {
        self.practice_problem.as_deref()
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    fn record(&mut self, message: &str, reply: &str) {
        self.transcript.push_str("Student: ");
        self.transcript.push_str(message.trim());
        self.transcript.push_str("\nTutor: ");
        self.transcript.push_str(reply.trim());
        self.transcript.push('\n');
        self.turns += 1;
    }
}

/// Reply of one turn: text plus an optional mermaid diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub diagram: Option<String>,
    pub text: String,
    /// `None` for the topic-detection turn, which bypasses the controller.
    pub intent: Option<Intent>,
}

/// Shared, stateless engine; all conversation state is passed in.
pub struct Tutor {
    llm: Arc<LlmServiceProfiles>,
    prompts: Arc<PromptLibrary>,
    cfg: TutorConfig,
}

impl Tutor {
    pub fn new(llm: Arc<LlmServiceProfiles>, prompts: PromptLibrary, cfg: TutorConfig) -> Self {
        Self {
            llm,
            prompts: Arc::new(prompts),
            cfg,
        }
    }

    /// Loads [`TutorConfig`] from env and the prompt library from `PROMPTS_DIR`.
    pub fn from_env(llm: Arc<LlmServiceProfiles>) -> Result<Self, TutorError> {
        let cfg = TutorConfig::from_env();
        let prompts = PromptLibrary::load(&cfg.prompts_dir)?;
        Ok(Self::new(llm, prompts, cfg))
    }

    pub fn config(&self) -> &TutorConfig {
        &self.cfg
    }

    pub fn new_session(&self) -> TutorSession {
        TutorSession::new(&self.prompts)
    }

    /// Runs one turn of the conversation.
    ///
    /// `submission` is the student's work for check-work turns; when absent
    /// the last saved drawing is used.
    ///
    /// # Errors
    /// LLM failures and unreadable artifacts. Missing practice problem or
    /// missing student work are answered with guidance text instead.
    #[instrument(skip_all, fields(turn = session.turns, has_submission = submission.is_some()))]
    pub async fn respond(
        &self,
        session: &mut TutorSession,
        message: &str,
        submission: Option<ImageData>,
    ) -> Result<ChatReply, TutorError> {
        if session.topic.is_none() {
            let text = match self.detect_topic(message).await? {
                Some(topic) => {
                    info!(topic = %topic, "topic detected");
                    let text = format!(
                        "It seems you would like to learn about {topic}. I can help by explaining the topic, providing you with interactive practice problems, or clarifying your understanding. How can I assist you today?"
                    );
                    session.topic = Some(topic);
                    text
                }
                None => {
                    warn!("topic detection returned nothing");
                    NO_TOPIC_REPLY.to_string()
                }
            };
            session.record(message, &text);
            return Ok(ChatReply {
                diagram: None,
                text,
                intent: None,
            });
        }

        let controller_reply = self
            .llm
            .generate(&fill(&[&self.prompts.controller, message]))
            .await?;
        let intent = Intent::from_controller_reply(&controller_reply);
        info!(?intent, "controller routed message");

        let raw = match intent {
            Intent::ExplainConcept => self.explain_concept(session, message).await?,
            Intent::CheckWork => self.check_work(session, submission).await?,
            Intent::Clarify => match &self.prompts.clarify {
                Some(template) => self.clarify(template, session, message).await?,
                None => controller_reply,
            },
            Intent::PracticeProblems => self.practice_problems(session).await?,
            Intent::General => controller_reply,
        };

        let (diagram, text) = parse_mermaid(&raw);
        session.record(message, &text);

        Ok(ChatReply {
            diagram,
            text,
            intent: Some(intent),
        })
    }

    /// `None` when the model names no topic; detection then runs again next turn.
    async fn detect_topic(&self, message: &str) -> Result<Option<String>, TutorError> {
        let reply = self
            .llm
            .generate(&fill(&[&self.prompts.find_topic, message]))
            .await?;
        let topic = reply.trim();
        Ok((!topic.is_empty()).then(|| topic.to_string()))
    }

    async fn explain_concept(
        &self,
        session: &TutorSession,
        message: &str,
    ) -> Result<String, TutorError> {
        let topic = session.topic().unwrap_or_default();
        Ok(self
            .llm
            .generate(&fill(&[&self.prompts.explain, topic, message]))
            .await?)
    }

    async fn clarify(
        &self,
        template: &str,
        session: &TutorSession,
        message: &str,
    ) -> Result<String, TutorError> {
        let topic = session.topic().unwrap_or_default();
        Ok(self
            .llm
            .generate(&fill(&[template, topic, session.transcript(), message]))
            .await?)
    }

    /// Two-step chain: topic → concepts → problems. The result becomes the
    /// session's current practice problem.
    async fn practice_problems(&self, session: &mut TutorSession) -> Result<String, TutorError> {
        let topic = session.topic().unwrap_or_default().to_string();

        let concepts = self
            .llm
            .generate(&fill(&[&self.prompts.concepts, &topic]))
            .await?;
        debug!(concepts_len = concepts.len(), "concepts extracted");

        let problems = self
            .llm
            .generate(&fill(&[&self.prompts.practice_problems, &topic, &concepts]))
            .await?;

        session.practice_problem = Some(problems.clone());
        Ok(problems)
    }

    /// Compares the student's image against worked examples for the current problem.
    async fn check_work(
        &self,
        session: &TutorSession,
        submission: Option<ImageData>,
    ) -> Result<String, TutorError> {
        let Some(problem) = session.practice_problem() else {
            return Ok(NO_PROBLEM_REPLY.to_string());
        };

        let work = match submission {
            Some(img) => Some(img),
            None => self.load_saved_drawing().await?,
        };
        let Some(work) = work else {
            return Ok(NO_WORK_REPLY.to_string());
        };

        let [first, second, third] = &self.prompts.check_work;
        let mut examples = self.prompts.example_solutions.iter().cloned();

        let mut msg = ChatMessage::user().text(first.as_str());
        if let Some(img) = examples.next() {
            msg = msg.image(img);
        }
        msg = msg.text(second.as_str());
        if let Some(img) = examples.next() {
            msg = msg.image(img);
        }
        let msg = msg.text(third.as_str()).text(problem).image(work);

        Ok(self.llm.generate_messages(&[msg]).await?)
    }

    async fn load_saved_drawing(&self) -> Result<Option<ImageData>, TutorError> {
        let path = self.cfg.drawing_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => Ok(Some(ImageData::from_bytes("image/png", &bytes))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no saved drawing to check");
                Ok(None)
            }
            Err(source) => Err(TutorError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::tests::write_prompt_set;
    use ai_llm_service::{LlmModelConfig, LlmProvider};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn claude(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Anthropic,
            model: "claude-test".into(),
            endpoint: endpoint.into(),
            api_key: Some("k".into()),
            max_tokens: Some(512),
            temperature: None,
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    async fn reply_when(server: &MockServer, marker: &str, text: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": text}]
            })))
            .mount(server)
            .await;
    }

    fn tutor(server: &MockServer, dir: &std::path::Path) -> Tutor {
        let llm = Arc::new(
            LlmServiceProfiles::new(claude(&server.uri()), claude(&server.uri()), Some(1)).unwrap(),
        );
        let prompts = PromptLibrary::load(dir).unwrap();
        let cfg = TutorConfig {
            prompts_dir: dir.to_path_buf(),
            artifacts_dir: dir.join("public"),
            max_sessions: 8,
        };
        Tutor::new(llm, prompts, cfg)
    }

    #[tokio::test]
    async fn first_turn_detects_topic_and_greets() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", " binary search trees \n").await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        let reply = t.respond(&mut s, "I want to learn BSTs", None).await.unwrap();

        assert_eq!(s.topic(), Some("binary search trees"));
        assert!(reply.text.starts_with(
            "It seems you would like to learn about binary search trees. I can help"
        ));
        assert_eq!(reply.intent, None);
        assert!(s.transcript().starts_with("INITIAL\nStudent: I want to learn BSTs\n"));
        assert_eq!(s.turns(), 1);
    }

    #[tokio::test]
    async fn explain_concept_splits_out_diagram() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "binary search trees").await;
        reply_when(&server, "CONTROLLER", "Explain Concept").await;
        reply_when(
            &server,
            "EXPLAIN",
            "A BST keeps order.\n```mermaid\ngraph TD\n8-->3\n```\nLeft is smaller.",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "teach me BSTs", None).await.unwrap();
        let reply = t.respond(&mut s, "how does insertion work?", None).await.unwrap();

        assert_eq!(reply.intent, Some(Intent::ExplainConcept));
        assert_eq!(reply.diagram.as_deref(), Some("graph TD\n8-->3"));
        assert_eq!(reply.text, "A BST keeps order.\n\nLeft is smaller.");
    }

    #[tokio::test]
    async fn general_intent_returns_controller_reply() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "graphs").await;
        reply_when(&server, "CONTROLLER", "Happy to chat about graphs!").await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "graphs please", None).await.unwrap();
        let reply = t.respond(&mut s, "thanks!", None).await.unwrap();

        assert_eq!(reply.intent, Some(Intent::General));
        assert_eq!(reply.text, "Happy to chat about graphs!");
    }

    #[tokio::test]
    async fn practice_problems_become_current_problem() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "heaps").await;
        reply_when(&server, "CONTROLLER", "practice problems").await;
        reply_when(&server, "CONCEPTS", "heapify, sift-down").await;
        reply_when(&server, "PRACTICE", "1. Build a min-heap from [5, 3, 8].").await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "heaps", None).await.unwrap();
        let reply = t.respond(&mut s, "give me problems", None).await.unwrap();

        assert_eq!(reply.intent, Some(Intent::PracticeProblems));
        assert_eq!(
            s.practice_problem(),
            Some("1. Build a min-heap from [5, 3, 8].")
        );
    }

    #[tokio::test]
    async fn check_work_without_problem_gives_guidance() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "heaps").await;
        reply_when(&server, "CONTROLLER", "check work").await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "heaps", None).await.unwrap();
        let reply = t.respond(&mut s, "is this right?", None).await.unwrap();

        assert_eq!(reply.intent, Some(Intent::CheckWork));
        assert_eq!(reply.text, NO_PROBLEM_REPLY);
    }

    #[tokio::test]
    async fn check_work_falls_back_to_saved_drawing() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "heaps").await;
        reply_when(&server, "CONTROLLER", "check work").await;
        // The student drawing bytes "drawn" encode to ZHJhd24=.
        reply_when(&server, "ZHJhd24=", "Correct! Nice heap.").await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());
        std::fs::write(
            dir.path().join("testingPraciceProblem.txt"),
            "Build a min-heap from [5, 3, 8].",
        )
        .unwrap();

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "heaps", None).await.unwrap();

        let missing = t.respond(&mut s, "check it", None).await.unwrap();
        assert_eq!(missing.text, NO_WORK_REPLY);

        std::fs::create_dir_all(dir.path().join("public")).unwrap();
        std::fs::write(dir.path().join("public").join("drawing.png"), b"drawn").unwrap();
        let reply = t.respond(&mut s, "check it", None).await.unwrap();
        assert_eq!(reply.text, "Correct! Nice heap.");
    }

    #[tokio::test]
    async fn blank_topic_keeps_detection_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_string_contains("FIND_TOPIC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "  \n "}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        reply_when(&server, "FIND_TOPIC", "tries").await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        let reply = t.respond(&mut s, "hmm", None).await.unwrap();
        assert_eq!(reply.text, NO_TOPIC_REPLY);
        assert_eq!(s.topic(), None);

        let reply = t.respond(&mut s, "tries, please", None).await.unwrap();
        assert_eq!(s.topic(), Some("tries"));
        assert!(reply.text.contains("learn about tries."));
    }

    #[tokio::test]
    async fn clarify_template_gets_topic_transcript_and_message() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "heaps").await;
        reply_when(&server, "CONTROLLER", "need help/clarification").await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_string_contains("CLARIFY"))
            .and(body_string_contains("heaps"))
            .and(body_string_contains("Student: heaps please"))
            .and(body_string_contains("why does sift-down stop early?"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "It stops once the parent is smaller."}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());
        std::fs::write(dir.path().join("clarify.txt"), "CLARIFY").unwrap();

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "heaps please", None).await.unwrap();
        let reply = t
            .respond(&mut s, "why does sift-down stop early?", None)
            .await
            .unwrap();

        assert_eq!(reply.intent, Some(Intent::Clarify));
        assert_eq!(reply.text, "It stops once the parent is smaller.");
    }

    #[tokio::test]
    async fn clarify_without_template_returns_controller_reply() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "heaps").await;
        reply_when(
            &server,
            "CONTROLLER",
            "Need help/clarification: a heap is a complete tree.",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "heaps please", None).await.unwrap();
        let reply = t.respond(&mut s, "what is a heap?", None).await.unwrap();

        assert_eq!(reply.intent, Some(Intent::Clarify));
        assert_eq!(reply.text, "Need help/clarification: a heap is a complete tree.");
    }

    #[tokio::test]
    async fn submitted_image_wins_over_saved_drawing() {
        let server = MockServer::start().await;
        reply_when(&server, "FIND_TOPIC", "heaps").await;
        reply_when(&server, "CONTROLLER", "check work").await;
        // "drawn" -> ZHJhd24=, "fresh" -> ZnJlc2g=
        reply_when(&server, "ZHJhd24=", "Checked the saved drawing.").await;
        reply_when(&server, "ZnJlc2g=", "Checked the upload.").await;
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());
        std::fs::write(dir.path().join("testingPraciceProblem.txt"), "Insert 4.").unwrap();
        std::fs::create_dir_all(dir.path().join("public")).unwrap();
        std::fs::write(dir.path().join("public").join("drawing.png"), b"drawn").unwrap();

        let t = tutor(&server, dir.path());
        let mut s = t.new_session();
        t.respond(&mut s, "heaps", None).await.unwrap();
        let upload = ImageData::from_bytes("image/png", b"fresh");
        let reply = t.respond(&mut s, "check it", Some(upload)).await.unwrap();

        assert_eq!(reply.text, "Checked the upload.");
    }
}
