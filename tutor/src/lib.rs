//! Tutoring session engine.
//!
//! A [`Tutor`] owns the shared LLM profiles, the loaded [`PromptLibrary`] and
//! the runtime config. Per-conversation state lives in [`TutorSession`]; the
//! [`SessionStore`] hands out one lock per session id so turns of the same
//! conversation never interleave.
//!
//! Flow of one turn ([`Tutor::respond`]):
//! 1. no topic yet → detect it with `findTopic.txt` and greet;
//! 2. otherwise classify the message with `controller.txt` into an [`Intent`];
//! 3. run the matching template chain (explain, check work, practice problems, ...);
//! 4. split an optional mermaid diagram out of the reply.
//!
//! [`save_drawing`] and [`save_diagram`] persist what the web app sends back.

mod artifacts;
mod cfg;
mod error;
mod intent;
mod mermaid;
mod prompts;
mod session;
mod store;

pub use artifacts::{decode_image, save_diagram, save_drawing};
pub use cfg::{DIAGRAM_FILE, DRAWING_FILE, TutorConfig};
pub use error::TutorError;
pub use intent::Intent;
pub use mermaid::parse_mermaid;
pub use prompts::{PromptLibrary, fill};
pub use session::{ChatReply, Tutor, TutorSession};
pub use store::{DEFAULT_SESSION_ID, SessionStore};
