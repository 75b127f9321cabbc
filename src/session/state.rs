use crate::{
    error::{EMPTY_PROMPT_MESSAGE, GENERATION_FAILED_MESSAGE},
    models::{AspectRatio, GeneratedImage},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Generating,
    Succeeded,
    Failed,
}

/// Everything one screen shows. Only [`transition`] mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    current_prompt: String,
    aspect_ratio: AspectRatio,
    last_submitted_prompt: String,
    images: Vec<GeneratedImage>,
    status: Status,
    error_message: Option<String>,
    selected: Option<usize>,
    latest_request: u64,
}

#[derive(Debug, Clone)]
pub enum Event {
    EditPrompt(String),
    SetAspectRatio(AspectRatio),
    StartGeneration {
        prompt: String,
        aspect_ratio: AspectRatio,
    },
    GenerationSettled {
        request_id: u64,
        outcome: Result<Vec<GeneratedImage>, String>,
    },
    SelectImage(usize),
    CloseSelection,
    Remix,
}

/// A provider call the caller must run and report back as `GenerationSettled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub request_id: u64,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn last_submitted_prompt(&self) -> &str {
        &self.last_submitted_prompt
    }

    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_image(&self) -> Option<&GeneratedImage> {
        self.selected.and_then(|index| self.images.get(index))
    }

    /// Id of the most recently issued generation request, 0 before the first.
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    pub fn is_generating(&self) -> bool {
        self.status == Status::Generating
    }

    pub fn can_remix(&self) -> bool {
        !self.last_submitted_prompt.is_empty()
    }

    fn start(&mut self, prompt: String, aspect_ratio: AspectRatio) -> Option<GenerationTicket> {
        if prompt.trim().is_empty() {
            log::warn!("Rejected generation: prompt is empty");
            self.status = Status::Failed;
            self.error_message = Some(EMPTY_PROMPT_MESSAGE.to_string());
            return None;
        }

        self.latest_request += 1;
        self.error_message = None;
        self.images.clear();
        self.selected = None;
        self.last_submitted_prompt = prompt.clone();
        self.aspect_ratio = aspect_ratio;
        self.status = Status::Generating;

        log::info!(
            "Starting generation [req:{}] at {}",
            self.latest_request,
            aspect_ratio
        );

        Some(GenerationTicket {
            request_id: self.latest_request,
            prompt,
            aspect_ratio,
        })
    }

    fn settle(&mut self, request_id: u64, outcome: Result<Vec<GeneratedImage>, String>) {
        if request_id != self.latest_request {
            log::debug!(
                "Discarding stale result [req:{}], latest is [req:{}]",
                request_id,
                self.latest_request
            );
            return;
        }

        match outcome {
            Ok(images) if !images.is_empty() => {
                log::info!("Generation [req:{}] returned {} image(s)", request_id, images.len());
                self.images = images;
                self.error_message = None;
                self.status = Status::Succeeded;
            }
            Ok(_) => self.fail(GENERATION_FAILED_MESSAGE.to_string()),
            Err(message) => self.fail(message),
        }
    }

    fn fail(&mut self, message: String) {
        log::warn!("Generation [req:{}] failed: {}", self.latest_request, message);
        self.images.clear();
        self.selected = None;
        self.error_message = Some(message);
        self.status = Status::Failed;
    }
}

/// Apply one event. Returns the next session and, when a generation was
/// started, the ticket describing the provider call to make.
pub fn transition(mut session: Session, event: Event) -> (Session, Option<GenerationTicket>) {
    let ticket = match event {
        Event::EditPrompt(text) => {
            session.current_prompt = text;
            None
        }
        Event::SetAspectRatio(aspect_ratio) => {
            session.aspect_ratio = aspect_ratio;
            None
        }
        Event::StartGeneration {
            prompt,
            aspect_ratio,
        } => session.start(prompt, aspect_ratio),
        Event::GenerationSettled {
            request_id,
            outcome,
        } => {
            session.settle(request_id, outcome);
            None
        }
        Event::SelectImage(index) => {
            if index < session.images.len() {
                session.selected = Some(index);
            } else {
                log::warn!(
                    "Ignoring selection of image {} ({} available)",
                    index,
                    session.images.len()
                );
            }
            None
        }
        Event::CloseSelection => {
            session.selected = None;
            None
        }
        Event::Remix => {
            if session.can_remix() {
                session.selected = None;
                let prompt = session.last_submitted_prompt.clone();
                let aspect_ratio = session.aspect_ratio;
                session.start(prompt, aspect_ratio)
            } else {
                log::debug!("Nothing to remix yet");
                None
            }
        }
    };

    (session, ticket)
}
