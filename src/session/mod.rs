pub mod download;
pub mod state;

use crate::{
    error::{Result, WallpaperError},
    gemini::WallpaperGenerator,
    models::{AspectRatio, GeneratedImage},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub use download::{download_file_name, save_image};
pub use state::{transition, Event, GenerationTicket, Session, Status};

/// Owns a [`Session`] and runs the generation cycles its transitions ask for.
///
/// The session lock is released while the provider call is in flight, so
/// overlapping generations are possible; request ids make the latest win.
pub struct SessionController<G> {
    session: Arc<Mutex<Session>>,
    generator: Arc<G>,
}

impl<G> Clone for SessionController<G> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<G: WallpaperGenerator> SessionController<G> {
    pub fn new(generator: G) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            generator: Arc::new(generator),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    async fn dispatch(&self, event: Event) -> Option<GenerationTicket> {
        let mut guard = self.session.lock().await;
        let current = std::mem::take(&mut *guard);
        let (next, ticket) = transition(current, event);
        *guard = next;
        ticket
    }

    async fn run(&self, ticket: Option<GenerationTicket>) -> Status {
        if let Some(ticket) = ticket {
            let outcome = self
                .generator
                .generate(&ticket.prompt, ticket.aspect_ratio)
                .await
                .map_err(|e| e.to_string());

            self.dispatch(Event::GenerationSettled {
                request_id: ticket.request_id,
                outcome,
            })
            .await;
        }
        self.session.lock().await.status()
    }

    pub async fn edit_prompt(&self, text: impl Into<String>) {
        self.dispatch(Event::EditPrompt(text.into())).await;
    }

    pub async fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        self.dispatch(Event::SetAspectRatio(aspect_ratio)).await;
    }

    /// Start a generation and wait for it to settle. Returns the status
    /// afterwards, which stays `Generating` if a newer request superseded it.
    pub async fn start_generation(
        &self,
        prompt: impl Into<String>,
        aspect_ratio: AspectRatio,
    ) -> Status {
        let ticket = self
            .dispatch(Event::StartGeneration {
                prompt: prompt.into(),
                aspect_ratio,
            })
            .await;
        self.run(ticket).await
    }

    /// Generate from the prompt text and ratio currently in the session.
    pub async fn submit(&self) -> Status {
        let (prompt, aspect_ratio) = {
            let session = self.session.lock().await;
            (session.current_prompt().to_string(), session.aspect_ratio())
        };
        self.start_generation(prompt, aspect_ratio).await
    }

    pub async fn select_image(&self, index: usize) -> Option<GeneratedImage> {
        self.dispatch(Event::SelectImage(index)).await;
        self.session.lock().await.selected_image().cloned()
    }

    pub async fn close_selection(&self) {
        self.dispatch(Event::CloseSelection).await;
    }

    pub async fn remix(&self) -> Status {
        let ticket = self.dispatch(Event::Remix).await;
        self.run(ticket).await
    }

    /// Write the selected image into `dir`, named after the last submitted prompt.
    pub async fn download(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let (image, prompt) = {
            let session = self.session.lock().await;
            let image = session
                .selected_image()
                .cloned()
                .ok_or_else(|| WallpaperError::DownloadError("no image selected".into()))?;
            (image, session.last_submitted_prompt().to_string())
        };
        save_image(&image, &prompt, dir.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EMPTY_PROMPT_MESSAGE, GENERATION_FAILED_MESSAGE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Returns `count` images tagged with the prompt, after an optional
    /// per-prompt delay. Prompts starting with "fail" produce an error.
    #[derive(Default)]
    struct StubGenerator {
        calls: AtomicUsize,
        count: usize,
        delays: Vec<(&'static str, u64)>,
        seen: std::sync::Mutex<Vec<(String, AspectRatio)>>,
    }

    impl StubGenerator {
        fn with_count(count: usize) -> Self {
            Self {
                count,
                ..Default::default()
            }
        }

        fn delayed(mut self, prompt: &'static str, millis: u64) -> Self {
            self.delays.push((prompt, millis));
            self
        }
    }

    #[async_trait]
    impl WallpaperGenerator for StubGenerator {
        async fn generate(
            &self,
            prompt: &str,
            aspect_ratio: AspectRatio,
        ) -> Result<Vec<GeneratedImage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), aspect_ratio));

            let delay = self
                .delays
                .iter()
                .find(|(p, _)| *p == prompt)
                .map(|(_, ms)| *ms);
            if let Some(ms) = delay {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }

            if prompt.starts_with("fail") {
                return Err(WallpaperError::generation_failed());
            }
            Ok((0..self.count)
                .map(|i| GeneratedImage::new("image/png", format!("{}-{}", prompt, i)))
                .collect())
        }
    }

    fn payloads(session: &Session) -> Vec<String> {
        session.images().iter().map(|i| i.image_data.clone()).collect()
    }

    #[tokio::test]
    async fn test_blank_prompt_never_reaches_generator() {
        let controller = SessionController::new(StubGenerator::with_count(4));
        for prompt in ["", "  ", "\t\n"] {
            controller.edit_prompt(prompt).await;
            assert_eq!(controller.submit().await, Status::Failed);
        }

        let session = controller.snapshot().await;
        assert_eq!(session.error_message(), Some(EMPTY_PROMPT_MESSAGE));
        assert_eq!(controller.generator().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_uses_current_prompt_and_ratio() {
        let controller = SessionController::new(StubGenerator::with_count(3));
        controller.edit_prompt("city rain").await;
        controller.set_aspect_ratio(AspectRatio::Tall).await;

        assert_eq!(controller.submit().await, Status::Succeeded);
        let session = controller.snapshot().await;
        assert_eq!(
            payloads(&session),
            vec!["city rain-0", "city rain-1", "city rain-2"]
        );
        assert_eq!(session.last_submitted_prompt(), "city rain");
        assert_eq!(
            controller.generator().seen.lock().unwrap()[0],
            ("city rain".to_string(), AspectRatio::Tall)
        );
    }

    #[tokio::test]
    async fn test_zero_images_leave_session_failed() {
        let controller = SessionController::new(StubGenerator::with_count(0));
        let status = controller.start_generation("empty", AspectRatio::Square).await;

        assert_eq!(status, Status::Failed);
        let session = controller.snapshot().await;
        assert_eq!(session.error_message(), Some(GENERATION_FAILED_MESSAGE));
        assert!(session.images().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_resubmittable() {
        let controller = SessionController::new(StubGenerator::with_count(2));
        assert_eq!(
            controller.start_generation("fail now", AspectRatio::Square).await,
            Status::Failed
        );
        assert_eq!(
            controller.start_generation("works", AspectRatio::Square).await,
            Status::Succeeded
        );
        assert!(controller.snapshot().await.error_message().is_none());
    }

    #[tokio::test]
    async fn test_latest_request_wins_when_first_settles_last() {
        let controller =
            SessionController::new(StubGenerator::with_count(2).delayed("first", 150));

        let (first, second) = tokio::join!(
            controller.start_generation("first", AspectRatio::Portrait),
            controller.start_generation("second", AspectRatio::Portrait),
        );

        assert_eq!(second, Status::Succeeded);
        assert_eq!(first, Status::Succeeded);
        let session = controller.snapshot().await;
        assert_eq!(payloads(&session), vec!["second-0", "second-1"]);
        assert_eq!(session.last_submitted_prompt(), "second");
        assert_eq!(controller.generator().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_clobber_newer_success() {
        let controller =
            SessionController::new(StubGenerator::with_count(1).delayed("fail slowly", 150));

        tokio::join!(
            controller.start_generation("fail slowly", AspectRatio::Portrait),
            controller.start_generation("fresh", AspectRatio::Portrait),
        );

        let session = controller.snapshot().await;
        assert_eq!(session.status(), Status::Succeeded);
        assert!(session.error_message().is_none());
        assert_eq!(payloads(&session), vec!["fresh-0"]);
    }

    #[tokio::test]
    async fn test_select_then_close_keeps_results() {
        let controller = SessionController::new(StubGenerator::with_count(2));
        controller.start_generation("glacier", AspectRatio::Portrait).await;

        assert!(controller.select_image(7).await.is_none());
        let selected = controller.select_image(1).await.unwrap();
        assert_eq!(selected.image_data, "glacier-1");

        controller.close_selection().await;
        let session = controller.snapshot().await;
        assert!(session.selected_image().is_none());
        assert_eq!(payloads(&session), vec!["glacier-0", "glacier-1"]);
        assert_eq!(session.status(), Status::Succeeded);
    }

    struct HelloGenerator;

    #[async_trait]
    impl WallpaperGenerator for HelloGenerator {
        async fn generate(&self, _: &str, _: AspectRatio) -> Result<Vec<GeneratedImage>> {
            Ok(vec![GeneratedImage::new("image/png", "aGVsbG8=")])
        }
    }

    #[tokio::test]
    async fn test_download_requires_selection_and_names_by_prompt() {
        let controller = SessionController::new(HelloGenerator);
        let dir = tempfile::tempdir().unwrap();
        controller
            .start_generation("Bioluminescent forest at night", AspectRatio::Portrait)
            .await;

        assert!(matches!(
            controller.download(dir.path()).await,
            Err(WallpaperError::DownloadError(_))
        ));

        controller.select_image(0).await;
        let path = controller.download(dir.path()).await.unwrap();
        assert_eq!(
            path.file_name().unwrap(),
            "Bioluminescent_fores_wallpaper.png"
        );
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_remix_reuses_last_prompt() {
        let controller = SessionController::new(StubGenerator::with_count(1));
        assert_eq!(controller.remix().await, Status::Idle);
        assert_eq!(controller.generator().calls.load(Ordering::SeqCst), 0);

        controller.start_generation("tidal pools", AspectRatio::Portrait).await;
        controller.select_image(0).await;
        controller.edit_prompt("unsent draft").await;
        controller.set_aspect_ratio(AspectRatio::Wide).await;

        assert_eq!(controller.remix().await, Status::Succeeded);
        let seen = controller.generator().seen.lock().unwrap().clone();
        assert_eq!(seen[1], ("tidal pools".to_string(), AspectRatio::Wide));
        assert!(controller.snapshot().await.selected_image().is_none());
    }
}
