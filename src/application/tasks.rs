//! Background jobs for calls to the extraction service.
//!
//! Each job runs on its own thread with a clone of the HTTP client and sends
//! exactly one [`TaskResult`] back. The event loop drains results between
//! frames, so the interface keeps redrawing while a request is in flight.

use crate::domain::EditorResult;
use crate::infrastructure::{MappingSuggestion, PdfApiClient, ProcessOutcome, ServiceConfig};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

#[derive(Debug)]
pub enum TaskResult {
    Health(bool),
    ServiceConfig(EditorResult<ServiceConfig>),
    Processed {
        file_name: String,
        result: EditorResult<ProcessOutcome>,
    },
    /// Carries the text the suggestion was requested for.
    Suggestion {
        text: String,
        result: EditorResult<MappingSuggestion>,
    },
}

#[derive(Debug)]
pub struct TaskRunner {
    client: PdfApiClient,
    sender: Sender<TaskResult>,
    receiver: Receiver<TaskResult>,
}

impl TaskRunner {
    pub fn new(client: PdfApiClient) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            client,
            sender,
            receiver,
        }
    }

    pub fn client(&self) -> &PdfApiClient {
        &self.client
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&PdfApiClient) -> TaskResult + Send + 'static,
    {
        let client = self.client.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            // The receiver only disappears when the app is shutting down.
            let _ = sender.send(job(&client));
        });
    }

    /// Checks health, then fetches upload limits if the service is up.
    pub fn check_service(&self) {
        let sender = self.sender.clone();
        self.spawn(move |client| {
            let healthy = client.health_check();
            if healthy {
                let _ = sender.send(TaskResult::ServiceConfig(client.service_config()));
            }
            TaskResult::Health(healthy)
        });
    }

    pub fn process_pdf(&self, path: PathBuf) {
        self.spawn(move |client| {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let result = client.process_pdf(&path);
            TaskResult::Processed { file_name, result }
        });
    }

    pub fn suggest_mapping(&self, text: String, columns: Vec<String>) {
        self.spawn(move |client| {
            let result = client.suggest_mapping(&text, &columns);
            TaskResult::Suggestion { text, result }
        });
    }

    /// Returns every result that has arrived, without blocking.
    pub fn drain(&self) -> Vec<TaskResult> {
        self.receiver.try_iter().collect()
    }
}
