//! Background network jobs
//!
//! The app never awaits the network while handling a key. It queues
//! `Request`s; the worker runs each on a tokio task and sends the `Response`
//! back over a channel that the event loop drains between frames. Every
//! request carries the app's session generation so answers to requests made
//! before a login or logout can be recognised and dropped.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::data::client::LOGOUT_PATH;
use crate::data::{Attachment, Feed, SiteClient, SiteError};
use crate::region::{LoadTicket, RegionId};

/// Why a page is being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    /// Filling regions after startup, login or logout
    Initial,
    /// The user asked for more content
    User,
}

/// The button a toggle request belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleTarget {
    Upvote {
        region: RegionId,
        page: usize,
        post: usize,
    },
    Save {
        region: RegionId,
        page: usize,
        post: usize,
    },
    Follow {
        username: String,
    },
}

/// Which form was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Login { username: String },
    Signin { username: String },
    Thread { region: RegionId },
    Reply,
}

/// Work the app wants done over the network
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    LoadPage {
        region: RegionId,
        ticket: LoadTicket,
        link: String,
        reason: LoadReason,
    },
    Toggle {
        target: ToggleTarget,
        link: String,
    },
    SubmitForm {
        kind: FormKind,
        link: String,
        fields: Vec<(String, String)>,
        attachment: Option<Attachment>,
    },
    Logout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub generation: u64,
    pub job: Job,
}

/// Result of a job
#[derive(Debug)]
pub enum Outcome {
    PageLoaded {
        region: RegionId,
        ticket: LoadTicket,
        reason: LoadReason,
        result: Result<Feed, SiteError>,
    },
    Toggled {
        target: ToggleTarget,
        result: Result<(), SiteError>,
    },
    FormSubmitted {
        kind: FormKind,
        result: Result<String, SiteError>,
    },
    LoggedOut(Result<(), SiteError>),
}

#[derive(Debug)]
pub struct Response {
    pub generation: u64,
    pub outcome: Outcome,
}

/// Runs one job to completion
pub async fn execute(client: &SiteClient, request: Request) -> Response {
    let Request { generation, job } = request;
    let outcome = match job {
        Job::LoadPage {
            region,
            ticket,
            link,
            reason,
        } => Outcome::PageLoaded {
            region,
            ticket,
            reason,
            result: client.recycle(&link).await,
        },
        Job::Toggle { target, link } => {
            debug!(?target, %link, "posting toggle");
            Outcome::Toggled {
                target,
                result: client.post(&link).await.map(|_| ()),
            }
        }
        Job::SubmitForm {
            kind,
            link,
            fields,
            attachment,
        } => {
            debug!(?kind, %link, "submitting form");
            Outcome::FormSubmitted {
                kind,
                result: client
                    .submit_form(&link, &fields, attachment.as_ref())
                    .await,
            }
        }
        Job::Logout => Outcome::LoggedOut(client.get(LOGOUT_PATH).await.map(|_| ())),
    };
    Response {
        generation,
        outcome,
    }
}

/// Handle owning the client and the response channel
pub struct WorkerHandle {
    client: SiteClient,
    sender: mpsc::Sender<Response>,
    /// Channel for receiving finished jobs
    pub receiver: mpsc::Receiver<Response>,
}

impl WorkerHandle {
    pub fn new(client: SiteClient) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self {
            client,
            sender,
            receiver,
        }
    }

    /// Runs `request` on a background task
    pub fn spawn(&self, request: Request) {
        let client = self.client.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let response = execute(&client, request).await;
            if sender.send(response).await.is_err() {
                info!("app went away before a job finished");
            }
        });
    }

    /// Runs every request concurrently and waits for all of them
    pub async fn execute_all(&self, requests: Vec<Request>) -> Vec<Response> {
        let futures = requests
            .into_iter()
            .map(|request| execute(&self.client, request));
        futures::future::join_all(futures).await
    }

    /// Returns a finished job without blocking
    pub fn try_recv(&mut self) -> Option<Response> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::region::Region;

    fn worker() -> WorkerHandle {
        // Nothing listens on port 9; requests fail fast
        WorkerHandle::new(SiteClient::new("http://127.0.0.1:9").expect("client should build"))
    }

    #[tokio::test]
    async fn test_try_recv_is_empty_without_jobs() {
        let mut worker = worker();
        assert!(worker.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_execute_all_returns_one_response_per_request() {
        let worker = worker();
        let mut region = Region::new(
            RegionId(0),
            &RegionConfig::new("Explore", "/explore/recycle"),
        );
        let ticket = region.begin_load().unwrap();

        let responses = worker
            .execute_all(vec![
                Request {
                    generation: 3,
                    job: Job::LoadPage {
                        region: RegionId(0),
                        ticket,
                        link: "/explore/recycle".to_string(),
                        reason: LoadReason::Initial,
                    },
                },
                Request {
                    generation: 3,
                    job: Job::Logout,
                },
            ])
            .await;

        assert_eq!(responses.len(), 2);
        assert!(responses.iter().all(|r| r.generation == 3));
        match &responses[0].outcome {
            Outcome::PageLoaded {
                ticket: got,
                result,
                ..
            } => {
                assert_eq!(*got, ticket);
                assert!(matches!(result, Err(SiteError::HttpError(_))));
            }
            other => panic!("Expected PageLoaded, got {:?}", other),
        }
        assert!(matches!(responses[1].outcome, Outcome::LoggedOut(Err(_))));
    }

    #[tokio::test]
    async fn test_spawned_job_reports_back() {
        let mut worker = worker();
        worker.spawn(Request {
            generation: 1,
            job: Job::Toggle {
                target: ToggleTarget::Follow {
                    username: "bep".to_string(),
                },
                link: "/follow?username=bep".to_string(),
            },
        });

        let response = worker.receiver.recv().await.expect("response arrives");
        assert_eq!(response.generation, 1);
        assert!(matches!(
            response.outcome,
            Outcome::Toggled { result: Err(_), .. }
        ));
    }
}
