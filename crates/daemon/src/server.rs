// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use std::time::Instant;

use cortex_core::{Clock, IdGen};
use cortex_engine::Node;
use cortex_storage::ReplicatedLog;
use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

/// Serves socket requests against a node
pub struct Server<L, C, I> {
    node: Node<L, C, I>,
    node_id: String,
    start_time: Instant,
    /// Set once a `Shutdown` request has been answered
    pub shutdown_requested: bool,
}

impl<L, C, I> Server<L, C, I>
where
    L: ReplicatedLog,
    C: Clock,
    I: IdGen,
{
    pub fn new(node: Node<L, C, I>, node_id: impl Into<String>) -> Self {
        Self {
            node,
            node_id: node_id.into(),
            start_time: Instant::now(),
            shutdown_requested: false,
        }
    }

    pub fn node(&self) -> &Node<L, C, I> {
        &self.node
    }

    /// Handle a single client connection
    pub async fn handle_connection(&mut self, stream: UnixStream) -> Result<(), ServerError> {
        let (mut reader, mut writer) = stream.into_split();

        let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
            Ok(req) => req,
            Err(protocol::ProtocolError::Timeout) => {
                error!("Request read timeout");
                return Err(ServerError::Timeout);
            }
            Err(protocol::ProtocolError::ConnectionClosed) => {
                debug!("Client disconnected before sending request");
                return Ok(());
            }
            Err(e) => {
                error!("Failed to read request: {}", e);
                let _ = protocol::write_response(&mut writer, &Response::error(&e), DEFAULT_TIMEOUT)
                    .await;
                return Err(ServerError::Protocol(e));
            }
        };

        debug!(?request, "received request");
        let response = self.handle_request(request).await;
        debug!(?response, "sending response");

        protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
            .await
            .map_err(ServerError::Protocol)?;

        Ok(())
    }

    /// Handle a single request and return a response
    pub async fn handle_request(&mut self, request: Request) -> Response {
        let node = &self.node;
        match request {
            Request::Ping => Response::Pong,

            Request::Hello { version: _ } => Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            },

            Request::Status => {
                let store = node.log().store();
                Response::Status {
                    node_id: self.node_id.clone(),
                    leader: node.is_leader(),
                    uptime_secs: self.start_time.elapsed().as_secs(),
                    rules: store.rules.len(),
                    buckets: store.buckets.len(),
                    scripts: store.scripts.len(),
                    records: store.records.len(),
                }
            }

            Request::AddRule { rule } => match node.add_rule(rule).await {
                Ok(rule) => Response::Rule {
                    rule: Some(Box::new(rule)),
                },
                Err(e) => Response::error(e),
            },

            Request::UpdateRule { rule } => match node.update_rule(rule).await {
                Ok(rule) => Response::Rule {
                    rule: Some(Box::new(rule)),
                },
                Err(e) => Response::error(e),
            },

            Request::RemoveRule { rule_id } => ok_or_error(node.remove_rule(&rule_id).await),

            Request::GetRule { rule_id } => Response::Rule {
                rule: node.get_rule(&rule_id).map(Box::new),
            },

            Request::ListRules => Response::Rules {
                rules: node.get_rules(),
            },

            Request::Stash { event } => match node.stash(event).await {
                Ok(matched) => Response::Stashed { matched },
                Err(e) => Response::error(e),
            },

            Request::StashAlert { alert } => match node.stash_alert(alert).await {
                Ok(matched) => Response::Stashed { matched },
                Err(e) => Response::error(e),
            },

            Request::AddScript { script } => ok_or_error(node.add_script(script).await),

            Request::UpdateScript { script } => ok_or_error(node.update_script(script).await),

            Request::RemoveScript { script_id } => {
                ok_or_error(node.remove_script(&script_id).await)
            }

            Request::GetScript { script_id } => Response::Script {
                script: node.get_script(&script_id),
            },

            Request::ListScripts => Response::Scripts {
                script_ids: node.get_scripts(),
            },

            Request::GetExecutions { rule_id } => Response::Executions {
                records: node.get_rule_executions(&rule_id),
            },

            Request::RemoveRecord { record_id } => {
                ok_or_error(node.remove_record(&record_id).await)
            }

            Request::Snapshot => ok_or_error(node.snapshot().await),

            Request::Shutdown => {
                self.shutdown_requested = true;
                Response::ShuttingDown
            }
        }
    }
}

fn ok_or_error<E: std::fmt::Display>(result: Result<(), E>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(e) => Response::error(e),
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
