// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node facade
//!
//! Reads are served from the locally applied state. Writes become commands
//! submitted to the log, which only the leader may do.

use crate::error::NodeError;
use cortex_core::{
    Alert, AzureAlert, Clock, Command, DwellDefaults, Event, ExecutionRecord, IcingaAlert, IdGen,
    Rule, Script, Site247Alert,
};
use cortex_storage::{ReplicatedLog, StoreError};

pub struct Node<L, C, I> {
    log: L,
    clock: C,
    id_gen: I,
    defaults: DwellDefaults,
}

impl<L, C, I> Clone for Node<L, C, I>
where
    L: Clone,
    C: Clone,
    I: Clone,
{
    fn clone(&self) -> Self {
        Self {
            log: self.log.clone(),
            clock: self.clock.clone(),
            id_gen: self.id_gen.clone(),
            defaults: self.defaults,
        }
    }
}

impl<L, C, I> Node<L, C, I>
where
    L: ReplicatedLog,
    C: Clock,
    I: IdGen,
{
    pub fn new(log: L, clock: C, id_gen: I, defaults: DwellDefaults) -> Self {
        Self {
            log,
            clock,
            id_gen,
            defaults,
        }
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn is_leader(&self) -> bool {
        self.log.is_leader()
    }

    fn ensure_leader(&self) -> Result<(), NodeError> {
        if self.log.is_leader() {
            Ok(())
        } else {
            Err(NodeError::NotLeader)
        }
    }

    /// Resolve defaults and patterns so the replicated rule is complete
    fn prepare_rule(&self, rule: &mut Rule) -> Result<(), NodeError> {
        rule.apply_defaults(&self.defaults);
        rule.validate()?;
        Ok(())
    }

    /// Create a rule, generating an ID if none was given. Returns the
    /// rule as stored.
    pub async fn add_rule(&self, mut rule: Rule) -> Result<Rule, NodeError> {
        self.ensure_leader()?;
        if rule.id.is_empty() {
            rule.id = self.id_gen.next();
        }
        self.prepare_rule(&mut rule)?;
        self.log
            .submit(Command::AddRule { rule: rule.clone() })
            .await?;
        tracing::info!(rule_id = %rule.id, patterns = ?rule.event_type_patterns, "added rule");
        Ok(rule)
    }

    pub async fn update_rule(&self, mut rule: Rule) -> Result<Rule, NodeError> {
        self.ensure_leader()?;
        if rule.id.is_empty() {
            return Err(NodeError::InvalidRequest("rule id is required".to_string()));
        }
        self.prepare_rule(&mut rule)?;
        self.log
            .submit(Command::UpdateRule { rule: rule.clone() })
            .await?;
        tracing::info!(rule_id = %rule.id, "updated rule");
        Ok(rule)
    }

    pub async fn remove_rule(&self, rule_id: &str) -> Result<(), NodeError> {
        self.log
            .submit(Command::RemoveRule {
                rule_id: rule_id.to_string(),
            })
            .await?;
        tracing::info!(rule_id, "removed rule");
        Ok(())
    }

    pub fn get_rule(&self, rule_id: &str) -> Option<Rule> {
        self.log.store().rules.get(rule_id)
    }

    pub fn get_rules(&self) -> Vec<Rule> {
        self.log.store().rules.list()
    }

    /// Stash an event into the bucket of every rule it matches. Returns the
    /// number of rules that took the event; an event matching nothing is
    /// dropped. The leader's clock stamps the event once so every replica
    /// computes the same dwell window.
    pub async fn stash(&self, event: Event) -> Result<usize, NodeError> {
        self.ensure_leader()?;
        let matching: Vec<String> = self
            .log
            .store()
            .rules
            .list()
            .into_iter()
            .filter(|rule| rule.has_matching(&event.event_type))
            .map(|rule| rule.id)
            .collect();

        if matching.is_empty() {
            tracing::debug!(event_type = %event.event_type, "no matching rule");
            return Ok(0);
        }
        let at = self.clock.now();
        let mut stashed = 0;
        for rule_id in &matching {
            let result = self
                .log
                .submit(Command::Stash {
                    rule_id: rule_id.clone(),
                    event: event.clone(),
                    at,
                })
                .await;
            match result.map_err(NodeError::from) {
                Ok(_) => stashed += 1,
                // Removed since the match; same as not matching
                Err(NodeError::Store(StoreError::NotFound { kind: "rule", .. })) => {
                    tracing::debug!(rule_id, "rule removed before stash");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(
            event_type = %event.event_type,
            rules = stashed,
            "stashed event"
        );
        Ok(stashed)
    }

    /// Convert a monitoring alert into an event and stash it
    pub async fn stash_alert(&self, alert: Alert) -> Result<usize, NodeError> {
        let event = alert.into_event(self.id_gen.next(), self.clock.now());
        self.stash(event).await
    }

    pub async fn stash_icinga(&self, alert: IcingaAlert) -> Result<usize, NodeError> {
        self.stash_alert(Alert::Icinga(alert)).await
    }

    pub async fn stash_site247(&self, alert: Site247Alert) -> Result<usize, NodeError> {
        self.stash_alert(Alert::Site247(alert)).await
    }

    pub async fn stash_azure(&self, alert: AzureAlert) -> Result<usize, NodeError> {
        self.stash_alert(Alert::Azure(alert)).await
    }

    pub async fn add_script(&self, script: Script) -> Result<(), NodeError> {
        if script.id.is_empty() {
            return Err(NodeError::InvalidRequest("script id is required".to_string()));
        }
        let script_id = script.id.clone();
        self.log.submit(Command::AddScript { script }).await?;
        tracing::info!(script_id, "added script");
        Ok(())
    }

    pub async fn update_script(&self, script: Script) -> Result<(), NodeError> {
        let script_id = script.id.clone();
        self.log.submit(Command::UpdateScript { script }).await?;
        tracing::info!(script_id, "updated script");
        Ok(())
    }

    pub async fn remove_script(&self, script_id: &str) -> Result<(), NodeError> {
        self.log
            .submit(Command::RemoveScript {
                script_id: script_id.to_string(),
            })
            .await?;
        tracing::info!(script_id, "removed script");
        Ok(())
    }

    pub fn get_script(&self, script_id: &str) -> Option<Script> {
        self.log.store().scripts.get(script_id)
    }

    /// IDs of all scripts, sorted
    pub fn get_scripts(&self) -> Vec<String> {
        self.log.store().scripts.keys()
    }

    /// Execution history for a rule, oldest first
    pub fn get_rule_executions(&self, rule_id: &str) -> Vec<ExecutionRecord> {
        self.log.store().records.for_rule(rule_id)
    }

    pub fn get_record_count(&self, rule_id: &str) -> usize {
        self.log.store().records.count_for_rule(rule_id)
    }

    pub fn get_total_record_count(&self) -> usize {
        self.log.store().records.len()
    }

    pub async fn remove_record(&self, record_id: &str) -> Result<(), NodeError> {
        self.log
            .submit(Command::RemoveRecord {
                record_id: record_id.to_string(),
            })
            .await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<(), NodeError> {
        self.log.snapshot().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
