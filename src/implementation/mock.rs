//! In-memory normalizers for testing the driver without child processes.

use std::collections::HashMap;

use crate::bench::config::ImplementationSpec;
use crate::{BenchError, BenchResult};

use super::traits::{Launcher, Normalizer, TerminationStatus};

/// How a mock normalizer answers a request.
#[derive(Debug, Clone, Default)]
pub enum MockReply {
    /// Reply with the request unchanged
    #[default]
    Echo,
    /// Reply with the same text for every request
    Fixed(String),
    /// Look the request up, echoing unknown formulas
    Table(HashMap<String, String>),
}

/// Configuration for mock normalizer responses.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Reply policy
    pub reply: MockReply,
    /// Close the channel after answering this many requests
    pub dies_after: Option<usize>,
    /// Status reported once the channel is closed
    pub exit_status: Option<TerminationStatus>,
    /// Fail `query` with an I/O error instead of replying
    pub query_fails: bool,
}

impl MockConfig {
    /// A normalizer that echoes every request.
    pub fn echo() -> Self {
        MockConfig::default()
    }

    /// Reply with fixed text.
    pub fn with_fixed_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = MockReply::Fixed(reply.into());
        self
    }

    /// Reply from a lookup table.
    pub fn with_replies<I, K, V>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.reply = MockReply::Table(
            replies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Close the channel after `n` replies, reporting `status`.
    pub fn dies_after(mut self, n: usize, status: TerminationStatus) -> Self {
        self.dies_after = Some(n);
        self.exit_status = Some(status);
        self
    }

    /// Make query fail.
    pub fn query_fails(mut self) -> Self {
        self.query_fails = true;
        self
    }
}

/// Normalizer answering from its [`MockConfig`].
pub struct MockNormalizer {
    name: String,
    config: MockConfig,
    answered: usize,
    shut_down: bool,
}

impl MockNormalizer {
    pub fn new(name: impl Into<String>, config: MockConfig) -> Self {
        MockNormalizer {
            name: name.into(),
            config,
            answered: 0,
            shut_down: false,
        }
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Normalizer for MockNormalizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&mut self, formula: &str) -> BenchResult<Option<String>> {
        if self.config.query_fails {
            return Err(BenchError::Message("mock query failed".into()));
        }
        if self.shut_down || self.config.dies_after.is_some_and(|n| self.answered >= n) {
            return Ok(None);
        }
        self.answered += 1;
        let reply = match &self.config.reply {
            MockReply::Echo => formula.to_string(),
            MockReply::Fixed(text) => text.clone(),
            MockReply::Table(table) => table
                .get(formula)
                .cloned()
                .unwrap_or_else(|| formula.to_string()),
        };
        Ok(Some(reply))
    }

    fn termination_status(&mut self) -> TerminationStatus {
        self.config
            .exit_status
            .clone()
            .unwrap_or(TerminationStatus::Running)
    }

    fn shutdown(&mut self) -> BenchResult<()> {
        self.shut_down = true;
        Ok(())
    }
}

/// Launches [`MockNormalizer`]s, one configuration per implementation name.
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    configs: HashMap<String, MockConfig>,
    fallback: Option<MockConfig>,
}

impl MockLauncher {
    pub fn new() -> Self {
        MockLauncher::default()
    }

    /// Configure the normalizer launched for `name`.
    pub fn with(mut self, name: impl Into<String>, config: MockConfig) -> Self {
        self.configs.insert(name.into(), config);
        self
    }

    /// Configuration used for names without their own.
    pub fn with_fallback(mut self, config: MockConfig) -> Self {
        self.fallback = Some(config);
        self
    }
}

impl Launcher for MockLauncher {
    fn launch(&self, spec: &ImplementationSpec) -> BenchResult<Box<dyn Normalizer>> {
        let config = self
            .configs
            .get(&spec.name)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                BenchError::Message(format!("no mock configured for {}", spec.name))
            })?;
        Ok(Box::new(MockNormalizer::new(spec.name.clone(), config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_echo() {
        let mut mock = MockNormalizer::new("echo", MockConfig::echo());
        assert_eq!(mock.query("a U b").unwrap().as_deref(), Some("a U b"));
        assert_eq!(mock.answered(), 1);
    }

    #[test]
    fn test_mock_table_falls_back_to_echo() {
        let config = MockConfig::echo().with_replies([("a W b", "G a | a U b")]);
        let mut mock = MockNormalizer::new("table", config);
        assert_eq!(mock.query("a W b").unwrap().as_deref(), Some("G a | a U b"));
        assert_eq!(mock.query("Fc").unwrap().as_deref(), Some("Fc"));
    }

    #[test]
    fn test_mock_dies_after() {
        let config = MockConfig::echo().dies_after(1, TerminationStatus::Exited(2));
        let mut mock = MockNormalizer::new("dying", config);
        assert!(mock.query("a").unwrap().is_some());
        assert!(mock.query("b").unwrap().is_none());
        assert_eq!(mock.termination_status(), TerminationStatus::Exited(2));
    }

    #[test]
    fn test_mock_shutdown_closes_channel() {
        let mut mock = MockNormalizer::new("echo", MockConfig::echo());
        mock.shutdown().unwrap();
        assert!(mock.is_shut_down());
        assert!(mock.query("a").unwrap().is_none());
    }

    #[test]
    fn test_launcher_requires_config() {
        let launcher = MockLauncher::new().with("known", MockConfig::echo());
        let known = ImplementationSpec {
            name: "known".into(),
            command: vec![],
        };
        let unknown = ImplementationSpec {
            name: "unknown".into(),
            command: vec![],
        };
        assert!(launcher.launch(&known).is_ok());
        assert!(launcher.launch(&unknown).is_err());
    }
}
