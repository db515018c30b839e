/*!
Source d'état scriptée pour tester le poller sans master

Chaque `fetch()` consomme la prochaine réponse du script. Une fois le script
épuisé, la réponse de repli (si définie) est servie indéfiniment.
*/

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use webui_core::{FetchError, StateSource};

#[derive(Debug, Clone)]
enum Scripted {
    Payload(String),
    Failure(String),
}

impl Scripted {
    fn to_result(&self) -> Result<String, FetchError> {
        match self {
            Scripted::Payload(raw) => Ok(raw.clone()),
            Scripted::Failure(msg) => Err(FetchError::Unavailable(msg.clone())),
        }
    }
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Scripted>,
    fallback: Option<Scripted>,
    fetches: Vec<Instant>,
}

#[derive(Clone, Default)]
pub struct MockStateSource {
    script: Arc<Mutex<Script>>,
}

impl MockStateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one successful response.
    pub fn respond<S: Into<String>>(&self, raw: S) -> &Self {
        self.script.lock().unwrap().queue.push_back(Scripted::Payload(raw.into()));
        self
    }

    /// Queues one transport failure.
    pub fn fail<S: Into<String>>(&self, msg: S) -> &Self {
        self.script.lock().unwrap().queue.push_back(Scripted::Failure(msg.into()));
        self
    }

    /// Queues `count` transport failures.
    pub fn fail_times(&self, count: usize) -> &Self {
        for i in 0..count {
            self.fail(format!("scripted failure #{}", i + 1));
        }
        self
    }

    /// Response served once the queue is empty.
    pub fn always<S: Into<String>>(&self, raw: S) -> &Self {
        self.script.lock().unwrap().fallback = Some(Scripted::Payload(raw.into()));
        self
    }

    /// Failure served once the queue is empty.
    pub fn always_fail<S: Into<String>>(&self, msg: S) -> &Self {
        self.script.lock().unwrap().fallback = Some(Scripted::Failure(msg.into()));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.script.lock().unwrap().fetches.len()
    }

    /// Instants (tokio clock) at which `fetch()` was called.
    pub fn fetch_times(&self) -> Vec<Instant> {
        self.script.lock().unwrap().fetches.clone()
    }

    /// Gaps between consecutive fetches, in milliseconds.
    pub fn fetch_gaps_ms(&self) -> Vec<u64> {
        self.fetch_times()
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_millis() as u64)
            .collect()
    }
}

impl StateSource for MockStateSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let next = {
            let mut script = self.script.lock().unwrap();
            script.fetches.push(Instant::now());
            script.queue.pop_front().or_else(|| script.fallback.clone())
        };
        match next {
            Some(scripted) => {
                log::debug!("[MOCK] serving {:?}", scripted);
                scripted.to_result()
            }
            None => Err(FetchError::Unavailable("mock script exhausted".into())),
        }
    }

    fn describe(&self) -> String {
        "mock://state.json".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let source = MockStateSource::new();
        source.respond("a").fail("down").always("b");

        assert_eq!(source.fetch().await.unwrap(), "a");
        assert!(matches!(source.fetch().await, Err(FetchError::Unavailable(_))));
        assert_eq!(source.fetch().await.unwrap(), "b");
        assert_eq!(source.fetch().await.unwrap(), "b");
        assert_eq!(source.fetch_count(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let source = MockStateSource::new();
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_gaps() {
        let source = MockStateSource::new();
        source.always("x");
        source.fetch().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        source.fetch().await.unwrap();
        assert_eq!(source.fetch_gaps_ms(), vec![1500]);
    }
}
