use std::fmt;
use std::fs;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use serde_json::json;
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

use scix_docs_core::config::EngineConfig;
use scix_docs_text::{DocSearch, SearchOptions};

/// Records the message of every event it sees.
#[derive(Clone, Default)]
struct MessageLog(Arc<Mutex<Vec<String>>>);

impl MessageLog {
    fn count(&self, message: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|m| m.as_str() == message).count()
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for MessageLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.0.lock().unwrap().push(message);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_calls_build_the_index_once() {
    let log = MessageLog::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(log.clone()));

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docs_chunks.json");
    let records = json!([
        {"id": "a", "category": "faq", "doc_type": "faq", "title": "Author Search", "content": "Search by author name."},
        {"id": "b", "category": "faq", "doc_type": "faq", "title": "Libraries", "content": "Collect papers in libraries."}
    ]);
    fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

    let search = DocSearch::new(path, EngineConfig::default());
    let options = SearchOptions::default();
    let searches = (0..8).map(|_| search.search_docs("author", Some(10.0), &options));
    let results = join_all(searches).await;
    assert!(results.iter().all(|r| r.as_ref().is_ok_and(|hits| !hits.is_empty())));
    assert!(search.get_stats().await.is_ok());
    assert!(search.get_doc_by_id("b").await.unwrap().is_some());

    assert_eq!(log.count("Loaded docs corpus"), 1);
    assert_eq!(log.count("Built docs index"), 1);
}
