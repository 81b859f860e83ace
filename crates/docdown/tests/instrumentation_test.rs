use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing::span::{Attributes, Id};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

use docdown::{ConversionConfig, convert};

/// Collects span names and their recorded field names.
struct SpanCollector {
    spans: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for SpanCollector {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let fields = attrs.metadata().fields().iter().map(|f| f.name().to_string()).collect();
        self.spans
            .lock()
            .unwrap()
            .push((attrs.metadata().name().to_string(), fields));
    }
}

#[tokio::test]
async fn test_convert_opens_a_span() {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let collector = SpanCollector { spans: spans.clone() };

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    convert("notes.md", b"hello", &ConversionConfig::default()).await.unwrap();

    let spans = spans.lock().unwrap();
    let (_, fields) = spans
        .iter()
        .find(|(name, _)| name == "convert")
        .expect("Expected a 'convert' span");
    assert!(fields.contains(&"filename".to_string()));
    assert!(fields.contains(&"size".to_string()));
}
