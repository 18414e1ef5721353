//! Shared test utilities used across the LDCR crates.

pub mod recording {
    //! A `tracing` layer that keeps closed spans and emitted events so tests
    //! can assert on instrumentation.

    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, PoisonError};

    use tracing::field::{Field, Visit};
    use tracing::subscriber::DefaultGuard;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::{Layer, Registry};

    /// Layer recording every closed span and every event.
    ///
    /// Clones share their records, so a test keeps one clone and installs
    /// the other.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Installs a clone of the layer as the thread's default subscriber
        /// until the returned guard drops.
        ///
        /// # Examples
        /// ```
        /// use ldcr_test_support::recording::RecordingLayer;
        ///
        /// let layer = RecordingLayer::default();
        /// let guard = layer.install();
        /// tracing::info!(answer = 42, "recorded");
        /// drop(guard);
        /// assert_eq!(layer.events_with_message("recorded").len(), 1);
        /// ```
        #[must_use]
        pub fn install(&self) -> DefaultGuard {
            tracing::subscriber::set_default(Registry::default().with(self.clone()))
        }

        /// Closed spans in completion order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Closed spans called `name`.
        #[must_use]
        pub fn spans_named(&self, name: &str) -> Vec<SpanRecord> {
            self.spans()
                .into_iter()
                .filter(|span| span.name == name)
                .collect()
        }

        /// Events whose message equals `message`.
        #[must_use]
        pub fn events_with_message(&self, message: &str) -> Vec<EventRecord> {
            self.events()
                .into_iter()
                .filter(|event| event.message() == Some(message))
                .collect()
        }
    }

    /// A closed span with its recorded fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name.
        pub name: String,
        /// Fields recorded at creation or later.
        pub fields: HashMap<String, String>,
    }

    /// An emitted event with its fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Event fields, including `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// The event's message, if it has one.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.fields.get("message").map(String::as_str)
        }
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            id: &tracing::span::Id,
            ctx: Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut record = SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldRecorder(&mut record.fields));
            span.extensions_mut().insert(record);
        }

        fn on_record(
            &self,
            id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            ctx: Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut extensions = span.extensions_mut();
            if let Some(record) = extensions.get_mut::<SpanRecord>() {
                values.record(&mut FieldRecorder(&mut record.fields));
            }
        }

        fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(record) = span.extensions_mut().remove::<SpanRecord>() else {
                return;
            };
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(record);
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldRecorder(&mut fields));
            let metadata = event.metadata();
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(EventRecord {
                    level: *metadata.level(),
                    target: metadata.target().to_owned(),
                    fields,
                });
        }
    }

    /// Stores every field as text; numbers and booleans fall through to
    /// their `Debug` form.
    struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

    impl Visit for FieldRecorder<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_owned(), value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_owned(), format!("{value:?}"));
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use tracing::{info, info_span, warn};

        #[test]
        fn records_spans_with_late_fields() {
            let layer = RecordingLayer::default();
            {
                let _guard = layer.install();
                let span = info_span!("graph.split", time_step = 3_u64, cluster = tracing::field::Empty);
                span.record("cluster", 7_u64);
                drop(span);
            }
            let spans = layer.spans_named("graph.split");
            assert_eq!(spans.len(), 1);
            assert_eq!(spans[0].fields.get("time_step").map(String::as_str), Some("3"));
            assert_eq!(spans[0].fields.get("cluster").map(String::as_str), Some("7"));
        }

        #[test]
        fn records_event_levels_and_messages() {
            let layer = RecordingLayer::default();
            {
                let _guard = layer.install();
                info!(nodes = 4_usize, "graph initialised");
                warn!(reason = "bad", "override ignored");
            }
            let events = layer.events();
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].level, Level::INFO);
            assert_eq!(events[0].message(), Some("graph initialised"));
            assert_eq!(events[1].fields.get("reason").map(String::as_str), Some("bad"));
            assert!(layer.events_with_message("missing").is_empty());
        }
    }
}

pub mod ci;
