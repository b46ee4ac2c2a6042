//! Shared test utilities used across graphlets crates.

pub mod tracing {
    //! A layer that captures spans and events so tests can assert on the
    //! instrumentation of the pipelines.
    use std::{
        collections::HashMap,
        fmt,
        sync::{Arc, Mutex, MutexGuard},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

    /// Structured fields keyed by name, values rendered as text.
    pub type Fields = HashMap<String, String>;

    #[derive(Default)]
    struct Recording {
        spans: Vec<SpanRecord>,
        events: Vec<EventRecord>,
    }

    /// Layer that records closed spans and every event.
    ///
    /// Clones share one recording, so a test keeps a clone and installs the
    /// other on the subscriber.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        recording: Arc<Mutex<Recording>>,
    }

    impl RecordingLayer {
        fn lock(&self) -> MutexGuard<'_, Recording> {
            self.recording
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }

        /// Closed spans in completion order.
        ///
        /// # Examples
        /// ```
        /// use graphlets_test_support::tracing::RecordingLayer;
        ///
        /// let layer = RecordingLayer::default();
        /// assert!(layer.spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.lock().spans.clone()
        }

        /// First closed span called `name`.
        #[must_use]
        pub fn span(&self, name: &str) -> Option<SpanRecord> {
            self.lock().spans.iter().find(|span| span.name == name).cloned()
        }

        /// Events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.lock().events.clone()
        }

        /// Events whose message equals `message`.
        #[must_use]
        pub fn events_with_message(&self, message: &str) -> Vec<EventRecord> {
            self.lock()
                .events
                .iter()
                .filter(|event| event.message() == Some(message))
                .cloned()
                .collect()
        }
    }

    /// A closed span with the fields recorded while it was open.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the metadata.
        pub name: String,
        /// Fields recorded at creation or later.
        pub fields: Fields,
    }

    /// An emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Event fields, the message included.
        pub fields: Fields,
    }

    impl EventRecord {
        /// The event's message, if any.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.fields.get("message").map(String::as_str)
        }
    }

    struct OpenSpan {
        name: String,
        fields: Fields,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = Fields::new();
            attrs.record(&mut FieldVisitor(&mut fields));
            span.extensions_mut().insert(OpenSpan {
                name: attrs.metadata().name().to_owned(),
                fields,
            });
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut FieldVisitor(&mut open.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(open) = ctx
                .span(&id)
                .and_then(|span| span.extensions_mut().remove::<OpenSpan>())
            else {
                return;
            };
            self.lock().spans.push(SpanRecord {
                name: open.name,
                fields: open.fields,
            });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::new();
            event.record(&mut FieldVisitor(&mut fields));
            let metadata = event.metadata();
            self.lock().events.push(EventRecord {
                level: *metadata.level(),
                target: metadata.target().to_owned(),
                fields,
            });
        }
    }

    struct FieldVisitor<'a>(&'a mut Fields);

    impl FieldVisitor<'_> {
        fn insert(&mut self, field: &Field, value: String) {
            self.0.insert(field.name().to_owned(), value);
        }
    }

    macro_rules! record_display {
        ($($method:ident: $ty:ty),+ $(,)?) => {
            $(
                fn $method(&mut self, field: &Field, value: $ty) {
                    self.insert(field, value.to_string());
                }
            )+
        };
    }

    impl Visit for FieldVisitor<'_> {
        record_display! {
            record_bool: bool,
            record_i64: i64,
            record_u64: u64,
            record_i128: i128,
            record_u128: u128,
            record_f64: f64,
            record_str: &str,
            record_error: &(dyn std::error::Error + 'static),
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.insert(field, format!("{value:?}"));
        }
    }
}

pub mod fixtures {
    //! Small host graphs and edge-list files with known graphlet counts.
    use std::{
        fmt::Write as _,
        fs,
        io,
        path::{Path, PathBuf},
    };

    use tempfile::TempDir;

    /// Edges of the cycle on `n` vertices.
    #[must_use]
    pub fn cycle_edges(n: usize) -> Vec<(usize, usize)> {
        (0..n).map(|vertex| (vertex, (vertex + 1) % n)).collect()
    }

    /// Edges of the complete graph on `n` vertices.
    #[must_use]
    pub fn clique_edges(n: usize) -> Vec<(usize, usize)> {
        (0..n)
            .flat_map(|left| (left + 1..n).map(move |right| (left, right)))
            .collect()
    }

    /// Edges of the Petersen graph: 10 vertices, 15 edges, girth 5.
    #[must_use]
    pub fn petersen_edges() -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(15);
        for vertex in 0..5 {
            edges.push((vertex, (vertex + 1) % 5));
            edges.push((vertex, vertex + 5));
            edges.push((vertex + 5, (vertex + 2) % 5 + 5));
        }
        edges
    }

    /// Renders `edges` in the whitespace-separated edge-list format, with a
    /// leading comment line.
    #[must_use]
    pub fn render_edge_list(edges: &[(usize, usize)]) -> String {
        let mut text = String::from("# source target\n");
        for (source, target) in edges {
            let _ = writeln!(text, "{source} {target}");
        }
        text
    }

    /// A temporary directory holding one edge-list file.
    #[derive(Debug)]
    pub struct EdgeListFile {
        dir: TempDir,
        path: PathBuf,
    }

    impl EdgeListFile {
        /// Writes `edges` to `graph.txt` in a fresh temporary directory.
        ///
        /// # Errors
        /// Returns any error raised while creating the directory or file.
        pub fn write(edges: &[(usize, usize)]) -> io::Result<Self> {
            Self::write_text(&render_edge_list(edges))
        }

        /// Writes `text` verbatim to `graph.txt` in a fresh temporary
        /// directory.
        ///
        /// # Errors
        /// Returns any error raised while creating the directory or file.
        pub fn write_text(text: &str) -> io::Result<Self> {
            let dir = TempDir::new()?;
            let path = dir.path().join("graph.txt");
            fs::write(&path, text)?;
            Ok(Self { dir, path })
        }

        /// Path of the edge-list file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Directory holding the file, for sibling outputs.
        #[must_use]
        pub fn dir(&self) -> &Path {
            self.dir.path()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use rstest::rstest;

        #[rstest]
        #[case(3, 3)]
        #[case(10, 10)]
        fn cycles_have_one_edge_per_vertex(#[case] n: usize, #[case] edges: usize) {
            assert_eq!(cycle_edges(n).len(), edges);
        }

        #[test]
        fn petersen_is_cubic() {
            let mut degree = [0_usize; 10];
            for (left, right) in petersen_edges() {
                degree[left] += 1;
                degree[right] += 1;
            }
            assert!(degree.iter().all(|&d| d == 3));
        }

        #[test]
        fn files_round_trip_through_disk() {
            let file = EdgeListFile::write(&clique_edges(4)).expect("file written");
            let text = fs::read_to_string(file.path()).expect("file readable");
            assert_eq!(text.lines().count(), 7);
            assert!(file.path().starts_with(file.dir()));
        }
    }
}
