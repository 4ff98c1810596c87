//! Tracing subscriber setup for formdesk binaries.
//!
//! Configuration comes from the environment:
//!
//! | Variable        | Values                               | Default               |
//! |-----------------|--------------------------------------|-----------------------|
//! | `LOG_LEVEL`     | any `EnvFilter` directive            | `info`                |
//! | `LOG_OUTPUT`    | `console`, `file`, `both`, `none`    | `console`             |
//! | `LOG_FORMAT`    | `human`, `json`                      | `human`               |
//! | `LOG_FILE_PATH` | path of the daily-rolled log file    | `/tmp/formdesk.log`   |
//! | `LOG_TAGS`      | `key:value,...` span field filter    | empty                 |

use std::{
    collections::HashMap,
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{field::Visit, span, subscriber::Interest, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Directive,
    fmt::MakeWriter,
    layer::{Context, Layer},
    prelude::*,
    registry, EnvFilter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

impl LogOutput {
    fn parse(value: &str) -> Self {
        match value {
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            "none" => LogOutput::None,
            _ => LogOutput::Console,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub output: LogOutput,
    pub json: bool,
    pub file_path: PathBuf,
    pub tags: Vec<Tag>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let output = env::var("LOG_OUTPUT").unwrap_or_else(|_| "console".to_string());
        let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "human".to_string());
        let tags = env::var("LOG_TAGS").unwrap_or_default();
        let file_path =
            env::var("LOG_FILE_PATH").unwrap_or_else(|_| "/tmp/formdesk.log".to_string());

        Self {
            level,
            output: LogOutput::parse(&output),
            json: format == "json",
            file_path: PathBuf::from(file_path),
            tags: parse_tags(&tags),
        }
    }
}

/// A `key:value` requirement on the fields of the enclosing spans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Parse `LOG_TAGS` (`key:value,key2:*`). Malformed entries are ignored.
pub fn parse_tags(raw: &str) -> Vec<Tag> {
    raw.split(',')
        .filter_map(|s| {
            let (key, value) = s.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(Tag {
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

// Writes every line to both sinks
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a>,
    B: MakeWriter<'a>,
{
    type Writer = Tee<A::Writer, B::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Drops events whose span scope lacks any of the configured tags.
struct TagFilterLayer {
    filters: Vec<Tag>,
}

impl TagFilterLayer {
    fn matches(&self, fields: &HashMap<String, String>) -> bool {
        self.filters.iter().all(|filter| {
            fields
                .get(&filter.key)
                .is_some_and(|value| filter.value == "*" || value.contains(&filter.value))
        })
    }
}

impl<S> Layer<S> for TagFilterLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        span.extensions_mut().insert(fields);
    }

    // The decision depends on the span scope at the time of each event.
    fn register_callsite(&self, meta: &'static Metadata<'static>) -> Interest {
        if self.filters.is_empty() || meta.is_span() {
            Interest::always()
        } else {
            Interest::sometimes()
        }
    }

    fn enabled(&self, meta: &Metadata<'_>, ctx: Context<'_, S>) -> bool {
        // Spans always exist so their fields can be matched by the events inside them
        if self.filters.is_empty() || meta.is_span() {
            return true;
        }

        let Some(scope) = ctx.current_span().id().and_then(|id| ctx.span_scope(id)) else {
            return false;
        };

        let mut all_fields = HashMap::new();
        for span_ref in scope {
            if let Some(fields) = span_ref.extensions().get::<HashMap<String, String>>() {
                for (k, v) in fields {
                    all_fields.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }

        self.matches(&all_fields)
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{value:?}"));
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    for directive in ["tokio=warn", "hyper=warn", "sqlx=warn"] {
        if let Ok(directive) = directive.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Install the global subscriber described by the environment.
///
/// The returned guard flushes the file writer when dropped; keep it alive for
/// the lifetime of the process.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(LogConfig::from_env())
}

pub fn init_with(config: LogConfig) -> Option<WorkerGuard> {
    let subscriber = registry()
        .with(env_filter(&config.level))
        .with(TagFilterLayer {
            filters: config.tags.clone(),
        });

    let log_dir = config
        .file_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("/tmp"));
    let log_filename = config
        .file_path
        .file_name()
        .unwrap_or("formdesk.log".as_ref());

    match config.output {
        LogOutput::None => {
            subscriber.init();
            None
        }
        LogOutput::Console => {
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stdout);
            if config.json {
                subscriber.with(fmt_layer.json()).init();
            } else {
                subscriber.with(fmt_layer).init();
            }
            None
        }
        LogOutput::File => {
            let appender = tracing_appender::rolling::daily(log_dir, log_filename);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            if config.json {
                subscriber.with(fmt_layer.json()).init();
            } else {
                subscriber.with(fmt_layer).init();
            }
            Some(guard)
        }
        LogOutput::Both => {
            let appender = tracing_appender::rolling::daily(log_dir, log_filename);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(MakeTee {
                    make_a: io::stdout,
                    make_b: writer,
                });
            if config.json {
                subscriber.with(fmt_layer.json()).init();
            } else {
                subscriber.with(fmt_layer).init();
            }
            Some(guard)
        }
    }
}
