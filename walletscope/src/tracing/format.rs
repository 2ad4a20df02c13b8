use tracing::Event;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::registry::LookupSpan;

/// `LEVEL timestamp::name::file::line::message`, plus the names of the enclosing spans.
#[derive(Debug, Clone)]
pub struct WalletscopeFormat {
  pub name: String,
}

impl<S, N> FormatEvent<S, N> for WalletscopeFormat
where
  S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
  N: for<'writer> FormatFields<'writer> + 'static,
{
  fn format_event(
    &self,
    ctx: &FmtContext<'_, S, N>,
    mut writer: Writer<'_>,
    event: &Event<'_>,
  ) -> std::fmt::Result {
    let metadata = event.metadata();
    let file = metadata.file().unwrap_or("unknown");
    let line = metadata.line().unwrap_or(0);

    if file == "unknown" && !cfg!(feature = "deep-trace") {
      return Ok(());
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
    write!(writer, "{} {}::{}::{}::{}::", metadata.level(), timestamp, self.name, file, line)?;

    // Request spans carry the request id.
    if let Some(scope) = ctx.event_scope() {
      for span in scope.from_root() {
        write!(writer, "{}", span.name())?;
        if let Some(fields) = span.extensions().get::<tracing_subscriber::fmt::FormattedFields<N>>() {
          if !fields.is_empty() {
            write!(writer, "{{{}}}", fields)?;
          }
        }
        write!(writer, "::")?;
      }
    }

    ctx.field_format().format_fields(writer.by_ref(), event)?;

    writeln!(writer)
  }
}
