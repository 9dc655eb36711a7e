mod health_check;
mod rsvp;
mod submission_created;
pub use health_check::*;
pub use rsvp::*;
pub use submission_created::*;

/// Print the error, then every `source` below it, one per line. Used as the
/// `Debug` impl of route errors, so that the logs show the whole chain.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}
