// a single test binary; see helpers.rs for the app harness
mod health_check;
mod helpers;
mod submission_created;
