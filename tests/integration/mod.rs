//! Integration tests for apache-image-check
//!
//! `common` holds an in-memory runtime and browser standing in for a docker
//! daemon and a web server; `docker` runs the real checklist against the image
//! named by `IMAGE_NAME`.

pub mod common;
pub mod docker;
