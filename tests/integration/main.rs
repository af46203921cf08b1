//! End-to-end tests: build trees the way a frontend would, scan with
//! the built-in rule set, and exercise output rendering and fix
//! application against full reports.

mod fix_application_tests;
mod scan_pipeline_tests;
