//! End-to-end scenarios: the probe against an in-process panel.

mod scenarios;
