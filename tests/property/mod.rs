//! Property-based tests for enumeration and batch planning

mod planner;
