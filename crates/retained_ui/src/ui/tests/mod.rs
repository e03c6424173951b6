//! Scenario tests that drive whole widget trees through the manager.

mod end_to_end;
