//! Helpers for building SQL while translating a list plan.

use query_engine_sql::sql;

/// Mutable state while translating a single plan.
#[derive(Debug, Default)]
pub struct State {
    next_unique_index: u64,
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    /// Create a table alias that is unique within the plan. The first one gets index 0.
    pub fn make_table_alias(&mut self, name: String) -> sql::ast::TableAlias {
        let unique_index = self.next_unique_index;
        self.next_unique_index += 1;
        sql::ast::TableAlias { unique_index, name }
    }
}
