use crate::actor_framework::Record;
use crate::domain::{Order, OrderPatch};
use crate::gateway::Table;

impl Record for Order {
    type Patch = OrderPatch;
    const TABLE: Table = Table::Orders;

    fn id(&self) -> &str {
        &self.id
    }

    /// Orders only ever change status after creation.
    fn on_update(&mut self, patch: &OrderPatch) {
        self.status = patch.status;
    }
}
