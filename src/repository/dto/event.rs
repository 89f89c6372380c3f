///
/// Inventory view of a catalog event.
/// Capacity is the seat count snapshot used at materialization
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub event_id: i64,
    pub capacity: i32,
}
