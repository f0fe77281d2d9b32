//! Splits a record into the actor payload and its ordered items

use crate::record::{ActorPayload, ImportRecord, ItemRecord};

/// Separate `items` from the rest of the record, preserving item order
pub fn split(record: ImportRecord) -> (ActorPayload, Vec<ItemRecord>) {
    let ImportRecord {
        name,
        kind,
        system,
        items,
        extra,
    } = record;

    (
        ActorPayload {
            name,
            kind,
            system,
            extra,
        },
        items,
    )
}
