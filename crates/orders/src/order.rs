use serde::{Deserialize, Serialize};

use ticketengine_core::{Entity, LocationId, OrderId};

/// An order placed against a location.
///
/// Orders are created once and never mutated afterwards; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    location_id: LocationId,
}

impl Order {
    pub fn new(id: OrderId, location_id: LocationId) -> Self {
        Self { id, location_id }
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
