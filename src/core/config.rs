use super::ship::ShipClass;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_CLASSES: usize = 4;
pub const MAX_SHIP_LENGTH: usize = 4;

/// Fleet composition, longest ships first. Placement prompts follow this order.
pub const FLEET: [ShipClass; NUM_CLASSES] = [
    ShipClass::new(4, 1),
    ShipClass::new(3, 2),
    ShipClass::new(2, 3),
    ShipClass::new(1, 4),
];

/// Total number of ships in the standard fleet.
pub const NUM_SHIPS: usize = 1 + 2 + 3 + 4;

/// Total number of ship segments used in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 4 + 3 * 2 + 2 * 3 + 4;

/// Number of ships of `length` in the standard fleet, or `None` if no such
/// class exists.
pub fn fleet_count(length: usize) -> Option<usize> {
    FLEET
        .iter()
        .find(|class| class.length() == length)
        .map(|class| class.count())
}
