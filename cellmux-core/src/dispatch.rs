//! Interrupt routing
//!
//! Every interrupt-capable pin maps to exactly one handler category.

use crate::config::{CounterId, PinId};

/// Front panel button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
}

/// Handler category for an interrupt pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqRoute {
    /// Coulomb counter edge
    ChargeEdge(CounterId),
    /// Slot pair power-good change
    PowerGood,
    /// Charger standby/charging status change
    Charger,
    Button(Button),
}

/// Resolve the handler for an interrupt pin
pub fn route(pin: PinId) -> Option<IrqRoute> {
    let route = match pin {
        PinId::ChargeInt1 => IrqRoute::ChargeEdge(CounterId::Pair1),
        PinId::ChargeInt2 => IrqRoute::ChargeEdge(CounterId::Pair2),
        PinId::ChargeInt3 => IrqRoute::ChargeEdge(CounterId::Pair3),
        PinId::ChargeInt4 => IrqRoute::ChargeEdge(CounterId::Pair4),
        PinId::ChargeInt5 => IrqRoute::ChargeEdge(CounterId::Pair5),
        PinId::ChargeIntOut => IrqRoute::ChargeEdge(CounterId::Charger),
        PinId::PowerGood1
        | PinId::PowerGood2
        | PinId::PowerGood3
        | PinId::PowerGood4
        | PinId::PowerGood5 => IrqRoute::PowerGood,
        PinId::Standby | PinId::Charging => IrqRoute::Charger,
        PinId::ButtonUp => IrqRoute::Button(Button::Up),
        PinId::ButtonDown => IrqRoute::Button(Button::Down),
        PinId::ButtonLeft => IrqRoute::Button(Button::Left),
        PinId::ButtonRight => IrqRoute::Button(Button::Right),
        PinId::ButtonEnter => IrqRoute::Button(Button::Enter),
        PinId::ButtonEsc => IrqRoute::Button(Button::Escape),
        _ => return None,
    };
    Some(route)
}
